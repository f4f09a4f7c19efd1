use std::fmt;

use thiserror::Error;

use crate::validator::FailureKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("duplicate field: {0}")]
    DuplicateField(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("input already bound: {0}")]
    AlreadyBound(String),
}

/// A single mismatch between a message catalog and the fields it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogGap {
    /// A validator is registered on the field but the catalog has no template for its kind.
    MissingMessage { field: String, kind: FailureKind },
    /// The catalog carries templates for a field the form does not declare.
    UnknownField(String),
}

impl fmt::Display for CatalogGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogGap::MissingMessage { field, kind } => {
                write!(f, "no message for field `{field}` failing `{kind}`")
            }
            CatalogGap::UnknownField(field) => write!(f, "catalog names unknown field `{field}`"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("message catalog incomplete: {}", join_gaps(.0))]
    Incomplete(Vec<CatalogGap>),
}

impl CatalogError {
    pub fn gaps(&self) -> &[CatalogGap] {
        match self {
            CatalogError::Incomplete(gaps) => gaps,
        }
    }
}

fn join_gaps(gaps: &[CatalogGap]) -> String {
    gaps.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
