//! Message catalog: field name → failure kind → message template.
//!
//! Built once and immutable afterwards. Templates may reference failure
//! metadata through `{min}`, `{max}`, `{requiredLength}` and
//! `{actualLength}`; anything else is returned verbatim.
//!
//! Catalogs come either from code (`MessageCatalog::builder()`) or from a
//! configuration file, deserialized from the nested shape:
//!
//! ```ignore
//! [productName]
//! required = "Product name is required."
//! minlength = "Product name must be at least {requiredLength} characters."
//! ```

use std::collections::HashMap;

use serde::Deserialize;

use crate::errors::{CatalogError, CatalogGap};
use crate::form::Form;
use crate::validator::{FailureKind, FailureMeta};

type RawCatalog = HashMap<String, HashMap<String, String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawCatalog")]
pub struct MessageCatalog {
    entries: HashMap<String, HashMap<FailureKind, String>>,
}

impl MessageCatalog {
    pub fn builder() -> MessageCatalogBuilder {
        MessageCatalogBuilder::default()
    }

    /// Build from `(field, kind, template)` triples. Later triples win.
    pub fn from_triples<F, K, T>(triples: impl IntoIterator<Item = (F, K, T)>) -> Self
    where
        F: Into<String>,
        K: Into<FailureKind>,
        T: Into<String>,
    {
        triples
            .into_iter()
            .fold(Self::builder(), |b, (field, kind, template)| {
                b.message(field, kind, template)
            })
            .build()
    }

    pub fn template(&self, field: &str, kind: &FailureKind) -> Option<&str> {
        self.entries
            .get(field)
            .and_then(|kinds| kinds.get(kind))
            .map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of templates across all fields.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overlay `other` on top of `self`; templates in `other` replace ours.
    pub fn merged(mut self, other: MessageCatalog) -> Self {
        for (field, kinds) in other.entries {
            self.entries.entry(field).or_default().extend(kinds);
        }
        self
    }

    /// Compare the catalog with the validators wired on `form`.
    ///
    /// Reports every registered validator kind without a template and every
    /// catalog field the form does not declare.
    pub fn check_coverage(&self, form: &Form) -> Result<(), CatalogError> {
        let mut gaps = Vec::new();
        for field in form.fields() {
            for kind in field.validator_kinds() {
                if self.template(field.name(), &kind).is_none() {
                    gaps.push(CatalogGap::MissingMessage {
                        field: field.name().to_string(),
                        kind,
                    });
                }
            }
        }
        let mut unknown: Vec<_> = self.fields().filter(|f| !form.contains(f)).collect();
        unknown.sort_unstable();
        gaps.extend(
            unknown
                .into_iter()
                .map(|f| CatalogGap::UnknownField(f.to_string())),
        );

        if gaps.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::Incomplete(gaps))
        }
    }
}

impl From<RawCatalog> for MessageCatalog {
    fn from(raw: RawCatalog) -> Self {
        let entries = raw
            .into_iter()
            .map(|(field, kinds)| {
                let kinds = kinds
                    .into_iter()
                    .map(|(kind, template)| (FailureKind::from(kind.as_str()), template))
                    .collect();
                (field, kinds)
            })
            .collect();
        Self { entries }
    }
}

#[derive(Debug, Default)]
pub struct MessageCatalogBuilder {
    entries: HashMap<String, HashMap<FailureKind, String>>,
}

impl MessageCatalogBuilder {
    pub fn message(
        mut self,
        field: impl Into<String>,
        kind: impl Into<FailureKind>,
        template: impl Into<String>,
    ) -> Self {
        self.entries
            .entry(field.into())
            .or_default()
            .insert(kind.into(), template.into());
        self
    }

    pub fn build(self) -> MessageCatalog {
        MessageCatalog {
            entries: self.entries,
        }
    }
}

/// Substitute metadata placeholders in a template.
pub fn render(template: &str, meta: &FailureMeta) -> String {
    match meta {
        FailureMeta::None => template.to_string(),
        FailureMeta::Length { required, actual } => template
            .replace("{requiredLength}", &required.to_string())
            .replace("{actualLength}", &actual.to_string()),
        FailureMeta::Range { min, max } => template
            .replace("{min}", &min.to_string())
            .replace("{max}", &max.to_string()),
    }
}
