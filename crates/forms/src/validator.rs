//! Validators attached to form fields.
//!
//! A validator is a pure function of the field value. It either accepts the
//! value or reports a [`Failure`] carrying the failure kind (the key used by
//! the message catalog) and optional metadata such as the violated bound.
//!
//! Built-in validators follow the usual "one concern each" split: only
//! `required` cares about absence. Length and range checks accept absent or
//! blank values so they never double-report an empty field.
//!
//! ```ignore
//! use forms::Validator;
//!
//! let price = Validator::range(1.0, 99_999.0);
//! assert!(price.validate(&serde_json::json!(12)).is_ok());
//! assert!(price.validate(&serde_json::json!(0)).is_err());
//! ```

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;

/// Key identifying why a validator rejected a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    Required,
    MinLength,
    MaxLength,
    Range,
    Custom(String),
}

impl FailureKind {
    pub fn as_str(&self) -> &str {
        match self {
            FailureKind::Required => "required",
            FailureKind::MinLength => "minlength",
            FailureKind::MaxLength => "maxlength",
            FailureKind::Range => "range",
            FailureKind::Custom(kind) => kind,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailureKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "required" => FailureKind::Required,
            "minlength" => FailureKind::MinLength,
            "maxlength" => FailureKind::MaxLength,
            "range" => FailureKind::Range,
            other => FailureKind::Custom(other.to_string()),
        })
    }
}

impl From<&str> for FailureKind {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

/// Metadata reported alongside a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureMeta {
    None,
    Length { required: usize, actual: usize },
    Range { min: f64, max: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub kind: FailureKind,
    pub meta: FailureMeta,
}

impl Failure {
    pub fn new(kind: FailureKind, meta: FailureMeta) -> Self {
        Self { kind, meta }
    }
}

type CustomCheck = Arc<dyn Fn(&Value) -> Option<FailureMeta> + Send + Sync>;

/// A single check attached to a field.
#[derive(Clone)]
pub enum Validator {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Range { min: f64, max: f64 },
    Custom { kind: String, check: CustomCheck },
}

impl Validator {
    pub fn required() -> Self {
        Validator::Required
    }

    pub fn min_length(len: usize) -> Self {
        Validator::MinLength(len)
    }

    pub fn max_length(len: usize) -> Self {
        Validator::MaxLength(len)
    }

    /// Inclusive numeric bound. Absent or non-numeric values pass.
    pub fn range(min: f64, max: f64) -> Self {
        Validator::Range { min, max }
    }

    /// Attach a caller-supplied check. The closure returns `Some(meta)` to
    /// reject the value under `kind`.
    pub fn custom(
        kind: impl Into<String>,
        check: impl Fn(&Value) -> Option<FailureMeta> + Send + Sync + 'static,
    ) -> Self {
        Validator::Custom {
            kind: kind.into(),
            check: Arc::new(check),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Validator::Required => FailureKind::Required,
            Validator::MinLength(_) => FailureKind::MinLength,
            Validator::MaxLength(_) => FailureKind::MaxLength,
            Validator::Range { .. } => FailureKind::Range,
            Validator::Custom { kind, .. } => FailureKind::Custom(kind.clone()),
        }
    }

    pub fn validate(&self, value: &Value) -> Result<(), Failure> {
        match self {
            Validator::Required => {
                if is_blank(value) {
                    return Err(Failure::new(FailureKind::Required, FailureMeta::None));
                }
            }
            Validator::MinLength(required) => {
                if let Some(actual) = length_of(value) {
                    if actual > 0 && actual < *required {
                        return Err(Failure::new(
                            FailureKind::MinLength,
                            FailureMeta::Length {
                                required: *required,
                                actual,
                            },
                        ));
                    }
                }
            }
            Validator::MaxLength(required) => {
                if let Some(actual) = length_of(value) {
                    if actual > *required {
                        return Err(Failure::new(
                            FailureKind::MaxLength,
                            FailureMeta::Length {
                                required: *required,
                                actual,
                            },
                        ));
                    }
                }
            }
            Validator::Range { min, max } => {
                if let Some(n) = as_number(value) {
                    if n < *min || n > *max {
                        return Err(Failure::new(
                            FailureKind::Range,
                            FailureMeta::Range {
                                min: *min,
                                max: *max,
                            },
                        ));
                    }
                }
            }
            Validator::Custom { kind, check } => {
                if let Some(meta) = check(value) {
                    return Err(Failure::new(FailureKind::Custom(kind.clone()), meta));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::Required => f.write_str("Required"),
            Validator::MinLength(n) => f.debug_tuple("MinLength").field(n).finish(),
            Validator::MaxLength(n) => f.debug_tuple("MaxLength").field(n).finish(),
            Validator::Range { min, max } => f
                .debug_struct("Range")
                .field("min", min)
                .field("max", max)
                .finish(),
            Validator::Custom { kind, .. } => {
                f.debug_struct("Custom").field("kind", kind).finish_non_exhaustive()
            }
        }
    }
}

/// True for null, whitespace-only strings and empty arrays.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Numeric reading of a value: JSON numbers and numeric text. Blank text is absent.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}
