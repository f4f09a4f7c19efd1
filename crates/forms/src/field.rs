//! A single named slot of a [`Form`](crate::Form).
//!
//! The declarative half (name, initial value, validators) is set through the
//! builder methods. The interactive half (`dirty`, `touched`, current value)
//! only changes through the owning form so value-change events stay in step
//! with the state they describe.

use serde_json::Value;

use crate::validator::{Failure, FailureKind, Validator};

#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    value: Value,
    validators: Vec<Validator>,
    dirty: bool,
    touched: bool,
    failures: Vec<Failure>,
}

impl Field {
    /// Create a field with an initial value and no validators.
    pub fn new(name: impl Into<String>, initial: impl Into<Value>) -> Self {
        let mut field = Self {
            name: name.into(),
            value: initial.into(),
            validators: Vec::new(),
            dirty: false,
            touched: false,
            failures: Vec::new(),
        };
        field.revalidate();
        field
    }

    /// Attach a validator. Registration order is the message precedence order.
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self.revalidate();
        self
    }

    pub fn validators(mut self, validators: impl IntoIterator<Item = Validator>) -> Self {
        self.validators.extend(validators);
        self.revalidate();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// Currently failing validators, in registration order.
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn has_failure(&self, kind: &FailureKind) -> bool {
        self.failures.iter().any(|f| &f.kind == kind)
    }

    /// Kinds of every registered validator, in registration order.
    pub fn validator_kinds(&self) -> impl Iterator<Item = FailureKind> + '_ {
        self.validators.iter().map(Validator::kind)
    }

    pub(crate) fn set_value(&mut self, value: Value) {
        self.value = value;
        self.revalidate();
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn mark_touched(&mut self) {
        self.touched = true;
    }

    pub(crate) fn reset(&mut self) {
        self.dirty = false;
        self.touched = false;
        self.set_value(Value::Null);
    }

    fn revalidate(&mut self) {
        self.failures = self
            .validators
            .iter()
            .filter_map(|v| v.validate(&self.value).err())
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failures_follow_registration_order() {
        let mut field = Field::new("productName", "")
            .validator(Validator::required())
            .validator(Validator::min_length(3));
        field.set_value(json!("  "));
        let kinds: Vec<_> = field.failures().iter().map(|f| f.kind.clone()).collect();
        assert_eq!(kinds, vec![FailureKind::Required, FailureKind::MinLength]);
    }

    #[test]
    fn validators_run_on_every_value_change() {
        let mut field = Field::new("unitInStock", json!(5)).validator(Validator::range(1.0, 2000.0));
        assert!(field.is_valid());
        field.set_value(json!(2001));
        assert!(field.has_failure(&FailureKind::Range));
        field.set_value(json!(20));
        assert!(field.is_valid());
    }

    #[test]
    fn reset_clears_flags_and_value() {
        let mut field = Field::new("productName", "Saw").validator(Validator::required());
        field.mark_dirty();
        field.mark_touched();
        field.reset();
        assert!(!field.is_dirty());
        assert!(!field.is_touched());
        assert_eq!(field.value(), &Value::Null);
        assert!(field.has_failure(&FailureKind::Required));
    }
}
