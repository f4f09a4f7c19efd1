//! Ordered collection of fields plus form-level flags.
//!
//! Every value change (user edit, programmatic patch, reset) emits a single
//! [`EventSource::ValueChanged`] event on the attached event queue, if any.

use std::collections::HashSet;

use log::trace;
use serde_json::{Map, Value};
use tokio::sync::mpsc::UnboundedSender;

use crate::errors::FormError;
use crate::field::Field;
use crate::pipeline::FormEvent;
use crate::validator::is_blank;

#[derive(Debug, Default)]
pub struct Form {
    fields: Vec<Field>,
    events: Option<UnboundedSender<FormEvent>>,
}

impl Form {
    pub fn new(fields: Vec<Field>) -> Result<Self, FormError> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name()) {
                return Err(FormError::DuplicateField(field.name().to_string()));
            }
        }
        Ok(Self {
            fields,
            events: None,
        })
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.fields.iter().any(Field::is_dirty)
    }

    pub fn is_touched(&self) -> bool {
        self.fields.iter().any(Field::is_touched)
    }

    pub fn is_valid(&self) -> bool {
        self.fields.iter().all(Field::is_valid)
    }

    /// User edit: replaces the value and marks the field dirty.
    pub fn set_value(&mut self, name: &str, value: impl Into<Value>) -> Result<(), FormError> {
        let field = self.field_mut(name)?;
        field.set_value(value.into());
        field.mark_dirty();
        self.emit_value_changed();
        Ok(())
    }

    /// Programmatic update of several fields at once. Unknown keys are
    /// ignored and dirty flags are left alone.
    pub fn patch_value(&mut self, values: &Map<String, Value>) {
        for field in &mut self.fields {
            if let Some(v) = values.get(field.name()) {
                field.set_value(v.clone());
            }
        }
        self.emit_value_changed();
    }

    pub fn mark_touched(&mut self, name: &str) -> Result<(), FormError> {
        self.field_mut(name)?.mark_touched();
        Ok(())
    }

    /// Clear every value and every dirty/touched flag.
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.reset();
        }
        self.emit_value_changed();
    }

    /// Current values keyed by field name. Blank text is reported as `null`.
    pub fn value(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|f| {
                let v = match f.value() {
                    text @ Value::String(_) if is_blank(text) => Value::Null,
                    other => other.clone(),
                };
                (f.name().to_string(), v)
            })
            .collect()
    }

    pub(crate) fn attach_events(&mut self, tx: UnboundedSender<FormEvent>) {
        self.events = Some(tx);
    }

    pub(crate) fn detach_events(&mut self) {
        self.events = None;
    }

    fn field_mut(&mut self, name: &str) -> Result<&mut Field, FormError> {
        self.fields
            .iter_mut()
            .find(|f| f.name() == name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    fn emit_value_changed(&self) {
        if let Some(tx) = &self.events {
            if tx.send(FormEvent::value_changed()).is_err() {
                trace!("value change dropped: pipeline stopped");
            }
        }
    }
}
