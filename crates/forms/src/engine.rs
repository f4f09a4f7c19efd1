//! Generic validator engine: derives one display message per invalid field.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use serde::Serialize;

use crate::catalog::{render, MessageCatalog};
use crate::errors::CatalogError;
use crate::form::Form;
use crate::validator::Failure;

/// Field name → the single message to show for it.
///
/// Only fields the user has interacted with (dirty or touched) and that
/// currently fail a validator appear here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DisplayMessages(BTreeMap<String, String>);

impl DisplayMessages {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DisplayMessages {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct GenericValidator {
    catalog: MessageCatalog,
    /// Fields whose catalog gap has already been warned about.
    missed: Arc<Mutex<BTreeSet<String>>>,
}

impl GenericValidator {
    /// Lenient engine: catalog gaps only show up as missing messages.
    pub fn new(catalog: MessageCatalog) -> Self {
        Self {
            catalog,
            missed: Arc::default(),
        }
    }

    /// Engine whose catalog has been checked against every validator wired on `form`.
    pub fn checked(catalog: MessageCatalog, form: &Form) -> Result<Self, CatalogError> {
        catalog.check_coverage(form)?;
        Ok(Self::new(catalog))
    }

    pub fn catalog(&self) -> &MessageCatalog {
        &self.catalog
    }

    /// Derive the display message map for the current form state.
    ///
    /// For each field (declaration order) that is dirty or touched and fails
    /// at least one validator, the first failing kind in registration order
    /// that has a catalog template wins. Fields whose failing kinds all lack
    /// a template are left out.
    pub fn process_messages(&self, form: &Form) -> DisplayMessages {
        let mut messages = BTreeMap::new();
        for field in form.fields() {
            if !(field.is_dirty() || field.is_touched()) || field.is_valid() {
                continue;
            }
            let chosen = field.failures().iter().find_map(|failure| {
                self.catalog
                    .template(field.name(), &failure.kind)
                    .map(|template| render(template, &failure.meta))
            });
            match chosen {
                Some(message) => {
                    messages.insert(field.name().to_string(), message);
                }
                None => self.report_miss(field.name(), field.failures()),
            }
        }
        debug!("derived {} display message(s)", messages.len());
        DisplayMessages(messages)
    }

    /// Warn the first time a field goes without a message, then only debug.
    fn report_miss(&self, field: &str, failures: &[Failure]) {
        let kinds: Vec<&str> = failures.iter().map(|f| f.kind.as_str()).collect();
        let first = self
            .missed
            .lock()
            .map(|mut missed| missed.insert(field.to_string()))
            .unwrap_or(false);
        if first {
            warn!("no catalog message for field `{field}` (failing: {kinds:?})");
        } else {
            debug!("still no catalog message for field `{field}`");
        }
    }
}
