//! Screen state owned by the event loop.
//!
//! `ScreenModel` is the single mutable state of one edit screen; only the
//! reducer changes it. `EditView` is the immutable snapshot published to the
//! rendering layer after every loop turn.

use serde::Serialize;
use serde_json::{Map, Value};
use strum::Display;

use forms::Form;

use crate::config::Config;
use crate::domain::{Category, Product};

/// Lifecycle of the edit screen.
///
/// ```text
/// Idle -> Loading(id) -> Populated -> Editing -> Saving | Deleting -> NavigatedAway
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScreenState {
    #[default]
    Idle,
    Loading { id: u64 },
    Populated,
    Editing,
    Saving,
    Deleting,
    NavigatedAway,
}

impl ScreenState {
    /// A store request is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            ScreenState::Loading { .. } | ScreenState::Saving | ScreenState::Deleting
        )
    }

    /// A product is on screen and can be saved or deleted.
    pub fn is_editable(&self) -> bool {
        matches!(self, ScreenState::Populated | ScreenState::Editing)
    }
}

/// Texts and routes the screen needs from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenLabels {
    pub create_title: String,
    pub update_title: String,
    pub list_route: String,
}

impl Default for ScreenLabels {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ScreenLabels {
    fn from(cfg: &Config) -> Self {
        Self {
            create_title: cfg.create_title.clone(),
            update_title: cfg.update_title.clone(),
            list_route: cfg.list_route.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScreenModel {
    pub state: ScreenState,
    /// Last product received from the store (or the blank one in creation mode).
    pub product: Option<Product>,
    pub page_title: String,
    /// Single error slot; each failure overwrites the previous one.
    pub error_message: Option<String>,
    pub categories: Vec<Category>,
    pub labels: ScreenLabels,
    /// Route id received while a save or delete was in flight.
    pub deferred_route: Option<String>,
}

impl ScreenModel {
    pub fn new(labels: ScreenLabels) -> Self {
        Self {
            page_title: labels.update_title.clone(),
            labels,
            ..Default::default()
        }
    }

    pub fn view(&self) -> EditView {
        EditView {
            state: self.state,
            page_title: self.page_title.clone(),
            error_message: self.error_message.clone(),
            categories: self.categories.clone(),
            product_id: self.product.as_ref().map(|p| p.id),
        }
    }
}

/// What the rendering layer shows besides the form and its messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditView {
    pub state: ScreenState,
    pub page_title: String,
    pub error_message: Option<String>,
    pub categories: Vec<Category>,
    pub product_id: Option<u64>,
}

impl EditView {
    /// Neither idle nor waiting on the store.
    pub fn is_settled(&self) -> bool {
        !self.state.is_busy() && self.state != ScreenState::Idle
    }
}

/// Read-only form facts the reducer decides on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormStatus {
    pub dirty: bool,
    pub valid: bool,
    pub values: Map<String, Value>,
}

impl FormStatus {
    pub fn capture(form: &Form) -> Self {
        Self {
            dirty: form.is_dirty(),
            valid: form.is_valid(),
            values: form.value(),
        }
    }
}
