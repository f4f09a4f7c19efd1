//! Everything that can happen to the screen, as one enum.

use serde_json::Value;

use super::effects::TaskResultKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Screen shown; reference data is requested.
    Activate,
    /// The `id` route parameter changed (raw text).
    RouteChanged(String),
    Input { field: String, value: Value },
    Blur { field: String },
    Save,
    Delete,
    /// The user accepted the delete prompt for product `id`.
    DeleteConfirmed(u64),
    TaskFinished(TaskResultKind),
}
