/*!
Effect & task model of the edit screen.

- `Effect`: declarative side effect returned by the reducer
- `TaskKind`: store call to run on the executor
- `TaskResultKind`: outcome of a task, fed back to the reducer
- `InternalEvent`: executor lifecycle events consumed by the screen loop

The reducer stays pure: it only returns `Vec<Effect>`. The screen loop
interprets them, hands `Effect::Async` to the `TaskExecutor`, and the
executor reports back with `InternalEvent::TaskFinished`.
*/

use std::fmt;

use serde_json::{Map, Value};

use crate::domain::{Category, Product};

/// Declarative instruction emitted by the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Run a store call in the background.
    Async(TaskKind),
    /// Clear values and dirty/touched flags of the form.
    ResetForm,
    /// Programmatic update; fields stay pristine.
    PatchForm(Map<String, Value>),
    /// Forward a user edit to the bound input.
    Input { field: String, value: Value },
    /// Forward a focus loss to the bound input.
    Blur { field: String },
    /// Ask the user before deleting product `id`.
    ConfirmDelete { id: u64, message: String },
    Navigate(String),
}

impl Effect {
    pub fn async_task(kind: TaskKind) -> Self {
        Effect::Async(kind)
    }
}

/// Store work the executor can run. Each variant carries its whole input.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskKind {
    FetchProduct(u64),
    FetchCategories,
    SaveProduct(Product),
    DeleteProduct(u64),
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::FetchProduct(id) => write!(f, "FetchProduct(id={id})"),
            TaskKind::FetchCategories => f.write_str("FetchCategories"),
            TaskKind::SaveProduct(p) => write!(f, "SaveProduct(id={})", p.id),
            TaskKind::DeleteProduct(id) => write!(f, "DeleteProduct(id={id})"),
        }
    }
}

/// Results produced by the executor. Failures carry the display text of
/// the store error.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskResultKind {
    ProductLoaded { id: u64, product: Product },
    ProductLoadFailed { id: u64, error: String },
    CategoriesLoaded(Vec<Category>),
    CategoriesFailed { error: String },
    Saved { product: Product },
    SaveFailed { error: String },
    Deleted { id: u64 },
    DeleteFailed { id: u64, error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    TaskStarted { id: u64, label: String },
    TaskFinished { id: u64, result: TaskResultKind },
}
