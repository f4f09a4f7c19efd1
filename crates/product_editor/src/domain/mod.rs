//! Product domain and the collaborators the edit screen depends on.

pub mod confirm;
pub mod product;
pub mod router;
pub mod store;

pub use confirm::{AutoConfirm, ConfirmPrompt, StdinConfirm};
pub use product::{Category, Product, FORM_FIELDS};
pub use router::{RecordingRouter, Router};
pub use store::{EntityStore, InMemoryStore, StoreCall, StoreError, StoreOp};
