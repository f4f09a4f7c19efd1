//! Declarative field validation.
//!
//! - [`Validator`]: pure value checks (`required`, `min_length`,
//!   `max_length`, `range`, custom closures)
//! - [`Field`] / [`Form`]: named values with dirty/touched tracking
//! - [`MessageCatalog`]: field → failure kind → message template
//! - [`GenericValidator`]: derives one display message per invalid field
//! - [`pipeline`]: merges value-change and blur events, debounces them and
//!   publishes fresh [`DisplayMessages`]

pub mod catalog;
pub mod engine;
pub mod errors;
pub mod field;
pub mod form;
pub mod pipeline;
pub mod validator;

pub use catalog::{MessageCatalog, MessageCatalogBuilder};
pub use engine::{DisplayMessages, GenericValidator};
pub use errors::{CatalogError, CatalogGap, FormError};
pub use field::Field;
pub use form::Form;
pub use pipeline::{
    lock_form, InputHandle, PipelineBuilder, SharedForm, ValidationPipeline, DEFAULT_DEBOUNCE,
};
pub use validator::{Failure, FailureKind, FailureMeta, Validator};
