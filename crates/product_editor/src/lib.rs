//! Product edit screen.
//!
//! Loads a product by route id, binds it to the product form, shows
//! validation messages as the user edits (through the `forms` pipeline) and
//! saves or deletes the product through an [`domain::EntityStore`].

pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod product_form;
pub mod script;

pub use crate::config::Config;
pub use crate::core::{EditView, ProductEditScreen, ScreenDeps, ScreenState, ID_PARAM};
pub use crate::errors::EditorError;
