use std::sync::OnceLock;

use color_eyre::Result;
use thiserror::Error;
use tracing::error;

use forms::{CatalogError, FormError};

use crate::domain::StoreError;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid product id `{0}`")]
    InvalidId(String),

    #[error("cannot apply form values to the product: {0}")]
    Overlay(#[from] serde_json::Error),
}

static INIT: OnceLock<()> = OnceLock::new();

/// Install the color-eyre report and panic hooks. Safe to call repeatedly.
pub fn init() -> Result<()> {
    if INIT.get().is_some() {
        return Ok(());
    }

    // try_into_hooks: no panic if another hook set is already installed
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .panic_section("This is a bug. Consider reporting it together with the log output.")
        .capture_span_trace_by_default(false)
        .display_location_section(false)
        .display_env_section(false)
        .try_into_hooks()?;
    eyre_hook.install()?;

    std::panic::set_hook(Box::new(move |panic_info| {
        let report = panic_hook.panic_report(panic_info);
        error!("Error: {}", report);
        eprintln!("{report}");
    }));

    let _ = INIT.set(());
    Ok(())
}
