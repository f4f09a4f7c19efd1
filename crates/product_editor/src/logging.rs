use color_eyre::Result;
use lazy_static::lazy_static;
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::PROJECT_NAME;

lazy_static! {
    pub static ref LOG_ENV: String = format!("{}_LOG", PROJECT_NAME.clone());
}

/// Console logging on stderr.
///
/// Filter: `PRODUCT_EDITOR_LOG`, else `RUST_LOG`, else `info`. Records from
/// the `log` facade (the `forms` crate) are forwarded as well.
pub fn init() -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV.as_str())
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(ErrorLayer::default())
        .try_init()?;
    Ok(())
}
