use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use lazy_static::lazy_static;
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

use forms::{FailureKind, MessageCatalog};

use crate::product_form::product_catalog;

const DEFAULT_DEBOUNCE_MS: u64 = 800;

/// Screen configuration.
///
/// Sources, lowest priority first: built-in defaults, `config.json5` and
/// `config.toml` in the config directory, an explicit file (`--config`).
///
/// ```toml
/// debounce_ms = 500
/// list_route = "/catalog"
///
/// [[messages]]
/// field = "unitPrice"
/// kind = "range"
/// template = "Enter a price from {min} to {max}."
/// ```
///
/// Message overrides are a list rather than a `[messages.<field>]` table:
/// the `config` crate lowercases keys, and field names are camelCase.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub debounce_ms: u64,
    pub list_route: String,
    pub create_title: String,
    pub update_title: String,
    /// Templates that override or extend the built-in product messages.
    #[serde(default, deserialize_with = "message_overrides")]
    pub messages: MessageCatalog,
    #[serde(default)]
    pub config_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            list_route: "/products".into(),
            create_title: "Add Product".into(),
            update_title: "Update Product".into(),
            messages: MessageCatalog::default(),
            config_dir: get_config_dir(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessageOverride {
    field: String,
    kind: String,
    template: String,
}

fn message_overrides<'de, D>(deserializer: D) -> Result<MessageCatalog, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = Vec::<MessageOverride>::deserialize(deserializer)?;
    Ok(MessageCatalog::from_triples(
        overrides
            .into_iter()
            .map(|o| (o.field, FailureKind::from(o.kind.as_str()), o.template)),
    ))
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

impl Config {
    /// Load defaults plus the config-directory files, then layer `explicit`
    /// on top. An explicit file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, config::ConfigError> {
        let config_dir = get_config_dir();
        let defaults = Config::default();
        let mut builder = config::Config::builder()
            .set_default("debounce_ms", defaults.debounce_ms as i64)?
            .set_default("list_route", defaults.list_route)?
            .set_default("create_title", defaults.create_title)?
            .set_default("update_title", defaults.update_title)?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?;

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.toml", config::FileFormat::Toml),
        ];
        let mut found_config = false;
        for (file, format) in &config_files {
            let path = config_dir.join(file);
            let source = config::File::from(path.clone())
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
            if path.exists() {
                found_config = true;
            }
        }
        if let Some(path) = explicit {
            builder = builder.add_source(config::File::from(path).required(true));
            found_config = true;
        }
        if !found_config {
            debug!("no configuration file found, using defaults");
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        info!(
            debounce_ms = cfg.debounce_ms,
            list_route = %cfg.list_route,
            overrides = cfg.messages.len(),
            "configuration loaded"
        );
        Ok(cfg)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Built-in product messages with the configured overrides applied.
    pub fn catalog(&self) -> MessageCatalog {
        product_catalog().merged(self.messages.clone())
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "forge", env!("CARGO_PKG_NAME"))
}
