//! Command implementations behind the CLI.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use serde_json::json;
use tokio::time::{sleep, timeout};
use tracing::info;

use forms::MessageCatalog;

use crate::config::Config;
use crate::core::{ProductEditScreen, ScreenDeps, ID_PARAM};
use crate::domain::{AutoConfirm, ConfirmPrompt, InMemoryStore, RecordingRouter, StdinConfirm};
use crate::product_form::product_form;
use crate::script::{self, Frame};

/// Run the edit screen for route id `id` and print one JSON line per frame.
pub async fn edit(
    config: &Config,
    id: &str,
    data: Option<&Path>,
    script_file: Option<&Path>,
    yes: bool,
) -> Result<()> {
    let store = match data {
        Some(path) => {
            let json = fs::read_to_string(path)
                .wrap_err_with(|| format!("reading store data {}", path.display()))?;
            InMemoryStore::from_json(&json)?
        }
        None => InMemoryStore::demo(),
    };
    let steps = match script_file {
        Some(path) => {
            let json = fs::read_to_string(path)
                .wrap_err_with(|| format!("reading script {}", path.display()))?;
            script::parse(&json)?
        }
        None => Vec::new(),
    };

    let router = Arc::new(RecordingRouter::new());
    let confirm: Arc<dyn ConfirmPrompt> = if yes {
        Arc::new(AutoConfirm::accept())
    } else {
        Arc::new(StdinConfirm)
    };
    let screen = ProductEditScreen::activate(
        config,
        ScreenDeps {
            store: Arc::new(store),
            router: router.clone(),
            confirm,
        },
    )?;

    router.push_param(ID_PARAM, id);
    let mut view = screen.view();
    timeout(
        Duration::from_secs(5),
        view.wait_for(|v| v.is_settled() || v.error_message.is_some()),
    )
    .await
    .wrap_err("product did not load in time")??;
    print_frame(&Frame::capture("load", &screen))?;

    let mut printed = Ok(());
    script::replay(&screen, &steps, |frame| {
        if printed.is_ok() {
            printed = print_frame(&frame);
        }
    })
    .await;
    printed?;

    sleep(config.debounce() + Duration::from_millis(50)).await;
    print_frame(&Frame::capture("final", &screen))?;
    for path in router.navigations() {
        println!("{}", json!({ "navigated": path }));
    }

    screen.teardown().await;
    info!("edit session finished");
    Ok(())
}

/// Compare a catalog with the product form and list every gap.
pub fn check_catalog(config: &Config, file: Option<&Path>) -> Result<()> {
    let catalog = match file {
        Some(path) => {
            let json = fs::read_to_string(path)
                .wrap_err_with(|| format!("reading catalog {}", path.display()))?;
            serde_json::from_str::<MessageCatalog>(&json)?
        }
        None => config.catalog(),
    };
    let form = product_form()?;
    let validators: usize = form.fields().iter().map(|f| f.validator_kinds().count()).sum();

    match catalog.check_coverage(&form) {
        Ok(()) => {
            println!(
                "catalog covers all {validators} validators on {} fields",
                form.fields().len()
            );
            Ok(())
        }
        Err(e) => {
            for gap in e.gaps() {
                println!("{gap}");
            }
            Err(eyre!("{} catalog gap(s) found", e.gaps().len()))
        }
    }
}

fn print_frame(frame: &Frame) -> Result<()> {
    println!("{}", serde_json::to_string(frame)?);
    Ok(())
}
