use clap::Parser;
use color_eyre::Result;

use product_editor::cli::{Cli, Cmd};
use product_editor::{app, errors, logging, Config};

#[tokio::main]
pub async fn main() -> Result<()> {
    errors::init()?;
    logging::init()?;

    let args = Cli::parse();
    let config = Config::load(args.config.as_deref())?;
    match args.cmd {
        Cmd::Edit {
            id,
            data,
            script,
            yes,
        } => app::edit(&config, &id, data.as_deref(), script.as_deref(), yes).await,
        Cmd::CheckCatalog { file } => app::check_catalog(&config, file.as_deref()),
    }
}
