use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "product_editor", version, about = "Headless product edit screen")]
pub struct Cli {
    /// Configuration file layered over the defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Open the edit screen for one product and replay a UI script
    Edit {
        /// Route id of the product; 0 creates a new one
        #[arg(long, default_value = "0")]
        id: String,
        /// JSON file seeding the store: {"products": [...], "categories": [...]}
        #[arg(long)]
        data: Option<PathBuf>,
        /// JSON file with the UI steps to replay
        #[arg(long)]
        script: Option<PathBuf>,
        /// Answer the delete prompt with yes instead of asking
        #[arg(long)]
        yes: bool,
    },
    /// Check a message catalog against the product form
    CheckCatalog {
        /// Catalog file (JSON); defaults to the configured catalog
        file: Option<PathBuf>,
    },
}
