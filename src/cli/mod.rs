//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod args;
pub mod validate;

pub use args::OutputFormat;

/// End-to-end validator for AEP-compliant HTTP APIs
#[derive(Parser, Debug)]
#[command(name = "aep-e2e-validator")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (defaults to <config dir>/aep-e2e-validator/settings.yaml)
    #[arg(long, global = true, env = "AEP_VALIDATOR_SETTINGS", hide_env = true)]
    pub settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true, env = "AEP_VALIDATOR_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the end-to-end tests against a live server
    Validate(ValidateArgs),

    /// List the available tests in the order they run
    ListTests,
}

/// Arguments for `validate`
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// OpenAPI description of the server, as a file path or http(s) URL
    #[arg(long)]
    pub config: String,

    /// Plural name of the collection to validate
    #[arg(
        long,
        conflicts_with = "all_collections",
        required_unless_present = "all_collections"
    )]
    pub collection: Option<String>,

    /// Validate every top-level collection
    #[arg(long)]
    pub all_collections: bool,

    /// Comma-separated tests to run (default: all)
    #[arg(long, value_delimiter = ',')]
    pub tests: Vec<String>,

    /// Server URL, overriding the one in the OpenAPI description
    #[arg(long)]
    pub server_url: Option<String>,

    /// Output format (pretty, json)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}
