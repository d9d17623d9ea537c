//! aep-e2e-validator - end-to-end conformance tests for AEP HTTP APIs

use clap::Parser;
use colored::Colorize;
use log::LevelFilter;

mod cases;
mod cli;
mod client;
mod config;
mod error;
mod models;
mod output;
mod payload;
mod validator;

use cli::{Cli, Commands};
use config::Settings;
use error::Result;
use validator::ExitStatus;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match run(cli).await {
        Ok(status) => std::process::exit(status.code()),
        Err(err) => {
            eprintln!("{} {}", "Error:".red(), err);
            // Anything that stops the run before a test starts is a precondition failure
            std::process::exit(ExitStatus::PreconditionFailed.code());
        }
    }
}

/// `RUST_LOG` applies unless `--debug` is given; the default is warnings only.
fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_module(env!("CARGO_CRATE_NAME"), LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

async fn run(cli: Cli) -> Result<ExitStatus> {
    match cli.command {
        Commands::Validate(args) => {
            let settings = Settings::load(cli.settings.as_deref())?;
            cli::validate::run(args, &settings).await
        }
        Commands::ListTests => {
            cli::list_tests::run();
            Ok(ExitStatus::Success)
        }
    }
}
