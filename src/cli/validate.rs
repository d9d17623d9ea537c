//! `validate` command

use std::io::Write;

use colored::Colorize;
use log::debug;

use crate::cli::{OutputFormat, ValidateArgs};
use crate::client::HttpResourceClient;
use crate::config::Settings;
use crate::error::Result;
use crate::models::openapi::{fetch_document, parse_api};
use crate::output::{self, Progress};
use crate::validator::{
    ExitStatus, ResourceSelection, RunReport, Validator, select_cases, select_resources,
};

/// Flags merged with settings; flags win.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Resolved {
    selection: ResourceSelection,
    tests: Vec<String>,
    server_url: Option<String>,
    format: OutputFormat,
}

fn resolve(args: ValidateArgs, settings: &Settings) -> Resolved {
    let selection = match args.collection {
        Some(plural) if !args.all_collections => ResourceSelection::Collection(plural),
        _ => ResourceSelection::AllCollections,
    };
    let tests = if args.tests.is_empty() {
        settings.tests.clone()
    } else {
        args.tests
    };

    Resolved {
        selection,
        tests,
        server_url: args.server_url.or_else(|| settings.server_url.clone()),
        format: args.format.or(settings.format).unwrap_or_default(),
    }
}

/// Run the selected tests and print the summary. Returns the run status.
pub async fn run(args: ValidateArgs, settings: &Settings) -> Result<ExitStatus> {
    let resolved = resolve(args.clone(), settings);
    let cases = select_cases(&resolved.tests)?;

    let doc = fetch_document(&args.config).await?;
    let model = parse_api(&doc, resolved.server_url.as_deref())?;
    let resources = select_resources(&model, &resolved.selection)?;
    debug!(
        "Validating {} resource(s) against {}",
        resources.len(),
        model.server_url
    );

    let client = HttpResourceClient::new(settings.timeout())?;
    let validator = Validator::new(&client, cases, Progress::for_format(resolved.format));
    let report = validator.run(&resources).await;

    Ok(finish(&report, resolved.format, &mut std::io::stdout().lock()))
}

/// Write the summary. The run status stands even if the summary cannot be
/// written.
fn finish(report: &RunReport, format: OutputFormat, out: &mut impl Write) -> ExitStatus {
    if let Err(err) = output::write_report(report, format, out) {
        eprintln!("{} failed to write summary: {}", "Error:".red(), err);
    }
    report.status
}
