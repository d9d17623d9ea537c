//! Output for validation runs
//!
//! Progress lines are written as the run goes; the summary is printed once
//! at the end in the selected format.

use std::io::Write;

use colored::Colorize;

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::validator::RunReport;

pub mod json;
pub mod table;

/// Human-readable progress lines on stdout.
///
/// Disabled for machine-readable output so stdout carries only the summary.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    enabled: bool,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn quiet() -> Self {
        Self::new(false)
    }

    pub fn for_format(format: OutputFormat) -> Self {
        Self::new(format == OutputFormat::Pretty)
    }

    pub fn resource(&self, singular: &str) {
        if self.enabled {
            println!("{} {}", "Validating resource:".bold(), singular);
        }
    }

    pub fn case(&self, index: usize, name: &str) {
        if self.enabled {
            println!("{}. {}...", index, name);
        }
    }

    /// Indented detail under the current case.
    pub fn detail(&self, message: &str) {
        if self.enabled {
            println!("   {}", message);
        }
    }

    pub fn passed(&self, name: &str) {
        if self.enabled {
            println!("   {} {}", "✓".green(), name);
        }
    }

    pub fn failed(&self, message: &str) {
        if self.enabled {
            println!("   {} {}", "✗".red(), message);
        }
    }
}

/// Write the end-of-run summary.
pub fn write_report(report: &RunReport, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    let output = match format {
        OutputFormat::Pretty => table::format_report(report),
        OutputFormat::Json => json::format_json(report)?,
    };
    writeln!(out, "{}", output)?;
    Ok(())
}
