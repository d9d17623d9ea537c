//! Table output formatting

use colored::Colorize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

use crate::validator::{CaseReport, RunReport};

/// Format data as a table
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return "No results found.".to_string();
    }

    let mut table = Table::new(data);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

#[derive(Tabled)]
struct CaseRow {
    #[tabled(rename = "RESOURCE")]
    resource: String,
    #[tabled(rename = "TEST")]
    test: String,
    #[tabled(rename = "RESULT")]
    result: String,
    #[tabled(rename = "ERROR")]
    error: String,
}

impl From<&CaseReport> for CaseRow {
    fn from(case: &CaseReport) -> Self {
        Self {
            resource: case.resource.clone(),
            test: case.test.clone(),
            result: case.status.to_string(),
            error: case.error.clone().unwrap_or_default(),
        }
    }
}

/// Summary table followed by a one-line verdict.
pub fn format_report(report: &RunReport) -> String {
    let rows: Vec<CaseRow> = report.cases.iter().map(CaseRow::from).collect();
    let verdict = if report.status.is_success() {
        format!("{} {} passed", "✓".green(), report.passed_count())
    } else {
        format!(
            "{} {} (exit code {}), {} passed, {} failed",
            "✗".red(),
            report.status,
            report.status.code(),
            report.passed_count(),
            report.failed_count()
        )
    };
    format!("\n{}\n{}", format_table(&rows), verdict)
}
