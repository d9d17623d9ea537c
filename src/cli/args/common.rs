//! Common CLI types shared across commands

use serde::{Deserialize, Serialize};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty format - progress lines and a summary table
    #[default]
    Pretty,
    /// JSON format - summary only, structured for scripts and CI
    Json,
}
