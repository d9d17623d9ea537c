//! Results of a validation run

use serde::Serialize;

use super::{ExitStatus, Phase};

/// Outcome of one test case against one resource
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub resource: String,
    pub test: String,
    pub status: ExitStatus,
    /// Phase whose failure decided the status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_phase: Option<Phase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaseReport {
    pub fn passed(&self) -> bool {
        self.status.is_success()
    }
}

/// Outcome of a whole run: the first failing status, and every case that ran
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub status: ExitStatus,
    pub cases: Vec<CaseReport>,
}

impl Default for RunReport {
    fn default() -> Self {
        Self {
            status: ExitStatus::Success,
            cases: Vec::new(),
        }
    }
}

impl RunReport {
    pub fn passed_count(&self) -> usize {
        self.cases.iter().filter(|c| c.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.cases.len() - self.passed_count()
    }
}
