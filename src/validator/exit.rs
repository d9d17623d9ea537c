//! Process exit statuses

use std::fmt;

use serde::Serialize;

/// Outcome of a test case, a resource, or a whole run, and the process exit
/// code it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitStatus {
    Success,
    TestFailed,
    PreconditionFailed,
    TeardownFailed,
    SetupFailed,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::TestFailed => 1,
            ExitStatus::PreconditionFailed => 2,
            ExitStatus::TeardownFailed => 3,
            ExitStatus::SetupFailed => 4,
        }
    }

    pub fn is_success(self) -> bool {
        self == ExitStatus::Success
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExitStatus::Success => "passed",
            ExitStatus::TestFailed => "test failed",
            ExitStatus::PreconditionFailed => "precondition failed",
            ExitStatus::TeardownFailed => "teardown failed",
            ExitStatus::SetupFailed => "setup failed",
        };
        f.write_str(label)
    }
}
