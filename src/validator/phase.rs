//! Phase state machine for a single test case
//!
//! ```text
//! Idle -> Precondition -> Setup -> Running -> Teardown -> Done
//!              |            |          |           |
//!              v            +----------+-----------+-> Aborted(status)
//!      Aborted(PreconditionFailed)
//! ```
//!
//! Teardown is entered after setup or run, whether or not they failed; the
//! status it carries is what the case reports if teardown itself succeeds.

use std::fmt;

use serde::Serialize;

use super::ExitStatus;

/// One of the four phases of a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Precondition,
    Setup,
    Run,
    Teardown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Precondition => "precondition",
            Phase::Setup => "setup",
            Phase::Run => "run",
            Phase::Teardown => "teardown",
        };
        f.write_str(name)
    }
}

/// Result of attempting one phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The case does not define this phase
    Skipped,
    Passed,
    Failed,
}

/// Execution state of a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseState {
    Idle,
    Precondition,
    Setup,
    Running,
    /// Cleaning up; `pending` is the status to report if teardown succeeds
    Teardown { pending: ExitStatus },
    Done,
    Aborted(ExitStatus),
}

impl CaseState {
    /// Phase to execute in this state, `None` for idle and terminal states.
    pub fn phase(self) -> Option<Phase> {
        match self {
            CaseState::Precondition => Some(Phase::Precondition),
            CaseState::Setup => Some(Phase::Setup),
            CaseState::Running => Some(Phase::Run),
            CaseState::Teardown { .. } => Some(Phase::Teardown),
            CaseState::Idle | CaseState::Done | CaseState::Aborted(_) => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CaseState::Done | CaseState::Aborted(_))
    }

    /// Final status of a terminal state.
    pub fn exit_status(self) -> Option<ExitStatus> {
        match self {
            CaseState::Done => Some(ExitStatus::Success),
            CaseState::Aborted(status) => Some(status),
            _ => None,
        }
    }

    /// Transition function. Defined for every (state, outcome) pair; terminal
    /// states absorb every outcome.
    pub fn next(self, outcome: StepOutcome) -> CaseState {
        use StepOutcome::Failed;

        match (self, outcome) {
            (CaseState::Idle, _) => CaseState::Precondition,

            (CaseState::Precondition, Failed) => {
                CaseState::Aborted(ExitStatus::PreconditionFailed)
            }
            (CaseState::Precondition, _) => CaseState::Setup,

            (CaseState::Setup, Failed) => CaseState::Teardown {
                pending: ExitStatus::SetupFailed,
            },
            (CaseState::Setup, _) => CaseState::Running,

            (CaseState::Running, Failed) => CaseState::Teardown {
                pending: ExitStatus::TestFailed,
            },
            (CaseState::Running, _) => CaseState::Teardown {
                pending: ExitStatus::Success,
            },

            (CaseState::Teardown { .. }, Failed) => {
                CaseState::Aborted(ExitStatus::TeardownFailed)
            }
            (CaseState::Teardown { pending }, _) if pending.is_success() => CaseState::Done,
            (CaseState::Teardown { pending }, _) => CaseState::Aborted(pending),

            (CaseState::Done, _) => CaseState::Done,
            (CaseState::Aborted(status), _) => CaseState::Aborted(status),
        }
    }
}
