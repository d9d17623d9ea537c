//! Test orchestration
//!
//! The [`Validator`] runs the selected test cases against each selected
//! resource, one case and one HTTP call at a time, and stops at the first
//! case that does not pass.

use log::{debug, warn};

use crate::cases::{self, TestCase};
use crate::client::ResourceActions;
use crate::error::{Error, Result};
use crate::models::{ApiModel, ResourceDescriptor};
use crate::output::Progress;

mod context;
mod exit;
mod phase;
mod report;

pub use context::ValidationContext;
pub use exit::ExitStatus;
pub use phase::{CaseState, Phase, StepOutcome};
pub use report::{CaseReport, RunReport};

/// Which resources to validate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceSelection {
    /// One resource, by plural name
    Collection(String),
    /// Every top-level resource
    AllCollections,
}

/// Resolve the resources to validate. An unknown collection is an error.
pub fn select_resources(
    model: &ApiModel,
    selection: &ResourceSelection,
) -> Result<Vec<ResourceDescriptor>> {
    match selection {
        ResourceSelection::Collection(plural) => model
            .find(plural)
            .cloned()
            .map(|resource| vec![resource])
            .ok_or_else(|| {
                Error::Precondition(format!("collection `{}` not found in API", plural))
            }),
        ResourceSelection::AllCollections => Ok(model.top_level().cloned().collect()),
    }
}

/// Resolve the cases to run, in catalog order. An empty `names` selects the
/// whole catalog; any unknown name is an error.
pub fn select_cases(names: &[String]) -> Result<Vec<&'static TestCase>> {
    if let Some(unknown) = names.iter().find(|name| cases::find(name).is_none()) {
        return Err(Error::Precondition(format!("test `{}` not found", unknown)));
    }
    Ok(cases::catalog()
        .iter()
        .filter(|case| names.is_empty() || names.iter().any(|name| name == case.name))
        .collect())
}

/// Runs test cases through their phases
pub struct Validator<'a> {
    actions: &'a dyn ResourceActions,
    cases: Vec<&'static TestCase>,
    progress: Progress,
}

impl<'a> Validator<'a> {
    pub fn new(
        actions: &'a dyn ResourceActions,
        cases: Vec<&'static TestCase>,
        progress: Progress,
    ) -> Self {
        Self {
            actions,
            cases,
            progress,
        }
    }

    /// Validate each resource in order, stopping at the first failure.
    pub async fn run(&self, resources: &[ResourceDescriptor]) -> RunReport {
        let mut report = RunReport::default();
        for resource in resources {
            let status = self.validate_resource(resource, &mut report.cases).await;
            if !status.is_success() {
                report.status = status;
                break;
            }
        }
        report
    }

    /// Run every selected case against one resource, stopping at the first
    /// failure. Case outcomes are appended to `reports`.
    pub async fn validate_resource(
        &self,
        resource: &ResourceDescriptor,
        reports: &mut Vec<CaseReport>,
    ) -> ExitStatus {
        self.progress.resource(&resource.singular);
        let mut ctx = ValidationContext::new(resource, self.progress);

        for (index, case) in self.cases.iter().enumerate() {
            self.progress.case(index + 1, case.name);
            let report = self.run_case(case, &mut ctx).await;
            let status = report.status;
            reports.push(report);
            if !status.is_success() {
                return status;
            }
        }

        if !ctx.resources.is_empty() {
            warn!(
                "{} {} resource(s) left behind after validation",
                ctx.resources.len(),
                resource.singular
            );
        }
        ExitStatus::Success
    }

    /// Drive one case through the phase state machine.
    pub async fn run_case(&self, case: &TestCase, ctx: &mut ValidationContext) -> CaseReport {
        let mut state = CaseState::Idle.next(StepOutcome::Skipped);
        let mut failure: Option<(Phase, Error)> = None;

        while let Some(phase) = state.phase() {
            debug!("{}: {}", case.name, phase);
            let outcome = match self.execute(case, phase, ctx).await {
                None => StepOutcome::Skipped,
                Some(Ok(())) => StepOutcome::Passed,
                Some(Err(err)) => {
                    let err = err.in_phase(case.name, phase);
                    self.progress.failed(&err.to_string());
                    failure = Some((phase, err));
                    StepOutcome::Failed
                }
            };
            state = state.next(outcome);
        }

        let status = state.exit_status().unwrap_or(ExitStatus::TestFailed);
        if status.is_success() {
            self.progress.passed(case.name);
        }
        let (failed_phase, error) = match failure {
            Some((phase, err)) if !status.is_success() => (Some(phase), Some(err.to_string())),
            _ => (None, None),
        };

        CaseReport {
            resource: ctx.resource.singular.clone(),
            test: case.name.to_string(),
            status,
            failed_phase,
            error,
        }
    }

    /// Execute one phase. `None` if the case does not define it.
    async fn execute(
        &self,
        case: &TestCase,
        phase: Phase,
        ctx: &mut ValidationContext,
    ) -> Option<Result<()>> {
        let step = match phase {
            Phase::Precondition => return case.precondition.map(|check| check(&*ctx)),
            Phase::Setup => case.setup,
            Phase::Run => case.run,
            Phase::Teardown => case.teardown,
        };
        match step {
            Some(step) => Some(step(self.actions, ctx).await),
            None => None,
        }
    }
}
