//! AEP-134 update case

use crate::client::ResourceActions;
use crate::error::Result;
use crate::validator::ValidationContext;

use super::common::{delete_oldest_phase, ensure_one_phase, requires_update};
use super::{BoxFuture, TestCase};

pub const UPDATE_RESOURCE: TestCase = TestCase {
    name: "aep-134-update-resource",
    description: "Patch with a fresh payload succeeds",
    precondition: Some(requires_update),
    setup: Some(ensure_one_phase),
    run: Some(run_update),
    teardown: Some(delete_oldest_phase),
};

fn run_update<'a>(
    actions: &'a dyn ResourceActions,
    ctx: &'a mut ValidationContext,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let payload = actions.generate_payload(&ctx.resource)?;
        let url = ctx.oldest_url()?;
        actions.patch(&url, &payload).await?;
        ctx.detail(&format!("Updated {}", url));
        Ok(())
    })
}
