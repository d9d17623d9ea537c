//! AEP-131 get case

use crate::client::ResourceActions;
use crate::error::{Error, Result};
use crate::payload::identifier_of;
use crate::validator::ValidationContext;

use super::common::{delete_oldest_phase, ensure_one_phase, requires_get};
use super::{BoxFuture, TestCase};

pub const GET_RESOURCE: TestCase = TestCase {
    name: "aep-131-get-resource",
    description: "Get returns the resource that was created",
    precondition: Some(requires_get),
    setup: Some(ensure_one_phase),
    run: Some(run_get),
    teardown: Some(delete_oldest_phase),
};

fn run_get<'a>(
    actions: &'a dyn ResourceActions,
    ctx: &'a mut ValidationContext,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let expected = ctx.oldest_name()?.to_string();
        let fetched = actions.get(&ctx.oldest_url()?).await?;

        match identifier_of(&fetched) {
            Some(name) if name == expected => {
                ctx.detail(&format!("Fetched {}", name));
                Ok(())
            }
            Some(name) => Err(Error::assertion(format!(
                "get for {} returned {}",
                expected, name
            ))),
            None => Err(Error::assertion(format!(
                "get for {} returned a resource without a name",
                expected
            ))),
        }
    })
}
