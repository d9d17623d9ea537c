//! AEP-132 list cases

use std::collections::HashSet;

use crate::client::{ListParams, ListResponse, ResourceActions};
use crate::error::{Error, Result};
use crate::payload::identifier_of;
use crate::validator::ValidationContext;

use super::common::{delete_all_phase, ensure_created, requires_list};
use super::{BoxFuture, TestCase};

/// Resources created before listing, enough for at least two pages of one
const LIST_SETUP_COUNT: usize = 3;

pub const LIST_LIMIT_1: TestCase = TestCase {
    name: "aep-132-list-resources-limit-1",
    description: "List with page_size=1 returns one item and a next_page_token",
    precondition: Some(requires_list),
    setup: Some(setup_list),
    run: Some(run_limit_1),
    teardown: Some(delete_all_phase),
};

pub const LIST_PAGE_TOKEN: TestCase = TestCase {
    name: "aep-132-list-resources-page-token",
    description: "Following next_page_token returns a further, non-overlapping page",
    precondition: Some(requires_list),
    setup: Some(setup_list),
    run: Some(run_page_token),
    teardown: Some(delete_all_phase),
};

fn setup_list<'a>(
    actions: &'a dyn ResourceActions,
    ctx: &'a mut ValidationContext,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(ensure_created(actions, ctx, LIST_SETUP_COUNT))
}

async fn first_page(actions: &dyn ResourceActions, ctx: &ValidationContext) -> Result<ListResponse> {
    let url = ListParams::new().page_size(1).apply(&ctx.collection_url)?;
    actions.list(&url, &ctx.resource.list_items_field).await
}

fn run_limit_1<'a>(
    actions: &'a dyn ResourceActions,
    ctx: &'a mut ValidationContext,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let page = first_page(actions, ctx).await?;
        if page.resources.len() != 1 {
            return Err(Error::assertion(format!(
                "expected 1 resource with page_size=1, got {}",
                page.resources.len()
            )));
        }
        if !page.has_next_page() {
            return Err(Error::assertion(
                "expected a next_page_token with more resources remaining",
            ));
        }
        ctx.detail(&format!("Listed 1 resource, next_page_token {}", page.next_page_token));
        ctx.last_list = Some(page);
        Ok(())
    })
}

fn run_page_token<'a>(
    actions: &'a dyn ResourceActions,
    ctx: &'a mut ValidationContext,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let first = match ctx.last_list.take().filter(ListResponse::has_next_page) {
            Some(page) => page,
            None => first_page(actions, ctx).await?,
        };
        if !first.has_next_page() {
            return Err(Error::assertion(
                "first page has no next_page_token to follow",
            ));
        }

        let url = ListParams::new()
            .page_size(1)
            .page_token(&first.next_page_token)
            .apply(&ctx.collection_url)?;
        let second = actions.list(&url, &ctx.resource.list_items_field).await?;
        if second.resources.is_empty() {
            return Err(Error::assertion("page after next_page_token is empty"));
        }

        let seen: HashSet<&str> = first.resources.iter().filter_map(identifier_of).collect();
        if let Some(repeated) = second
            .resources
            .iter()
            .filter_map(identifier_of)
            .find(|name| seen.contains(name))
        {
            return Err(Error::assertion(format!(
                "{} appears on both pages",
                repeated
            )));
        }

        ctx.detail(&format!(
            "Followed next_page_token, got {} more",
            second.resources.len()
        ));
        ctx.last_list = Some(second);
        Ok(())
    })
}
