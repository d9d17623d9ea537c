//! Phase building blocks shared across cases

use crate::client::ResourceActions;
use crate::error::{Error, Result};
use crate::validator::ValidationContext;

use super::BoxFuture;

/// Create one resource with a generated payload and record it.
pub async fn create_one(actions: &dyn ResourceActions, ctx: &mut ValidationContext) -> Result<()> {
    let payload = actions.generate_payload(&ctx.resource)?;
    let created = actions
        .create_resource(&ctx.resource, &ctx.collection_url, &payload)
        .await?;
    ctx.record_created(created)
}

/// Create resources until the context holds at least `count`.
pub async fn ensure_created(
    actions: &dyn ResourceActions,
    ctx: &mut ValidationContext,
    count: usize,
) -> Result<()> {
    while ctx.resources.len() < count {
        create_one(actions, ctx).await?;
    }
    Ok(())
}

/// Delete the oldest created resource. No call is made if nothing was created.
pub async fn delete_oldest(actions: &dyn ResourceActions, ctx: &mut ValidationContext) -> Result<()> {
    if ctx.resources.is_empty() {
        return Ok(());
    }
    let url = ctx.oldest_url()?;
    actions.delete(&url).await?;
    ctx.remove_oldest();
    ctx.detail(&format!("Deleted {}", url));
    Ok(())
}

/// Delete every created resource, oldest first, and forget the last listing.
pub async fn delete_all(actions: &dyn ResourceActions, ctx: &mut ValidationContext) -> Result<()> {
    while !ctx.resources.is_empty() {
        delete_oldest(actions, ctx).await?;
    }
    ctx.last_list = None;
    Ok(())
}

pub fn ensure_one_phase<'a>(
    actions: &'a dyn ResourceActions,
    ctx: &'a mut ValidationContext,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(ensure_created(actions, ctx, 1))
}

pub fn delete_oldest_phase<'a>(
    actions: &'a dyn ResourceActions,
    ctx: &'a mut ValidationContext,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(delete_oldest(actions, ctx))
}

pub fn delete_all_phase<'a>(
    actions: &'a dyn ResourceActions,
    ctx: &'a mut ValidationContext,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(delete_all(actions, ctx))
}

// ============================================================================
// Preconditions
// ============================================================================

fn require(declared: bool, method: &str, ctx: &ValidationContext) -> Result<()> {
    if declared {
        Ok(())
    } else {
        Err(Error::Precondition(format!(
            "resource `{}` does not declare the {} method",
            ctx.resource.singular, method
        )))
    }
}

pub fn requires_create(ctx: &ValidationContext) -> Result<()> {
    require(ctx.resource.methods.create.is_some(), "create", ctx)
}

pub fn requires_list(ctx: &ValidationContext) -> Result<()> {
    requires_create(ctx)?;
    require(ctx.resource.methods.list, "list", ctx)
}

pub fn requires_get(ctx: &ValidationContext) -> Result<()> {
    requires_create(ctx)?;
    require(ctx.resource.methods.get, "get", ctx)
}

pub fn requires_update(ctx: &ValidationContext) -> Result<()> {
    requires_create(ctx)?;
    require(ctx.resource.methods.update, "update", ctx)
}

pub fn requires_delete(ctx: &ValidationContext) -> Result<()> {
    requires_create(ctx)?;
    require(ctx.resource.methods.delete, "delete", ctx)
}

pub fn requires_delete_only(ctx: &ValidationContext) -> Result<()> {
    require(ctx.resource.methods.delete, "delete", ctx)
}
