//! AEP-135 delete cases

use reqwest::StatusCode;

use crate::client::ResourceActions;
use crate::error::{Error, Result};
use crate::validator::ValidationContext;

use super::common::{
    delete_oldest, delete_oldest_phase, ensure_one_phase, requires_delete, requires_delete_only,
};
use super::{BoxFuture, TestCase};

pub const DELETE_RESOURCE: TestCase = TestCase {
    name: "aep-135-delete-resource",
    description: "Delete succeeds and the resource is gone afterwards",
    precondition: Some(requires_delete),
    setup: Some(ensure_one_phase),
    run: Some(run_delete),
    teardown: Some(delete_oldest_phase),
};

pub const DELETE_NONEXISTENT: TestCase = TestCase {
    name: "aep-135-delete-nonexistent-resource",
    description: "Deleting an unknown identifier returns 404",
    precondition: Some(requires_delete_only),
    setup: None,
    run: Some(run_delete_nonexistent),
    teardown: None,
};

fn run_delete<'a>(
    actions: &'a dyn ResourceActions,
    ctx: &'a mut ValidationContext,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let url = ctx.oldest_url()?;
        delete_oldest(actions, ctx).await?;

        if ctx.resource.methods.get {
            let raw = actions.raw_get(&url).await?;
            if raw.status != StatusCode::NOT_FOUND {
                return Err(Error::assertion(format!(
                    "expected 404 for {} after delete, got {}",
                    url,
                    raw.status.as_u16()
                )));
            }
        }
        Ok(())
    })
}

fn run_delete_nonexistent<'a>(
    actions: &'a dyn ResourceActions,
    ctx: &'a mut ValidationContext,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let url = format!("{}/{}", ctx.collection_url, actions.generate_id());
        let raw = actions.raw_delete(&url).await?;
        if raw.status != StatusCode::NOT_FOUND {
            return Err(Error::assertion(format!(
                "expected 404 deleting {}, got {}",
                url,
                raw.status.as_u16()
            )));
        }
        ctx.detail(&format!("{} returned 404", url));
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::super::common::testing::{book, context_for};
    use super::*;
    use crate::client::MockResourceActions;
    use crate::error::ApiError;
    use crate::models::Methods;

    #[tokio::test]
    async fn test_delete_then_get_is_404() {
        let mock = MockResourceActions::new();
        let mut ctx = context_for(&book());
        (DELETE_RESOURCE.setup.unwrap())(&mock, &mut ctx).await.unwrap();

        (DELETE_RESOURCE.run.unwrap())(&mock, &mut ctx).await.unwrap();
        assert!(ctx.resources.is_empty());

        // Nothing left for teardown to do
        (DELETE_RESOURCE.teardown.unwrap())(&mock, &mut ctx)
            .await
            .unwrap();
        assert_eq!(
            mock.call_log(),
            vec![
                "POST http://mock.test/books",
                "DELETE http://mock.test/books/s1",
                "GET http://mock.test/books/s1",
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_skips_get_when_not_declared() {
        let mock = MockResourceActions::new();
        let resource = book().with_methods(Methods {
            get: false,
            ..Methods::all()
        });
        let mut ctx = context_for(&resource);
        (DELETE_RESOURCE.setup.unwrap())(&mock, &mut ctx).await.unwrap();

        (DELETE_RESOURCE.run.unwrap())(&mock, &mut ctx).await.unwrap();
        assert_eq!(mock.captured_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_nonexistent_expects_404() {
        let mock = MockResourceActions::new();
        let mut ctx = context_for(&book());

        (DELETE_NONEXISTENT.run.unwrap())(&mock, &mut ctx)
            .await
            .unwrap();

        let requests = mock.captured_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "DELETE");
        assert!(requests[0].url.starts_with("http://mock.test/books/test-id-"));
    }

    #[tokio::test]
    async fn test_delete_nonexistent_transport_error_propagates() {
        let mock = MockResourceActions::new().with_error("DELETE", ApiError::Network("down".into()));
        let mut ctx = context_for(&book());

        let err = (DELETE_NONEXISTENT.run.unwrap())(&mock, &mut ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Network(_))));
    }
}
