//! AEP-133 create cases

use log::debug;
use reqwest::StatusCode;

use crate::client::{RawResponse, ResourceActions, with_id_param};
use crate::error::{Error, Result};
use crate::payload::{id_from_name, identifier_of};
use crate::validator::ValidationContext;

use super::common::{
    create_one, delete_all_phase, delete_oldest_phase, ensure_one_phase, requires_create,
};
use super::{BoxFuture, TestCase};

pub const CREATE: TestCase = TestCase {
    name: "aep-133-create",
    description: "Create returns the resource with a name",
    precondition: Some(requires_create),
    setup: None,
    run: Some(run_create),
    teardown: Some(delete_oldest_phase),
};

pub const DUPLICATE_CREATION_CHECK: TestCase = TestCase {
    name: "aep-133-duplicate-creation-check",
    description: "Creating with an identifier already in use is rejected",
    precondition: Some(requires_create),
    setup: Some(ensure_one_phase),
    run: Some(run_duplicate_check),
    teardown: Some(delete_all_phase),
};

fn run_create<'a>(
    actions: &'a dyn ResourceActions,
    ctx: &'a mut ValidationContext,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(create_one(actions, ctx))
}

fn run_duplicate_check<'a>(
    actions: &'a dyn ResourceActions,
    ctx: &'a mut ValidationContext,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        if !ctx.resource.supports_user_settable_create() {
            ctx.detail("Identifiers are server-assigned, nothing to collide with");
            return Ok(());
        }

        let id = id_from_name(ctx.oldest_name()?).to_string();
        let url = with_id_param(&ctx.collection_url, &id)?;
        let payload = actions.generate_payload(&ctx.resource)?;
        let raw = actions.raw_post(&url, &payload).await?;

        match raw.status {
            StatusCode::CONFLICT | StatusCode::BAD_REQUEST => {
                ctx.detail(&format!("Duplicate {} rejected with {}", id, raw.status));
                Ok(())
            }
            status => {
                if status.is_success() {
                    track_accepted_duplicate(ctx, &raw);
                }
                Err(Error::assertion(format!(
                    "expected 409 or 400 when re-using identifier {}, got {}",
                    id,
                    status.as_u16()
                )))
            }
        }
    })
}

/// A server that accepted the duplicate may have created a second resource;
/// record it so teardown deletes it too.
fn track_accepted_duplicate(ctx: &mut ValidationContext, raw: &RawResponse) {
    let created = match raw.json_object() {
        Ok(created) => created,
        Err(err) => {
            debug!("Accepted duplicate has no readable body: {}", err);
            return;
        }
    };
    let already_tracked = identifier_of(&created)
        .is_some_and(|name| ctx.resources.iter().any(|r| identifier_of(r) == Some(name)));
    if already_tracked {
        return;
    }
    if let Err(err) = ctx.record_created(created) {
        debug!("Accepted duplicate not recorded: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::super::common::testing::{book, context_for};
    use super::*;
    use crate::client::{HttpResourceClient, MockResourceActions};
    use crate::error::ApiError;
    use crate::models::ResourceDescriptor;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_records_resource() {
        let mock = MockResourceActions::new();
        let mut ctx = context_for(&book());

        (CREATE.run.unwrap())(&mock, &mut ctx).await.unwrap();
        assert_eq!(ctx.oldest_name().unwrap(), "books/s1");

        (CREATE.teardown.unwrap())(&mock, &mut ctx).await.unwrap();
        assert!(ctx.resources.is_empty());
        assert_eq!(
            mock.call_log(),
            vec!["POST http://mock.test/books", "DELETE http://mock.test/books/s1"]
        );
    }

    #[tokio::test]
    async fn test_create_failure_records_nothing() {
        let mock = MockResourceActions::new().with_error(
            "POST",
            ApiError::UnexpectedStatus {
                status: 500,
                body: "boom".into(),
            },
        );
        let mut ctx = context_for(&book());

        assert!((CREATE.run.unwrap())(&mock, &mut ctx).await.is_err());
        assert!(ctx.resources.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_skipped_for_server_assigned_ids() {
        let mock = MockResourceActions::new();
        let mut ctx = context_for(&book());
        (DUPLICATE_CREATION_CHECK.setup.unwrap())(&mock, &mut ctx).await.unwrap();

        (DUPLICATE_CREATION_CHECK.run.unwrap())(&mock, &mut ctx)
            .await
            .unwrap();
        assert_eq!(mock.captured_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_rejected_with_conflict() {
        let mock = MockResourceActions::new();
        let mut ctx = context_for(&book().with_user_settable_create());
        (DUPLICATE_CREATION_CHECK.setup.unwrap())(&mock, &mut ctx).await.unwrap();

        (DUPLICATE_CREATION_CHECK.run.unwrap())(&mock, &mut ctx)
            .await
            .unwrap();
        assert_eq!(
            mock.call_log().last().unwrap(),
            "POST http://mock.test/books?id=s1"
        );
        assert_eq!(mock.stored_names(), vec!["books/s1"]);
    }

    #[tokio::test]
    async fn test_duplicate_accepted_is_a_failure() {
        let mock = MockResourceActions::new().accepting_duplicates();
        let mut ctx = context_for(&book().with_user_settable_create());
        (DUPLICATE_CREATION_CHECK.setup.unwrap())(&mock, &mut ctx).await.unwrap();

        let err = (DUPLICATE_CREATION_CHECK.run.unwrap())(&mock, &mut ctx)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("got 201"));
        // Same name as the original, so it is tracked once
        assert_eq!(ctx.resources.len(), 1);

        (DUPLICATE_CREATION_CHECK.teardown.unwrap())(&mock, &mut ctx)
            .await
            .unwrap();
        assert!(mock.stored_names().is_empty());
    }

    #[tokio::test]
    async fn test_accepted_duplicate_is_cleaned_up() {
        let mut server = mockito::Server::new_async().await;
        let _duplicate = server
            .mock("POST", "/books")
            .match_query(mockito::Matcher::UrlEncoded("id".into(), "a".into()))
            .with_status(201)
            .with_body(r#"{"name":"books/a-copy"}"#)
            .create_async()
            .await;
        let delete_original = server
            .mock("DELETE", "/books/a")
            .with_status(204)
            .expect(1)
            .create_async()
            .await;
        let delete_copy = server
            .mock("DELETE", "/books/a-copy")
            .with_status(204)
            .expect(1)
            .create_async()
            .await;

        let resource = ResourceDescriptor::new("book", "books", server.url())
            .with_schema(book().schema.unwrap())
            .with_user_settable_create();
        let client = HttpResourceClient::new(None).unwrap();
        let mut ctx = context_for(&resource);
        ctx.record_created(json!({ "name": "books/a" }).as_object().cloned().unwrap())
            .unwrap();

        let err = (DUPLICATE_CREATION_CHECK.run.unwrap())(&client, &mut ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Assertion(_)));
        assert_eq!(ctx.resources.len(), 2);

        (DUPLICATE_CREATION_CHECK.teardown.unwrap())(&client, &mut ctx)
            .await
            .unwrap();
        assert!(ctx.resources.is_empty());
        delete_original.assert_async().await;
        delete_copy.assert_async().await;
    }
}
