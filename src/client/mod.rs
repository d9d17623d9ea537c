//! Resource action client
//!
//! [`ResourceActions`] is the only surface test cases use to reach the
//! server under test. [`HttpResourceClient`] implements it over reqwest; the
//! test build also has an in-memory fake in `mock`.

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::{ApiError, Result};
use crate::models::ResourceDescriptor;
use crate::payload::Payload;

pub mod generator;
pub mod http;
#[cfg(test)]
pub mod mock;
pub mod pagination;

pub use generator::Generator;
pub use http::HttpResourceClient;
#[cfg(test)]
pub use mock::MockResourceActions;
pub use pagination::{ListParams, ListResponse, with_id_param};

/// Status and body of a response, without success-code enforcement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Fail with `UnexpectedStatus` unless the status is one of `accepted`.
    pub fn expect(&self, accepted: &[StatusCode]) -> Result<()> {
        if accepted.contains(&self.status) {
            Ok(())
        } else {
            Err(ApiError::UnexpectedStatus {
                status: self.status.as_u16(),
                body: self.body.clone(),
            }
            .into())
        }
    }

    /// Decode the body as a property map.
    pub fn json_object(&self) -> Result<Payload> {
        serde_json::from_str(&self.body).map_err(|e| {
            ApiError::InvalidResponse(format!(
                "Failed to parse response: {}. Body was: {}",
                e, self.body
            ))
            .into()
        })
    }

    /// Decode the body as a list page.
    pub fn list_page(&self, items_field: &str) -> Result<ListResponse> {
        let body: serde_json::Value = serde_json::from_str(&self.body).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse list response: {}", e))
        })?;
        ListResponse::from_body(&body, items_field)
    }
}

/// Capability operations over a resource-oriented HTTP API
#[async_trait]
pub trait ResourceActions: Send + Sync {
    // ========================================================================
    // Checked operations
    // ========================================================================

    /// POST `payload` to `collection_url` and return the created resource.
    ///
    /// The URL is used as given: to choose the identifier, build it with
    /// [`with_id_param`]. 200 and 201 are success.
    async fn create_resource(
        &self,
        resource: &ResourceDescriptor,
        collection_url: &str,
        payload: &Payload,
    ) -> Result<Payload>;

    /// GET one page of a collection. `url` may already carry `page_size` and
    /// `page_token`; items are read from `items_field`.
    async fn list(&self, url: &str, items_field: &str) -> Result<ListResponse>;

    /// GET a single resource; 200 is success.
    async fn get(&self, url: &str) -> Result<Payload>;

    /// PATCH a single resource; 200 is success.
    async fn patch(&self, url: &str, payload: &Payload) -> Result<Payload>;

    /// DELETE a single resource; 200 and 204 are success.
    async fn delete(&self, url: &str) -> Result<()>;

    // ========================================================================
    // Raw operations (caller inspects the status)
    // ========================================================================

    async fn raw_post(&self, url: &str, payload: &Payload) -> Result<RawResponse>;

    async fn raw_get(&self, url: &str) -> Result<RawResponse>;

    async fn raw_delete(&self, url: &str) -> Result<RawResponse>;

    // ========================================================================
    // Value generation (single generator per run)
    // ========================================================================

    /// Identifier never handed out before in this process.
    fn generate_id(&self) -> String;

    /// Create/update body for `resource`.
    fn generate_payload(&self, resource: &ResourceDescriptor) -> Result<Payload>;
}
