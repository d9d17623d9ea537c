//! In-memory resource server for testing
//!
//! Implements [`ResourceActions`] against a fake collection store so the
//! validator and the test catalog can be exercised without network calls.
//! Every call is captured in order for assertions on phase sequencing.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::{Value, json};

use super::pagination::ListResponse;
use super::{Generator, RawResponse, ResourceActions};
use crate::error::{ApiError, Result};
use crate::models::ResourceDescriptor;
use crate::payload::{Payload, generate_create_payload};

/// Base URL descriptors must use to talk to the mock
pub const MOCK_SERVER_URL: &str = "http://mock.test";

/// A captured call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRequest {
    /// HTTP verb (`POST`, `GET`, `PATCH`, `DELETE`)
    pub method: &'static str,
    /// Full URL including query
    pub url: String,
}

/// Mock action client backed by an in-memory store.
///
/// # Example
/// ```ignore
/// let mock = MockResourceActions::new().with_error("DELETE", ApiError::Network("down".into()));
/// let outcome = validator.validate_resource(&resource).await;
/// assert_eq!(mock.captured_requests().len(), 2);
/// ```
pub struct MockResourceActions {
    state: Mutex<MockState>,
    generator: Mutex<Generator>,
}

#[derive(Default)]
struct MockState {
    /// Stored resources by name, in creation order
    resources: Vec<(String, Payload)>,
    /// Counter for server-assigned identifiers
    next_server_id: usize,
    captured: Vec<CapturedRequest>,
    /// One-shot errors keyed by HTTP verb, consumed on first use
    errors: Vec<(&'static str, ApiError)>,
    /// When false, list returns everything and never a page token
    paginate: bool,
    /// When false, re-using an identifier on create succeeds
    reject_duplicates: bool,
}

impl Default for MockResourceActions {
    fn default() -> Self {
        Self {
            state: Mutex::new(MockState {
                paginate: true,
                reject_duplicates: true,
                ..MockState::default()
            }),
            generator: Mutex::new(Generator::seeded(0)),
        }
    }
}

impl MockResourceActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure an error for the next call with the given verb.
    pub fn with_error(self, method: &'static str, error: ApiError) -> Self {
        self.state().errors.push((method, error));
        self
    }

    /// Make list ignore `page_size` and never return a cursor.
    pub fn without_pagination(self) -> Self {
        self.state().paginate = false;
        self
    }

    /// Accept a create that re-uses an existing identifier.
    pub fn accepting_duplicates(self) -> Self {
        self.state().reject_duplicates = false;
        self
    }

    /// Seed the store with an existing resource.
    pub fn with_resource(self, name: &str, mut body: Payload) -> Self {
        body.insert("name".to_string(), Value::from(name));
        self.state().resources.push((name.to_string(), body));
        self
    }

    /// All calls made so far, in order.
    pub fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.state().captured.clone()
    }

    /// `"METHOD url"` strings for compact assertions.
    pub fn call_log(&self) -> Vec<String> {
        self.state()
            .captured
            .iter()
            .map(|c| format!("{} {}", c.method, c.url))
            .collect()
    }

    /// Names of the resources currently stored.
    pub fn stored_names(&self) -> Vec<String> {
        self.state()
            .resources
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call, then fail if an error is queued for this verb.
    fn capture(&self, method: &'static str, url: &str) -> Result<()> {
        let mut state = self.state();
        state.captured.push(CapturedRequest {
            method,
            url: url.to_string(),
        });
        if let Some(pos) = state.errors.iter().position(|(m, _)| *m == method) {
            let (_, error) = state.errors.remove(pos);
            return Err(error.into());
        }
        Ok(())
    }

    fn handle_post(&self, url: &str, payload: &Payload) -> RawResponse {
        let url = MockUrl::parse(url);
        let path = &url.path;
        let mut state = self.state();
        let id = match url.param("id") {
            Some(id) => id.to_string(),
            None => {
                state.next_server_id += 1;
                format!("s{}", state.next_server_id)
            }
        };
        let name = format!("{}/{}", path, id);

        if state.resources.iter().any(|(n, _)| *n == name) {
            if state.reject_duplicates {
                return RawResponse::new(StatusCode::CONFLICT, r#"{"error":"already exists"}"#);
            }
            state.resources.retain(|(n, _)| *n != name);
        }

        let mut body = payload.clone();
        body.insert("name".to_string(), Value::from(name.clone()));
        let text = Value::Object(body.clone()).to_string();
        state.resources.push((name, body));
        RawResponse::new(StatusCode::CREATED, text)
    }

    fn handle_get(&self, url: &str) -> RawResponse {
        let path = MockUrl::parse(url).path;
        let state = self.state();
        match state.resources.iter().find(|(n, _)| *n == path) {
            Some((_, body)) => RawResponse::new(StatusCode::OK, Value::Object(body.clone()).to_string()),
            None => not_found(&path),
        }
    }

    fn handle_list(&self, url: &str, items_field: &str) -> RawResponse {
        let url = MockUrl::parse(url);
        let state = self.state();
        let prefix = format!("{}/", url.path);
        let items: Vec<&Payload> = state
            .resources
            .iter()
            .filter(|(n, _)| n.starts_with(&prefix))
            .map(|(_, body)| body)
            .collect();

        let offset = match url.param("page_token") {
            None => 0,
            Some(token) => match token.strip_prefix("page-").and_then(|n| n.parse().ok()) {
                Some(offset) => offset,
                None => {
                    return RawResponse::new(StatusCode::BAD_REQUEST, r#"{"error":"bad token"}"#);
                }
            },
        };
        let page_size = url.param("page_size")
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|_| state.paginate)
            .unwrap_or(items.len());

        let end = (offset + page_size).min(items.len());
        let page: Vec<&Payload> = items.get(offset..end).unwrap_or_default().to_vec();
        let next = if state.paginate && end < items.len() {
            format!("page-{}", end)
        } else {
            String::new()
        };

        let body = json!({ items_field: page, "next_page_token": next });
        RawResponse::new(StatusCode::OK, body.to_string())
    }

    fn handle_patch(&self, url: &str, payload: &Payload) -> RawResponse {
        let path = MockUrl::parse(url).path;
        let mut state = self.state();
        match state.resources.iter_mut().find(|(n, _)| *n == path) {
            Some((_, body)) => {
                for (k, v) in payload {
                    body.insert(k.clone(), v.clone());
                }
                RawResponse::new(StatusCode::OK, Value::Object(body.clone()).to_string())
            }
            None => not_found(&path),
        }
    }

    fn handle_delete(&self, url: &str) -> RawResponse {
        let path = MockUrl::parse(url).path;
        let mut state = self.state();
        let before = state.resources.len();
        state.resources.retain(|(n, _)| *n != path);
        if state.resources.len() == before {
            not_found(&path)
        } else {
            RawResponse::new(StatusCode::NO_CONTENT, "")
        }
    }
}

/// A mock URL split into the resource path (without server prefix) and
/// decoded query pairs.
struct MockUrl {
    path: String,
    query: Vec<(String, String)>,
}

impl MockUrl {
    fn parse(raw: &str) -> Self {
        match Url::parse(raw) {
            Ok(url) => Self {
                path: url.path().trim_start_matches('/').to_string(),
                query: url.query_pairs().into_owned().collect(),
            },
            Err(_) => Self {
                path: raw.trim_start_matches('/').to_string(),
                query: Vec::new(),
            },
        }
    }

    fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn not_found(path: &str) -> RawResponse {
    RawResponse::new(
        StatusCode::NOT_FOUND,
        json!({ "error": format!("{} not found", path) }).to_string(),
    )
}

#[async_trait]
impl ResourceActions for MockResourceActions {
    async fn create_resource(
        &self,
        _resource: &ResourceDescriptor,
        collection_url: &str,
        payload: &Payload,
    ) -> Result<Payload> {
        self.capture("POST", collection_url)?;
        let raw = self.handle_post(collection_url, payload);
        raw.expect(&[StatusCode::OK, StatusCode::CREATED])?;
        raw.json_object()
    }

    async fn list(&self, url: &str, items_field: &str) -> Result<ListResponse> {
        self.capture("GET", url)?;
        let raw = self.handle_list(url, items_field);
        raw.expect(&[StatusCode::OK])?;
        raw.list_page(items_field)
    }

    async fn get(&self, url: &str) -> Result<Payload> {
        self.capture("GET", url)?;
        let raw = self.handle_get(url);
        raw.expect(&[StatusCode::OK])?;
        raw.json_object()
    }

    async fn patch(&self, url: &str, payload: &Payload) -> Result<Payload> {
        self.capture("PATCH", url)?;
        let raw = self.handle_patch(url, payload);
        raw.expect(&[StatusCode::OK])?;
        raw.json_object()
    }

    async fn delete(&self, url: &str) -> Result<()> {
        self.capture("DELETE", url)?;
        self.handle_delete(url)
            .expect(&[StatusCode::OK, StatusCode::NO_CONTENT])
    }

    async fn raw_post(&self, url: &str, payload: &Payload) -> Result<RawResponse> {
        self.capture("POST", url)?;
        Ok(self.handle_post(url, payload))
    }

    async fn raw_get(&self, url: &str) -> Result<RawResponse> {
        self.capture("GET", url)?;
        Ok(self.handle_get(url))
    }

    async fn raw_delete(&self, url: &str) -> Result<RawResponse> {
        self.capture("DELETE", url)?;
        Ok(self.handle_delete(url))
    }

    fn generate_id(&self) -> String {
        self.generator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_id()
    }

    fn generate_payload(&self, resource: &ResourceDescriptor) -> Result<Payload> {
        let mut generator = self.generator.lock().unwrap_or_else(PoisonError::into_inner);
        generate_create_payload(resource, &mut generator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ListParams, with_id_param};

    fn book() -> ResourceDescriptor {
        ResourceDescriptor::new("book", "books", MOCK_SERVER_URL)
    }

    fn collection() -> String {
        book().collection_url()
    }

    #[tokio::test]
    async fn test_mock_create_assigns_names() {
        let mock = MockResourceActions::new();

        let a = mock
            .create_resource(&book(), &collection(), &Payload::new())
            .await
            .unwrap();
        let b = mock
            .create_resource(&book(), &collection(), &Payload::new())
            .await
            .unwrap();

        assert_eq!(a["name"], "books/s1");
        assert_eq!(b["name"], "books/s2");
        assert_eq!(mock.stored_names(), vec!["books/s1", "books/s2"]);
    }

    #[tokio::test]
    async fn test_mock_duplicate_id_conflicts() {
        let mock = MockResourceActions::new();
        let url = with_id_param(&collection(), "fixed").unwrap();

        mock.create_resource(&book(), &url, &Payload::new())
            .await
            .unwrap();
        let raw = mock.raw_post(&url, &Payload::new()).await.unwrap();
        assert_eq!(raw.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_mock_list_paginates_with_opaque_tokens() {
        let mock = MockResourceActions::new();
        for _ in 0..3 {
            mock.create_resource(&book(), &collection(), &Payload::new())
                .await
                .unwrap();
        }

        let first = mock
            .list(&ListParams::new().page_size(2).apply(&collection()).unwrap(), "results")
            .await
            .unwrap();
        assert_eq!(first.resources.len(), 2);
        assert!(first.has_next_page());

        let second = mock
            .list(
                &ListParams::new()
                    .page_size(2)
                    .page_token(&first.next_page_token)
                    .apply(&collection())
                    .unwrap(),
                "results",
            )
            .await
            .unwrap();
        assert_eq!(second.resources.len(), 1);
        assert!(!second.has_next_page());
    }

    #[tokio::test]
    async fn test_mock_without_pagination() {
        let mock = MockResourceActions::new().without_pagination();
        for _ in 0..2 {
            mock.create_resource(&book(), &collection(), &Payload::new())
                .await
                .unwrap();
        }
        let page = mock
            .list(&ListParams::new().page_size(1).apply(&collection()).unwrap(), "results")
            .await
            .unwrap();
        assert_eq!(page.resources.len(), 2);
        assert!(!page.has_next_page());
    }

    #[tokio::test]
    async fn test_mock_delete_then_get_is_404() {
        let mock = MockResourceActions::new().with_resource("books/b1", Payload::new());
        let url = book().resource_url("books/b1");

        mock.delete(&url).await.unwrap();
        assert!(mock.delete(&url).await.is_err());
        assert_eq!(
            mock.raw_get(&url).await.unwrap().status,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_mock_error_is_consumed_once() {
        let mock = MockResourceActions::new()
            .with_resource("books/b1", Payload::new())
            .with_error("GET", ApiError::Network("down".to_string()));
        let url = book().resource_url("books/b1");

        assert!(mock.get(&url).await.is_err());
        assert!(mock.get(&url).await.is_ok());
        assert_eq!(mock.captured_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_call_log_order() {
        let mock = MockResourceActions::new();
        mock.create_resource(&book(), &collection(), &Payload::new())
            .await
            .unwrap();
        mock.delete(&book().resource_url("books/s1")).await.unwrap();

        assert_eq!(
            mock.call_log(),
            vec![
                "POST http://mock.test/books".to_string(),
                "DELETE http://mock.test/books/s1".to_string(),
            ]
        );
    }
}
