//! reqwest implementation of the resource action client

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client as HttpClient, Method, StatusCode};

use super::pagination::ListResponse;
use super::{Generator, RawResponse, ResourceActions};
use crate::error::{ApiError, Result};
use crate::models::ResourceDescriptor;
use crate::payload::{Payload, generate_create_payload};

/// HTTP client for the server under test.
///
/// Requests are issued one at a time; every call is awaited by the caller
/// before the next one starts.
pub struct HttpResourceClient {
    http: HttpClient,
    generator: Mutex<Generator>,
}

impl HttpResourceClient {
    /// Create a client. Without `timeout` the transport's default applies.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        Self::with_generator(timeout, Generator::from_entropy())
    }

    pub fn with_generator(timeout: Option<Duration>, generator: Generator) -> Result<Self> {
        let mut builder = HttpClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            generator: Mutex::new(generator),
        })
    }

    /// Send a request and read the whole body.
    async fn send(&self, method: Method, url: &str, body: Option<&Payload>) -> Result<RawResponse> {
        debug!("{} {}", method, url);

        let mut request = self.http.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::from)?;
        let status = response.status();
        let text = response.text().await.map_err(ApiError::from)?;
        debug!("{} {} -> {}", method, url, status);

        Ok(RawResponse::new(status, text))
    }

    fn generator(&self) -> std::sync::MutexGuard<'_, Generator> {
        self.generator.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ResourceActions for HttpResourceClient {
    async fn create_resource(
        &self,
        resource: &ResourceDescriptor,
        collection_url: &str,
        payload: &Payload,
    ) -> Result<Payload> {
        debug!("Creating {} at {}", resource.singular, collection_url);
        let raw = self.send(Method::POST, collection_url, Some(payload)).await?;
        raw.expect(&[StatusCode::OK, StatusCode::CREATED])?;
        raw.json_object()
    }

    async fn list(&self, url: &str, items_field: &str) -> Result<ListResponse> {
        let raw = self.send(Method::GET, url, None).await?;
        raw.expect(&[StatusCode::OK])?;
        raw.list_page(items_field)
    }

    async fn get(&self, url: &str) -> Result<Payload> {
        let raw = self.send(Method::GET, url, None).await?;
        raw.expect(&[StatusCode::OK])?;
        raw.json_object()
    }

    async fn patch(&self, url: &str, payload: &Payload) -> Result<Payload> {
        let raw = self.send(Method::PATCH, url, Some(payload)).await?;
        raw.expect(&[StatusCode::OK])?;
        // Some servers answer an update with an empty body
        if raw.body.trim().is_empty() {
            return Ok(Payload::new());
        }
        raw.json_object()
    }

    async fn delete(&self, url: &str) -> Result<()> {
        let raw = self.send(Method::DELETE, url, None).await?;
        raw.expect(&[StatusCode::OK, StatusCode::NO_CONTENT])
    }

    async fn raw_post(&self, url: &str, payload: &Payload) -> Result<RawResponse> {
        self.send(Method::POST, url, Some(payload)).await
    }

    async fn raw_get(&self, url: &str) -> Result<RawResponse> {
        self.send(Method::GET, url, None).await
    }

    async fn raw_delete(&self, url: &str) -> Result<RawResponse> {
        self.send(Method::DELETE, url, None).await
    }

    fn generate_id(&self) -> String {
        self.generator().next_id()
    }

    fn generate_payload(&self, resource: &ResourceDescriptor) -> Result<Payload> {
        generate_create_payload(resource, &mut self.generator())
    }
}
