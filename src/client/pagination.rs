//! Pagination helpers for list calls
//!
//! Page tokens are opaque: they are only ever forwarded exactly as a previous
//! list response returned them.

use reqwest::Url;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::payload::Payload;

/// Field carrying the cursor in a list response body
pub const NEXT_PAGE_TOKEN_FIELD: &str = "next_page_token";

/// Query parameters for a list request.
///
/// # Example
/// ```ignore
/// let url = ListParams::new().page_size(1).page_token(&token).apply(&collection_url)?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    /// Maximum number of items per page
    pub page_size: Option<usize>,
    /// Cursor from a previous response
    pub page_token: Option<String>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Set the cursor. An empty token means "first page" and is not sent.
    pub fn page_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.page_token = (!token.is_empty()).then_some(token);
        self
    }

    /// Query pairs in the order they are sent.
    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(size) = self.page_size {
            params.push(("page_size", size.to_string()));
        }
        if let Some(ref token) = self.page_token {
            params.push(("page_token", token.clone()));
        }
        params
    }

    /// Append the parameters to a URL that may already carry a query.
    pub fn apply(&self, base_url: &str) -> Result<String> {
        let params = self.to_query_params();
        if params.is_empty() {
            return Ok(base_url.to_string());
        }
        let mut url = parse_url(base_url)?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        Ok(url.into())
    }
}

/// Append `id=<id>` to a collection URL for user-settable identifiers.
pub fn with_id_param(collection_url: &str, id: &str) -> Result<String> {
    let mut url = parse_url(collection_url)?;
    url.query_pairs_mut().append_pair("id", id);
    Ok(url.into())
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| {
        ApiError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// One page of a list call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListResponse {
    /// Items on this page, in server order
    pub resources: Vec<Payload>,
    /// Cursor for the next page; empty when there are no more pages
    pub next_page_token: String,
}

impl ListResponse {
    pub fn has_next_page(&self) -> bool {
        !self.next_page_token.is_empty()
    }

    /// Decode a list response body.
    ///
    /// Items come from `items_field`. When the body has no such field, the
    /// single array-valued field is used instead; a body with zero or several
    /// array fields is rejected rather than guessed at.
    pub fn from_body(body: &Value, items_field: &str) -> Result<Self> {
        let object = body.as_object().ok_or_else(|| {
            ApiError::InvalidResponse("list response is not a JSON object".to_string())
        })?;

        let items = match object.get(items_field) {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(ApiError::InvalidResponse(format!(
                    "list response field `{}` is not an array",
                    items_field
                ))
                .into());
            }
            None => {
                let arrays: Vec<(&String, &Vec<Value>)> = object
                    .iter()
                    .filter_map(|(k, v)| v.as_array().map(|a| (k, a)))
                    .collect();
                match arrays.as_slice() {
                    [(_, items)] => *items,
                    // An empty page may omit the items field entirely
                    [] => {
                        return Ok(Self {
                            resources: Vec::new(),
                            next_page_token: next_page_token(object),
                        });
                    }
                    many => {
                        let names: Vec<&str> = many.iter().map(|(k, _)| k.as_str()).collect();
                        return Err(ApiError::InvalidResponse(format!(
                            "list response has no `{}` field and several arrays: {}",
                            items_field,
                            names.join(", ")
                        ))
                        .into());
                    }
                }
            }
        };

        let resources = items
            .iter()
            .filter_map(|item| item.as_object().cloned())
            .collect();

        Ok(Self {
            resources,
            next_page_token: next_page_token(object),
        })
    }
}

fn next_page_token(object: &serde_json::Map<String, Value>) -> String {
    object
        .get(NEXT_PAGE_TOKEN_FIELD)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
