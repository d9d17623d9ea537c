//! Error types for the AEP end-to-end validator

use std::path::PathBuf;

use thiserror::Error;

use crate::validator::Phase;

/// Result type alias for validator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A response had the wrong shape or content for the test asserting on it
    #[error("Assertion failed: {0}")]
    Assertion(String),

    /// Something the run depends on is missing (unknown collection, unknown test,
    /// method not declared by the API)
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Resource `{0}` has no schema to generate a payload from")]
    SchemaMissing(String),

    /// An error raised inside one phase of a test case
    #[error("{test} {phase} failed: {source}")]
    Phase {
        test: String,
        phase: Phase,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap this error with the test case and phase it was raised in.
    pub fn in_phase(self, test: &str, phase: Phase) -> Self {
        Error::Phase {
            test: test.to_string(),
            phase,
            source: Box::new(self),
        }
    }

    pub fn assertion(msg: impl Into<String>) -> Self {
        Error::Assertion(msg.into())
    }
}

/// Errors raised by the resource action client
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network(format!("Failed to connect: {}", err))
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Settings and API description errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Settings file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to parse settings: {0}")]
    ParseError(String),

    #[error("Invalid settings: {0}")]
    Invalid(String),

    #[error("Failed to load API description: {0}")]
    ApiDocument(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
