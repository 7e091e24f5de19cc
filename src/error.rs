// src/error.rs

use std::sync::Arc;
use thiserror::Error;

/// The primary error type for the `token-inspector` library.
#[derive(Debug, Error)]
pub enum InspectorError {
    /// The token is not three dot-separated segments.
    #[error("Invalid JWT format")]
    InvalidTokenFormat,

    #[error("Failed to decode {segment}: invalid base64url encoding")]
    Base64Decode { segment: &'static str },

    #[error("Failed to parse {segment} as JSON: {reason}")]
    JsonParse { segment: &'static str, reason: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Ambiguous key source: {0}")]
    AmbiguousKeySource(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{context}: {status}")]
    HttpStatus { context: &'static str, status: reqwest::StatusCode },

    #[error("{context}: response exceeds maximum size of {max} bytes")]
    ResponseTooLarge { context: &'static str, max: usize },

    #[error("No JWKS URI found in OpenID configuration")]
    MissingJwksUri,

    #[error("Invalid OpenID configuration: {0}")]
    InvalidDiscoveryDocument(String),

    #[error("{0}")]
    InvalidJwks(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ConfigFile(#[from] serde_yaml::Error),

    /// A fetch failure observed by every caller that waited on the same fetch.
    #[error(transparent)]
    Shared(Arc<InspectorError>),
}

pub type Result<T, E = InspectorError> = std::result::Result<T, E>;
