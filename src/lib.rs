// src/lib.rs

//! Decode, classify and validate OAuth 2.0 and OpenID Connect JWTs, with
//! optional signature verification against a JWKS.

pub mod claims;
pub mod client;
pub mod config;
pub mod decoder;
pub mod display;
pub mod error;
pub mod inspector;
pub mod model;
pub mod signature;
pub mod timeline;
pub mod validator;

/// The public prelude for the `token-inspector` crate.
///
/// This module re-exports the most commonly used types for convenience.
pub mod prelude {
    pub use crate::client::JwksClient;
    pub use crate::config::{ConfigBuilder, FileConfig, InspectorConfig, KeySourceConfig};
    pub use crate::decoder::{decode_token, DecodedToken};
    pub use crate::error::InspectorError;
    pub use crate::inspector::{Inspection, Inspector};
    pub use crate::model::{parse_jwks, JsonWebKeySet};
    pub use crate::signature::{SignatureReport, SignatureStatus};
    pub use crate::validator::{Profile, Severity, TokenType, ValidationResult, Validator};
}
