// src/validator/model.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of token, as inferred from its header and claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    IdToken,
    AccessToken,
    RefreshToken,
    Unknown,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenType::IdToken => "ID Token",
            TokenType::AccessToken => "Access Token",
            TokenType::RefreshToken => "Refresh Token",
            TokenType::Unknown => "Unknown Token Type",
        })
    }
}

/// Which rule set classifies and validates a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// OAuth 2.0 rules, including the RFC 9068 JWT access token profile.
    #[default]
    OAuth,
    /// OpenID Connect rules centred on ID tokens.
    Oidc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// A single finding about a header field or claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// The claim the finding is about. Header fields are prefixed with `header.`.
    pub claim: String,
    pub valid: bool,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ValidationResult {
    pub fn info(claim: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(claim, true, message, Severity::Info)
    }

    pub fn warning(claim: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(claim, false, message, Severity::Warning)
    }

    pub fn error(claim: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(claim, false, message, Severity::Error)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_optional_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }

    fn new(claim: impl Into<String>, valid: bool, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            claim: claim.into(),
            valid,
            message: message.into(),
            severity,
            details: None,
        }
    }
}
