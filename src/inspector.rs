// src/inspector.rs

use crate::claims::{claim_description, provider_claims, ClaimDescription, ProviderClaim, STANDARD_CLAIMS, TIMESTAMP_CLAIMS};
use crate::client::JwksClient;
use crate::config::{InspectorConfig, KeySourceConfig};
use crate::decoder::{decode_token, DecodedToken, TokenSize};
use crate::error::Result;
use crate::model::JsonWebKeySet;
use crate::signature::{verify_signature, SignatureReport};
use crate::timeline::{format_timestamp, Timeline};
use crate::validator::{numeric_claim, unix_now, Profile, Severity, TokenType, ValidationResult, Validator};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Decodes, classifies, validates and verifies tokens.
pub struct Inspector {
    config: InspectorConfig,
    validator: Validator,
    // Only built when keys come from the network.
    client: Option<JwksClient>,
}

/// Everything learned about one token.
#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    pub token: String,
    pub profile: Profile,
    pub token_type: TokenType,
    pub header: Map<String, Value>,
    pub payload: Map<String, Value>,
    pub validation: Vec<ValidationResult>,
    pub signature: SignatureReport,
    pub size: TokenSize,
    pub timeline: Option<Timeline>,
    pub claims: Vec<ClaimView>,
}

/// A payload claim together with its reference documentation and findings.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimView {
    pub name: String,
    pub value: Value,
    /// Whether the claim is one of the common OIDC claims listed first.
    pub standard: bool,
    pub description: Option<&'static ClaimDescription>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub provider_notes: Vec<&'static ProviderClaim>,
    /// The value rendered as a UTC date, for timestamp claims.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_time: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<ValidationResult>,
}

impl Inspection {
    /// Whether any finding is an error or the signature failed to verify.
    pub fn has_errors(&self) -> bool {
        self.signature.is_failed() || self.validation.iter().any(|r| r.severity == Severity::Error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.validation.iter().filter(|r| r.severity == severity).count()
    }

    fn failed_decode(token: &str, profile: Profile, message: String) -> Self {
        Self {
            token: token.trim().to_string(),
            profile,
            token_type: TokenType::Unknown,
            header: Map::new(),
            payload: Map::new(),
            validation: vec![ValidationResult::error("format", message.clone())],
            signature: SignatureReport::failed(message),
            size: TokenSize::measure(token.trim()),
            timeline: None,
            claims: Vec::new(),
        }
    }
}

impl Inspector {
    pub fn new(config: InspectorConfig) -> Result<Self> {
        let client = match &config.key_source {
            Some(KeySourceConfig::Discovery { .. }) | Some(KeySourceConfig::JwksUri(_)) => {
                Some(JwksClient::new(&config.http)?)
            }
            Some(KeySourceConfig::Inline(_)) | None => None,
        };
        Ok(Self {
            validator: Validator::new(config.validation.clone()),
            config,
            client,
        })
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    /// Inspects a token using the configured key source and the system clock.
    pub async fn inspect(&self, token: &str) -> Inspection {
        self.inspect_at(token, unix_now()).await
    }

    /// Inspects a token as if the current time were `now`.
    ///
    /// A failure to obtain keys is recorded in the signature report; the rest
    /// of the inspection still runs.
    #[instrument(skip_all, fields(now = now))]
    pub async fn inspect_at(&self, token: &str, now: i64) -> Inspection {
        let decoded = match decode_token(token) {
            Ok(decoded) => decoded,
            Err(e) => return Inspection::failed_decode(token, self.config.validation.profile, e.to_string()),
        };

        let signature = match self.resolve_keys().await {
            None => SignatureReport::not_verified(),
            Some(Ok(jwks)) => verify_signature(&decoded, &jwks),
            Some(Err(e)) => {
                warn!("Could not obtain verification keys: {}", e);
                SignatureReport::failed(e.to_string())
            }
        };

        self.build(&decoded, signature, now)
    }

    /// Inspects a token offline against an optional, already parsed key set.
    pub fn inspect_with(&self, token: &str, jwks: Option<&JsonWebKeySet>, now: i64) -> Inspection {
        match decode_token(token) {
            Ok(decoded) => {
                let signature = jwks.map_or_else(SignatureReport::not_verified, |jwks| verify_signature(&decoded, jwks));
                self.build(&decoded, signature, now)
            }
            Err(e) => Inspection::failed_decode(token, self.config.validation.profile, e.to_string()),
        }
    }

    /// The key set of the configured key source, or `None` when there is none.
    pub async fn resolve_keys(&self) -> Option<Result<Arc<JsonWebKeySet>>> {
        let source = self.config.key_source.as_ref()?;
        let result = match (&self.client, source) {
            (Some(client), _) => client.resolve(source).await,
            (None, KeySourceConfig::Inline(text)) => crate::model::parse_jwks(text).map(Arc::new),
            // Network sources always get a client in `new`.
            (None, _) => return None,
        };
        Some(result)
    }

    fn build(&self, decoded: &DecodedToken, signature: SignatureReport, now: i64) -> Inspection {
        let token_type = self.validator.determine_token_type(&decoded.header, &decoded.payload);
        let validation = self
            .validator
            .validate_at(&decoded.header, &decoded.payload, token_type, now);
        debug!(%token_type, findings = validation.len(), "Token inspected");

        Inspection {
            token: decoded.raw.clone(),
            profile: self.validator.profile(),
            token_type,
            header: decoded.header.clone(),
            payload: decoded.payload.clone(),
            claims: claim_views(&decoded.payload, &validation),
            validation,
            signature,
            size: TokenSize::measure(&decoded.raw),
            timeline: Timeline::build(&decoded.payload, now),
        }
    }
}

/// Orders the payload claims for display: the common OIDC claims first, in
/// payload order, then everything else.
fn claim_views(payload: &Map<String, Value>, validation: &[ValidationResult]) -> Vec<ClaimView> {
    let (standard, other): (Vec<_>, Vec<_>) = payload
        .iter()
        .partition(|(name, _)| STANDARD_CLAIMS.contains(&name.as_str()));

    standard
        .into_iter()
        .map(|entry| (entry, true))
        .chain(other.into_iter().map(|entry| (entry, false)))
        .map(|((name, value), standard)| ClaimView {
            name: name.clone(),
            value: value.clone(),
            standard,
            description: claim_description(name),
            provider_notes: provider_claims(name),
            formatted_time: TIMESTAMP_CLAIMS
                .contains(&name.as_str())
                .then(|| numeric_claim(value).map(format_timestamp))
                .flatten(),
            findings: validation.iter().filter(|r| r.claim == *name).cloned().collect(),
        })
        .collect()
}
