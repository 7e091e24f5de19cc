// src/validator.rs

mod detect;
mod model;
mod rules;

pub use detect::determine_token_type;
pub use model::{Profile, Severity, TokenType, ValidationResult};

use crate::config::ValidationDetails;
use serde_json::{Map, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, instrument};

/// Classifies tokens and checks their header and claims.
///
/// The validator never fails: every problem it finds is reported as a
/// [`ValidationResult`] with a severity, so a caller can show all findings at once.
#[derive(Clone, Debug, Default)]
pub struct Validator {
    details: ValidationDetails,
}

impl Validator {
    pub fn new(details: ValidationDetails) -> Self {
        Self { details }
    }

    pub fn profile(&self) -> Profile {
        self.details.profile
    }

    pub fn determine_token_type(&self, header: &Map<String, Value>, payload: &Map<String, Value>) -> TokenType {
        determine_token_type(self.details.profile, header, payload)
    }

    /// Validates a token against the system clock.
    pub fn validate(
        &self,
        header: &Map<String, Value>,
        payload: &Map<String, Value>,
        token_type: TokenType,
    ) -> Vec<ValidationResult> {
        self.validate_at(header, payload, token_type, unix_now())
    }

    /// Validates a token as if the current time were `now` (seconds since the UNIX epoch).
    ///
    /// Header findings come first, then the token-type specific claim checks,
    /// then the temporal and issuer checks shared by every token type.
    #[instrument(skip(self, header, payload), fields(profile = ?self.details.profile))]
    pub fn validate_at(
        &self,
        header: &Map<String, Value>,
        payload: &Map<String, Value>,
        token_type: TokenType,
        now: i64,
    ) -> Vec<ValidationResult> {
        let profile = self.details.profile;
        let mut results = Vec::new();

        rules::validate_header(header, profile, token_type, &mut results);

        match (token_type, profile) {
            (TokenType::IdToken, _) => rules::validate_id_token(payload, &mut results),
            (TokenType::AccessToken, Profile::OAuth) => rules::validate_access_token_oauth(payload, &mut results),
            (TokenType::AccessToken, Profile::Oidc) => rules::validate_access_token_oidc(payload, &mut results),
            _ => {}
        }

        rules::validate_common(payload, &self.details, now, &mut results);

        debug!(count = results.len(), "Validation finished");
        results
    }
}

/// Current time in seconds since the UNIX epoch.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

/// Whether a claim is present with a truthy value.
///
/// Absent, `null`, `false`, `0` and `""` all count as missing, which is how
/// token producers in the wild tend to signal "not set".
pub(crate) fn is_present(map: &Map<String, Value>, claim: &str) -> bool {
    match map.get(claim) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

pub(crate) fn header_typ(header: &Map<String, Value>) -> Option<&str> {
    header.get("typ").and_then(Value::as_str)
}

/// Reads a NumericDate claim, truncating fractional seconds.
pub(crate) fn numeric_claim(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
}
