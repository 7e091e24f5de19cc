// src/validator/rules.rs

//! Claim rules from RFC 7519, RFC 9068 and OpenID Connect Core.

use super::model::{Profile, TokenType, ValidationResult};
use super::{header_typ, is_present, numeric_claim};
use crate::claims::claim_description;
use crate::config::ValidationDetails;
use crate::timeline::{format_timespan, format_timestamp};
use serde_json::{Map, Value};
use url::Url;

const RFC_9068_TYPES: &[&str] = &["at+jwt", "application/at+jwt", "JWT"];
const ID_TOKEN_REQUIRED: &[&str] = &["iss", "sub", "aud", "exp", "iat"];
const RFC_9068_REQUIRED: &[&str] = &["iss", "exp", "aud", "sub", "client_id", "iat", "jti"];
const OIDC_ACCESS_REQUIRED: &[&str] = &["iss", "exp", "iat"];
const AUTHORIZATION_CLAIMS: &[&str] = &["roles", "groups", "entitlements"];

pub(super) fn validate_header(
    header: &Map<String, Value>,
    profile: Profile,
    token_type: TokenType,
    results: &mut Vec<ValidationResult>,
) {
    validate_alg(header, results);
    match profile {
        Profile::OAuth => validate_typ_oauth(header, token_type, results),
        Profile::Oidc => validate_typ_oidc(header, results),
    }

    if is_present(header, "kid") {
        results.push(ValidationResult::info("header.kid", "Key ID is present"));
    } else {
        results.push(
            ValidationResult::warning("header.kid", "Key ID (kid) is missing from header")
                .with_details("The 'kid' claim helps identify which key to use for validation"),
        );
    }
}

fn validate_alg(header: &Map<String, Value>, results: &mut Vec<ValidationResult>) {
    if !is_present(header, "alg") {
        results.push(ValidationResult::error("header.alg", "Algorithm (alg) is missing from header"));
        return;
    }
    let Some(alg) = header.get("alg").and_then(Value::as_str) else {
        results.push(ValidationResult::error("header.alg", "Algorithm (alg) must be a string"));
        return;
    };

    let family = match alg.get(..2) {
        Some("HS") => Some("HMAC"),
        Some("RS") => Some("RSA"),
        Some("ES") => Some("ECDSA"),
        Some("PS") => Some("RSASSA-PSS"),
        _ => None,
    };
    let bits = alg.get(2..).filter(|b| matches!(*b, "256" | "384" | "512"));

    if alg == "none" {
        results.push(ValidationResult::error("header.alg", "Algorithm 'none' is not secure"));
    } else if alg == "EdDSA" {
        results.push(ValidationResult::info("header.alg", "Edwards-curve Digital Signature Algorithm"));
    } else if let (Some(family), Some(bits)) = (family, bits) {
        results.push(ValidationResult::info("header.alg", format!("{family} with SHA-{bits}")));
    }
}

fn validate_typ_oauth(header: &Map<String, Value>, token_type: TokenType, results: &mut Vec<ValidationResult>) {
    let Some(typ) = present_typ(header) else {
        results.push(ValidationResult::warning("header.typ", "Type (typ) is missing from header"));
        return;
    };

    let is_access = token_type == TokenType::AccessToken;
    if is_access && (typ == "at+jwt" || typ == "application/at+jwt") {
        results.push(ValidationResult::info(
            "header.typ",
            format!("Token type correctly set to {typ} as per RFC 9068"),
        ));
    } else if token_type == TokenType::IdToken && typ != "JWT" {
        results.push(ValidationResult::warning(
            "header.typ",
            format!("Unexpected token type for ID Token: {typ}"),
        ));
    } else if is_access && !RFC_9068_TYPES.contains(&typ) {
        results.push(
            ValidationResult::warning("header.typ", format!("Unexpected token type for Access Token: {typ}"))
                .with_details("RFC 9068 recommends using 'at+jwt' or 'application/at+jwt' for JWT access tokens"),
        );
    } else {
        results.push(ValidationResult::info("header.typ", format!("Token type is {typ}")));
    }
}

fn validate_typ_oidc(header: &Map<String, Value>, results: &mut Vec<ValidationResult>) {
    match present_typ(header) {
        None => results.push(ValidationResult::warning("header.typ", "Type (typ) is missing from header")),
        Some("JWT") => results.push(ValidationResult::info("header.typ", "Token type is correctly set to JWT")),
        Some(typ) => results.push(ValidationResult::warning("header.typ", format!("Unexpected token type: {typ}"))),
    }
}

/// The `typ` header as text. A present but non-string value renders as `<non-string>`.
fn present_typ(header: &Map<String, Value>) -> Option<&str> {
    if !is_present(header, "typ") {
        return None;
    }
    Some(header_typ(header).unwrap_or("<non-string>"))
}

pub(super) fn validate_id_token(payload: &Map<String, Value>, results: &mut Vec<ValidationResult>) {
    for claim in ID_TOKEN_REQUIRED {
        if !is_present(payload, claim) {
            results.push(
                ValidationResult::error(*claim, format!("Required claim '{claim}' is missing"))
                    .with_optional_details(describe(claim)),
            );
        }
    }

    if !is_present(payload, "nonce") {
        results.push(
            ValidationResult::warning("nonce", "Nonce is missing - recommended for replay protection")
                .with_details("The 'nonce' claim helps prevent replay attacks"),
        );
    }

    if is_present(payload, "at_hash") {
        results.push(
            ValidationResult::info("at_hash", "Access Token hash is present")
                .with_details("This token was issued alongside an access token"),
        );
    }

    if !is_present(payload, "auth_time") {
        results.push(
            ValidationResult::warning("auth_time", "auth_time is missing - required if max_age was requested")
                .with_details("The 'auth_time' claim indicates when the user authenticated"),
        );
    }
}

/// RFC 9068 JWT access token rules.
pub(super) fn validate_access_token_oauth(payload: &Map<String, Value>, results: &mut Vec<ValidationResult>) {
    for claim in RFC_9068_REQUIRED {
        if is_present(payload, claim) {
            continue;
        }
        let message = format!("Required claim '{claim}' for JWT Access Token is missing");
        let note = match *claim {
            "jti" => Some("RFC 9068 requires 'jti' but it's not universally implemented"),
            "client_id" => Some("RFC 9068 requires 'client_id' but some implementations use 'azp' instead"),
            _ => None,
        };
        let details = match (describe(claim), note) {
            (Some(description), Some(note)) => Some(format!("{description} {note}")),
            (Some(description), None) => Some(description),
            (None, Some(note)) => Some(note.to_string()),
            (None, None) => None,
        };
        let result = if note.is_some() {
            ValidationResult::warning(*claim, message)
        } else {
            ValidationResult::error(*claim, message)
        };
        results.push(result.with_optional_details(details));
    }

    if !is_present(payload, "client_id") && is_present(payload, "azp") {
        results.push(
            ValidationResult::info("azp", "Using 'azp' instead of 'client_id'")
                .with_details("While RFC 9068 specifies 'client_id', some implementations use 'azp' instead"),
        );
    }

    validate_scope(payload, results);

    for claim in AUTHORIZATION_CLAIMS {
        if !is_present(payload, claim) {
            continue;
        }
        if payload.get(*claim).is_some_and(Value::is_array) {
            results.push(
                ValidationResult::info(*claim, format!("Token includes {claim} authorization claim"))
                    .with_details("This is a standard authorization claim as per RFC 9068"),
            );
        } else {
            results.push(
                ValidationResult::warning(*claim, format!("{claim} is present but not in the expected array format"))
                    .with_details(format!("RFC 9068 expects {claim} to be an array of strings")),
            );
        }
    }
}

pub(super) fn validate_access_token_oidc(payload: &Map<String, Value>, results: &mut Vec<ValidationResult>) {
    for claim in OIDC_ACCESS_REQUIRED {
        if !is_present(payload, claim) {
            results.push(
                ValidationResult::error(*claim, format!("Required claim '{claim}' is missing"))
                    .with_optional_details(describe(claim)),
            );
        }
    }

    validate_scope(payload, results);

    if !is_present(payload, "client_id") && !is_present(payload, "azp") {
        results.push(
            ValidationResult::warning("client_id/azp", "No client identifier found")
                .with_details("Access tokens typically include client_id or azp to identify the client"),
        );
    }
}

fn validate_scope(payload: &Map<String, Value>, results: &mut Vec<ValidationResult>) {
    let (claim, value) = if is_present(payload, "scope") {
        ("scope", &payload["scope"])
    } else if is_present(payload, "scp") {
        ("scp", &payload["scp"])
    } else {
        results.push(
            ValidationResult::warning("scope/scp", "No scope claim found in access token")
                .with_details("Access tokens typically include scope or scp claim to indicate permissions"),
        );
        return;
    };

    let noun = if value.is_string() { "scope" } else { "scopes" };
    results.push(ValidationResult::info(claim, format!("Token includes {noun}")));
}

pub(super) fn validate_common(
    payload: &Map<String, Value>,
    details: &ValidationDetails,
    now: i64,
    results: &mut Vec<ValidationResult>,
) {
    let leeway = i64::try_from(details.leeway.as_secs()).unwrap_or(i64::MAX);

    if is_present(payload, "iss") {
        let is_url = payload["iss"].as_str().is_some_and(|iss| Url::parse(iss).is_ok());
        if is_url {
            results.push(ValidationResult::info("iss", "Issuer is a valid URL"));
        } else {
            results.push(ValidationResult::warning("iss", "Issuer is not a valid URL"));
        }
    }

    if let Some(exp) = timestamp(payload, "exp", results) {
        if exp.saturating_add(leeway) < now {
            results.push(
                ValidationResult::error("exp", "Token has expired")
                    .with_details(format!("Expired at {}", format_timestamp(exp))),
            );
        } else {
            results.push(
                ValidationResult::info("exp", format!("Token expires in {}", format_timespan(exp.saturating_sub(now))))
                    .with_details(format!("Expires at {}", format_timestamp(exp))),
            );
        }
    }

    if let Some(iat) = timestamp(payload, "iat", results) {
        let age = now.saturating_sub(iat);
        results.push(
            ValidationResult::info("iat", format!("Token was issued {} ago", format_timespan(age)))
                .with_details(format!("Issued at {}", format_timestamp(iat))),
        );

        let max_age = i64::try_from(details.max_token_age.as_secs()).unwrap_or(i64::MAX);
        if age > max_age {
            results.push(
                ValidationResult::warning("iat", "Token is quite old")
                    .with_details(format!("This token was issued more than {} ago", format_timespan(max_age))),
            );
        }
    }

    if let Some(nbf) = timestamp(payload, "nbf", results) {
        if nbf.saturating_sub(leeway) > now {
            results.push(
                ValidationResult::error("nbf", "Token is not yet valid")
                    .with_details(format!("Valid from {}", format_timestamp(nbf))),
            );
        } else {
            results.push(
                ValidationResult::info("nbf", "Token is currently valid (nbf)")
                    .with_details(format!("Valid from {}", format_timestamp(nbf))),
            );
        }
    }
}

/// Reads a present temporal claim, recording a warning when it is not numeric.
fn timestamp(payload: &Map<String, Value>, claim: &str, results: &mut Vec<ValidationResult>) -> Option<i64> {
    if !is_present(payload, claim) {
        return None;
    }
    let value = numeric_claim(&payload[claim]);
    if value.is_none() {
        results.push(
            ValidationResult::warning(claim, format!("'{claim}' is not a numeric timestamp"))
                .with_details("Temporal claims are NumericDate values: seconds since the UNIX epoch"),
        );
    }
    value
}

fn describe(claim: &str) -> Option<String> {
    claim_description(claim).map(|d| d.description.to_string())
}
