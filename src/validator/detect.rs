// src/validator/detect.rs

//! Heuristics that tell ID tokens from access tokens.

use super::model::{Profile, TokenType};
use super::{header_typ, is_present};
use serde_json::{Map, Value};

const AT_JWT_TYPES: &[&str] = &["at+jwt", "application/at+jwt"];

/// Infers the token type from the header and claims, using the profile's heuristics.
pub fn determine_token_type(
    profile: Profile,
    header: &Map<String, Value>,
    payload: &Map<String, Value>,
) -> TokenType {
    match profile {
        Profile::OAuth => detect_oauth(header, payload),
        Profile::Oidc => detect_oidc(payload),
    }
}

fn detect_oauth(header: &Map<String, Value>, payload: &Map<String, Value>) -> TokenType {
    let has = |claim: &str| is_present(payload, claim);
    let typ = header_typ(header);
    let typ_is_jwt = typ == Some("JWT");

    if typ.is_some_and(|t| AT_JWT_TYPES.contains(&t)) {
        return TokenType::AccessToken;
    }

    if has("nonce") || has("at_hash") || has("c_hash") || has("sid") || (typ_is_jwt && has("auth_time")) {
        return TokenType::IdToken;
    }

    let has_authorities = ["authorities", "roles", "permissions", "entitlements"]
        .iter()
        .any(|claim| has(*claim));
    if has("scope")
        || has("scp")
        || (has("azp") && !has("nonce"))
        || has("client_id")
        || (typ_is_jwt && has_authorities)
    {
        return TokenType::AccessToken;
    }

    if ["iss", "sub", "aud", "exp", "iat"].iter().all(|claim| has(*claim)) {
        return if has("scope") || has("scp") {
            TokenType::AccessToken
        } else {
            TokenType::IdToken
        };
    }

    TokenType::Unknown
}

fn detect_oidc(payload: &Map<String, Value>) -> TokenType {
    let has = |claim: &str| is_present(payload, claim);

    if has("nonce") || has("at_hash") || has("c_hash") {
        TokenType::IdToken
    } else if has("scope") || has("scp") || (has("azp") && !has("nonce")) {
        TokenType::AccessToken
    } else {
        TokenType::Unknown
    }
}
