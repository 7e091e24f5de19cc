// src/model.rs

use crate::error::{InspectorError, Result};
use jsonwebtoken::jwk::Jwk;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;
use url::Url;

/// Represents the data structure of an OIDC provider's discovery document.
/// Found at the `.well-known/openid-configuration` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OidcDiscoveryDocument {
    pub issuer: Option<String>,
    pub jwks_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub id_token_signing_alg_values_supported: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes_supported: Vec<String>,
}

impl OidcDiscoveryDocument {
    /// The advertised JWKS location.
    pub fn jwks_url(&self) -> Result<Url> {
        let uri = self
            .jwks_uri
            .as_deref()
            .filter(|uri| !uri.is_empty())
            .ok_or(InspectorError::MissingJwksUri)?;
        Url::parse(uri).map_err(|e| InspectorError::InvalidUrl(format!("{uri}: {e}")))
    }
}

/// A single JSON Web Key (RFC 7517) as found in a key set.
#[derive(Debug, Clone)]
pub struct JsonWebKey {
    pub kid: Option<String>,
    pub kty: String,
    pub use_purpose: Option<String>,
    pub alg: Option<String>,
    /// The key exactly as published.
    pub raw: Map<String, Value>,
    /// The key in a form usable for verification, when the key type and algorithm are supported.
    pub jwk: Option<Jwk>,
}

/// A JSON Web Key Set (JWKS).
#[derive(Debug, Clone, Default)]
pub struct JsonWebKeySet {
    pub keys: Vec<JsonWebKey>,
}

impl JsonWebKeySet {
    pub fn find(&self, kid: &str) -> Option<&JsonWebKey> {
        self.keys.iter().find(|key| key.kid.as_deref() == Some(kid))
    }
}

/// Parses and shape-checks a JWKS document.
///
/// Every key must be an object with a `kty`. Keys that cannot be used for
/// verification are kept for display but carry no [`Jwk`].
pub fn parse_jwks(text: &str) -> Result<JsonWebKeySet> {
    let value: Value = serde_json::from_str(text.trim())
        .map_err(|e| InspectorError::InvalidJwks(format!("Invalid JWKS JSON: {e}")))?;

    let Some(keys) = value.get("keys").and_then(Value::as_array) else {
        return Err(InspectorError::InvalidJwks(
            "Invalid JWKS format: missing 'keys' array".to_string(),
        ));
    };

    let mut parsed = Vec::with_capacity(keys.len());
    for key in keys {
        let Some(raw) = key.as_object() else {
            return Err(InspectorError::InvalidJwks("Invalid key in JWKS: expected an object".to_string()));
        };
        let Some(kty) = raw.get("kty").and_then(Value::as_str).filter(|kty| !kty.is_empty()) else {
            return Err(InspectorError::InvalidJwks(
                "Invalid key in JWKS: missing 'kty' property".to_string(),
            ));
        };

        let text_field = |name: &str| raw.get(name).and_then(Value::as_str).map(str::to_string);
        let kid = text_field("kid");
        let jwk = match serde_json::from_value::<Jwk>(key.clone()) {
            Ok(jwk) => Some(jwk),
            Err(e) => {
                warn!(kid = ?kid, kty, "Skipping unsupported key: {}", e);
                None
            }
        };

        parsed.push(JsonWebKey {
            kid,
            kty: kty.to_string(),
            use_purpose: text_field("use"),
            alg: text_field("alg"),
            raw: raw.clone(),
            jwk,
        });
    }

    Ok(JsonWebKeySet { keys: parsed })
}

/// Location of the discovery document for an issuer.
///
/// The issuer path is kept, so `https://host/realms/x` maps to
/// `https://host/realms/x/.well-known/openid-configuration`.
pub fn discovery_url(issuer: &Url) -> Result<Url> {
    let mut base = issuer.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(".well-known/openid-configuration")
        .map_err(|e| InspectorError::InvalidUrl(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_url_keeps_issuer_path() {
        let url = discovery_url(&Url::parse("https://login.example.com/realms/main").unwrap()).unwrap();
        assert_eq!(url.as_str(), "https://login.example.com/realms/main/.well-known/openid-configuration");

        let url = discovery_url(&Url::parse("https://login.example.com/").unwrap()).unwrap();
        assert_eq!(url.as_str(), "https://login.example.com/.well-known/openid-configuration");
    }

    #[test]
    fn parses_supported_and_unsupported_keys() {
        let jwks = parse_jwks(
            r#"{"keys":[
                {"kty":"oct","kid":"hmac","alg":"HS256","k":"c2VjcmV0"},
                {"kty":"XYZ","kid":"odd"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(jwks.keys.len(), 2);
        let hmac = jwks.find("hmac").unwrap();
        assert_eq!(hmac.kty, "oct");
        assert_eq!(hmac.alg.as_deref(), Some("HS256"));
        assert!(hmac.jwk.is_some());

        let odd = jwks.find("odd").unwrap();
        assert!(odd.jwk.is_none());
        assert_eq!(odd.raw["kty"], "XYZ");
        assert!(jwks.find("missing").is_none());
    }

    #[test]
    fn rejects_missing_keys_array() {
        let err = parse_jwks(r#"{"foo": []}"#).unwrap_err();
        assert_eq!(err.to_string(), "Invalid JWKS format: missing 'keys' array");

        let err = parse_jwks(r#"{"keys": {}}"#).unwrap_err();
        assert_eq!(err.to_string(), "Invalid JWKS format: missing 'keys' array");
    }

    #[test]
    fn rejects_key_without_kty() {
        let err = parse_jwks(r#"{"keys": [{"kid": "1"}]}"#).unwrap_err();
        assert_eq!(err.to_string(), "Invalid key in JWKS: missing 'kty' property");
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(parse_jwks("{not json"), Err(InspectorError::InvalidJwks(_))));
    }

    #[test]
    fn discovery_document_requires_jwks_uri() {
        let doc: OidcDiscoveryDocument = serde_json::from_str(r#"{"issuer": "https://id.example.com"}"#).unwrap();
        assert!(matches!(doc.jwks_url(), Err(InspectorError::MissingJwksUri)));

        let doc: OidcDiscoveryDocument =
            serde_json::from_str(r#"{"issuer": "https://id", "jwks_uri": "https://id/keys"}"#).unwrap();
        assert_eq!(doc.jwks_url().unwrap().as_str(), "https://id/keys");
    }
}
