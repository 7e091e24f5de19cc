// src/signature.rs

//! Signature verification against a JSON Web Key Set.

use crate::decoder::DecodedToken;
use crate::model::{JsonWebKey, JsonWebKeySet};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{crypto, Algorithm, DecodingKey};
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SignatureStatus {
    Verified,
    Failed { reason: String },
    /// No key source was configured.
    NotVerified,
}

/// Summary of the JWK that was selected for verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeySummary {
    pub kid: Option<String>,
    pub kty: String,
    pub alg: Option<String>,
    #[serde(rename = "use")]
    pub use_purpose: Option<String>,
    /// RFC 7638 SHA-256 thumbprint, base64url-encoded.
    pub thumbprint: Option<String>,
}

impl KeySummary {
    pub fn from_key(key: &JsonWebKey) -> Self {
        Self {
            kid: key.kid.clone(),
            kty: key.kty.clone(),
            alg: key.alg.clone(),
            use_purpose: key.use_purpose.clone(),
            thumbprint: jwk_thumbprint(&key.raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureReport {
    pub status: SignatureStatus,
    pub algorithm: Option<String>,
    pub kid: Option<String>,
    pub key_count: usize,
    pub matching_key: Option<KeySummary>,
}

impl SignatureReport {
    pub fn not_verified() -> Self {
        Self {
            status: SignatureStatus::NotVerified,
            algorithm: None,
            kid: None,
            key_count: 0,
            matching_key: None,
        }
    }

    /// A failure that happened before any key set was available.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: SignatureStatus::Failed { reason: reason.into() },
            ..Self::not_verified()
        }
    }

    pub fn is_verified(&self) -> bool {
        self.status == SignatureStatus::Verified
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, SignatureStatus::Failed { .. })
    }
}

/// Verifies the token's signature with a key from `jwks`.
///
/// Only the signature is checked. Expiry and other temporal claims are left to
/// the validator so that an expired but authentic token still verifies.
pub fn verify_signature(token: &DecodedToken, jwks: &JsonWebKeySet) -> SignatureReport {
    let algorithm = token.header.get("alg").and_then(Value::as_str).map(str::to_string);
    let kid = token.header.get("kid").and_then(Value::as_str).map(str::to_string);

    let mut report = SignatureReport {
        status: SignatureStatus::NotVerified,
        algorithm: algorithm.clone(),
        kid: kid.clone(),
        key_count: jwks.keys.len(),
        matching_key: None,
    };

    let outcome = select_key(kid.as_deref(), jwks).and_then(|key| {
        report.matching_key = Some(KeySummary::from_key(key));
        check(token, algorithm.as_deref(), key)
    });

    report.status = match outcome {
        Ok(()) => SignatureStatus::Verified,
        Err(reason) => {
            debug!(kid = ?kid, "Signature not verified: {}", reason);
            SignatureStatus::Failed { reason }
        }
    };
    report
}

fn select_key<'a>(kid: Option<&str>, jwks: &'a JsonWebKeySet) -> Result<&'a JsonWebKey, String> {
    if jwks.keys.is_empty() {
        return Err("The JWKS contains no keys".to_string());
    }
    match kid {
        Some(kid) => jwks
            .find(kid)
            .ok_or_else(|| format!("No key with matching key ID '{kid}' found in the JWKS")),
        None if jwks.keys.len() == 1 => Ok(&jwks.keys[0]),
        None => Err(format!(
            "Token has no key ID (kid) and the JWKS contains {} keys",
            jwks.keys.len()
        )),
    }
}

fn check(token: &DecodedToken, alg: Option<&str>, key: &JsonWebKey) -> Result<(), String> {
    let alg = alg.ok_or_else(|| "Token header has no algorithm (alg)".to_string())?;
    if alg == "none" {
        return Err("Algorithm 'none' cannot be verified".to_string());
    }
    let algorithm = Algorithm::from_str(alg).map_err(|_| format!("Unsupported algorithm: {alg}"))?;

    if let Some(key_alg) = key.alg.as_deref() {
        if key_alg != alg {
            return Err(format!("Key algorithm {key_alg} does not match token algorithm {alg}"));
        }
    }
    let expected_kty = required_key_type(algorithm);
    if key.kty != expected_kty {
        return Err(format!("Key type {} cannot verify {alg} signatures", key.kty));
    }

    let jwk = key
        .jwk
        .as_ref()
        .ok_or_else(|| "The matching key is not supported for verification".to_string())?;
    let decoding_key = DecodingKey::from_jwk(jwk).map_err(|e| format!("Invalid key: {e}"))?;

    let message = signing_input(&token.raw);
    match crypto::verify(&token.signature, message.as_bytes(), &decoding_key, algorithm) {
        Ok(true) => Ok(()),
        Ok(false) => Err("Invalid signature".to_string()),
        Err(e) => Err(format!("Signature verification failed: {e}")),
    }
}

fn required_key_type(algorithm: Algorithm) -> &'static str {
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => "oct",
        Algorithm::ES256 | Algorithm::ES384 => "EC",
        Algorithm::EdDSA => "OKP",
        _ => "RSA",
    }
}

/// `header.payload`, the bytes the signature covers.
fn signing_input(raw: &str) -> &str {
    raw.rsplit_once('.').map_or(raw, |(input, _)| input)
}

/// Computes the RFC 7638 JWK thumbprint (SHA-256, base64url).
///
/// Returns `None` for unknown key types or keys missing a required member.
pub fn jwk_thumbprint(jwk: &Map<String, Value>) -> Option<String> {
    let kty = jwk.get("kty")?.as_str()?;
    let members: &[&str] = match kty {
        "RSA" => &["e", "kty", "n"],
        "EC" => &["crv", "kty", "x", "y"],
        "oct" => &["k", "kty"],
        "OKP" => &["crv", "kty", "x"],
        _ => return None,
    };

    // BTreeMap keeps members in lexicographic order
    let mut canonical = BTreeMap::new();
    for member in members {
        canonical.insert(*member, jwk.get(*member)?.as_str()?);
    }
    let canonical = serde_json::to_string(&canonical).ok()?;

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Some(URL_SAFE_NO_PAD.encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode_token;
    use crate::model::parse_jwks;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &[u8] = b"a-string-secret-at-least-256-bits-long";

    fn hs256_token(kid: Option<&str>) -> DecodedToken {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = kid.map(str::to_string);
        let token = encode(&header, &json!({"sub": "1", "exp": 1}), &EncodingKey::from_secret(SECRET)).unwrap();
        decode_token(&token).unwrap()
    }

    fn oct_jwks(keys: &[(&str, &[u8])]) -> JsonWebKeySet {
        let keys: Vec<Value> = keys
            .iter()
            .map(|(kid, secret)| json!({"kty": "oct", "kid": kid, "alg": "HS256", "k": URL_SAFE_NO_PAD.encode(secret)}))
            .collect();
        parse_jwks(&json!({ "keys": keys }).to_string()).unwrap()
    }

    #[test]
    fn verifies_with_matching_kid() {
        let jwks = oct_jwks(&[("other", b"nope-nope-nope".as_slice()), ("k1", SECRET)]);
        let report = verify_signature(&hs256_token(Some("k1")), &jwks);

        assert!(report.is_verified(), "{:?}", report.status);
        assert_eq!(report.algorithm.as_deref(), Some("HS256"));
        assert_eq!(report.key_count, 2);
        let key = report.matching_key.unwrap();
        assert_eq!(key.kid.as_deref(), Some("k1"));
        assert!(key.thumbprint.is_some());
    }

    #[test]
    fn expired_token_still_verifies() {
        // the encoded payload has exp = 1
        let report = verify_signature(&hs256_token(None), &oct_jwks(&[("only", SECRET)]));
        assert!(report.is_verified());
    }

    #[test]
    fn wrong_secret_fails() {
        let report = verify_signature(&hs256_token(Some("k1")), &oct_jwks(&[("k1", b"some-other-secret-value".as_slice())]));
        assert_eq!(
            report.status,
            SignatureStatus::Failed {
                reason: "Invalid signature".to_string()
            }
        );
    }

    #[test]
    fn unknown_kid_fails() {
        let report = verify_signature(&hs256_token(Some("missing")), &oct_jwks(&[("k1", SECRET)]));
        assert_eq!(
            report.status,
            SignatureStatus::Failed {
                reason: "No key with matching key ID 'missing' found in the JWKS".to_string()
            }
        );
        assert!(report.matching_key.is_none());
    }

    #[test]
    fn missing_kid_needs_single_key() {
        let report = verify_signature(&hs256_token(None), &oct_jwks(&[("a", SECRET), ("b", SECRET)]));
        assert!(report.is_failed());
    }

    #[test]
    fn empty_key_set_fails() {
        let report = verify_signature(&hs256_token(None), &JsonWebKeySet::default());
        assert!(report.is_failed());
        assert_eq!(report.key_count, 0);
    }

    #[test]
    fn alg_none_is_never_verified() {
        let token = decode_token("eyJhbGciOiJub25lIn0.eyJzdWIiOiIxIn0.").unwrap();
        let report = verify_signature(&token, &oct_jwks(&[("k1", SECRET)]));
        assert_eq!(
            report.status,
            SignatureStatus::Failed {
                reason: "Algorithm 'none' cannot be verified".to_string()
            }
        );
    }

    #[test]
    fn key_type_must_fit_algorithm() {
        let jwks = parse_jwks(r#"{"keys":[{"kty":"RSA","kid":"k1","n":"AQAB","e":"AQAB"}]}"#).unwrap();
        let report = verify_signature(&hs256_token(Some("k1")), &jwks);
        assert_eq!(
            report.status,
            SignatureStatus::Failed {
                reason: "Key type RSA cannot verify HS256 signatures".to_string()
            }
        );
    }

    #[test]
    fn key_alg_must_match_header() {
        let jwks = parse_jwks(&format!(
            r#"{{"keys":[{{"kty":"oct","kid":"k1","alg":"HS512","k":"{}"}}]}}"#,
            URL_SAFE_NO_PAD.encode(SECRET)
        ))
        .unwrap();
        let report = verify_signature(&hs256_token(Some("k1")), &jwks);
        assert!(matches!(report.status, SignatureStatus::Failed { reason } if reason.contains("does not match")));
    }

    #[test]
    fn thumbprint_uses_canonical_members() {
        let key = json!({"kty": "RSA", "n": "abc", "e": "AQAB", "kid": "ignored", "alg": "RS256"});
        let Value::Object(key) = key else { unreachable!() };

        let mut hasher = Sha256::new();
        hasher.update(br#"{"e":"AQAB","kty":"RSA","n":"abc"}"#);
        let expected = URL_SAFE_NO_PAD.encode(hasher.finalize());

        assert_eq!(jwk_thumbprint(&key), Some(expected));
    }

    #[test]
    fn thumbprint_needs_required_members() {
        let Value::Object(key) = json!({"kty": "EC", "crv": "P-256", "x": "abc"}) else { unreachable!() };
        assert_eq!(jwk_thumbprint(&key), None);

        let Value::Object(key) = json!({"kty": "unknown"}) else { unreachable!() };
        assert_eq!(jwk_thumbprint(&key), None);
    }

    #[test]
    fn signing_input_drops_signature() {
        assert_eq!(signing_input("a.b.c"), "a.b");
        assert_eq!(signing_input("a.b."), "a.b");
    }
}
