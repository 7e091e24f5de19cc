// src/decoder.rs

//! Splits a raw JWT into its three segments and decodes the header and payload.

use crate::error::InspectorError;
use base64::alphabet::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Base64url engine that accepts segments with or without `=` padding.
const SEGMENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// The decoded parts of a JWT. Nothing here has been verified.
#[derive(Clone)]
pub struct DecodedToken {
    pub header: Map<String, Value>,
    pub payload: Map<String, Value>,
    /// The raw base64url signature segment.
    pub signature: String,
    /// The token exactly as it was decoded, surrounding whitespace removed.
    pub raw: String,
}

impl fmt::Debug for DecodedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedToken")
            .field("header", &self.header)
            .field("payload", &"[REDACTED]")
            .field("signature", &"[REDACTED]")
            .finish()
    }
}

/// Decodes a JWT without verifying it.
///
/// # Errors
///
/// Returns [`InspectorError::InvalidTokenFormat`] unless the token has exactly
/// three segments, and a segment-specific error when the header or payload is
/// not base64url-encoded JSON object.
pub fn decode_token(token: &str) -> Result<DecodedToken, InspectorError> {
    let raw = token.trim();
    let parts: Vec<&str> = raw.split('.').collect();
    if parts.len() != 3 {
        return Err(InspectorError::InvalidTokenFormat);
    }

    let header = decode_segment(parts[0], "header")?;
    let payload = decode_segment(parts[1], "payload")?;

    Ok(DecodedToken {
        header,
        payload,
        signature: parts[2].to_string(),
        raw: raw.to_string(),
    })
}

fn decode_segment(encoded: &str, segment: &'static str) -> Result<Map<String, Value>, InspectorError> {
    let bytes = SEGMENT_ENGINE
        .decode(encoded)
        .map_err(|_| InspectorError::Base64Decode { segment })?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(InspectorError::JsonParse {
            segment,
            reason: "expected a JSON object".to_string(),
        }),
        Err(e) => Err(InspectorError::JsonParse {
            segment,
            reason: e.to_string(),
        }),
    }
}

/// Byte sizes of a token's segments, encoded and decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenSize {
    pub header: usize,
    pub payload: usize,
    pub signature: usize,
    pub total: usize,
    pub decoded_header: usize,
    pub decoded_payload: usize,
    /// Bytes spent on encoding and signature: `total - (decoded_header + decoded_payload)`.
    pub overhead: i64,
    pub overhead_percent: i64,
}

impl TokenSize {
    /// Measures a token. Segments that do not decode count as `{}`.
    pub fn measure(token: &str) -> Self {
        let parts: Vec<&str> = token.split('.').collect();
        let header_part = parts.first().copied().unwrap_or("");
        let payload_part = parts.get(1).copied().unwrap_or("");
        let signature_part = if parts.len() == 3 { parts[2] } else { "" };

        let decoded_header = compact_len(header_part);
        let decoded_payload = compact_len(payload_part);
        let total = token.len();
        let overhead = total as i64 - (decoded_header + decoded_payload) as i64;
        let overhead_percent = if total == 0 {
            0
        } else {
            (overhead as f64 / total as f64 * 100.0).round() as i64
        };

        Self {
            header: header_part.len(),
            payload: payload_part.len(),
            signature: signature_part.len(),
            total,
            decoded_header,
            decoded_payload,
            overhead,
            overhead_percent,
        }
    }
}

fn compact_len(segment: &str) -> usize {
    let value = if segment.is_empty() {
        None
    } else {
        decode_segment(segment, "segment").ok()
    };
    let value = Value::Object(value.unwrap_or_default());
    serde_json::to_string(&value).map(|s| s.len()).unwrap_or(2)
}
