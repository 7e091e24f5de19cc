// src/timeline.rs

//! Token lifetime arithmetic and human-readable time formatting.

use crate::validator::is_present;
use crate::validator::numeric_claim;
use chrono::DateTime;
use serde::Serialize;
use serde_json::{Map, Value};

/// Renders a NumericDate as `YYYY-MM-DD HH:MM:SS UTC`.
pub fn format_timestamp(seconds: i64) -> String {
    match DateTime::from_timestamp(seconds, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => format!("{seconds} (out of range)"),
    }
}

/// Renders a duration in its largest whole unit, e.g. `1 minute` or `3 days`.
///
/// Negative durations render as zero.
pub fn format_timespan(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let (value, unit) = if seconds < 60 {
        (seconds, "second")
    } else if seconds < 3600 {
        (seconds / 60, "minute")
    } else if seconds < 86_400 {
        (seconds / 3600, "hour")
    } else {
        (seconds / 86_400, "day")
    };
    let plural = if value == 1 { "" } else { "s" };
    format!("{value} {unit}{plural}")
}

/// Compact difference between two instants, e.g. `4m 10s` or `2d 3h`.
pub fn format_time_diff(from: i64, to: i64) -> String {
    let diff = to.saturating_sub(from);
    if diff < 0 {
        return format!("{}s ago", diff.unsigned_abs());
    }
    match diff {
        0..=59 => format!("{diff}s"),
        60..=3599 => format!("{}m {}s", diff / 60, diff % 60),
        3600..=86_399 => format!("{}h {}m", diff / 3600, (diff % 3600) / 60),
        _ => format!("{}d {}h", diff / 86_400, (diff % 86_400) / 3600),
    }
}

/// A point of interest placed on the token's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineMarker {
    pub at: i64,
    /// Position relative to `iat` (0) and `exp` (100). May fall outside that range.
    pub percent: f64,
    pub formatted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub issued_at: i64,
    pub expires_at: i64,
    pub now: i64,
    pub lifetime_seconds: i64,
    pub elapsed_seconds: i64,
    pub percent_elapsed: f64,
    pub expired: bool,
    pub age: String,
    /// Time left until `exp`, absent once the token has expired.
    pub remaining: Option<String>,
    pub total: String,
    pub auth_time: Option<TimelineMarker>,
    pub not_before: Option<TimelineMarker>,
    pub session_id: Option<String>,
}

impl Timeline {
    /// Builds the timeline of a token. Needs both `iat` and `exp`.
    pub fn build(payload: &Map<String, Value>, now: i64) -> Option<Self> {
        let issued_at = instant(payload, "iat")?;
        let expires_at = instant(payload, "exp")?;

        let lifetime = expires_at.saturating_sub(issued_at);
        let elapsed = now.saturating_sub(issued_at).max(0);
        let percent_of = |at: i64| {
            if lifetime <= 0 {
                100.0
            } else {
                at.saturating_sub(issued_at) as f64 / lifetime as f64 * 100.0
            }
        };
        let marker = |claim: &str| {
            instant(payload, claim).map(|at| TimelineMarker {
                at,
                percent: percent_of(at),
                formatted: format_timestamp(at),
            })
        };

        let expired = now > expires_at;
        Some(Self {
            issued_at,
            expires_at,
            now,
            lifetime_seconds: lifetime,
            elapsed_seconds: elapsed,
            percent_elapsed: percent_of(issued_at.saturating_add(elapsed)).min(100.0),
            expired,
            age: format_time_diff(issued_at, now),
            remaining: (!expired).then(|| format_time_diff(now, expires_at)),
            total: format_time_diff(issued_at, expires_at),
            auth_time: marker("auth_time"),
            not_before: marker("nbf"),
            session_id: payload.get("sid").and_then(Value::as_str).map(str::to_string),
        })
    }
}

fn instant(payload: &Map<String, Value>, claim: &str) -> Option<i64> {
    if !is_present(payload, claim) {
        return None;
    }
    payload.get(claim).and_then(numeric_claim)
}
