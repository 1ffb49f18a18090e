//! Request DTOs for the cache server API
//!
//! Defines the query parameters of incoming HTTP requests and their
//! validation.

use chrono::Duration;
use serde::Deserialize;

use crate::error::{ApiError, Result};

/// Query parameters of the SET operation (POST /set)
///
/// Every field is optional at the extractor level so that a missing
/// parameter is reported with the handler's own message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetParams {
    /// The cache key
    pub key: Option<String>,
    /// The value to store
    pub value: Option<String>,
    /// TTL as a number of seconds
    pub duration: Option<String>,
}

/// A validated SET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCommand {
    pub key: String,
    pub value: String,
    pub ttl: Duration,
}

impl SetParams {
    /// Validates the parameters and parses the duration.
    ///
    /// # Errors
    /// `InvalidRequest` if a parameter is missing or empty, or if the
    /// duration is not a number of seconds.
    pub fn validate(self) -> Result<SetCommand> {
        let (Some(key), Some(value), Some(duration)) = (
            non_empty(self.key),
            non_empty(self.value),
            non_empty(self.duration),
        ) else {
            return Err(ApiError::InvalidRequest(
                "Missing key, value, or duration".to_string(),
            ));
        };

        let ttl = parse_duration_secs(&duration)
            .ok_or_else(|| ApiError::InvalidRequest("Invalid duration".to_string()))?;

        Ok(SetCommand { key, value, ttl })
    }
}

/// Query parameters carrying a single key (GET /get, DELETE /delete)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyParams {
    /// The cache key
    pub key: Option<String>,
}

impl KeyParams {
    /// Returns the key, or `InvalidRequest` if it is missing or empty.
    pub fn require_key(self) -> Result<String> {
        non_empty(self.key)
            .ok_or_else(|| ApiError::InvalidRequest("Missing key parameter".to_string()))
    }
}

fn non_empty(param: Option<String>) -> Option<String> {
    param.filter(|s| !s.is_empty())
}

/// Parses a signed number of seconds, integral or decimal.
///
/// Only an optional `+`/`-` sign followed by digits and at most one decimal
/// point is accepted: no surrounding whitespace, exponents or `inf`/`NaN`.
/// Returns `None` for anything else or for spans outside the representable
/// range.
pub fn parse_duration_secs(input: &str) -> Option<Duration> {
    let digits = input.strip_prefix(['+', '-']).unwrap_or(input);
    let well_formed = digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1;
    if !well_formed {
        return None;
    }

    if let Ok(secs) = input.parse::<i64>() {
        return Duration::try_seconds(secs);
    }

    let secs: f64 = input.parse().ok()?;
    let nanos = secs * 1e9;
    if nanos.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(Duration::nanoseconds(nanos.round() as i64))
}
