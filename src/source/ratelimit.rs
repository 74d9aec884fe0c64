//! Classification of transport failures into rate-limit exhaustion and the rest

use chrono::{DateTime, Local, TimeZone};
use tracing::error;

use crate::source::error::TransportError;

const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RESET_HEADER: &str = "x-ratelimit-reset";

/// Used when `X-RateLimit-Remaining` is absent; never equals zero
const REMAINING_SENTINEL: i64 = -1;

/// Exhausted rate limit reported by the forge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Unix timestamp from `X-RateLimit-Reset`, if the header was readable
    pub reset: Option<i64>,
}

impl RateLimit {
    pub fn reset_at(&self) -> Option<DateTime<Local>> {
        self.reset
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|utc| utc.with_timezone(&Local))
    }
}

/// Result of a transport call after classification
#[derive(Debug, Clone, PartialEq)]
pub enum TransportOutcome<T> {
    Success(T),
    RateLimited(RateLimit),
    OtherFailure(TransportError),
}

impl<T> TransportOutcome<T> {
    /// Classifies a transport result
    ///
    /// Only a transient failure with an attached response whose
    /// `X-RateLimit-Remaining` is exactly `0` counts as rate limited.
    /// Everything else is passed through unchanged.
    pub fn classify(result: Result<T, TransportError>) -> Self {
        let error = match result {
            Ok(value) => return TransportOutcome::Success(value),
            Err(error) => error,
        };

        if !error.transient {
            return TransportOutcome::OtherFailure(error);
        }

        let headers = error.response.as_ref().map(|response| {
            (
                header_i64(&response.headers, REMAINING_HEADER).unwrap_or(REMAINING_SENTINEL),
                header_i64(&response.headers, RESET_HEADER),
            )
        });
        let Some((remaining, reset)) = headers else {
            return TransportOutcome::OtherFailure(error);
        };

        if remaining != 0 {
            return TransportOutcome::OtherFailure(error);
        }

        TransportOutcome::RateLimited(RateLimit { reset })
    }
}

/// Logs an exhausted rate limit for `project`
pub fn report_rate_limit(project: &str, limit: &RateLimit) {
    let reset_time = limit
        .reset_at()
        .map(|at| ctime(&at))
        .unwrap_or_else(|| "an unknown time".to_string());

    error!(
        project = %project,
        reset = limit.reset,
        "rate limited, resetting at {}. Or get an API token to increase the allowance if not yet",
        reset_time
    );
}

/// Formats like C's `ctime`, e.g. `Mon May  1 12:00:00 2023`
fn ctime<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%a %b %e %H:%M:%S %Y").to_string()
}

fn header_i64(headers: &reqwest::header::HeaderMap, name: &str) -> Option<i64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
