//! Result types returned by the resolver

use serde::Serialize;

use crate::source::ratelimit::RateLimit;

/// Normalized upstream version with its canonical web URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalResult {
    pub version: String,
    pub url: String,
}

impl CanonicalResult {
    pub fn new(version: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            url: url.into(),
        }
    }
}

/// Outcome of a single resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// One version (every strategy except max-tag)
    Single(CanonicalResult),
    /// Every tag reference, in the order returned upstream
    Multiple(Vec<CanonicalResult>),
    /// Rate limit exhausted; already logged, no result available
    Suppressed(RateLimit),
}

impl Resolution {
    /// Returns the results carried by this resolution, empty when suppressed
    pub fn results(&self) -> &[CanonicalResult] {
        match self {
            Resolution::Single(result) => std::slice::from_ref(result),
            Resolution::Multiple(results) => results,
            Resolution::Suppressed(_) => &[],
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, Resolution::Suppressed(_))
    }
}
