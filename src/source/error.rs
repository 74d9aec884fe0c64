use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use thiserror::Error;

/// Terminal failure for one resolution attempt
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GetVersionError {
    #[error("token not given but it is required")]
    TokenRequired,

    #[error("no tag found")]
    NoTagFound,

    #[error("no release found")]
    NoReleaseFound,

    #[error("No tag found in upstream repository.")]
    NoUpstreamTag,

    #[error("No release found in upstream repository.")]
    NoUpstreamRelease,

    #[error("No commit found in upstream repository.")]
    NoCommitFound,

    #[error("Invalid repository (expected owner/name): {0}")]
    InvalidRepository(String),

    #[error("Invalid token: not a valid header value")]
    InvalidToken,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Response attached to a failed transport call
#[derive(Debug, Clone, PartialEq)]
pub struct FailedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

/// Failure raised by a [`Transport`](crate::source::transport::Transport)
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub response: Option<FailedResponse>,
    pub transient: bool,
}

impl TransportError {
    /// Network-level failure before any response was received
    pub fn no_response(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: None,
            transient: true,
        }
    }

    /// Non-success HTTP status; throttling and server errors are transient
    pub fn from_response(status: StatusCode, headers: HeaderMap) -> Self {
        let transient = status == StatusCode::FORBIDDEN
            || status == StatusCode::TOO_MANY_REQUESTS
            || status.is_server_error();
        Self {
            message: format!("Unexpected status: {}", status),
            response: Some(FailedResponse { status, headers }),
            transient,
        }
    }

    /// Body could not be decoded; retrying will not help
    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: None,
            transient: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    GetVersion(#[from] GetVersionError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Error)]
pub enum KeyfileError {
    #[error("Failed to read keyfile: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse keyfile: {0}")]
    Parse(#[from] serde_json::Error),
}
