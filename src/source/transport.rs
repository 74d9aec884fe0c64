//! HTTP transport used to reach the GitHub APIs

#[cfg(test)]
use mockall::automock;

use serde_json::Value;
use tracing::{debug, warn};

use crate::source::error::TransportError;
use crate::source::query::{Method, Request};

/// Sends a built request and returns the decoded JSON body
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// # Returns
    /// * `Ok(Value)` - Decoded body of a successful response
    /// * `Err(TransportError)` - Network failure, non-success status or undecodable body
    async fn send(&self, request: &Request) -> Result<Value, TransportError>;
}

/// Transport backed by `reqwest`
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("github-source/", env!("CARGO_PKG_VERSION")))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &Request) -> Result<Value, TransportError> {
        debug!("{:?} {}", request.method, request.url);

        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        }
        .headers(request.headers.clone());

        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::no_response(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, request.url);
            return Err(TransportError::from_response(
                status,
                response.headers().clone(),
            ));
        }

        response.json().await.map_err(|e| {
            warn!("Failed to decode GitHub response body: {}", e);
            TransportError::decode(e.to_string())
        })
    }
}
