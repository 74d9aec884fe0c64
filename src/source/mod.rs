//! Upstream version resolution for GitHub-hosted projects
//!
//! Given a [`ProjectConfig`](crate::config::ProjectConfig), this module picks one
//! resolution strategy, builds the matching REST or GraphQL request, fetches it
//! through a deduplicating cache and turns the payload into a version and URL.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Strategy   │────▶│    Query    │────▶│    Cache    │
//! │  (select)   │     │  (request)  │     │  (dedupe)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!        ┌───────────────────────────────────────┤
//!        ▼                                       ▼
//! ┌─────────────┐                         ┌─────────────┐
//! │  RateLimit  │                         │    Parse    │
//! │ (classify)  │                         │  (result)   │
//! └─────────────┘                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`github`]: Entry point tying the pieces together
//! - [`strategy`]: Strategy precedence and cache keys
//! - [`query`]: GraphQL documents, REST URLs and headers
//! - [`parse`]: Payload interpretation per strategy
//! - [`ratelimit`]: Transport failure classification
//! - [`cache`]: In-flight deduplication and memoization
//! - [`transport`]: HTTP transport trait and reqwest implementation
//! - [`keys`]: Token lookup
//! - [`error`]: Error types
//! - [`types`]: `CanonicalResult` and `Resolution`

pub mod cache;
pub mod error;
pub mod github;
pub mod keys;
pub mod parse;
pub mod query;
pub mod ratelimit;
pub mod strategy;
#[cfg(test)]
pub(crate) mod testing;
pub mod transport;
pub mod types;

pub use cache::AsyncCache;
pub use github::GitHubSource;
pub use keys::{KeyManager, Keyfile};
pub use transport::{HttpTransport, Transport};
pub use types::{CanonicalResult, Resolution};
