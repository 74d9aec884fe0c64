//! Entry point for resolving a project's upstream version

use tracing::debug;

use crate::config::{DEFAULT_API_URL, FORGE_KEY_NAME, ProjectConfig};
use crate::source::cache::AsyncCache;
use crate::source::error::ResolveError;
use crate::source::keys::KeyManager;
use crate::source::parse::parse_payload;
use crate::source::query::QueryBuilder;
use crate::source::ratelimit::{TransportOutcome, report_rate_limit};
use crate::source::strategy::Strategy;
use crate::source::types::Resolution;

/// Resolves upstream versions for projects hosted on GitHub
#[derive(Debug, Clone)]
pub struct GitHubSource {
    queries: QueryBuilder,
}

impl GitHubSource {
    /// Creates a GitHubSource with a custom API base URL
    pub fn new(api_base: &str) -> Self {
        Self {
            queries: QueryBuilder::new(api_base),
        }
    }

    /// Resolves the current upstream version of `name`
    ///
    /// # Returns
    /// * `Ok(Resolution::Single)` / `Ok(Resolution::Multiple)` - Resolved version(s)
    /// * `Ok(Resolution::Suppressed)` - Rate limit exhausted; already logged
    /// * `Err(ResolveError)` - Configuration, empty-result or transport failure
    pub async fn get_version(
        &self,
        name: &str,
        config: &ProjectConfig,
        cache: &AsyncCache,
        keys: &dyn KeyManager,
    ) -> Result<Resolution, ResolveError> {
        let token = resolve_token(config, keys);
        let strategy = Strategy::select(config, token)?;
        let request = self.queries.build(&strategy)?;
        let key = strategy.cache_key(&request);

        debug!(
            "{}: resolving {} via {}",
            name,
            strategy.repo(),
            strategy.name()
        );

        match TransportOutcome::classify(cache.fetch(key, &request).await) {
            TransportOutcome::Success(payload) => Ok(parse_payload(&strategy, payload)?),
            TransportOutcome::RateLimited(limit) => {
                report_rate_limit(name, &limit);
                Ok(Resolution::Suppressed(limit))
            }
            TransportOutcome::OtherFailure(error) => Err(error.into()),
        }
    }
}

impl Default for GitHubSource {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

/// Config token wins, even when empty; otherwise ask the key manager
pub fn resolve_token(config: &ProjectConfig, keys: &dyn KeyManager) -> Option<String> {
    config
        .token
        .clone()
        .or_else(|| keys.get_key(FORGE_KEY_NAME))
}
