//! Shared fixtures for integration tests

use std::sync::Arc;

use github_source::config::ProjectConfig;
use github_source::source::{AsyncCache, GitHubSource, HttpTransport, KeyManager};

/// Key manager holding at most a GitHub token, never reading the environment
#[derive(Default)]
pub struct StaticKeys {
    github: Option<String>,
}

impl KeyManager for StaticKeys {
    fn get_key(&self, name: &str) -> Option<String> {
        (name == "github").then(|| self.github.clone()).flatten()
    }
}

/// Source, cache and key manager pointed at a mock server
pub struct TestSource {
    pub source: GitHubSource,
    pub cache: AsyncCache,
    pub keys: StaticKeys,
}

impl TestSource {
    pub fn new(server_url: &str) -> Self {
        Self {
            source: GitHubSource::new(server_url),
            cache: AsyncCache::new(Arc::new(HttpTransport::new())),
            keys: StaticKeys::default(),
        }
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.keys = StaticKeys {
            github: Some(token.to_string()),
        };
        self
    }
}

pub fn project(repository: &str) -> ProjectConfig {
    ProjectConfig::new(repository)
}
