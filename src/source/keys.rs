//! Secret lookup for forge tokens

#[cfg(test)]
use mockall::automock;

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::source::error::KeyfileError;

/// Looks up a secret by name
#[cfg_attr(test, automock)]
pub trait KeyManager: Send + Sync {
    fn get_key(&self, name: &str) -> Option<String>;
}

/// Keys loaded from a JSON file of the form `{"keys": {"github": "..."}}`
///
/// Names missing from the file fall back to the `{NAME}_TOKEN` environment
/// variable, e.g. `GITHUB_TOKEN`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Keyfile {
    #[serde(default)]
    keys: HashMap<String, String>,
}

impl Keyfile {
    pub fn from_keys(keys: HashMap<String, String>) -> Self {
        Self { keys }
    }

    pub fn load(path: &Path) -> Result<Self, KeyfileError> {
        debug!("Loading keyfile from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn get_key_with_env(
        &self,
        name: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        self.keys
            .get(name)
            .cloned()
            .or_else(|| env(&format!("{}_TOKEN", name.to_uppercase())))
    }
}

impl KeyManager for Keyfile {
    fn get_key(&self, name: &str) -> Option<String> {
        self.get_key_with_env(name, |var| std::env::var(var).ok())
    }
}
