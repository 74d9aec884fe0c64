use serde::Deserialize;
use std::path::PathBuf;

/// Default base URL for the GitHub REST and GraphQL APIs
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Base URL for canonical web links returned to the caller
pub const GITHUB_WEB_URL: &str = "https://github.com";

/// Name under which the forge token is stored in the key manager
pub const FORGE_KEY_NAME: &str = "github";

const APP_NAME: &str = "github-source";

/// Per-project configuration describing which upstream signal to trust
///
/// Exactly one strategy is active per resolution; see
/// [`Strategy::select`](crate::source::strategy::Strategy::select) for precedence.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct ProjectConfig {
    /// Repository coordinate in `owner/name` form
    #[serde(rename = "github", alias = "repository")]
    pub repository: String,
    /// Token override; takes priority over the key manager even when empty
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub use_latest_tag: bool,
    /// Tag-name filter, only used with `use_latest_tag`
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub use_latest_release: bool,
    #[serde(default)]
    pub include_prereleases: bool,
    /// Commit ref filter for the commits strategy
    #[serde(default)]
    pub branch: Option<String>,
    /// Path filter for the commits strategy
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub use_max_tag: bool,
}

impl ProjectConfig {
    pub fn new(repository: &str) -> Self {
        Self {
            repository: repository.to_string(),
            ..Self::default()
        }
    }
}

/// Returns the path to the default keyfile.
/// Uses $XDG_CONFIG_HOME/github-source if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/github-source,
/// or ./github-source if neither is available.
pub fn keyfile_path() -> PathBuf {
    config_dir_with_env(std::env::var("XDG_CONFIG_HOME").ok(), dirs::home_dir())
        .join("keyfile.json")
}

/// Returns the path to the log file.
/// Uses $XDG_DATA_HOME/github-source, falling back to ~/.local/share/github-source.
pub fn log_path() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
        .join("github-source.log")
}

fn config_dir_with_env(xdg_config_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    app_dir(xdg_config_home, home_dir, ".config")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    app_dir(xdg_data_home, home_dir, ".local/share")
}

fn app_dir(xdg_dir: Option<String>, home_dir: Option<PathBuf>, home_fallback: &str) -> PathBuf {
    let base = xdg_dir
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(home_fallback)))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join(APP_NAME)
}
