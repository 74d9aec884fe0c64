//! Strategy selection from project configuration

use tracing::warn;

use crate::config::ProjectConfig;
use crate::source::error::GetVersionError;
use crate::source::query::Request;

/// One of the mutually exclusive ways to resolve an upstream version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Most recently tag-committed ref matching `query` (GraphQL)
    LatestTag {
        repo: String,
        query: String,
        token: String,
    },
    /// Most recently created release, prereleases included (GraphQL)
    LatestReleaseWithPrereleases { repo: String, token: String },
    /// `releases/latest` REST endpoint
    LatestRelease { repo: String, token: Option<String> },
    /// Every tag ref via the `git/refs/tags` REST endpoint
    MaxTag { repo: String, token: Option<String> },
    /// Newest commit, optionally filtered by branch and path
    Commits {
        repo: String,
        branch: Option<String>,
        path: Option<String>,
        token: Option<String>,
    },
}

/// Identifies a memoizable request; equal keys always describe equal requests
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    LatestTag {
        repo: String,
        query: String,
        token: String,
    },
    LatestReleaseWithPrereleases {
        repo: String,
        token: String,
    },
    /// REST headers are derived from the token alone
    Rest { url: String, token: Option<String> },
}

impl Strategy {
    /// Picks the strategy for `config`, first match wins:
    ///
    /// 1. `use_latest_tag`
    /// 2. `use_latest_release` together with `include_prereleases`
    /// 3. `use_latest_release`, then `use_max_tag`, else commits
    ///
    /// Both GraphQL strategies require a non-empty token and fail before any
    /// request is built.
    pub fn select(config: &ProjectConfig, token: Option<String>) -> Result<Self, GetVersionError> {
        let token = token.filter(|t| !t.is_empty());
        let repo = config.repository.clone();

        if config.use_latest_tag {
            if config.use_latest_release || config.use_max_tag {
                warn!(
                    "{}: use_latest_tag overrides use_latest_release and use_max_tag",
                    repo
                );
            }
            let token = token.ok_or(GetVersionError::TokenRequired)?;
            return Ok(Strategy::LatestTag {
                repo,
                query: config.query.clone().unwrap_or_default(),
                token,
            });
        }

        if config.use_latest_release && config.include_prereleases {
            let token = token.ok_or(GetVersionError::TokenRequired)?;
            return Ok(Strategy::LatestReleaseWithPrereleases { repo, token });
        }

        let strategy = if config.use_latest_release {
            Strategy::LatestRelease { repo, token }
        } else if config.use_max_tag {
            Strategy::MaxTag { repo, token }
        } else {
            Strategy::Commits {
                repo,
                branch: config.branch.clone(),
                path: config.path.clone(),
                token,
            }
        };

        Ok(strategy)
    }

    pub fn repo(&self) -> &str {
        match self {
            Strategy::LatestTag { repo, .. }
            | Strategy::LatestReleaseWithPrereleases { repo, .. }
            | Strategy::LatestRelease { repo, .. }
            | Strategy::MaxTag { repo, .. }
            | Strategy::Commits { repo, .. } => repo,
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::LatestTag { .. } => "latest-tag",
            Strategy::LatestReleaseWithPrereleases { .. } => "latest-release-with-prereleases",
            Strategy::LatestRelease { .. } => "latest-release",
            Strategy::MaxTag { .. } => "max-tag",
            Strategy::Commits { .. } => "commits",
        }
    }

    /// Builds the cache key for the request this strategy produced
    pub fn cache_key(&self, request: &Request) -> CacheKey {
        match self {
            Strategy::LatestTag { repo, query, token } => CacheKey::LatestTag {
                repo: repo.clone(),
                query: query.clone(),
                token: token.clone(),
            },
            Strategy::LatestReleaseWithPrereleases { repo, token } => {
                CacheKey::LatestReleaseWithPrereleases {
                    repo: repo.clone(),
                    token: token.clone(),
                }
            }
            Strategy::LatestRelease { token, .. }
            | Strategy::MaxTag { token, .. }
            | Strategy::Commits { token, .. } => CacheKey::Rest {
                url: request.url.clone(),
                token: token.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn config() -> ProjectConfig {
        ProjectConfig::new("owner/repo")
    }

    #[test]
    fn select_latest_tag_requires_token() {
        let config = ProjectConfig {
            use_latest_tag: true,
            ..config()
        };

        assert_eq!(
            Strategy::select(&config, None),
            Err(GetVersionError::TokenRequired)
        );
    }

    #[test]
    fn select_treats_empty_token_as_missing() {
        let config = ProjectConfig {
            use_latest_tag: true,
            ..config()
        };

        assert_eq!(
            Strategy::select(&config, Some(String::new())),
            Err(GetVersionError::TokenRequired)
        );
    }

    #[test]
    fn select_latest_tag_defaults_query_to_empty() {
        let config = ProjectConfig {
            use_latest_tag: true,
            ..config()
        };

        assert_eq!(
            Strategy::select(&config, Some("t".to_string())),
            Ok(Strategy::LatestTag {
                repo: "owner/repo".to_string(),
                query: String::new(),
                token: "t".to_string(),
            })
        );
    }

    #[rstest]
    #[case(true, false, true, "latest-tag")]
    #[case(true, true, true, "latest-tag")]
    #[case(false, true, true, "latest-release")]
    #[case(false, false, true, "max-tag")]
    #[case(false, false, false, "commits")]
    fn select_follows_precedence(
        #[case] use_latest_tag: bool,
        #[case] use_latest_release: bool,
        #[case] use_max_tag: bool,
        #[case] expected: &str,
    ) {
        let config = ProjectConfig {
            use_latest_tag,
            use_latest_release,
            use_max_tag,
            ..config()
        };

        let strategy = Strategy::select(&config, Some("t".to_string())).unwrap();

        assert_eq!(strategy.name(), expected);
    }

    #[test]
    fn select_latest_release_with_prereleases_requires_token() {
        let config = ProjectConfig {
            use_latest_release: true,
            include_prereleases: true,
            ..config()
        };

        assert_eq!(
            Strategy::select(&config, None),
            Err(GetVersionError::TokenRequired)
        );
        assert_eq!(
            Strategy::select(&config, Some("t".to_string())),
            Ok(Strategy::LatestReleaseWithPrereleases {
                repo: "owner/repo".to_string(),
                token: "t".to_string(),
            })
        );
    }

    #[test]
    fn select_include_prereleases_alone_falls_back_to_commits() {
        let config = ProjectConfig {
            include_prereleases: true,
            branch: Some("main".to_string()),
            ..config()
        };

        assert_eq!(
            Strategy::select(&config, None),
            Ok(Strategy::Commits {
                repo: "owner/repo".to_string(),
                branch: Some("main".to_string()),
                path: None,
                token: None,
            })
        );
    }

    #[test]
    fn select_rest_strategies_do_not_require_token() {
        let config = ProjectConfig {
            use_max_tag: true,
            ..config()
        };

        assert_eq!(
            Strategy::select(&config, None),
            Ok(Strategy::MaxTag {
                repo: "owner/repo".to_string(),
                token: None,
            })
        );
    }

    #[test]
    fn cache_key_for_rest_strategy_uses_request_url() {
        let strategy = Strategy::MaxTag {
            repo: "owner/repo".to_string(),
            token: Some("t".to_string()),
        };
        let request = Request::get("https://api.github.com/repos/owner/repo/git/refs/tags");

        assert_eq!(
            strategy.cache_key(&request),
            CacheKey::Rest {
                url: "https://api.github.com/repos/owner/repo/git/refs/tags".to_string(),
                token: Some("t".to_string()),
            }
        );
    }
}
