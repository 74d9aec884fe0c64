//! Request construction for each strategy

use reqwest::Url;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};

use crate::config::DEFAULT_API_URL;
use crate::source::error::GetVersionError;
use crate::source::strategy::Strategy;

/// Media type for REST calls
const REST_ACCEPT: &str = "application/vnd.github.quicksilver-preview+json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A fully built request, ready for a transport
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl Request {
    pub fn get(url: &str) -> Self {
        Self {
            method: Method::Get,
            url: url.to_string(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn post(url: &str, body: Value) -> Self {
        Self {
            method: Method::Post,
            url: url.to_string(),
            headers: HeaderMap::new(),
            body: Some(body),
        }
    }

    fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

/// Renders GraphQL documents and REST URLs against one API base
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    api_base: String,
}

impl QueryBuilder {
    pub fn new(api_base: &str) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn graphql_url(&self) -> String {
        format!("{}/graphql", self.api_base)
    }

    pub fn commits_url(
        &self,
        repo: &str,
        branch: Option<&str>,
        path: Option<&str>,
    ) -> Result<String, GetVersionError> {
        let base = format!("{}/repos/{}/commits", self.api_base, repo);
        let mut url = Url::parse(&base).map_err(|e| GetVersionError::InvalidUrl(e.to_string()))?;

        let params: Vec<(&str, &str)> = [("sha", branch), ("path", path)]
            .into_iter()
            .filter_map(|(name, value)| value.filter(|v| !v.is_empty()).map(|v| (name, v)))
            .collect();
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        Ok(url.into())
    }

    pub fn latest_release_url(&self, repo: &str) -> String {
        format!("{}/repos/{}/releases/latest", self.api_base, repo)
    }

    pub fn tags_url(&self, repo: &str) -> String {
        format!("{}/repos/{}/git/refs/tags", self.api_base, repo)
    }

    /// Builds the request a strategy needs
    pub fn build(&self, strategy: &Strategy) -> Result<Request, GetVersionError> {
        let request = match strategy {
            Strategy::LatestTag { repo, query, token } => {
                let (owner, name) = split_repository(repo)?;
                let document = latest_tag_query(owner, name, query);
                Request::post(&self.graphql_url(), json!({ "query": document }))
                    .with_headers(graphql_headers(token)?)
            }
            Strategy::LatestReleaseWithPrereleases { repo, token } => {
                let (owner, name) = split_repository(repo)?;
                let document = latest_release_query(owner, name);
                Request::post(&self.graphql_url(), json!({ "query": document }))
                    .with_headers(graphql_headers(token)?)
            }
            Strategy::LatestRelease { repo, token } => {
                Request::get(&self.latest_release_url(repo))
                    .with_headers(rest_headers(token.as_deref())?)
            }
            Strategy::MaxTag { repo, token } => {
                Request::get(&self.tags_url(repo)).with_headers(rest_headers(token.as_deref())?)
            }
            Strategy::Commits {
                repo,
                branch,
                path,
                token,
            } => {
                let url = self.commits_url(repo, branch.as_deref(), path.as_deref())?;
                Request::get(&url).with_headers(rest_headers(token.as_deref())?)
            }
        };

        Ok(request)
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

/// Splits `owner/name`; anything else is rejected
pub fn split_repository(repo: &str) -> Result<(&str, &str), GetVersionError> {
    match repo.split('/').collect::<Vec<_>>().as_slice() {
        [owner, name] if !owner.is_empty() && !name.is_empty() => Ok((*owner, *name)),
        _ => Err(GetVersionError::InvalidRepository(repo.to_string())),
    }
}

/// Latest tag under `refs/tags/` whose name matches `query`, newest tag commit first
pub fn latest_tag_query(owner: &str, name: &str, query: &str) -> String {
    format!(
        r#"
{{
  repository(name: "{name}", owner: "{owner}") {{
    refs(refPrefix: "refs/tags/", first: 1,
         query: "{query}",
         orderBy: {{field: TAG_COMMIT_DATE, direction: DESC}}) {{
      edges {{
        node {{
          name
        }}
      }}
    }}
  }}
}}
"#,
        name = escape(name),
        owner = escape(owner),
        query = escape(query),
    )
}

/// Most recently created release, prereleases included
pub fn latest_release_query(owner: &str, name: &str) -> String {
    format!(
        r#"
{{
  repository(name: "{name}", owner: "{owner}") {{
    releases(first: 1, orderBy: {{field: CREATED_AT, direction: DESC}}) {{
      edges {{
        node {{
          name
          url
        }}
      }}
    }}
  }}
}}
"#,
        name = escape(name),
        owner = escape(owner),
    )
}

// GraphQL string literals share JSON's escaping for quotes and backslashes
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn header_value(value: &str) -> Result<HeaderValue, GetVersionError> {
    HeaderValue::from_str(value).map_err(|_| GetVersionError::InvalidToken)
}

pub fn rest_headers(token: Option<&str>) -> Result<HeaderMap, GetVersionError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(REST_ACCEPT));
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        headers.insert(AUTHORIZATION, header_value(&format!("token {}", token))?);
    }
    Ok(headers)
}

pub fn graphql_headers(token: &str) -> Result<HeaderMap, GetVersionError> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, header_value(&format!("bearer {}", token))?);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}
