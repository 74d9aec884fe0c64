//! Interpretation of raw payloads into canonical results

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::config::GITHUB_WEB_URL;
use crate::source::error::GetVersionError;
use crate::source::strategy::Strategy;
use crate::source::types::{CanonicalResult, Resolution};

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryData<T> {
    repository: Option<T>,
}

#[derive(Debug, Deserialize)]
struct RefsRepository {
    refs: Connection<TagNode>,
}

#[derive(Debug, Deserialize)]
struct ReleasesRepository {
    releases: Connection<ReleaseNode>,
}

#[derive(Debug, Deserialize)]
struct Connection<N> {
    edges: Vec<Edge<N>>,
}

#[derive(Debug, Deserialize)]
struct Edge<N> {
    node: N,
}

#[derive(Debug, Deserialize)]
struct TagNode {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ReleaseNode {
    name: String,
    url: String,
}

/// Element of the `git/refs/tags` response
#[derive(Debug, Deserialize)]
struct TagRef {
    #[serde(rename = "ref")]
    reference: String,
}

/// Response from the `releases/latest` endpoint
#[derive(Debug, Deserialize)]
struct LatestRelease {
    tag_name: Option<String>,
    html_url: Option<String>,
}

/// Element of the `commits` response
#[derive(Debug, Deserialize)]
struct CommitEntry {
    html_url: String,
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    committer: Signature,
}

#[derive(Debug, Deserialize)]
struct Signature {
    date: String,
}

/// Turns the payload fetched for `strategy` into a resolution
pub fn parse_payload(strategy: &Strategy, payload: Value) -> Result<Resolution, GetVersionError> {
    match strategy {
        Strategy::LatestTag { repo, .. } => parse_latest_tag(repo, payload).map(Resolution::Single),
        Strategy::LatestReleaseWithPrereleases { .. } => {
            parse_latest_release_with_prereleases(payload).map(Resolution::Single)
        }
        Strategy::LatestRelease { .. } => parse_latest_release(payload).map(Resolution::Single),
        Strategy::MaxTag { repo, .. } => parse_tag_refs(repo, payload).map(Resolution::Multiple),
        Strategy::Commits { .. } => parse_commits(payload).map(Resolution::Single),
    }
}

pub fn parse_latest_tag(repo: &str, payload: Value) -> Result<CanonicalResult, GetVersionError> {
    let repository: RefsRepository = graphql_repository(payload)?;
    let edge = repository
        .refs
        .edges
        .into_iter()
        .next()
        .ok_or(GetVersionError::NoTagFound)?;

    let url = tag_url(repo, &edge.node.name);
    Ok(CanonicalResult::new(edge.node.name, url))
}

pub fn parse_latest_release_with_prereleases(
    payload: Value,
) -> Result<CanonicalResult, GetVersionError> {
    let repository: ReleasesRepository = graphql_repository(payload)?;
    let edge = repository
        .releases
        .edges
        .into_iter()
        .next()
        .ok_or(GetVersionError::NoReleaseFound)?;

    Ok(CanonicalResult::new(edge.node.name, edge.node.url))
}

pub fn parse_tag_refs(repo: &str, payload: Value) -> Result<Vec<CanonicalResult>, GetVersionError> {
    let refs: Vec<TagRef> = decode(payload)?;
    if refs.is_empty() {
        return Err(GetVersionError::NoUpstreamTag);
    }

    Ok(refs
        .into_iter()
        .map(|tag| {
            let version = ref_to_tag(&tag.reference).to_string();
            let url = tag_url(repo, &version);
            CanonicalResult::new(version, url)
        })
        .collect())
}

pub fn parse_latest_release(payload: Value) -> Result<CanonicalResult, GetVersionError> {
    let release: LatestRelease = decode(payload)?;
    let version = release.tag_name.ok_or(GetVersionError::NoUpstreamRelease)?;
    let url = release.html_url.ok_or_else(|| {
        GetVersionError::InvalidResponse("release without html_url".to_string())
    })?;

    Ok(CanonicalResult::new(version, url))
}

pub fn parse_commits(payload: Value) -> Result<CanonicalResult, GetVersionError> {
    let commits: Vec<CommitEntry> = decode(payload)?;
    let latest = commits
        .into_iter()
        .next()
        .ok_or(GetVersionError::NoCommitFound)?;

    Ok(CanonicalResult::new(
        commit_date_to_version(&latest.commit.committer.date),
        latest.html_url,
    ))
}

/// `2023-05-01T12:00:00Z` -> `20230501.120000`
pub fn commit_date_to_version(date: &str) -> String {
    date.trim_end_matches('Z')
        .replace(['-', ':'], "")
        .replace('T', ".")
}

/// `refs/tags/v1.2.3` -> `v1.2.3`; slashes inside the tag name are kept
pub fn ref_to_tag(reference: &str) -> &str {
    reference.splitn(3, '/').last().unwrap_or(reference)
}

fn tag_url(repo: &str, version: &str) -> String {
    format!("{}/{}/releases/tag/{}", GITHUB_WEB_URL, repo, version)
}

fn graphql_repository<T: DeserializeOwned>(payload: Value) -> Result<T, GetVersionError> {
    let response: GraphQlResponse<RepositoryData<T>> = decode(payload)?;

    if !response.errors.is_empty() {
        let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
        warn!("GraphQL query returned errors: {}", messages.join("; "));
        return Err(GetVersionError::InvalidResponse(messages.join("; ")));
    }

    response
        .data
        .and_then(|data| data.repository)
        .ok_or_else(|| GetVersionError::InvalidResponse("missing data.repository".to_string()))
}

fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, GetVersionError> {
    serde_json::from_value(payload).map_err(|e| {
        warn!("Failed to parse GitHub response: {}", e);
        GetVersionError::InvalidResponse(e.to_string())
    })
}
