use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::CommonError;

const USER_AGENT: &str = "Portfolio-Website";
const ACCEPT: &str = "application/vnd.github.v3+json";

#[derive(Clone, Debug)]
pub struct GitHubClientConfig {
    pub base_url: String,
    /// Optional personal access token; raises the anonymous rate limit when set.
    pub token: Option<String>,
    pub timeout: Duration,
    pub max_error_body_bytes: usize,
}

impl Default for GitHubClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com".to_string(),
            token: None,
            timeout: Duration::from_secs(10),
            max_error_body_bytes: 8 * 1024,
        }
    }
}

impl GitHubClientConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = std::env::var("GITHUB_API_BASE_URL").unwrap_or(defaults.base_url);

        let token = std::env::var("GITHUB_TOKEN")
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let timeout = std::env::var("GITHUB_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            timeout,
            max_error_body_bytes: defaults.max_error_body_bytes,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GitHubClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("invalid GitHub base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("GitHub API error: status={status} message={message}")]
    Upstream { status: StatusCode, message: String },

    #[error("GitHub API returned non-JSON error: status={status} body={body}")]
    UpstreamBody { status: StatusCode, body: String },

    #[error("README content could not be decoded: {0}")]
    Decode(String),
}

impl GitHubClientError {
    /// Upstream HTTP status, when the failure was a non-success response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GitHubClientError::Upstream { status, .. }
            | GitHubClientError::UpstreamBody { status, .. } => Some(*status),
            GitHubClientError::Request(e) => e.status(),
            _ => None,
        }
    }
}

/// A repository as returned by `GET /users/{user}/repos`.
///
/// Fields GitHub omits or sends as `null` default to empty values so a single
/// odd record never fails the whole listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topics: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stargazers_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub forks_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fork: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RepositoryRecord {
    /// Provider description with surrounding whitespace removed, `None` when blank.
    pub fn trimmed_description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    /// Declared homepage, `None` when missing or blank.
    pub fn trimmed_homepage(&self) -> Option<&str> {
        self.homepage
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
struct ReadmeEnvelope {
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubErrorEnvelope {
    message: Option<String>,
    #[allow(dead_code)]
    documentation_url: Option<String>,
}

#[derive(Clone)]
pub struct GitHubClient {
    config: GitHubClientConfig,
    http: reqwest::Client,
}

impl GitHubClient {
    pub fn new(config: GitHubClientConfig) -> Result<Self, CommonError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GitHubClientConfig {
        &self.config
    }

    /// Lists the public repositories of `username`, most recently updated first.
    pub async fn list_repositories(
        &self,
        username: &str,
    ) -> Result<Vec<RepositoryRecord>, GitHubClientError> {
        let mut url = self.endpoint(&["users", username, "repos"])?;
        url.query_pairs_mut()
            .append_pair("sort", "updated")
            .append_pair("per_page", "100");

        debug!(%url, "listing GitHub repositories");
        let resp = self.get(url).send().await?;
        self.parse_json_response(resp).await
    }

    /// Fetches and base64-decodes the README of `owner/repo`.
    pub async fn fetch_readme(&self, owner: &str, repo: &str) -> Result<String, GitHubClientError> {
        let url = self.endpoint(&["repos", owner, repo, "readme"])?;
        let resp = self.get(url).send().await?;
        let envelope: ReadmeEnvelope = self.parse_json_response(resp).await?;
        decode_readme(&envelope)
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        let req = self.http.get(url).header(reqwest::header::ACCEPT, ACCEPT);
        match &self.config.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, GitHubClientError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| GitHubClientError::InvalidBaseUrl(format!("{}: {e}", self.config.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| GitHubClientError::InvalidBaseUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn parse_json_response<T: for<'de> Deserialize<'de>>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, GitHubClientError> {
        if resp.status().is_success() {
            let bytes = resp.bytes().await?;
            return Ok(serde_json::from_slice(&bytes)?);
        }
        Err(Self::to_upstream_error(resp, self.config.max_error_body_bytes).await)
    }

    async fn to_upstream_error(resp: reqwest::Response, max_error_body_bytes: usize) -> GitHubClientError {
        let status = resp.status();
        let body = read_limited_text(resp, max_error_body_bytes).await;
        if let Ok(parsed) = serde_json::from_str::<GitHubErrorEnvelope>(&body) {
            let message = parsed
                .message
                .unwrap_or_else(|| "unknown upstream error".to_string());
            return GitHubClientError::Upstream { status, message };
        }
        GitHubClientError::UpstreamBody { status, body }
    }
}

fn decode_readme(envelope: &ReadmeEnvelope) -> Result<String, GitHubClientError> {
    if let Some(encoding) = envelope.encoding.as_deref() {
        if !encoding.eq_ignore_ascii_case("base64") {
            return Err(GitHubClientError::Decode(format!("unsupported encoding {encoding}")));
        }
    }
    // GitHub wraps the payload at 60 columns.
    let compact: String = envelope
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| GitHubClientError::Decode(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

async fn read_limited_text(resp: reqwest::Response, max_bytes: usize) -> String {
    match resp.bytes().await {
        Ok(mut b) => {
            if b.len() > max_bytes {
                b.truncate(max_bytes);
            }
            String::from_utf8_lossy(&b).to_string()
        }
        Err(e) => {
            warn!(error = %e, "failed to read upstream error body");
            "<failed to read error body>".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{extract::Path, http::StatusCode as AxumStatus, routing::get, Json, Router};
    use serde_json::json;

    use super::*;
    use crate::test_support::spawn_stub;

    fn client_for(base_url: String) -> GitHubClient {
        GitHubClient::new(GitHubClientConfig {
            base_url,
            ..GitHubClientConfig::default()
        })
        .expect("client builds")
    }

    fn repo_json(name: &str) -> serde_json::Value {
        json!({
            "id": 1,
            "name": name,
            "full_name": format!("octo/{name}"),
            "description": null,
            "html_url": format!("https://github.com/octo/{name}"),
            "homepage": "",
            "language": "Rust",
            "topics": null,
            "stargazers_count": 3,
            "forks_count": 0,
            "fork": false,
            "archived": false,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-02-01T12:30:00Z",
            "owner": { "login": "octo" }
        })
    }

    #[test]
    fn record_tolerates_nulls_and_extra_fields() {
        let record: RepositoryRecord = serde_json::from_value(repo_json("crate")).unwrap();
        assert!(record.topics.is_empty());
        assert_eq!(record.description, None);
        assert_eq!(record.trimmed_homepage(), None);
        assert_eq!(record.stargazers_count, 3);
        assert_eq!(record.updated_at.to_rfc3339(), "2024-02-01T12:30:00+00:00");
    }

    #[test]
    fn trimmed_description_ignores_whitespace_only() {
        let mut record: RepositoryRecord = serde_json::from_value(repo_json("crate")).unwrap();
        record.description = Some("   ".to_string());
        assert_eq!(record.trimmed_description(), None);
        record.description = Some("  Tool  ".to_string());
        assert_eq!(record.trimmed_description(), Some("Tool"));
    }

    #[test]
    fn decode_readme_handles_wrapped_base64() {
        let envelope = ReadmeEnvelope {
            content: "IyBUaXRs\nZQo=\n".to_string(),
            encoding: Some("base64".to_string()),
        };
        assert_eq!(decode_readme(&envelope).unwrap(), "# Title\n");
    }

    #[test]
    fn decode_readme_rejects_unknown_encoding() {
        let envelope = ReadmeEnvelope {
            content: "abc".to_string(),
            encoding: Some("utf-16".to_string()),
        };
        assert!(matches!(decode_readme(&envelope), Err(GitHubClientError::Decode(_))));
    }

    #[test]
    fn config_from_env_trims_base_url_and_blank_token() {
        temp_env::with_vars(
            [
                ("GITHUB_API_BASE_URL", Some("http://localhost:9999/")),
                ("GITHUB_TOKEN", Some("  ")),
                ("GITHUB_TIMEOUT_SECS", Some("not-a-number")),
            ],
            || {
                let config = GitHubClientConfig::from_env();
                assert_eq!(config.base_url, "http://localhost:9999");
                assert_eq!(config.token, None);
                assert_eq!(config.timeout, Duration::from_secs(10));
            },
        );
    }

    #[tokio::test]
    async fn list_repositories_returns_records() {
        let router = Router::new().route(
            "/users/{user}/repos",
            get(|Path(user): Path<String>| async move {
                assert_eq!(user, "octo");
                Json(json!([repo_json("alpha"), repo_json("beta")]))
            }),
        );
        let client = client_for(spawn_stub(router).await);

        let repos = client.list_repositories("octo").await.unwrap();
        let names: Vec<_> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["alpha", "beta"]);
    }

    #[tokio::test]
    async fn list_repositories_surfaces_upstream_status() {
        let router = Router::new().route(
            "/users/{user}/repos",
            get(|| async { (AxumStatus::NOT_FOUND, Json(json!({ "message": "Not Found" }))) }),
        );
        let client = client_for(spawn_stub(router).await);

        let err = client.list_repositories("ghost").await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(matches!(err, GitHubClientError::Upstream { ref message, .. } if message == "Not Found"));
    }

    #[tokio::test]
    async fn fetch_readme_decodes_content() {
        let router = Router::new().route(
            "/repos/{owner}/{repo}/readme",
            get(|| async { Json(json!({ "content": STANDARD.encode("# Hi\n\nBody"), "encoding": "base64" })) }),
        );
        let client = client_for(spawn_stub(router).await);

        let readme = client.fetch_readme("octo", "alpha").await.unwrap();
        assert_eq!(readme, "# Hi\n\nBody");
    }
}
