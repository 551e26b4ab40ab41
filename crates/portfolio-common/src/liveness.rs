/// Reachability checks for project homepages.
///
/// A URL is live when it answers 2xx within the configured timeout. Hosts that
/// serve "deployment not found" pages with a 200 status (Vercel) are sniffed for
/// known marker strings. Every failure path resolves to a negative
/// `LivenessReport`; nothing here returns an error.
use std::time::Duration;

use reqwest::{redirect, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::CommonError;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; PortfolioBot/1.0)";

#[derive(Clone, Debug)]
pub struct LivenessConfig {
    pub timeout: Duration,
    /// Hosts (and their subdomains) whose 2xx bodies are checked for soft-404 markers.
    pub soft_404_hosts: Vec<String>,
    pub soft_404_markers: Vec<String>,
    /// Only this many leading body bytes are searched for markers.
    pub max_body_bytes: usize,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            soft_404_hosts: vec!["vercel.app".to_string(), "vercel.com".to_string()],
            soft_404_markers: vec![
                "DEPLOYMENT_NOT_FOUND".to_string(),
                "NOT_FOUND".to_string(),
                "This deployment cannot be found".to_string(),
            ],
            max_body_bytes: 64 * 1024,
        }
    }
}

impl LivenessConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let timeout = std::env::var("LIVENESS_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.timeout);
        Self { timeout, ..defaults }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivenessReport {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LivenessReport {
    fn live(status: StatusCode) -> Self {
        Self {
            valid: true,
            status: Some(status.as_u16()),
            error: None,
        }
    }

    fn rejected(status: StatusCode, error: Option<&str>) -> Self {
        Self {
            valid: false,
            status: Some(status.as_u16()),
            error: error.map(str::to_string),
        }
    }

    fn unreachable(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            status: None,
            error: Some(error.into()),
        }
    }

    fn unsupported() -> Self {
        Self {
            valid: false,
            status: None,
            error: None,
        }
    }
}

#[derive(Clone)]
pub struct LivenessChecker {
    config: LivenessConfig,
    http: reqwest::Client,
}

impl LivenessChecker {
    pub fn new(config: LivenessConfig) -> Result<Self, CommonError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(redirect::Policy::limited(10))
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &LivenessConfig {
        &self.config
    }

    /// Probes `raw_url` once; the whole probe, fallbacks included, shares one timeout.
    pub async fn check(&self, raw_url: &str) -> LivenessReport {
        let url = match Url::parse(raw_url.trim()) {
            Ok(url) => url,
            Err(e) => {
                debug!(url = raw_url, error = %e, "rejecting malformed url");
                return LivenessReport::unreachable("Invalid URL format");
            }
        };
        if !matches!(url.scheme(), "http" | "https") {
            return LivenessReport::unsupported();
        }

        match tokio::time::timeout(self.config.timeout, self.probe(&url)).await {
            Ok(report) => {
                debug!(%url, valid = report.valid, status = ?report.status, "liveness probe finished");
                report
            }
            Err(_) => {
                debug!(%url, timeout_ms = self.config.timeout.as_millis(), "liveness probe timed out");
                LivenessReport::unreachable("Timeout")
            }
        }
    }

    async fn probe(&self, url: &Url) -> LivenessReport {
        let (resp, via_head) = match self.http.head(url.clone()).send().await {
            Ok(resp)
                if resp.status() != StatusCode::METHOD_NOT_ALLOWED
                    && resp.status() != StatusCode::NOT_IMPLEMENTED =>
            {
                (resp, true)
            }
            head => {
                if let Err(e) = &head {
                    debug!(%url, error = %e, "HEAD failed, retrying with GET");
                }
                match self.http.get(url.clone()).send().await {
                    Ok(resp) => (resp, false),
                    Err(e) => return LivenessReport::unreachable(transport_error_message(&e)),
                }
            }
        };

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return LivenessReport::rejected(status, Some("Not Found"));
        }
        if !status.is_success() {
            return LivenessReport::rejected(status, None);
        }

        if self.is_soft_404_host(url) {
            let limit = self.config.max_body_bytes;
            let body = if via_head {
                match self.http.get(url.clone()).send().await {
                    Ok(resp) => read_body_prefix(resp, limit).await,
                    Err(_) => None,
                }
            } else {
                read_body_prefix(resp, limit).await
            };
            if body.is_some_and(|b| self.has_soft_404_marker(&b)) {
                return LivenessReport::rejected(status, Some("Vercel deployment not found"));
            }
        }

        LivenessReport::live(status)
    }

    fn is_soft_404_host(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        self.config
            .soft_404_hosts
            .iter()
            .any(|h| host == *h || host.ends_with(&format!(".{h}")))
    }

    fn has_soft_404_marker(&self, body: &str) -> bool {
        self.config
            .soft_404_markers
            .iter()
            .any(|marker| body.contains(marker.as_str()))
    }
}

/// Reads at most `max_bytes` of the body. `None` when nothing could be read.
async fn read_body_prefix(mut resp: reqwest::Response, max_bytes: usize) -> Option<String> {
    let mut buf: Vec<u8> = Vec::new();
    while buf.len() < max_bytes {
        match resp.chunk().await {
            Ok(Some(chunk)) => buf.extend_from_slice(&chunk),
            Ok(None) => break,
            Err(e) => {
                debug!(error = %e, "failed to read response body");
                if buf.is_empty() {
                    return None;
                }
                break;
            }
        }
    }
    buf.truncate(max_bytes);
    Some(String::from_utf8_lossy(&buf).into_owned())
}

fn transport_error_message(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "Timeout".to_string()
    } else {
        err.to_string()
    }
}
