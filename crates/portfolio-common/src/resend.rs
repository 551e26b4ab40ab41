/// Minimal client for the Resend transactional email API (`POST /emails`).
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CommonError;

const DEFAULT_FROM: &str = "Portfolio Contact <onboarding@resend.dev>";

#[derive(Clone)]
pub struct ResendConfig {
    pub api_key: String,
    /// Inbox that receives contact form submissions.
    pub contact_email: String,
    pub from_email: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for ResendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendConfig")
            .field("api_key", &"<redacted>")
            .field("contact_email", &self.contact_email)
            .field("from_email", &self.from_email)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ResendConfig {
    /// Required:
    /// - `RESEND_API_KEY`
    /// - `CONTACT_EMAIL`
    ///
    /// Optional:
    /// - `RESEND_FROM_EMAIL` (default: "Portfolio Contact <onboarding@resend.dev>")
    /// - `RESEND_BASE_URL` (default: "https://api.resend.com")
    ///
    /// The error message names the first missing variable so callers can log
    /// why relaying is disabled.
    pub fn from_env() -> Result<Self, CommonError> {
        let api_key = non_empty_var("RESEND_API_KEY").ok_or_else(|| {
            CommonError::Config("RESEND_API_KEY is not set in environment variables".to_string())
        })?;
        let contact_email = non_empty_var("CONTACT_EMAIL").ok_or_else(|| {
            CommonError::Config("CONTACT_EMAIL is not set in environment variables".to_string())
        })?;
        let from_email = non_empty_var("RESEND_FROM_EMAIL").unwrap_or_else(|| DEFAULT_FROM.to_string());
        let base_url = non_empty_var("RESEND_BASE_URL")
            .unwrap_or_else(|| "https://api.resend.com".to_string());

        Ok(Self {
            api_key,
            contact_email,
            from_email,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(10),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ResendError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Resend API error: status={status} message={message}")]
    Upstream { status: StatusCode, message: String },

    #[error("Resend API returned non-JSON error: status={status} body={body}")]
    UpstreamBody { status: StatusCode, body: String },

    #[error("Resend response did not include an email id")]
    MissingId,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResendErrorEnvelope {
    message: Option<String>,
    #[allow(dead_code)]
    name: Option<String>,
}

#[derive(Clone)]
pub struct ResendClient {
    config: ResendConfig,
    http: reqwest::Client,
}

impl ResendClient {
    pub fn new(config: ResendConfig) -> Result<Self, CommonError> {
        let http = reqwest::Client::builder()
            .user_agent("portfolio-server")
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ResendConfig {
        &self.config
    }

    /// Sends `email` and returns the provider's message id.
    pub async fn send(&self, email: &OutgoingEmail) -> Result<String, ResendError> {
        let url = format!("{}/emails", self.config.base_url);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(email)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            let text = String::from_utf8_lossy(&body).to_string();
            if let Ok(parsed) = serde_json::from_str::<ResendErrorEnvelope>(&text) {
                let message = parsed
                    .message
                    .unwrap_or_else(|| "unknown upstream error".to_string());
                return Err(ResendError::Upstream { status, message });
            }
            warn!(%status, "Resend returned a non-JSON error body");
            return Err(ResendError::UpstreamBody { status, body: text });
        }

        let parsed: SendResponse = serde_json::from_slice(&body)?;
        parsed.id.filter(|id| !id.is_empty()).ok_or(ResendError::MissingId)
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::HeaderMap, http::StatusCode as AxumStatus, routing::post, Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::test_support::spawn_stub;

    fn config_for(base_url: String) -> ResendConfig {
        ResendConfig {
            api_key: "re_test".to_string(),
            contact_email: "me@example.com".to_string(),
            from_email: DEFAULT_FROM.to_string(),
            base_url,
            timeout: Duration::from_secs(2),
        }
    }

    fn sample_email() -> OutgoingEmail {
        OutgoingEmail {
            from: DEFAULT_FROM.to_string(),
            to: "me@example.com".to_string(),
            reply_to: "visitor@example.org".to_string(),
            subject: "New Contact Form Message from Ada".to_string(),
            text: "hello".to_string(),
            html: "<p>hello</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn send_returns_provider_id() {
        let router = Router::new().route(
            "/emails",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(
                    headers.get("authorization").and_then(|v| v.to_str().ok()),
                    Some("Bearer re_test")
                );
                assert_eq!(body["reply_to"], "visitor@example.org");
                Json(json!({ "id": "email_123" }))
            }),
        );
        let client = ResendClient::new(config_for(spawn_stub(router).await)).unwrap();

        let id = client.send(&sample_email()).await.unwrap();
        assert_eq!(id, "email_123");
    }

    #[tokio::test]
    async fn send_maps_error_envelope() {
        let router = Router::new().route(
            "/emails",
            post(|| async {
                (
                    AxumStatus::FORBIDDEN,
                    Json(json!({ "statusCode": 403, "name": "validation_error", "message": "domain not verified" })),
                )
            }),
        );
        let client = ResendClient::new(config_for(spawn_stub(router).await)).unwrap();

        let err = client.send(&sample_email()).await.unwrap_err();
        assert!(
            matches!(err, ResendError::Upstream { status, ref message } if status == StatusCode::FORBIDDEN && message == "domain not verified")
        );
    }

    #[tokio::test]
    async fn send_without_id_is_an_error() {
        let router = Router::new().route("/emails", post(|| async { Json(json!({})) }));
        let client = ResendClient::new(config_for(spawn_stub(router).await)).unwrap();

        assert!(matches!(client.send(&sample_email()).await, Err(ResendError::MissingId)));
    }

    #[test]
    fn from_env_reports_first_missing_variable() {
        temp_env::with_vars(
            [
                ("RESEND_API_KEY", None::<&str>),
                ("CONTACT_EMAIL", Some("me@example.com")),
            ],
            || {
                let err = ResendConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("RESEND_API_KEY"));
            },
        );
        temp_env::with_vars(
            [
                ("RESEND_API_KEY", Some("re_live")),
                ("CONTACT_EMAIL", Some(" ")),
            ],
            || {
                let err = ResendConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("CONTACT_EMAIL"));
            },
        );
    }

    #[test]
    fn from_env_applies_defaults() {
        temp_env::with_vars(
            [
                ("RESEND_API_KEY", Some("re_live")),
                ("CONTACT_EMAIL", Some("me@example.com")),
                ("RESEND_FROM_EMAIL", None),
                ("RESEND_BASE_URL", Some("http://localhost:4000/")),
            ],
            || {
                let config = ResendConfig::from_env().unwrap();
                assert_eq!(config.from_email, DEFAULT_FROM);
                assert_eq!(config.base_url, "http://localhost:4000");
                assert!(!format!("{config:?}").contains("re_live"));
            },
        );
    }
}
