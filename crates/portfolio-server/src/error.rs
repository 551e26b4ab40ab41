use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use portfolio_common::error::CommonError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handler failures rendered as `{ "error": ..., "details"?: ... }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    /// `details` is only populated in development mode.
    #[error("{message}")]
    Internal {
        message: String,
        details: Option<String>,
    },
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream { status, .. } => *status,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match self {
            ApiError::Internal { message, details } => {
                (status, Json(ErrorBody { error: message, details })).into_response()
            }
            other => {
                let body = ErrorBody {
                    error: other.to_string(),
                    details: None,
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use serde_json::{json, Value};

    use super::*;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn upstream_keeps_provider_status() {
        let (status, body) = render(ApiError::Upstream {
            status: StatusCode::FORBIDDEN,
            message: "GitHub API error: 403".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "error": "GitHub API error: 403" }));
    }

    #[tokio::test]
    async fn internal_omits_missing_details() {
        let (status, body) = render(ApiError::Internal {
            message: "Failed".to_string(),
            details: None,
        })
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed" }));
    }

    #[tokio::test]
    async fn bad_request_uses_message_as_error() {
        let (status, body) = render(ApiError::BadRequest("Username is required".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Username is required" }));
    }
}
