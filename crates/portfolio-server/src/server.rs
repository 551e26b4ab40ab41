use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use portfolio_common::github::RepositoryRecord;
use portfolio_common::liveness::{LivenessChecker, LivenessReport};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::assembler::ProjectAssembler;
use crate::contact::{ContactRelay, ContactSubmission, SUCCESS_MESSAGE};
use crate::error::{ApiError, AppError, ErrorBody};
use crate::model::{ContactResponse, HealthResponse, ProjectCard};
use crate::projects::{load_projects, RepositoryFetcher};

const CONTACT_FAILURE: &str = "Failed to send message. Please try again later.";

#[derive(Clone)]
pub struct AppState {
    pub fetcher: RepositoryFetcher,
    pub assembler: Arc<ProjectAssembler>,
    pub checker: LivenessChecker,
    pub relay: ContactRelay,
    pub development: bool,
    pub started_at: Instant,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/validate-url", get(validate_url))
        .route("/api/github-repos", get(github_repos))
        .route("/api/projects", get(projects))
        .route("/api/contact", post(contact))
        .fallback(not_found)
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("shutdown requested");
        })
        .await?;
    info!("HTTP server exited");
    Ok(())
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

#[derive(Debug, Deserialize)]
struct UrlQuery {
    url: Option<String>,
}

async fn validate_url(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> (StatusCode, Json<LivenessReport>) {
    let Some(url) = query.url.filter(|u| !u.trim().is_empty()) else {
        let report = LivenessReport {
            valid: false,
            status: None,
            error: Some("URL parameter is required".to_string()),
        };
        return (StatusCode::BAD_REQUEST, Json(report));
    };

    let report = state.checker.check(url.trim()).await;
    debug!(url = %url, valid = report.valid, status = ?report.status, "validated URL");
    (StatusCode::OK, Json(report))
}

#[derive(Debug, Deserialize)]
struct UsernameQuery {
    username: Option<String>,
}

async fn github_repos(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> Result<Json<Vec<RepositoryRecord>>, ApiError> {
    let username = query
        .username
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Username is required".to_string()))?;

    match state.fetcher.fetch(&username).await {
        Ok(repos) => Ok(Json(repos)),
        Err(e) => {
            warn!(username = %username, error = %e, "GitHub repository listing failed");
            match e.status() {
                Some(status) => Err(ApiError::Upstream {
                    status: StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
                    message: format!("GitHub API error: {}", status.as_u16()),
                }),
                None => Err(ApiError::Internal {
                    message: "Failed to fetch GitHub repositories".to_string(),
                    details: Some(e.to_string()),
                }),
            }
        }
    }
}

async fn projects(State(state): State<AppState>) -> Json<Vec<ProjectCard>> {
    let username = state.assembler.config().github_username.clone();
    Json(load_projects(&state.fetcher, &state.assembler, &username).await)
}

async fn contact(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ContactResponse>, ApiError> {
    let submission: ContactSubmission = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "unreadable contact form body");
        ApiError::Internal {
            message: CONTACT_FAILURE.to_string(),
            details: state.development.then(|| e.to_string()),
        }
    })?;
    let contact = submission
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let outcome = state.relay.relay(&contact).await;
    debug!(?outcome, "contact submission handled");

    Ok(Json(ContactResponse {
        success: true,
        message: SUCCESS_MESSAGE.to_string(),
    }))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Not found".to_string(),
            details: None,
        }),
    )
}
