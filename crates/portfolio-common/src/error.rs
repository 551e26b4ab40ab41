/// Error types shared across the portfolio crates.
///
/// These cover infrastructure set-up (HTTP client construction, configuration
/// parsing) that every outbound client needs. Request-level failures are typed
/// next to the client that produces them (`GitHubClientError`, `ResendError`).

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("config error: {0}")]
    Config(String),
}
