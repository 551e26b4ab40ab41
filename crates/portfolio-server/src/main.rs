mod assembler;
mod config;
mod contact;
mod error;
mod model;
mod projects;
mod readme;
mod server;
mod tech_stack;
#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Instant;

use tracing::info;
use tracing_subscriber::EnvFilter;

use portfolio_common::github::{GitHubClient, GitHubClientConfig};
use portfolio_common::liveness::{LivenessChecker, LivenessConfig};

use assembler::ProjectAssembler;
use config::{ProjectsConfig, ServerConfig};
use contact::ContactRelay;
use projects::RepositoryFetcher;
use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting portfolio server");

    let server_config = ServerConfig::from_env()?;
    let projects_config = Arc::new(ProjectsConfig::from_env()?);
    info!(
        username = %projects_config.github_username,
        max_projects = projects_config.max_projects,
        max_prioritized = projects_config.max_prioritized,
        development = server_config.development,
        readme_descriptions = server_config.readme_descriptions,
        "portfolio configured"
    );

    let github_config = GitHubClientConfig::from_env();
    info!(
        base_url = %github_config.base_url,
        authenticated = github_config.token.is_some(),
        timeout_ms = github_config.timeout.as_millis(),
        "github client configured"
    );
    let github = GitHubClient::new(github_config)?;

    let liveness_config = LivenessConfig::from_env();
    info!(
        timeout_ms = liveness_config.timeout.as_millis(),
        "liveness checker configured"
    );
    let checker = LivenessChecker::new(liveness_config)?;

    let relay = ContactRelay::from_env()?;
    match &relay {
        ContactRelay::Resend(_) => info!("contact relay enabled"),
        ContactRelay::Disabled(reason) => {
            info!(reason = %reason, "contact relay disabled, submissions will only be logged")
        }
    }

    let state = AppState {
        fetcher: RepositoryFetcher::new(github, server_config.readme_descriptions),
        assembler: Arc::new(ProjectAssembler::new(projects_config, checker.clone())),
        checker,
        relay,
        development: server_config.development,
        started_at: Instant::now(),
    };

    server::serve(server_config.bind_addr, state).await?;
    info!("portfolio server shut down");
    Ok(())
}
