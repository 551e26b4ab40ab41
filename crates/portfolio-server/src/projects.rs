use futures::future::join_all;
use portfolio_common::github::{GitHubClient, GitHubClientError, RepositoryRecord};
use tracing::{debug, info, warn};

use crate::assembler::ProjectAssembler;
use crate::model::{fallback_projects, ProjectCard};
use crate::readme::extract_description;

/// Repository listing with optional README-derived descriptions.
#[derive(Clone)]
pub struct RepositoryFetcher {
    github: GitHubClient,
    enrich_readmes: bool,
}

impl RepositoryFetcher {
    pub fn new(github: GitHubClient, enrich_readmes: bool) -> Self {
        Self {
            github,
            enrich_readmes,
        }
    }

    /// Lists and enriches every repository of `username`, surfacing listing failures.
    pub async fn fetch(&self, username: &str) -> Result<Vec<RepositoryRecord>, GitHubClientError> {
        let repos = self.github.list_repositories(username).await?;
        info!(username, count = repos.len(), "fetched GitHub repositories");
        Ok(self.enrich(username, repos).await)
    }

    /// Listing for the display pipeline: any failure degrades to no repositories.
    pub async fn fetch_or_empty(&self, username: &str) -> Vec<RepositoryRecord> {
        match self.github.list_repositories(username).await {
            Ok(repos) => repos,
            Err(e) => {
                warn!(username, error = %e, "failed to list GitHub repositories");
                Vec::new()
            }
        }
    }

    /// Fills blank descriptions from READMEs, concurrently and in input order.
    pub async fn enrich(&self, owner: &str, repos: Vec<RepositoryRecord>) -> Vec<RepositoryRecord> {
        if !self.enrich_readmes {
            return repos;
        }
        join_all(repos.into_iter().map(|repo| self.enrich_one(owner, repo))).await
    }

    async fn enrich_one(&self, owner: &str, mut repo: RepositoryRecord) -> RepositoryRecord {
        if repo.trimmed_description().is_some() {
            return repo;
        }
        match self.github.fetch_readme(owner, &repo.name).await {
            Ok(readme) => {
                repo.description = extract_description(&readme);
                debug!(
                    repo = %repo.name,
                    found = repo.description.is_some(),
                    "README description lookup"
                );
            }
            Err(e) => debug!(repo = %repo.name, error = %e, "README unavailable"),
        }
        repo
    }
}

/// Cards for `username`. README descriptions are filled in before selection
/// so prioritization sees them; excluded repositories are dropped first and
/// cost no README request.
pub async fn load_projects(
    fetcher: &RepositoryFetcher,
    assembler: &ProjectAssembler,
    username: &str,
) -> Vec<ProjectCard> {
    let repos = assembler.displayable(fetcher.fetch_or_empty(username).await);
    let repos = fetcher.enrich(username, repos).await;
    let cards = assembler.assemble(&repos).await;

    if cards.is_empty() {
        info!(username, "no displayable repositories, serving fallback card");
        return fallback_projects();
    }
    cards
}
