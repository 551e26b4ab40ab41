/// Turns a GitHub repository listing into the ordered project cards shown on the site.
///
/// Selection (filter, partition, order, cap) is synchronous and deterministic.
/// Card construction runs concurrently per repository because each card may
/// probe its homepage; `join_all` keeps the selection order.
use std::cmp::Reverse;
use std::sync::Arc;

use futures::future::join_all;
use portfolio_common::github::RepositoryRecord;
use portfolio_common::liveness::LivenessChecker;
use tracing::{debug, info};

use crate::config::ProjectsConfig;
use crate::model::ProjectCard;
use crate::tech_stack::infer_tech_stack;

/// Name fragments that are never shown, regardless of configuration.
const ALWAYS_EXCLUDED: [&str; 2] = ["portfolio", "test"];

const AGENT_TOPICS: &[&str] = &[
    "ai-agent",
    "ai-agents",
    "llm-agent",
    "llm-agents",
    "agentic-ai",
    "autonomous-agents",
    "multi-agent",
];
const AGENT_WORDS: &[&str] = &["agent", "agents", "agentic"];
const AI_WORDS: &[&str] = &[
    "ai", "llm", "llms", "gpt", "openai", "genai", "langchain", "langgraph", "autogen", "crewai",
    "rag", "gemini", "claude", "chatbot",
];

pub struct ProjectAssembler {
    config: Arc<ProjectsConfig>,
    checker: LivenessChecker,
}

impl ProjectAssembler {
    pub fn new(config: Arc<ProjectsConfig>, checker: LivenessChecker) -> Self {
        Self { config, checker }
    }

    pub fn config(&self) -> &ProjectsConfig {
        &self.config
    }

    /// Drops repositories that can never be shown.
    pub fn displayable(&self, repos: Vec<RepositoryRecord>) -> Vec<RepositoryRecord> {
        repos.into_iter().filter(|repo| !self.is_excluded(repo)).collect()
    }

    pub async fn assemble(&self, repos: &[RepositoryRecord]) -> Vec<ProjectCard> {
        let selected = self.select(repos);
        self.build_cards(&selected).await
    }

    /// Filters and orders `repos`: prioritized repositories first, at most
    /// `max_projects` in total.
    pub fn select(&self, repos: &[RepositoryRecord]) -> Vec<RepositoryRecord> {
        let (mut prioritized, mut ordinary): (Vec<&RepositoryRecord>, Vec<&RepositoryRecord>) =
            repos
                .iter()
                .filter(|repo| !self.is_excluded(repo))
                .partition(|repo| self.is_prioritized(repo));

        prioritized.sort_by_key(|repo| (self.featured_rank(&repo.name), Reverse(repo.updated_at)));
        ordinary.sort_by_key(|repo| (Reverse(repo.stargazers_count), Reverse(repo.updated_at)));

        let cap = self.config.max_projects;
        let mut selected: Vec<RepositoryRecord> = prioritized
            .into_iter()
            .take(self.config.max_prioritized.min(cap))
            .cloned()
            .collect();
        let remaining = cap.saturating_sub(selected.len());
        selected.extend(ordinary.into_iter().take(remaining).cloned());

        debug!(
            input = repos.len(),
            selected = selected.len(),
            "selected repositories for display"
        );
        selected
    }

    /// Builds one card per repository, in order. The index drives positional images.
    pub async fn build_cards(&self, selected: &[RepositoryRecord]) -> Vec<ProjectCard> {
        let cards = join_all(
            selected
                .iter()
                .enumerate()
                .map(|(index, repo)| self.build_card(index, repo)),
        )
        .await;

        info!(
            count = cards.len(),
            live = cards.iter().filter(|c| c.live_url.is_some()).count(),
            "assembled project cards"
        );
        cards
    }

    async fn build_card(&self, index: usize, repo: &RepositoryRecord) -> ProjectCard {
        let derived = derive_title(&repo.name);
        let title = keyword_lookup(&self.config.display_names, &repo.name)
            .map(str::to_string)
            .unwrap_or_else(|| derived.clone());
        let description = repo
            .trimmed_description()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{derived} project"));

        let mut tech = infer_tech_stack(&repo.topics, repo.language.as_deref());
        if tech.is_empty() {
            tech = self.config.default_tech.clone();
        }

        ProjectCard {
            title,
            description,
            tech,
            image: self.image_for(index, &repo.name),
            live_url: self.live_url_for(repo).await,
            github_url: repo.html_url.clone(),
        }
    }

    fn is_excluded(&self, repo: &RepositoryRecord) -> bool {
        if repo.fork || repo.archived {
            return true;
        }
        let name = repo.name.to_lowercase();
        ALWAYS_EXCLUDED.iter().any(|k| name.contains(k))
            || self.config.excluded.iter().any(|k| name.contains(k.as_str()))
    }

    fn is_prioritized(&self, repo: &RepositoryRecord) -> bool {
        let name = repo.name.to_lowercase();
        self.config
            .prioritized
            .iter()
            .any(|k| name.contains(k.as_str()))
            || looks_like_ai_agent(repo)
    }

    /// Position in the featured order; unlisted repositories sort after every listed one.
    fn featured_rank(&self, name: &str) -> usize {
        let name = name.to_lowercase();
        self.config
            .featured_order
            .iter()
            .position(|k| name.contains(k.as_str()))
            .unwrap_or(usize::MAX)
    }

    fn image_for(&self, index: usize, name: &str) -> String {
        keyword_lookup(&self.config.image_overrides, name)
            .map(str::to_string)
            .or_else(|| self.config.fallback_images.get(index).cloned())
            .unwrap_or_else(|| format!("/project{}.jpg", index + 1))
    }

    async fn live_url_for(&self, repo: &RepositoryRecord) -> Option<String> {
        let homepage = repo.trimmed_homepage()?;
        if self.is_known_broken(&repo.name, homepage) {
            debug!(repo = %repo.name, homepage, "homepage is on the broken list");
            return None;
        }

        let report = self.checker.check(homepage).await;
        if report.valid {
            Some(homepage.to_string())
        } else {
            debug!(
                repo = %repo.name,
                homepage,
                status = ?report.status,
                error = ?report.error,
                "homepage failed liveness check"
            );
            None
        }
    }

    fn is_known_broken(&self, name: &str, homepage: &str) -> bool {
        let name = name.to_lowercase();
        let homepage = homepage.to_lowercase();
        self.config
            .broken_live_urls
            .iter()
            .any(|k| name.contains(k.as_str()) || homepage.contains(k.as_str()))
    }
}

/// Agent vocabulary paired with AI vocabulary anywhere in the name, topics or
/// description, or an explicit agent topic.
pub fn looks_like_ai_agent(repo: &RepositoryRecord) -> bool {
    let topics: Vec<String> = repo.topics.iter().map(|t| t.to_lowercase()).collect();
    if topics.iter().any(|t| AGENT_TOPICS.contains(&t.as_str())) {
        return true;
    }

    let mut words = words_of(&repo.name);
    for topic in &topics {
        words.extend(words_of(topic));
    }
    if let Some(description) = repo.description.as_deref() {
        words.extend(words_of(description));
    }

    let mentions = |vocabulary: &[&str]| words.iter().any(|w| vocabulary.contains(&w.as_str()));
    mentions(AGENT_WORDS) && mentions(AI_WORDS)
}

/// `my-cool_app` becomes `My Cool App`.
pub fn derive_title(name: &str) -> String {
    let title = name
        .split(['-', '_'])
        .filter(|segment| !segment.is_empty())
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ");
    if title.is_empty() {
        name.to_string()
    } else {
        title
    }
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn words_of(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn keyword_lookup<'a>(table: &'a [(String, String)], name: &str) -> Option<&'a str> {
    let name = name.to_lowercase();
    table
        .iter()
        .find(|(keyword, _)| name.contains(keyword.as_str()))
        .map(|(_, value)| value.as_str())
}
