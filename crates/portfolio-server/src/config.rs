use std::net::SocketAddr;

use crate::error::AppError;

const DEFAULT_GITHUB_USERNAME: &str = "HarshYadav1711";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Exposes internal error details in 500 responses.
    pub development: bool,
    /// Fill missing repository descriptions from README files.
    pub readme_descriptions: bool,
}

impl ServerConfig {
    /// Optional:
    /// - `BIND_ADDR` (default: "0.0.0.0:3000")
    /// - `APP_ENV` ("development" enables error details)
    /// - `README_DESCRIPTIONS` (default: true)
    pub fn from_env() -> Result<Self, AppError> {
        let raw_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("invalid BIND_ADDR {raw_addr:?}: {e}")))?;

        let development = std::env::var("APP_ENV")
            .map(|v| v.trim().eq_ignore_ascii_case("development"))
            .unwrap_or(false);

        let readme_descriptions = std::env::var("README_DESCRIPTIONS")
            .ok()
            .and_then(|v| parse_bool(&v))
            .unwrap_or(true);

        Ok(Self {
            bind_addr,
            development,
            readme_descriptions,
        })
    }
}

/// Lookup tables that shape GitHub repositories into project cards.
///
/// Keywords are stored lower-cased and matched as substrings of the
/// lower-cased repository name. Ordered tables resolve conflicts by first match.
#[derive(Debug, Clone)]
pub struct ProjectsConfig {
    pub github_username: String,
    pub excluded: Vec<String>,
    pub prioritized: Vec<String>,
    /// Featured projects in display order; prioritized repositories not listed sort last.
    pub featured_order: Vec<String>,
    pub display_names: Vec<(String, String)>,
    pub image_overrides: Vec<(String, String)>,
    /// Images handed out by position when no override matches.
    pub fallback_images: Vec<String>,
    /// Name keywords or homepage fragments whose live link is never shown.
    pub broken_live_urls: Vec<String>,
    pub max_prioritized: usize,
    pub max_projects: usize,
    pub default_tech: Vec<String>,
}

impl Default for ProjectsConfig {
    fn default() -> Self {
        Self {
            github_username: DEFAULT_GITHUB_USERNAME.to_string(),
            excluded: strings(&["clinic-tracker", "clinic"]),
            prioritized: strings(&[
                "qps",
                "mentor-session-booking",
                "student-learning-progress",
                "session-discovery",
            ]),
            featured_order: strings(&[
                "mentor-session-booking",
                "student-learning-progress",
                "session-discovery",
                "qps",
            ]),
            display_names: pairs(&[
                ("mentor-session-booking", "Mentor Session Booking Dashboard"),
                (
                    "student-learning-progress",
                    "Student Learning Progress & Engagement Dashboard",
                ),
                (
                    "session-discovery",
                    "Session Discovery — Intelligent Search & Recommendation Interface",
                ),
            ]),
            image_overrides: pairs(&[
                ("mentor-session-booking", "/projects/mentor-session-booking.png"),
                ("student-learning-progress", "/projects/student-learning-progress.png"),
                ("session-discovery", "/projects/session-discovery.png"),
                ("qps", "/projects/qps.png"),
            ]),
            fallback_images: strings(&[
                "/projects/dashboard.jpg",
                "/projects/web-app.jpg",
                "/projects/api.jpg",
                "/projects/tooling.jpg",
            ]),
            broken_live_urls: strings(&["localhost", "127.0.0.1", "example.com"]),
            max_prioritized: 6,
            max_projects: 8,
            default_tech: strings(&["JavaScript", "Git"]),
        }
    }
}

impl ProjectsConfig {
    /// Every variable is optional and replaces the corresponding default table:
    /// - `PORTFOLIO_GITHUB_USERNAME`
    /// - `PORTFOLIO_EXCLUDED_PROJECTS`, `PORTFOLIO_PRIORITIZED_PROJECTS`,
    ///   `PORTFOLIO_FEATURED_ORDER`, `PORTFOLIO_BROKEN_LIVE_URLS`,
    ///   `PORTFOLIO_FALLBACK_IMAGES` (comma-separated)
    /// - `PORTFOLIO_DISPLAY_NAMES`, `PORTFOLIO_IMAGE_OVERRIDES`
    ///   (`keyword=value` pairs separated by `;`)
    /// - `PORTFOLIO_MAX_PROJECTS`, `PORTFOLIO_MAX_PRIORITIZED`
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let github_username = match std::env::var("PORTFOLIO_GITHUB_USERNAME") {
            Ok(v) if v.trim().is_empty() => {
                return Err(AppError::Config(
                    "PORTFOLIO_GITHUB_USERNAME must not be empty".to_string(),
                ))
            }
            Ok(v) => v.trim().to_string(),
            Err(_) => defaults.github_username,
        };

        let display_names = match std::env::var("PORTFOLIO_DISPLAY_NAMES") {
            Ok(raw) => parse_pairs("PORTFOLIO_DISPLAY_NAMES", &raw)?,
            Err(_) => defaults.display_names,
        };
        let image_overrides = match std::env::var("PORTFOLIO_IMAGE_OVERRIDES") {
            Ok(raw) => parse_pairs("PORTFOLIO_IMAGE_OVERRIDES", &raw)?,
            Err(_) => defaults.image_overrides,
        };

        Ok(Self {
            github_username,
            excluded: keyword_list("PORTFOLIO_EXCLUDED_PROJECTS").unwrap_or(defaults.excluded),
            prioritized: keyword_list("PORTFOLIO_PRIORITIZED_PROJECTS")
                .unwrap_or(defaults.prioritized),
            featured_order: keyword_list("PORTFOLIO_FEATURED_ORDER")
                .unwrap_or(defaults.featured_order),
            display_names,
            image_overrides,
            fallback_images: std::env::var("PORTFOLIO_FALLBACK_IMAGES")
                .ok()
                .map(|raw| split_list(&raw).map(str::to_string).collect())
                .unwrap_or(defaults.fallback_images),
            broken_live_urls: keyword_list("PORTFOLIO_BROKEN_LIVE_URLS")
                .unwrap_or(defaults.broken_live_urls),
            max_prioritized: positive_var("PORTFOLIO_MAX_PRIORITIZED")
                .unwrap_or(defaults.max_prioritized),
            max_projects: positive_var("PORTFOLIO_MAX_PROJECTS").unwrap_or(defaults.max_projects),
            default_tech: defaults.default_tech,
        })
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn keyword_list(name: &str) -> Option<Vec<String>> {
    let raw = std::env::var(name).ok()?;
    Some(split_list(&raw).map(str::to_lowercase).collect())
}

fn positive_var(name: &str) -> Option<usize> {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
}

fn parse_pairs(name: &str, raw: &str) -> Result<Vec<(String, String)>, AppError> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (key, value) = entry.split_once('=').ok_or_else(|| {
                AppError::Config(format!("{name}: expected keyword=value, got {entry:?}"))
            })?;
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                return Err(AppError::Config(format!(
                    "{name}: empty keyword or value in {entry:?}"
                )));
            }
            Ok((key.to_lowercase(), value.to_string()))
        })
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
