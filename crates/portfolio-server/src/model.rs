use serde::{Deserialize, Serialize};

/// Display-ready project, derived from a repository on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCard {
    pub title: String,
    pub description: String,
    pub tech: Vec<String>,
    pub image: String,
    /// Only set when the homepage passed a liveness check during assembly.
    pub live_url: Option<String>,
    pub github_url: String,
}

/// Shown when GitHub yields nothing displayable.
pub fn fallback_projects() -> Vec<ProjectCard> {
    vec![ProjectCard {
        title: "Sample Project".to_string(),
        description: "A sample project to showcase your work. Set PORTFOLIO_GITHUB_USERNAME to \
fetch your real projects."
            .to_string(),
        tech: vec![
            "React".to_string(),
            "TypeScript".to_string(),
            "Next.js".to_string(),
        ],
        image: "/project1.jpg".to_string(),
        live_url: None,
        github_url: "#".to_string(),
    }]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_serializes_camel_case() {
        let json = serde_json::to_value(&fallback_projects()[0]).unwrap();
        assert!(json.get("liveUrl").is_some_and(|v| v.is_null()));
        assert_eq!(json["githubUrl"], "#");
    }
}
