/// Keyword tables mapping repository topics and primary language to display labels.

struct Rule {
    label: &'static str,
    topics: &'static [&'static str],
    languages: &'static [&'static str],
}

const fn rule(
    label: &'static str,
    topics: &'static [&'static str],
    languages: &'static [&'static str],
) -> Rule {
    Rule {
        label,
        topics,
        languages,
    }
}

const FRONTEND: &[Rule] = &[
    rule("React", &["react", "nextjs", "next.js"], &[]),
    rule("Next.js", &["nextjs", "next.js"], &[]),
    rule("TypeScript", &["typescript"], &["typescript"]),
    rule("JavaScript", &["javascript"], &["javascript"]),
    rule("TailwindCSS", &["tailwind", "tailwindcss"], &[]),
    rule("HTML", &["html"], &[]),
    rule("CSS", &["css"], &[]),
];

const BACKEND: &[Rule] = &[
    rule("Node.js", &["nodejs", "node.js"], &["javascript"]),
    rule("ExpressJS", &["express", "expressjs"], &[]),
    rule("Python", &["python"], &["python"]),
    rule("FastAPI", &["fastapi"], &[]),
    rule("Django", &["django"], &[]),
];

const DATASTORE: &[Rule] = &[
    rule("MongoDB", &["mongodb"], &[]),
    rule("MySQL", &["mysql"], &[]),
    rule("PostgreSQL", &["postgresql", "postgres"], &[]),
    rule("Redis", &["redis"], &[]),
];

const TOOLING: &[Rule] = &[
    rule("Git", &["git"], &[]),
    rule("Docker", &["docker"], &[]),
    rule("AWS", &["aws"], &[]),
    rule("Figma", &["figma"], &[]),
    rule("Framer Motion", &["framer-motion", "framermotion"], &[]),
];

const CATEGORIES: [&[Rule]; 4] = [FRONTEND, BACKEND, DATASTORE, TOOLING];

/// Labels in table order without duplicates. When no rule fires, the
/// capitalized primary language stands in; no language and no topics yields
/// an empty list.
pub fn infer_tech_stack(topics: &[String], language: Option<&str>) -> Vec<String> {
    let topics: Vec<String> = topics.iter().map(|t| t.trim().to_lowercase()).collect();
    let language = language
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty());

    let mut labels: Vec<String> = Vec::new();
    for rule in CATEGORIES.iter().flat_map(|c| c.iter()) {
        let topic_hit = rule.topics.iter().any(|k| topics.iter().any(|t| t == k));
        let language_hit = language
            .as_deref()
            .is_some_and(|l| rule.languages.contains(&l));
        if (topic_hit || language_hit) && !labels.iter().any(|l| l == rule.label) {
            labels.push(rule.label.to_string());
        }
    }

    if labels.is_empty() {
        if let Some(language) = language {
            labels.push(capitalize(&language));
        }
    }
    labels
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn nextjs_topic_implies_react() {
        let labels = infer_tech_stack(&topics(&["nextjs"]), None);
        assert_eq!(labels, ["React", "Next.js"]);
    }

    #[test]
    fn react_alone_does_not_imply_nextjs() {
        let labels = infer_tech_stack(&topics(&["React"]), None);
        assert_eq!(labels, ["React"]);
    }

    #[test]
    fn javascript_language_adds_node() {
        let labels = infer_tech_stack(&topics(&["docker", "mongodb"]), Some("JavaScript"));
        assert_eq!(labels, ["JavaScript", "Node.js", "MongoDB", "Docker"]);
    }

    #[test]
    fn labels_are_deduplicated() {
        let labels = infer_tech_stack(&topics(&["python", "postgres", "postgresql"]), Some("Python"));
        assert_eq!(labels, ["Python", "PostgreSQL"]);
    }

    #[test]
    fn unmatched_language_is_capitalized() {
        assert_eq!(infer_tech_stack(&[], Some("rust")), ["Rust"]);
        assert_eq!(infer_tech_stack(&topics(&["cli"]), Some("Go")), ["Go"]);
    }

    #[test]
    fn no_language_and_no_topics_is_empty() {
        assert!(infer_tech_stack(&[], None).is_empty());
        assert!(infer_tech_stack(&[], Some("  ")).is_empty());
    }
}
