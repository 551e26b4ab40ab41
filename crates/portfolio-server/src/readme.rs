use std::sync::LazyLock;

use regex::Regex;

const MIN_PARAGRAPH_CHARS: usize = 30;
const MAX_DESCRIPTION_CHARS: usize = 300;

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("valid regex"));
static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid regex"));
static ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*]+)\*").expect("valid regex"));
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid regex"));

/// First substantial paragraph line after the README's `# ` title, with
/// Markdown inline formatting reduced to plain text.
///
/// Lines before the title, blank lines, images, fenced code, tables, raw HTML
/// and further headings are skipped.
pub fn extract_description(readme: &str) -> Option<String> {
    let mut found_title = false;
    let mut in_fence = false;

    for line in readme.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence
            || trimmed.is_empty()
            || trimmed.starts_with("![")
            || trimmed.starts_with('|')
            || trimmed.starts_with('<')
        {
            continue;
        }

        if trimmed.starts_with('#') {
            if !found_title && trimmed.starts_with("# ") {
                found_title = true;
            }
            continue;
        }

        if found_title && trimmed.chars().count() >= MIN_PARAGRAPH_CHARS {
            let truncated: String = trimmed.chars().take(MAX_DESCRIPTION_CHARS).collect();
            let plain = strip_inline_markdown(truncated.trim());
            if !plain.is_empty() {
                return Some(plain);
            }
        }
    }
    None
}

fn strip_inline_markdown(text: &str) -> String {
    let text = LINK_RE.replace_all(text, "$1");
    let text = BOLD_RE.replace_all(&text, "$1");
    let text = ITALIC_RE.replace_all(&text, "$1");
    let text = CODE_RE.replace_all(&text, "$1");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_long_line_after_title() {
        let readme = r#"[![CI](https://img.shields.io/badge.svg)](https://ci)

# Session Discovery

![screenshot](docs/shot.png)

Short intro.

A **search** and [recommendation](https://example.com) interface built with `Next.js` and *care*.

Second paragraph that should never be used for the description.
"#;
        assert_eq!(
            extract_description(readme).as_deref(),
            Some("A search and recommendation interface built with Next.js and care.")
        );
    }

    #[test]
    fn skips_code_tables_html_and_subheadings() {
        let readme = r#"# Tool
<p align="center"><img src="logo.png" alt="a logo that is long enough to count"></p>
## Installation instructions for the command line tool
```bash
cargo install something-with-a-long-name --features all
```
| Column one is quite long | Column two is long too |
Finally a sentence that describes what this tool does.
"#;
        assert_eq!(
            extract_description(readme).as_deref(),
            Some("Finally a sentence that describes what this tool does.")
        );
    }

    #[test]
    fn long_lines_are_truncated_by_characters() {
        let body = "é".repeat(400);
        let readme = format!("# Title\n\n{body}\n");
        let description = extract_description(&readme).unwrap();
        assert_eq!(description.chars().count(), MAX_DESCRIPTION_CHARS);
    }

    #[test]
    fn readme_without_title_yields_nothing() {
        let readme = "This paragraph is long enough but there is no title above it.";
        assert_eq!(extract_description(readme), None);
    }
}
