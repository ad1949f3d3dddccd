use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::lines::Line;

/// Words that mark a line as pointing at something worth watching or reading.
pub const KEYWORDS: &[&str] = &[
    "demo",
    "tutorial",
    "explanation",
    "guide",
    "walkthrough",
    "example",
];

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)https?://[^\s)]+").unwrap());

/// URLs found on a keyword line, or on the line right after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMatch {
    pub urls: Vec<String>,
}

/// Walk the lines pairing keywords with links. A keyword line without links
/// borrows the next line's links; that next line is then skipped entirely.
pub fn match_links(lines: &[Line]) -> Vec<LinkMatch> {
    let mut matches = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if !has_keyword(lines[i].text) {
            i += 1;
            continue;
        }

        let links = external_links(lines[i].text);
        if !links.is_empty() {
            matches.push(LinkMatch { urls: links });
            i += 1;
            continue;
        }

        match lines.get(i + 1).map(|next| external_links(next.text)) {
            Some(next_links) if !next_links.is_empty() => {
                matches.push(LinkMatch { urls: next_links });
                i += 2;
            }
            _ => i += 1,
        }
    }

    matches
}

pub fn has_keyword(line: &str) -> bool {
    let lower = line.to_lowercase();
    KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// All `http(s)://` URLs on the line except those pointing at GitHub itself.
pub fn external_links(line: &str) -> Vec<String> {
    URL_RE
        .find_iter(line)
        .map(|m| m.as_str())
        .filter(|url| !url.to_lowercase().contains("github"))
        .map(str::to_string)
        .collect()
}
