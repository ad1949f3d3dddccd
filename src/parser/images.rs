use std::sync::LazyLock;

use regex::Regex;

use super::lines::Line;
use crate::repo::RepoCoordinate;

pub const RAW_CONTENT_HOST: &str = "https://raw.githubusercontent.com";

static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)!\[.*?\]\((.*?)\)").unwrap());

/// Every `![alt](target)` on every line, in document order, as absolute URLs.
pub fn extract_images(lines: &[Line], repo: &RepoCoordinate) -> Vec<String> {
    lines
        .iter()
        .flat_map(|line| IMAGE_RE.captures_iter(line.text))
        .map(|caps| resolve_target(&caps[1], repo))
        .collect()
}

/// Targets that already carry a scheme are kept; anything else is treated as a
/// path inside the repository at `repo.branch()`.
pub fn resolve_target(target: &str, repo: &RepoCoordinate) -> String {
    if target.starts_with("http") {
        return target.to_string();
    }
    format!(
        "{}/{}/{}/{}",
        RAW_CONTENT_HOST,
        repo.slug(),
        repo.branch(),
        target.trim_start_matches(['.', '/'])
    )
}

pub fn main_image(images: &[String]) -> Option<String> {
    images.first().cloned()
}
