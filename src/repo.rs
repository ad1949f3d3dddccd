use std::fmt;
use std::sync::LazyLock;

use anyhow::{bail, Result};
use regex::Regex;

/// Branch segment used for relative image URLs when the caller does not know
/// the repository's real default branch.
pub const DEFAULT_BRANCH: &str = "master";

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").unwrap());

/// `owner/name` of a repository plus the branch relative README paths resolve against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCoordinate {
    slug: String,
    branch: String,
}

impl RepoCoordinate {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            branch: DEFAULT_BRANCH.to_string(),
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Accepts `owner/name` or any URL containing `github.com/owner/name`.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim().trim_end_matches('/');
        let slug = match trimmed.rsplit_once("github.com/") {
            Some((_, rest)) => rest,
            None => trimmed,
        };
        let slug = slug.strip_suffix(".git").unwrap_or(slug);

        if !SLUG_RE.is_match(slug) {
            bail!("Invalid GitHub repository URL: {:?}", input);
        }
        Ok(Self::new(slug))
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }
}

impl fmt::Display for RepoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_slug() {
        let repo = RepoCoordinate::parse("foo/bar").unwrap();
        assert_eq!(repo.slug(), "foo/bar");
        assert_eq!(repo.branch(), "master");
    }

    #[test]
    fn github_url() {
        let repo = RepoCoordinate::parse("https://github.com/rust-lang/regex/").unwrap();
        assert_eq!(repo.slug(), "rust-lang/regex");
    }

    #[test]
    fn clone_url() {
        let repo = RepoCoordinate::parse("https://github.com/serde-rs/json.git").unwrap();
        assert_eq!(repo.slug(), "serde-rs/json");
    }

    #[test]
    fn explicit_branch() {
        let repo = RepoCoordinate::new("foo/bar").with_branch("main");
        assert_eq!(repo.branch(), "main");
        assert_eq!(repo.to_string(), "foo/bar");
    }

    #[test]
    fn rejects_non_repo_input() {
        assert!(RepoCoordinate::parse("https://gitlab.com/foo").is_err());
        assert!(RepoCoordinate::parse("https://github.com").is_err());
        assert!(RepoCoordinate::parse("").is_err());
        assert!(RepoCoordinate::parse("/bar").is_err());
    }
}
