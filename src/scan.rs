use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::db::ReadmeRow;
use crate::ingest::Document;
use crate::parser;
use crate::repo::RepoCoordinate;

/// A README found on disk under `<root>/<owner>/<name>/`.
#[derive(Debug, Clone)]
pub struct ReadmeFile {
    pub path: PathBuf,
    pub repo: RepoCoordinate,
}

/// Find one README per `<owner>/<name>` directory, sorted by path.
/// `README.md`, `readme.rst`, `README` and saved `readme.json` payloads all count.
pub fn discover(root: &Path, branch: &str, limit: Option<usize>) -> Vec<ReadmeFile> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    let entries = WalkDir::new(root)
        .min_depth(3)
        .max_depth(3)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        });

    for entry in entries {
        if limit.is_some_and(|n| files.len() >= n) {
            break;
        }
        if !entry.file_type().is_file() || !is_readme_name(&entry.file_name().to_string_lossy()) {
            continue;
        }
        let Some(slug) = repo_from_path(entry.path()) else {
            continue;
        };
        if !seen.insert(slug.clone()) {
            debug!("Ignoring extra README {}", entry.path().display());
            continue;
        }
        files.push(ReadmeFile {
            path: entry.into_path(),
            repo: RepoCoordinate::new(slug).with_branch(branch),
        });
    }

    info!("Found {} READMEs under {}", files.len(), root.display());
    files
}

/// `owner/name` from the two directories that hold the file.
pub fn repo_from_path(path: &Path) -> Option<String> {
    let mut dirs = path.parent()?.components().rev();
    let name = dirs.next()?.as_os_str().to_str()?;
    let owner = dirs.next()?.as_os_str().to_str()?;
    let slug = format!("{}/{}", owner, name);
    RepoCoordinate::parse(&slug).ok().map(|r| r.slug().to_string())
}

/// Load, analyze and package one README for storage.
pub fn analyze_file(file: &ReadmeFile) -> Result<ReadmeRow> {
    let doc = Document::load(&file.path)?;
    let result = parser::analyze(doc.text(), &file.repo);
    Ok(ReadmeRow {
        repo: file.repo.slug().to_string(),
        path: file.path.display().to_string(),
        branch: file.repo.branch().to_string(),
        bytes: doc.len(),
        line_count: parser::lines::split_lines(doc.text()).len(),
        result,
    })
}

fn is_readme_name(name: &str) -> bool {
    name.to_ascii_lowercase().starts_with("readme")
}
