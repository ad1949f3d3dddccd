pub mod best;
pub mod images;
pub mod lines;
pub mod links;
pub mod sections;

use serde::{Deserialize, Serialize};

use crate::repo::RepoCoordinate;
pub use best::BestSection;
pub use links::LinkMatch;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub matches: Vec<LinkMatch>,
    pub images: Vec<String>,
    pub main_image: Option<String>,
    pub best_section: Option<BestSection>,
}

impl AnalysisResult {
    pub fn link_count(&self) -> usize {
        self.matches.iter().map(|m| m.urls.len()).sum()
    }
}

/// Lines feed three independent passes: images, keyword links, and
/// sections → best section. A line may contribute to all three.
pub fn analyze(text: &str, repo: &RepoCoordinate) -> AnalysisResult {
    let lines = lines::split_lines(text);
    let images = images::extract_images(&lines, repo);
    let matches = links::match_links(&lines);
    let sections = sections::segment_sections(&lines);

    AnalysisResult {
        matches,
        main_image: images::main_image(&images),
        images,
        best_section: best::select_best(&sections),
    }
}

// ── Tests ──
