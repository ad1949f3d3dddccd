use serde::{Deserialize, Serialize};

use super::sections::Section;

/// Heading words that suggest a section describes the project itself.
pub const RELEVANT_TITLES: &[&str] = &[
    "introduction",
    "overview",
    "demo",
    "about",
    "description",
    "background",
    "project",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestSection {
    pub title: String,
    pub content: String,
}

/// Pick the relevant section with the most words. Ties go to the earlier
/// section; a section with no words is never picked.
pub fn select_best(sections: &[Section]) -> Option<BestSection> {
    let mut best: Option<&Section> = None;
    let mut best_words = 0;

    for section in sections.iter().filter(|s| is_relevant(&s.title)) {
        let words = section.word_count();
        if words > best_words {
            best = Some(section);
            best_words = words;
        }
    }

    best.map(|s| BestSection {
        title: s.title.clone(),
        content: s.content(),
    })
}

pub fn is_relevant(title: &str) -> bool {
    RELEVANT_TITLES.iter().any(|t| title.contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lines::split_lines;
    use crate::parser::sections::segment_sections;

    fn best(md: &str) -> Option<BestSection> {
        select_best(&segment_sections(&split_lines(md)))
    }

    #[test]
    fn longest_relevant_wins() {
        let md = "# Overview\none two\n# Installation\na b c d e f g\n# About the project\nx y z";
        let b = best(md).unwrap();
        assert_eq!(b.title, "about the project");
        assert_eq!(b.content, "x y z");
    }

    #[test]
    fn tie_keeps_first() {
        let md = "# Introduction\nalpha beta\n# Background\ngamma delta";
        assert_eq!(best(md).unwrap().title, "introduction");
    }

    #[test]
    fn substring_match_in_title() {
        assert!(is_relevant("demos and screenshots"));
        assert!(is_relevant("project goals"));
        assert!(!is_relevant("installation"));
    }

    #[test]
    fn no_relevant_titles() {
        assert_eq!(best("# Install\ncargo install foo\n# License\nMIT"), None);
    }

    #[test]
    fn blank_relevant_section_never_wins() {
        assert_eq!(best("# About\n\n   \n# Usage\nrun it"), None);
    }
}
