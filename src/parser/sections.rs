use std::sync::LazyLock;

use regex::Regex;

use super::lines::{is_space, Line};

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#+\s*(.+)").unwrap());

/// A heading and the lines under it, up to the next heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub title: String,
    pub body: Vec<&'a str>,
}

impl<'a> Section<'a> {
    fn open(title: String) -> Self {
        Self {
            title,
            body: Vec::new(),
        }
    }

    pub fn word_count(&self) -> usize {
        self.body
            .iter()
            .map(|l| l.split(is_space).filter(|w| !w.is_empty()).count())
            .sum()
    }

    pub fn content(&self) -> String {
        self.body.join("\n").trim_matches(is_space).to_string()
    }
}

/// Split lines into heading-delimited sections. Text before the first heading
/// is dropped, as are sections that never received a body line.
pub fn segment_sections<'a>(lines: &[Line<'a>]) -> Vec<Section<'a>> {
    let mut sections = Vec::new();
    let mut current: Option<Section<'a>> = None;

    for line in lines {
        if let Some(title) = heading_title(line.text) {
            close(&mut sections, current.take());
            // "# " has no usable title: lines under it belong nowhere.
            if !title.is_empty() {
                current = Some(Section::open(title));
            }
        } else if let Some(section) = current.as_mut() {
            section.body.push(line.text);
        }
    }
    close(&mut sections, current);

    sections
}

/// Lowercased, trimmed heading text if the line starts with `#`.
pub fn heading_title(line: &str) -> Option<String> {
    HEADING_RE
        .captures(line)
        .map(|caps| caps[1].trim_matches(is_space).to_lowercase())
}

fn close<'a>(sections: &mut Vec<Section<'a>>, section: Option<Section<'a>>) {
    if let Some(section) = section.filter(|s| !s.body.is_empty()) {
        sections.push(section);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lines::split_lines;

    fn titles(md: &str) -> Vec<String> {
        segment_sections(&split_lines(md))
            .into_iter()
            .map(|s| s.title)
            .collect()
    }

    #[test]
    fn heading_variants() {
        assert_eq!(heading_title("# Overview").as_deref(), Some("overview"));
        assert_eq!(heading_title("###   About This  ").as_deref(), Some("about this"));
        assert_eq!(heading_title("#hashtag").as_deref(), Some("hashtag"));
        assert_eq!(heading_title("##").as_deref(), Some("#"));
        assert_eq!(heading_title("# ").as_deref(), Some(""));
        assert_eq!(heading_title("#"), None);
        assert_eq!(heading_title("  # indented"), None);
        assert_eq!(heading_title("text # not a heading"), None);
    }

    #[test]
    fn preamble_discarded() {
        let sections = segment_sections(&split_lines("intro text\n# Usage\ncargo run"));
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "usage");
        assert_eq!(sections[0].body, vec!["cargo run"]);
    }

    #[test]
    fn empty_sections_skipped() {
        assert_eq!(titles("# A\n# B\nbody\n# C"), vec!["b"]);
    }

    #[test]
    fn blank_lines_count_as_body() {
        let sections = segment_sections(&split_lines("# A\n\n# B\nx"));
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].word_count(), 0);
    }

    #[test]
    fn untitled_heading_swallows_lines() {
        assert_eq!(titles("# A\none\n# \nlost\n# B\ntwo"), vec!["a", "b"]);
    }

    #[test]
    fn repeated_titles_kept() {
        assert_eq!(titles("# Demo\na\n# Demo\nb"), vec!["demo", "demo"]);
    }

    #[test]
    fn content_joined_and_trimmed() {
        let sections = segment_sections(&split_lines("# About\n\n  first line\nsecond  \n\n"));
        assert_eq!(sections[0].content(), "first line\nsecond");
        assert_eq!(sections[0].word_count(), 3);
    }

    #[test]
    fn unit_separator_splits_words() {
        let sections = segment_sections(&split_lines("# About\none\x1ftwo \x1f three\x1f"));
        assert_eq!(sections[0].word_count(), 3);
        assert_eq!(sections[0].content(), "one\x1ftwo \x1f three");
    }

    #[test]
    fn no_headings() {
        assert!(segment_sections(&split_lines("just\nprose")).is_empty());
    }
}
