/// One line of a README, borrowed from the document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub index: usize,
    pub text: &'a str,
}

/// Characters that end a line. `\r\n` counts as a single break.
pub const LINE_BREAKS: &[char] = &[
    '\n', '\r', '\x0b', '\x0c', '\x1c', '\x1d', '\x1e', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Whitespace for word splitting and trimming: Unicode whitespace plus the
/// ASCII information separators.
pub fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\x1c'..='\x1f').contains(&c)
}

/// Split on any of `LINE_BREAKS`. Empty lines are kept; a trailing
/// terminator does not produce an extra empty line.
pub fn split_lines(text: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let (line, next) = match rest.char_indices().find(|(_, c)| LINE_BREAKS.contains(c)) {
            Some((pos, c)) => {
                let width = if rest[pos..].starts_with("\r\n") { 2 } else { c.len_utf8() };
                (&rest[..pos], &rest[pos + width..])
            }
            None => (rest, ""),
        };
        lines.push(Line {
            index: lines.len(),
            text: line,
        });
        rest = next;
    }

    lines
}
