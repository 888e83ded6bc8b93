//! Domain models for stylesheet lines, selectors, and rule blocks.

use std::fmt;
use std::ops::RangeInclusive;

use serde::Serialize;

/// Kind of an atomic selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    Class,
    Id,
    Tag,
}

impl SelectorKind {
    /// Label used in console traces.
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectorKind::Class => "class",
            SelectorKind::Id => "ID",
            SelectorKind::Tag => "tag",
        }
    }

    /// CSS prefix that introduces a selector of this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            SelectorKind::Class => ".",
            SelectorKind::Id => "#",
            SelectorKind::Tag => "",
        }
    }
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single class, ID, or tag name taken out of a compound selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AtomicSelector {
    pub name: String,
    pub kind: SelectorKind,
}

impl AtomicSelector {
    pub fn new(name: impl Into<String>, kind: SelectorKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, SelectorKind::Class)
    }

    pub fn id(name: impl Into<String>) -> Self {
        Self::new(name, SelectorKind::Id)
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Self::new(name, SelectorKind::Tag)
    }

    /// Rebuild the CSS token for this selector: `.name`, `#name`, or `name`.
    pub fn rewrite(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AtomicSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.name)
    }
}

/// Inclusive, zero-based line range covering one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleBlock {
    pub open: usize,
    pub close: usize,
}

impl RuleBlock {
    pub fn new(open: usize, close: usize) -> Self {
        Self { open, close }
    }

    /// One-based `(open, close)` pair for display.
    pub fn display_lines(&self) -> (usize, usize) {
        (self.open + 1, self.close + 1)
    }

    pub fn range(&self) -> RangeInclusive<usize> {
        self.open..=self.close
    }
}

/// Ordered lines of a text file. Each line keeps its terminator so that
/// [`SourceLines::to_text`] reproduces the input exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLines {
    lines: Vec<String>,
}

impl SourceLines {
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.split_inclusive('\n').map(str::to_owned).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Build a new collection without the given inclusive ranges.
    ///
    /// Ranges may overlap or arrive in any order; indices past the end are ignored.
    pub fn without(&self, ranges: &[RangeInclusive<usize>]) -> Self {
        let mut dropped = vec![false; self.lines.len()];
        for range in ranges {
            let end = (*range.end()).min(self.lines.len().saturating_sub(1));
            for index in *range.start()..=end {
                if let Some(slot) = dropped.get_mut(index) {
                    *slot = true;
                }
            }
        }

        Self {
            lines: self
                .lines
                .iter()
                .zip(dropped)
                .filter(|(_, dropped)| !dropped)
                .map(|(line, _)| line.clone())
                .collect(),
        }
    }

    pub fn to_text(&self) -> String {
        self.lines.concat()
    }
}

/// Strip the `\n` or `\r\n` terminator from a line.
pub fn line_body(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
        .unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_prefixes_by_kind() {
        assert_eq!(AtomicSelector::class("card").rewrite(), ".card");
        assert_eq!(AtomicSelector::id("main").rewrite(), "#main");
        assert_eq!(AtomicSelector::tag("nav").rewrite(), "nav");
    }

    #[test]
    fn source_lines_round_trip_text() {
        let text = "a {\r\n  color: red;\n}";
        let lines = SourceLines::from_text(text);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.get(2), Some("}"));
        assert_eq!(lines.to_text(), text);
    }

    #[test]
    fn without_drops_overlapping_ranges_once() {
        let lines = SourceLines::from_text("0\n1\n2\n3\n4\n");
        let kept = lines.without(&[3..=4, 0..=1, 1..=1, 9..=12]);
        assert_eq!(kept.to_text(), "2\n");
    }

    #[test]
    fn line_body_handles_terminators() {
        assert_eq!(line_body("abc\r\n"), "abc");
        assert_eq!(line_body("abc\n"), "abc");
        assert_eq!(line_body("abc"), "abc");
    }

    #[test]
    fn rule_block_reports_one_based_lines() {
        let block = RuleBlock::new(4, 6);
        assert_eq!(block.display_lines(), (5, 7));
        assert_eq!(block.range().count(), 3);
    }
}
