//! Line-oriented comment removal for stylesheets and markup.
//!
//! Only comments that start a line (after blanks) are recognised. A block
//! comment that is not closed on its opening line swallows every line up to
//! and including the first one that contains the closing token.

use std::ops::RangeInclusive;

use crate::domain::model::SourceLines;

/// Comment dialect of the file being stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentSyntax {
    /// `//` line comments and `/* */` blocks (CSS and SCSS).
    Style,
    /// `<!-- -->` blocks (HTML).
    Markup,
}

impl CommentSyntax {
    fn line_token(&self) -> Option<&'static str> {
        match self {
            CommentSyntax::Style => Some("//"),
            CommentSyntax::Markup => None,
        }
    }

    fn block_tokens(&self) -> (&'static str, &'static str) {
        match self {
            CommentSyntax::Style => ("/*", "*/"),
            CommentSyntax::Markup => ("<!--", "-->"),
        }
    }
}

/// Locate the inclusive line ranges occupied by comments.
pub fn comment_ranges(source: &SourceLines, syntax: CommentSyntax) -> Vec<RangeInclusive<usize>> {
    let (open, close) = syntax.block_tokens();
    let mut ranges = Vec::new();
    let mut index = 0;

    while let Some(line) = source.get(index) {
        let trimmed = line.trim_start_matches([' ', '\t']);

        if syntax.line_token().is_some_and(|token| trimmed.starts_with(token)) {
            ranges.push(index..=index);
            index += 1;
            continue;
        }

        let Some(rest) = trimmed.strip_prefix(open) else {
            index += 1;
            continue;
        };

        if rest.contains(close) {
            ranges.push(index..=index);
            index += 1;
            continue;
        }

        match (index + 1..source.len()).find(|&later| {
            source
                .get(later)
                .is_some_and(|candidate| candidate.contains(close))
        }) {
            Some(end) => {
                ranges.push(index..=end);
                index = end + 1;
            }
            None => {
                tracing::warn!(
                    line = index + 1,
                    token = open,
                    "unterminated block comment runs to end of file"
                );
                ranges.push(index..=source.len() - 1);
                index = source.len();
            }
        }
    }

    ranges
}

/// Return `source` with every comment line removed.
pub fn strip_comments(source: &SourceLines, syntax: CommentSyntax) -> SourceLines {
    let ranges = comment_ranges(source, syntax);
    if ranges.is_empty() {
        return source.clone();
    }
    tracing::debug!(?syntax, ranges = ranges.len(), "stripped comments");
    source.without(&ranges)
}

/// Convenience wrapper over raw text.
pub fn strip_comments_from_text(text: &str, syntax: CommentSyntax) -> String {
    strip_comments(&SourceLines::from_text(text), syntax).to_text()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(text: &str, syntax: CommentSyntax) -> String {
        strip_comments_from_text(text, syntax)
    }

    #[test]
    fn text_without_comments_is_unchanged() {
        let css = ".a {\n  color: red;\n}\n\n#b { margin: 0 }\n";
        assert_eq!(strip(css, CommentSyntax::Style), css);

        let html = "<div class=\"a\">\n  <p>hi</p>\n</div>";
        assert_eq!(strip(html, CommentSyntax::Markup), html);
    }

    #[test]
    fn removes_line_comments_and_keeps_order() {
        let css = "// header\n.a {\n    // inner note\n  color: red;\n}\n\t// trailer\n";
        assert_eq!(
            strip(css, CommentSyntax::Style),
            ".a {\n  color: red;\n}\n"
        );
    }

    #[test]
    fn removes_identical_comment_lines_everywhere() {
        let css = "// todo\n.a {}\n// todo\n.b {}\n";
        assert_eq!(strip(css, CommentSyntax::Style), ".a {}\n.b {}\n");
    }

    #[test]
    fn removes_single_line_block_comment() {
        let css = "/* one liner */\n.a {\n}\n";
        assert_eq!(strip(css, CommentSyntax::Style), ".a {\n}\n");
    }

    #[test]
    fn removes_multi_line_block_comment_inclusive() {
        let css = ".a {}\n  /* start\n   .hidden {\n   } end */\n.b {}\n";
        assert_eq!(strip(css, CommentSyntax::Style), ".a {}\n.b {}\n");
    }

    #[test]
    fn trailing_comment_after_code_is_kept() {
        let css = ".a { color: red; } /* note */\n.b { top: 0; } // note\n";
        assert_eq!(strip(css, CommentSyntax::Style), css);
    }

    #[test]
    fn unterminated_block_comment_runs_to_end() {
        let css = ".a {}\n/* never closed\n.b {}\n";
        assert_eq!(strip(css, CommentSyntax::Style), ".a {}\n");
    }

    #[test]
    fn markup_comments_single_and_multi_line() {
        let html = "<div>\n  <!-- single -->\n  <!-- multi\n  <span class=\"ghost\"></span>\n  -->\n</div>\n";
        assert_eq!(strip(html, CommentSyntax::Markup), "<div>\n</div>\n");
    }

    #[test]
    fn markup_ignores_double_slash() {
        let html = "// not a comment in html\n<p></p>\n";
        assert_eq!(strip(html, CommentSyntax::Markup), html);
    }
}
