//! Selector extraction and decomposition.

use crate::domain::model::{AtomicSelector, SelectorKind, SourceLines};

/// Collect the raw selector text in front of every `{` in a comment-free stylesheet.
///
/// A line that is nothing but `{` takes its selector from the line above.
pub fn extract_selectors(lines: &SourceLines) -> Vec<String> {
    let mut selectors = Vec::new();
    let mut previous: Option<&str> = None;

    for (index, line) in lines.iter().enumerate() {
        let cleaned: String = line.chars().filter(|ch| !ch.is_whitespace()).collect();

        if let Some(brace) = cleaned.find('{') {
            let selector = if cleaned.len() > 1 {
                Some(cleaned[..brace].to_owned())
            } else {
                match previous {
                    Some(above) => Some(above.trim().to_owned()),
                    None => {
                        tracing::debug!(line = index + 1, "opening brace with no selector above");
                        None
                    }
                }
            };

            if let Some(selector) = selector.filter(|selector| !selector.is_empty()) {
                selectors.push(selector);
            }
        }

        previous = Some(line);
    }

    selectors
}

/// Split a raw selector string into atomic selectors.
///
/// Compound pieces are read right to left, so `div.a.b` yields `b`, `a`, then `div`.
pub fn decompose(raw: &str) -> Vec<AtomicSelector> {
    let mut atoms = Vec::new();

    for piece in raw.split(',') {
        let piece = piece.trim();
        let mut rest = piece.strip_prefix('&').unwrap_or(piece).trim();
        if rest.is_empty() {
            continue;
        }

        while let Some(position) = rest.rfind(['.', '#']) {
            let kind = if rest[position..].starts_with('.') {
                SelectorKind::Class
            } else {
                SelectorKind::Id
            };
            let name = rest[position + 1..].trim();
            if !name.is_empty() {
                atoms.push(AtomicSelector::new(name, kind));
            }
            rest = rest[..position].trim_end();
        }

        if !rest.is_empty() {
            atoms.push(AtomicSelector::tag(rest));
        }
    }

    atoms
}

/// Decompose every extracted selector, keeping duplicates.
pub fn decompose_all<S: AsRef<str>>(selectors: &[S]) -> Vec<AtomicSelector> {
    selectors
        .iter()
        .flat_map(|selector| decompose(selector.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(css: &str) -> Vec<String> {
        extract_selectors(&SourceLines::from_text(css))
    }

    #[test]
    fn extracts_selector_before_brace_without_spaces() {
        let css = ".used { color: red; }\n.a, .b {\n  top: 0;\n}\n";
        assert_eq!(extract(css), vec![".used", ".a,.b"]);
    }

    #[test]
    fn brace_on_own_line_uses_previous_line() {
        let css = "  .card .title\n{\n  margin: 0;\n}\n";
        assert_eq!(extract(css), vec![".card .title"]);
    }

    #[test]
    fn brace_on_first_line_is_skipped() {
        assert!(extract("{\n}\n").is_empty());
    }

    #[test]
    fn tag_only_selector_is_single_tag() {
        assert_eq!(decompose("  section  "), vec![AtomicSelector::tag("section")]);
    }

    #[test]
    fn compound_reads_right_to_left_across_kinds() {
        assert_eq!(
            decompose(".a.b#c"),
            vec![
                AtomicSelector::id("c"),
                AtomicSelector::class("b"),
                AtomicSelector::class("a"),
            ]
        );
    }

    #[test]
    fn trailing_tag_is_emitted_last() {
        assert_eq!(
            decompose("div.a.b"),
            vec![
                AtomicSelector::class("b"),
                AtomicSelector::class("a"),
                AtomicSelector::tag("div"),
            ]
        );
    }

    #[test]
    fn comma_lists_and_parent_reference() {
        assert_eq!(
            decompose("&.active, h1,#hero"),
            vec![
                AtomicSelector::class("active"),
                AtomicSelector::tag("h1"),
                AtomicSelector::id("hero"),
            ]
        );
    }

    #[test]
    fn empty_pieces_are_skipped() {
        assert_eq!(decompose(".a,,"), vec![AtomicSelector::class("a")]);
        assert!(decompose("&").is_empty());
    }

    #[test]
    fn rewrite_inverts_simple_selectors() {
        for raw in ["nav", ".card", "#main"] {
            let atoms = decompose(raw);
            assert_eq!(atoms.len(), 1);
            assert_eq!(atoms[0].rewrite(), raw);
        }
    }

    #[test]
    fn decompose_all_keeps_duplicates() {
        let atoms = decompose_all(&[".a", ".a", "p"]);
        assert_eq!(atoms.len(), 3);
    }
}
