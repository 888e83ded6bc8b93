//! Removal of rule blocks that mention absent selectors.
//!
//! Pruning runs in two passes: the blocks to delete are planned against the
//! untouched line list first, then the kept lines are materialised. Blocks are
//! assumed to be flat; a nested `{` inside a planned block is reported as a
//! warning because the first `}` closes the block early.

use std::fmt;

use serde::Serialize;

use crate::domain::model::{RuleBlock, SourceLines, line_body};

/// One rule block scheduled for removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedRule {
    pub block: RuleBlock,
    /// Fragment that matched the opening line.
    pub fragment: String,
    /// Opening line without its terminator.
    pub line: String,
}

/// Structural problems noticed while planning removals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PruneWarning {
    NestedBlock { block: RuleBlock },
    UnterminatedBlock { line: usize, fragment: String },
}

impl fmt::Display for PruneWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PruneWarning::NestedBlock { block } => {
                let (open, close) = block.display_lines();
                write!(
                    f,
                    "nested block inside lines {open}-{close}; the rule may have been cut short"
                )
            }
            PruneWarning::UnterminatedBlock { line, fragment } => write!(
                f,
                "no closing brace after line {} ('{fragment}'); left in place",
                line + 1
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrunePlan {
    pub removed: Vec<RemovedRule>,
    pub warnings: Vec<PruneWarning>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneOutcome {
    pub lines: SourceLines,
    pub removed: Vec<RemovedRule>,
    pub warnings: Vec<PruneWarning>,
}

/// Plan which blocks to drop from `source`.
pub fn plan_removals<S: AsRef<str>>(source: &SourceLines, fragments: &[S]) -> PrunePlan {
    let fragments: Vec<&str> = fragments
        .iter()
        .map(AsRef::as_ref)
        .filter(|fragment| !fragment.is_empty())
        .collect();

    let mut plan = PrunePlan::default();
    let mut index = 0;

    while let Some(line) = source.get(index) {
        let Some(fragment) = fragments.iter().find(|fragment| line.contains(**fragment)) else {
            index += 1;
            continue;
        };

        let Some(close) = closing_line(source, index) else {
            tracing::warn!(line = index + 1, fragment, "rule has no closing brace");
            plan.warnings.push(PruneWarning::UnterminatedBlock {
                line: index,
                fragment: (*fragment).to_owned(),
            });
            index += 1;
            continue;
        };

        let block = RuleBlock::new(index, close);
        if has_nested_open(source, block) {
            let (open, close) = block.display_lines();
            tracing::warn!(open, close, "nested block inside removed rule");
            plan.warnings.push(PruneWarning::NestedBlock { block });
        }

        plan.removed.push(RemovedRule {
            block,
            fragment: (*fragment).to_owned(),
            line: line_body(line).to_owned(),
        });
        index = close + 1;
    }

    plan
}

/// Remove every block that mentions one of `fragments`.
pub fn prune_rules<S: AsRef<str>>(source: &SourceLines, fragments: &[S]) -> PruneOutcome {
    let plan = plan_removals(source, fragments);
    let ranges: Vec<_> = plan.removed.iter().map(|rule| rule.block.range()).collect();

    PruneOutcome {
        lines: source.without(&ranges),
        removed: plan.removed,
        warnings: plan.warnings,
    }
}

/// The opening line closes its own block when a `}` follows its `{`.
fn closing_line(source: &SourceLines, open: usize) -> Option<usize> {
    let first = source.get(open)?;
    if let Some(brace) = first.find('{')
        && first[brace..].contains('}')
    {
        return Some(open);
    }

    (open + 1..source.len())
        .find(|&index| source.get(index).is_some_and(|line| line.contains('}')))
}

fn has_nested_open(source: &SourceLines, block: RuleBlock) -> bool {
    let opening_braces: usize = block
        .range()
        .filter_map(|index| source.get(index))
        .map(|line| line.matches('{').count())
        .sum();
    opening_braces > 1
}
