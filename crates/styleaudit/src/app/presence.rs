//! Checks selector names against markup text.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;

use crate::domain::model::AtomicSelector;

/// Outcome of checking one atomic selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Present,
    Absent,
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceEntry {
    pub selector: AtomicSelector,
    pub presence: Presence,
}

/// Every checked selector in stylesheet order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PresenceReport {
    pub entries: Vec<PresenceEntry>,
}

impl PresenceReport {
    /// Selectors whose name never occurs in the markup, duplicates included.
    pub fn absent(&self) -> impl Iterator<Item = &AtomicSelector> {
        self.entries
            .iter()
            .filter(|entry| entry.presence == Presence::Absent)
            .map(|entry| &entry.selector)
    }

    /// CSS fragments of the absent selectors, as matched by the pruner.
    pub fn absent_fragments(&self) -> Vec<String> {
        self.absent().map(AtomicSelector::rewrite).collect()
    }

    pub fn count(&self, presence: Presence) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.presence == presence)
            .count()
    }
}

/// Glob patterns naming selectors that are never reported absent.
#[derive(Debug, Clone, Default)]
pub struct SelectorFilter {
    globs: Option<GlobSet>,
}

impl SelectorFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(Self::default());
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern)
                .with_context(|| format!("invalid ignored selector pattern '{pattern}'"))?;
            builder.add(glob);
        }
        let globs = builder
            .build()
            .context("failed to build ignored selector matcher")?;
        Ok(Self { globs: Some(globs) })
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.globs.as_ref().is_some_and(|set| set.is_match(name))
    }
}

/// Plain substring test; `nav` counts as present inside `navbar`.
pub fn is_present(name: &str, markup: &str) -> bool {
    markup.contains(name)
}

/// Check every selector against the markup text.
pub fn check_presence(
    selectors: &[AtomicSelector],
    markup: &str,
    filter: &SelectorFilter,
) -> PresenceReport {
    let entries = selectors
        .iter()
        .map(|selector| {
            let presence = if filter.is_ignored(&selector.name) {
                Presence::Ignored
            } else if is_present(&selector.name, markup) {
                Presence::Present
            } else {
                Presence::Absent
            };
            tracing::debug!(selector = %selector, kind = %selector.kind, ?presence, "checked selector");
            PresenceEntry {
                selector: selector.clone(),
                presence,
            }
        })
        .collect();

    PresenceReport { entries }
}
