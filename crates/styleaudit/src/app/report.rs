//! Rendering of audit results for the console.

use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use minijinja::Environment;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::app::audit::AuditOutcome;
use crate::app::presence::Presence;
use crate::domain::model::AtomicSelector;

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum ReportFormat {
    /// Human-readable trace and summary.
    Text,
    /// Machine-readable JSON document.
    Json,
}

impl FromStr for ReportFormat {
    type Err = ReportFormatParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(ReportFormatParseError::UnknownFormat(other.to_string())),
        }
    }
}

/// Error returned when parsing a [`ReportFormat`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ReportFormatParseError {
    #[error("unknown report format '{0}'")]
    UnknownFormat(String),
}

/// Serializable view of an [`AuditOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub generated_at: String,
    pub markup: String,
    pub stylesheet: String,
    pub output: String,
    pub selectors: Vec<ReportSelector>,
    pub absent: Vec<ReportSelector>,
    pub removed: Vec<ReportRemoval>,
    pub warnings: Vec<String>,
    pub lines_before: usize,
    pub lines_after: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSelector {
    pub name: String,
    pub kind: String,
    pub css: String,
    pub status: Presence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRemoval {
    pub selector: String,
    pub line: String,
    pub open: usize,
    pub close: usize,
}

impl AuditReport {
    pub fn from_outcome(outcome: &AuditOutcome) -> Result<Self> {
        let generated_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .context("failed to format report timestamp")?;
        Ok(Self::with_timestamp(outcome, generated_at))
    }

    pub fn with_timestamp(outcome: &AuditOutcome, generated_at: String) -> Self {
        let selectors: Vec<ReportSelector> = outcome
            .presence
            .entries
            .iter()
            .map(|entry| report_selector(&entry.selector, entry.presence))
            .collect();
        let absent = selectors
            .iter()
            .filter(|selector| selector.status == Presence::Absent)
            .cloned()
            .collect();
        let removed = outcome
            .prune
            .removed
            .iter()
            .map(|rule| {
                let (open, close) = rule.block.display_lines();
                ReportRemoval {
                    selector: rule.fragment.clone(),
                    line: rule.line.clone(),
                    open,
                    close,
                }
            })
            .collect();

        Self {
            generated_at,
            markup: outcome.request.markup.display().to_string(),
            stylesheet: outcome.request.style.display().to_string(),
            output: outcome.output_path.display().to_string(),
            selectors,
            absent,
            removed,
            warnings: outcome.prune.warnings.iter().map(ToString::to_string).collect(),
            lines_before: outcome.original_lines,
            lines_after: outcome.prune.lines.len(),
        }
    }
}

fn report_selector(selector: &AtomicSelector, status: Presence) -> ReportSelector {
    ReportSelector {
        name: selector.name.clone(),
        kind: selector.kind.as_str().to_owned(),
        css: selector.rewrite(),
        status,
    }
}

/// Renders [`AuditReport`]s in the requested format.
pub struct ReportRenderer {
    env: Environment<'static>,
}

impl ReportRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_template("text_report", TEXT_TEMPLATE)
            .map_err(|err| anyhow!("failed to register text report template: {err}"))?;
        Ok(Self { env })
    }

    pub fn render(&self, report: &AuditReport, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => {
                serde_json::to_string_pretty(report).context("failed to serialize JSON report")
            }
            ReportFormat::Text => self
                .env
                .get_template("text_report")
                .and_then(|template| template.render(report))
                .map_err(|err| anyhow!("failed to render text report: {err}")),
        }
    }
}

const TEXT_TEMPLATE: &str = r#"HTML: {{ markup }}
CSS: {{ stylesheet }}

FULL STYLE LIST (parsed):
{% for selector in selectors %}
  {{ selector.css }} ({{ selector.kind }}){% if selector.status == "ignored" %} [ignored]{% endif %}

{% endfor %}

{% for selector in absent %}
ABSENT FROM DOM: {{ selector.css }} ({{ selector.kind }})
{% endfor %}
{% for rule in removed %}

Line {{ rule.open }}: {{ rule.line }}
Opened at {{ rule.open }}, closed at {{ rule.close }} (matched {{ rule.selector }})
RULE REMOVED
{% endfor %}
{% for warning in warnings %}
warning: {{ warning }}
{% endfor %}

The trimmed stylesheet has been saved as '{{ output }}' ({{ lines_before }} -> {{ lines_after }} lines).
{% if not removed %}
No rules were removed, so '{{ output }}' matches the original and can be deleted.
{% endif %}
Compare the two files side by side to check for parsing mistakes.
The original stylesheet, {{ stylesheet }}, has not been changed.
"#;
