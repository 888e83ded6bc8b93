//! Audit pipeline: strip comments, extract and check selectors, prune the stylesheet.
//!
//! Each stage takes typed input and can be called on its own; [`Auditor::run`]
//! chains them and handles the file system side.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::app::comments::{CommentSyntax, strip_comments};
use crate::app::presence::{PresenceReport, SelectorFilter, check_presence};
use crate::app::prune::{PruneOutcome, prune_rules};
use crate::app::selectors::{decompose_all, extract_selectors};
use crate::domain::errors::{AuditError, InputRole};
use crate::domain::model::{AtomicSelector, SourceLines};
use crate::infra::config::Config;
use crate::infra::prompt::Prompter;
use crate::infra::scratch::{ScratchFile, write_new};

const MARKUP_SCRATCH: &str = "htmlCommentsRemoved.html";
const STYLE_SCRATCH_STEM: &str = "styleCommentsRemoved";

pub const MARKUP_QUESTION: &str = "HTML filename";
pub const STYLE_QUESTION: &str = "Stylesheet filename (enter to reuse the HTML name)";
pub const OUTPUT_QUESTION: &str =
    "Name for the trimmed stylesheet, without the file extension";

/// Settings shared by every audit run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditSettings {
    pub style_extension: String,
    pub output_stem: String,
    pub ignore: Vec<String>,
    /// Directory receiving scratch files and the trimmed stylesheet.
    pub work_dir: PathBuf,
}

impl AuditSettings {
    pub fn from_config(config: &Config, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            style_extension: config.defaults.style_extension.clone(),
            output_stem: config.defaults.output_stem.clone(),
            ignore: config.ignore.selectors.clone(),
            work_dir: work_dir.into(),
        }
    }

    fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.style_extension)
    }
}

/// The pair of files to compare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRequest {
    pub markup: PathBuf,
    pub style: PathBuf,
}

impl AuditRequest {
    /// Fill in missing paths by prompting. An empty stylesheet answer reuses the
    /// HTML name with the configured extension; no answer at all is an error.
    pub fn resolve(
        markup: Option<PathBuf>,
        style: Option<PathBuf>,
        extension: &str,
        prompter: &mut dyn Prompter,
    ) -> Result<Self> {
        let markup = match markup {
            Some(markup) => markup,
            None => PathBuf::from(ask_required(prompter, MARKUP_QUESTION)?),
        };

        let style = match style {
            Some(style) => style,
            None => match prompter.ask(STYLE_QUESTION)? {
                Some(answer) if !answer.trim().is_empty() => PathBuf::from(answer.trim()),
                Some(_) => default_style_path(&markup, extension),
                None => {
                    return Err(AuditError::NoAnswer {
                        question: STYLE_QUESTION.to_owned(),
                    }
                    .into());
                }
            },
        };

        Ok(Self { markup, style })
    }
}

/// `page.html` becomes `page.<extension>`.
pub fn default_style_path(markup: &Path, extension: &str) -> PathBuf {
    markup.with_extension(extension)
}

/// Selectors extracted from the stylesheet, before presence checking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleScan {
    pub selectors: Vec<String>,
    pub atoms: Vec<AtomicSelector>,
}

/// Everything produced by a completed run.
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    pub request: AuditRequest,
    pub scan: StyleScan,
    pub presence: PresenceReport,
    pub prune: PruneOutcome,
    pub original_lines: usize,
    pub output_path: PathBuf,
}

/// Runs the audit pipeline with fixed settings.
#[derive(Debug, Clone)]
pub struct Auditor {
    settings: AuditSettings,
    filter: SelectorFilter,
}

impl Auditor {
    pub fn new(settings: AuditSettings) -> Result<Self> {
        let filter = SelectorFilter::new(&settings.ignore)?;
        Ok(Self { settings, filter })
    }

    pub fn settings(&self) -> &AuditSettings {
        &self.settings
    }

    /// Stage: stylesheet text with comment lines removed.
    pub fn strip_style(&self, style_text: &str) -> String {
        strip_comments(&SourceLines::from_text(style_text), CommentSyntax::Style).to_text()
    }

    /// Stage: markup text with comment lines removed.
    pub fn strip_markup(&self, markup_text: &str) -> String {
        strip_comments(&SourceLines::from_text(markup_text), CommentSyntax::Markup).to_text()
    }

    /// Stage: selectors of a comment-free stylesheet.
    pub fn scan_style(&self, stripped_style: &str) -> StyleScan {
        let selectors = extract_selectors(&SourceLines::from_text(stripped_style));
        let atoms = decompose_all(&selectors);
        StyleScan { selectors, atoms }
    }

    /// Stage: presence of each atomic selector in comment-free markup.
    pub fn check_markup(&self, atoms: &[AtomicSelector], stripped_markup: &str) -> PresenceReport {
        check_presence(atoms, stripped_markup, &self.filter)
    }

    /// Stage: remove the rules of absent selectors from the original stylesheet text.
    pub fn prune_style(&self, style_text: &str, presence: &PresenceReport) -> PruneOutcome {
        prune_rules(&SourceLines::from_text(style_text), &presence.absent_fragments())
    }

    /// Run every stage against the files of `request` and write the trimmed stylesheet.
    ///
    /// The comment-free copies pass through scratch files in the work dir, which
    /// are removed again before this returns.
    pub fn run(&self, request: AuditRequest, prompter: &mut dyn Prompter) -> Result<AuditOutcome> {
        let style_text = read_input(&request.style, InputRole::Stylesheet)?;
        let markup_text = read_input(&request.markup, InputRole::Markup)?;

        let scan = {
            let scratch = ScratchFile::create(
                &self.settings.work_dir,
                &self.settings.file_name(STYLE_SCRATCH_STEM),
                &self.strip_style(&style_text),
            )?;
            self.scan_style(&scratch.read_to_string()?)
        };
        tracing::info!(
            selectors = scan.selectors.len(),
            atoms = scan.atoms.len(),
            "scanned stylesheet"
        );

        let presence = {
            let scratch = ScratchFile::create(
                &self.settings.work_dir,
                MARKUP_SCRATCH,
                &self.strip_markup(&markup_text),
            )?;
            self.check_markup(&scan.atoms, &scratch.read_to_string()?)
        };

        let output_path = self.choose_output_path(prompter)?;
        let prune = self.prune_style(&style_text, &presence);

        write_new(&output_path, &prune.lines.to_text()).map_err(|err| match err.kind() {
            io::ErrorKind::AlreadyExists => anyhow::Error::new(AuditError::OutputExists {
                path: output_path.clone(),
            }),
            _ => anyhow::Error::new(err)
                .context(format!("failed to write {}", output_path.display())),
        })?;
        tracing::info!(
            path = %output_path.display(),
            removed = prune.removed.len(),
            "wrote trimmed stylesheet"
        );

        Ok(AuditOutcome {
            request,
            scan,
            presence,
            prune,
            original_lines: SourceLines::from_text(&style_text).len(),
            output_path,
        })
    }

    /// Pick `<stem>.<ext>` in the work dir, asking for a new stem while the name is taken.
    pub fn choose_output_path(&self, prompter: &mut dyn Prompter) -> Result<PathBuf> {
        let mut path = self
            .settings
            .work_dir
            .join(self.settings.file_name(&self.settings.output_stem));

        while path.exists() {
            tracing::warn!(path = %path.display(), "output name already used");
            let stem = match prompter.ask(OUTPUT_QUESTION)? {
                Some(stem) if !stem.trim().is_empty() => stem,
                Some(_) => continue,
                None => return Err(AuditError::OutputExists { path }.into()),
            };
            path = self.settings.work_dir.join(self.settings.file_name(stem.trim()));
        }

        Ok(path)
    }
}

fn read_input(path: &Path, role: InputRole) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(AuditError::MissingInput {
            role,
            path: path.to_path_buf(),
        }
        .into()),
        Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
    }
}

fn ask_required(prompter: &mut dyn Prompter, question: &str) -> Result<String> {
    match prompter.ask(question)? {
        Some(answer) if !answer.trim().is_empty() => Ok(answer.trim().to_owned()),
        _ => Err(AuditError::NoAnswer {
            question: question.to_owned(),
        }
        .into()),
    }
}
