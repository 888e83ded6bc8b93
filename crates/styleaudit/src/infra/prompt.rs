//! Interactive prompting.

use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};

/// Source of answers to interactive questions.
pub trait Prompter {
    /// Ask `question`. `None` means no answer is available (closed input or cancelled).
    fn ask(&mut self, question: &str) -> Result<Option<String>>;
}

/// Prompts on the terminal with a line editor, or reads plain lines from stdin
/// when either stdin or stdout is redirected.
///
/// Plain prompts are written to stderr.
pub struct TerminalPrompter {
    editor: Option<Reedline>,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        let interactive = io::stdin().is_terminal() && io::stdout().is_terminal();
        let editor = interactive.then(Reedline::create);
        Self { editor }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        let Some(editor) = self.editor.as_mut() else {
            return read_plain_line(question);
        };

        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic(question.to_owned()),
            DefaultPromptSegment::Empty,
        );
        match editor.read_line(&prompt).context("failed to read prompt input")? {
            Signal::Success(line) => Ok(Some(line.trim().to_owned())),
            _ => Ok(None),
        }
    }
}

fn read_plain_line(question: &str) -> Result<Option<String>> {
    let mut stderr = io::stderr();
    write!(stderr, "{question}: ").context("failed to write prompt")?;
    stderr.flush().context("failed to flush prompt")?;

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read prompt input")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

/// Answers questions from a fixed queue; an empty queue answers nothing.
///
/// Used for `--no-input` runs and in tests.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Questions asked so far, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        self.asked.push(question.to_owned());
        Ok(self.answers.pop_front())
    }
}
