//! Domain-specific errors.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which input file an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRole {
    Markup,
    Stylesheet,
}

impl fmt::Display for InputRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputRole::Markup => f.write_str("HTML"),
            InputRole::Stylesheet => f.write_str("CSS"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("{role} file not found: {}, abandoning", path.display())]
    MissingInput { role: InputRole, path: PathBuf },
    #[error(
        "scratch file {} already exists; a previous run left it behind, remove it and retry",
        path.display()
    )]
    ScratchExists { path: PathBuf },
    #[error("output file {} already exists and will not be overwritten", path.display())]
    OutputExists { path: PathBuf },
    #[error("no answer given for prompt: {question}")]
    NoAnswer { question: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("key '{key}' not found under '{parent}'")]
    MissingKey { parent: String, key: String },
    #[error("'{path}' is not a JSON object")]
    NotAnObject { path: String },
}
