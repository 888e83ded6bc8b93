//! Scratch files that never outlive the audit, and create-only writes.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::{Builder, NamedTempFile};

use crate::domain::errors::AuditError;

/// A fixed-name file in the working directory that is deleted when dropped.
#[derive(Debug)]
pub struct ScratchFile {
    file: NamedTempFile,
}

impl ScratchFile {
    /// Create `dir/name` with `contents`. Fails if the file already exists.
    pub fn create(dir: &Path, name: &str, contents: &str) -> Result<Self> {
        let mut scratch = Self::reserve(dir, name)?;
        scratch
            .file
            .write_all(contents.as_bytes())
            .and_then(|()| scratch.file.flush())
            .with_context(|| format!("failed to write scratch file {}", scratch.path().display()))?;
        tracing::debug!(path = %scratch.path().display(), "created scratch file");
        Ok(scratch)
    }

    /// Claim `dir/name` as an empty file owned by the guard.
    fn reserve(dir: &Path, name: &str) -> Result<Self> {
        let file = Builder::new()
            .prefix(name)
            .rand_bytes(0)
            .tempfile_in(dir)
            .map_err(|err| match err.kind() {
                io::ErrorKind::AlreadyExists => anyhow::Error::new(AuditError::ScratchExists {
                    path: dir.join(name),
                }),
                _ => anyhow::Error::new(err).context(format!(
                    "failed to create scratch file {}",
                    dir.join(name).display()
                )),
            })?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn read_to_string(&self) -> Result<String> {
        fs::read_to_string(self.path())
            .with_context(|| format!("failed to read scratch file {}", self.path().display()))
    }
}

/// Write `contents` to a file that must not exist yet.
///
/// The data goes to a hidden sibling first and is linked into place only once
/// fully written, so a failed write leaves nothing behind.
pub fn write_new(path: &Path, contents: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = Builder::new().prefix(".styleaudit-").tempfile_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    file.persist_noclobber(path).map_err(|err| err.error)?;
    Ok(())
}
