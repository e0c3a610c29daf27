//! Orchestration of whole runs: stage tracking, persistence and the
//! backup/restore/purge/decrypt sequences.

pub mod backup;
pub mod decrypt;
pub mod purge;
pub mod restore;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::BackupError;
use crate::fsutil::write_atomic;

pub use backup::{BackupPlan, BackupResult, run_backup};
pub use decrypt::{DecryptPlan, run_decrypt};
pub use purge::run_purge;
pub use restore::{load_backup, run_restore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Connecting,
    Connected,
    Selecting,
    Fetching,
    Reading,
    Writing,
    Purging,
    Serializing,
    Encrypting,
    Decrypting,
    Persisting,
    Done,
    Failed,
    Cancelled,
}

impl Stage {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Records the stages a run passes through. Once terminal, it stays terminal.
#[derive(Debug)]
pub struct RunTracker {
    name: &'static str,
    history: Vec<Stage>,
}

impl RunTracker {
    pub fn new(name: &'static str) -> Self {
        Self { name, history: vec![Stage::Idle] }
    }

    #[must_use]
    pub fn current(&self) -> Stage {
        self.history.last().copied().unwrap_or(Stage::Idle)
    }

    #[must_use]
    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    /// Move to `stage`.
    ///
    /// # Errors
    /// `Stage` when the run has already finished, failed or been cancelled.
    pub fn enter(&mut self, stage: Stage) -> Result<(), BackupError> {
        let from = self.current();
        if from.is_terminal() {
            return Err(BackupError::Stage(format!("{}: {from} -> {stage}", self.name)));
        }
        log::debug!("{}: {from} -> {stage}", self.name);
        self.history.push(stage);
        Ok(())
    }

    /// Mark the run failed and hand the error back for propagation.
    pub fn fail(&mut self, err: BackupError) -> BackupError {
        if !self.current().is_terminal() {
            log::error!("{}: failed during {}: {err}", self.name, self.current());
            self.history.push(Stage::Failed);
        }
        err
    }

    pub fn cancel(&mut self) {
        if !self.current().is_terminal() {
            log::info!("{}: cancelled during {}", self.name, self.current());
            self.history.push(Stage::Cancelled);
        }
    }

    /// # Errors
    /// `Stage` when the run is already terminal.
    pub fn finish(&mut self) -> Result<(), BackupError> {
        self.enter(Stage::Done)
    }

    /// Record the terminal stage matching `result`.
    ///
    /// # Errors
    /// Passes through the error in `result`.
    pub fn settle<T>(&mut self, result: Result<T, BackupError>) -> Result<T, BackupError> {
        match result {
            Ok(v) => {
                if !self.current().is_terminal() {
                    self.finish()?;
                }
                Ok(v)
            }
            Err(e) => Err(self.fail(e)),
        }
    }
}

/// Result of a run that writes a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written(PathBuf),
    /// The operator declined to overwrite an existing file.
    Cancelled,
}

/// Write `text` to `path`, asking before replacing an existing file.
///
/// A "no" leaves the existing file untouched. A file created between the
/// check and the write is never replaced.
///
/// # Errors
/// `FileExists` for that race, `Io` for write failures, and anything the
/// confirmation callback returns.
pub fn persist<F>(path: &Path, text: &str, private: bool, confirm_overwrite: F) -> Result<Outcome, BackupError>
where
    F: FnOnce(&Path) -> Result<bool, BackupError>,
{
    let overwrite = if path.exists() {
        if !confirm_overwrite(path)? {
            log::info!("persist: kept existing {}", path.display());
            return Ok(Outcome::Cancelled);
        }
        true
    } else {
        false
    };
    write_atomic(path, text.as_bytes(), overwrite, private)?;
    log::info!("persist: wrote {} ({} bytes)", path.display(), text.len());
    Ok(Outcome::Written(path.to_path_buf()))
}
