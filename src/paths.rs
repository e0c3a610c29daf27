//! File-name rules for backup files.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::errors::FormatError;

pub const PLAIN_SUFFIX: &str = ".json";
pub const ENCRYPTED_SUFFIX: &str = ".json.enc";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupKind {
    Plain,
    Encrypted,
    Unsupported,
}

impl BackupKind {
    #[must_use]
    pub fn classify(path: &Path) -> Self {
        let name = path.file_name().map(|n| n.to_string_lossy().to_ascii_lowercase()).unwrap_or_default();
        if name.ends_with(ENCRYPTED_SUFFIX) {
            Self::Encrypted
        } else if name.ends_with(PLAIN_SUFFIX) {
            Self::Plain
        } else {
            Self::Unsupported
        }
    }
}

/// Only a plain `.json` file can be restored.
///
/// # Errors
/// `EncryptedInput` for `.json.enc`, `NotJson` for anything else.
pub fn ensure_restorable(path: &Path) -> Result<(), FormatError> {
    match BackupKind::classify(path) {
        BackupKind::Plain => Ok(()),
        BackupKind::Encrypted => Err(FormatError::EncryptedInput(path.to_path_buf())),
        BackupKind::Unsupported => Err(FormatError::NotJson(path.to_path_buf())),
    }
}

/// Backups are always written under a `.json` name (encryption adds `.enc` later).
///
/// # Errors
/// `NotJson` when the name does not end in `.json`.
pub fn ensure_backup_target(path: &Path) -> Result<(), FormatError> {
    match BackupKind::classify(path) {
        BackupKind::Plain => Ok(()),
        _ => Err(FormatError::NotJson(path.to_path_buf())),
    }
}

#[must_use]
pub fn encrypted_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".enc");
    PathBuf::from(s)
}

/// Decrypted output name: `x.json.enc` becomes `x.json`.
#[must_use]
pub fn decrypted_path(path: &Path) -> PathBuf {
    match path.to_str().and_then(|s| s.strip_suffix(".enc")) {
        Some(stripped) => PathBuf::from(stripped),
        None => {
            let mut p = path.to_path_buf();
            p.set_extension("json");
            p
        }
    }
}

/// Backup files of the given kinds directly under `dir`, sorted by name.
///
/// # Errors
/// Returns the I/O error if `dir` cannot be read.
pub fn list_backups(dir: &Path, kinds: &[BackupKind]) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && kinds.contains(&BackupKind::classify(&path)) {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

#[must_use]
pub fn default_backup_name(now: DateTime<Utc>) -> PathBuf {
    PathBuf::from(format!("./backup_{}.json", now.timestamp()))
}
