use std::path::Path;

use super::{RunTracker, Stage};
use crate::crypto;
use crate::errors::{BackupError, FormatError};
use crate::model::DocumentSet;
use crate::paths::ensure_restorable;
use crate::restore::{RestoreReport, restore, select_databases};
use crate::serializer;
use crate::store::DocumentStore;

/// Read and parse a plain backup file.
///
/// # Errors
/// `Format` for a wrong suffix, encrypted content or malformed JSON; `Io` if unreadable.
pub fn load_backup(path: &Path) -> Result<Vec<DocumentSet>, BackupError> {
    ensure_restorable(path)?;
    let text = std::fs::read_to_string(path)?;
    if crypto::is_encrypted(&text) {
        return Err(FormatError::EncryptedInput(path.to_path_buf()).into());
    }
    let data = serializer::deserialize(&text)?;
    log::info!("load_backup: {} databases from {}", data.len(), path.display());
    Ok(data)
}

/// Insert the chosen databases of `data` and report per-collection results.
///
/// Partial insert failures do not fail the run; they are in the report.
///
/// # Errors
/// Only `Stage` if the tracker is already terminal.
pub async fn run_restore<S: DocumentStore + ?Sized>(
    store: &S,
    data: &[DocumentSet],
    databases: &[String],
    tracker: &mut RunTracker,
) -> Result<RestoreReport, BackupError> {
    if let Err(e) = tracker.enter(Stage::Writing) {
        return Err(tracker.fail(e));
    }
    let chosen = select_databases(data, databases);
    let report = restore(store, &chosen).await;
    let failed = report.failed().count();
    log::info!(
        target: "mongoba::audit",
        "restore finished collections={} inserted={} failed={failed}",
        report.collections.len(),
        report.inserted()
    );
    tracker.settle(Ok(report))
}
