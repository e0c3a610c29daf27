use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

use super::{Outcome, RunTracker, Stage, persist};
use crate::crypto::{self, PbeKdfParams};
use crate::errors::BackupError;
use crate::fetch::fetch_all;
use crate::model::{BackupStats, Selection};
use crate::paths::{encrypted_path, ensure_backup_target};
use crate::serializer;
use crate::store::DocumentStore;

/// Everything a backup run needs once the operator has answered.
#[derive(Clone)]
pub struct BackupPlan {
    pub selection: Selection,
    /// Must end in `.json`; encrypted output gets `.enc` appended.
    pub output: PathBuf,
    pub pretty: bool,
    pub password: Option<Zeroizing<String>>,
    pub kdf: PbeKdfParams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupResult {
    pub outcome: Outcome,
    pub stats: BackupStats,
}

/// fetch → serialize → [encrypt] → persist.
///
/// # Errors
/// Any fetch, format, encryption or write failure; the tracker ends in `Failed`.
pub async fn run_backup<S, F>(
    store: &S,
    plan: &BackupPlan,
    tracker: &mut RunTracker,
    confirm_overwrite: F,
) -> Result<BackupResult, BackupError>
where
    S: DocumentStore + ?Sized,
    F: FnOnce(&Path) -> Result<bool, BackupError>,
{
    let result = backup_inner(store, plan, tracker, confirm_overwrite).await;
    tracker.settle(result)
}

async fn backup_inner<S, F>(
    store: &S,
    plan: &BackupPlan,
    tracker: &mut RunTracker,
    confirm_overwrite: F,
) -> Result<BackupResult, BackupError>
where
    S: DocumentStore + ?Sized,
    F: FnOnce(&Path) -> Result<bool, BackupError>,
{
    ensure_backup_target(&plan.output)?;
    tracker.enter(Stage::Fetching)?;
    let data = fetch_all(store, &plan.selection).await?;
    let stats = BackupStats::of(&data);

    tracker.enter(Stage::Serializing)?;
    let mut text = serializer::serialize(&data, plan.pretty)?;
    drop(data);

    let mut target = plan.output.clone();
    if let Some(password) = &plan.password {
        tracker.enter(Stage::Encrypting)?;
        text = crypto::encrypt_with(&text, password, &plan.kdf)?;
        target = encrypted_path(&target);
    }

    tracker.enter(Stage::Persisting)?;
    let outcome = persist(&target, &text, plan.password.is_some(), confirm_overwrite)?;
    match &outcome {
        Outcome::Written(path) => log::info!(
            target: "mongoba::audit",
            "backup wrote {} databases={} collections={} documents={} encrypted={}",
            path.display(),
            stats.databases,
            stats.collections,
            stats.documents,
            plan.password.is_some()
        ),
        Outcome::Cancelled => tracker.cancel(),
    }
    Ok(BackupResult { outcome, stats })
}
