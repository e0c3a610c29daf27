use super::{RunTracker, Stage};
use crate::errors::BackupError;
use crate::model::Selection;
use crate::purge::{PurgeReport, purge};
use crate::store::DocumentStore;

/// # Errors
/// `ReservedDatabase` or the first failed drop; the tracker ends in `Failed`.
pub async fn run_purge<S: DocumentStore + ?Sized>(
    store: &S,
    selection: &Selection,
    tracker: &mut RunTracker,
) -> Result<PurgeReport, BackupError> {
    let result = async {
        tracker.enter(Stage::Purging)?;
        purge(store, selection).await
    }
    .await;
    tracker.settle(result)
}
