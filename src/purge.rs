//! Dropping selected collections.

use futures::future::try_join_all;

use crate::catalog::is_system_database;
use crate::errors::BackupError;
use crate::model::Selection;
use crate::store::DocumentStore;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PurgeReport {
    /// `(database, collection)` pairs that were dropped.
    pub dropped: Vec<(String, String)>,
}

/// Drop every selected collection concurrently.
///
/// A selection naming a system database is rejected before any drop is issued.
/// The first failed drop aborts the remaining ones; completed drops stay dropped.
///
/// # Errors
/// `ReservedDatabase` for system databases, `Purge` for the first failed drop.
pub async fn purge<S: DocumentStore + ?Sized>(store: &S, selection: &Selection) -> Result<PurgeReport, BackupError> {
    if let Some(db) = selection.keys().find(|db| is_system_database(db)) {
        return Err(BackupError::ReservedDatabase(db.clone()));
    }
    let pairs = selection.iter().flat_map(|(db, colls)| colls.iter().map(move |c| (db, c)));
    let dropped = try_join_all(pairs.map(|(db, coll)| async move {
        store.drop_collection(db, coll).await.map_err(|source| {
            log::error!(target: "mongoba::audit", "purge {db}.{coll} failed: {source}");
            BackupError::Purge { database: db.clone(), collection: coll.clone(), source }
        })?;
        log::info!(target: "mongoba::audit", "purge {db}.{coll} dropped");
        Ok::<_, BackupError>((db.clone(), coll.clone()))
    }))
    .await?;
    Ok(PurgeReport { dropped })
}
