//! Concurrent bulk read of every selected collection.

use futures::future::try_join_all;

use crate::errors::BackupError;
use crate::model::{CollectionDocuments, DocumentSet, Selection};
use crate::store::DocumentStore;

/// Read every selected (database, collection) pair concurrently.
///
/// The first failure aborts the whole fetch. Empty collections and then
/// empty databases are dropped; the rest keep selection order.
///
/// # Errors
/// Returns `Fetch` for the first collection that could not be read.
pub async fn fetch_all<S: DocumentStore + ?Sized>(
    store: &S,
    selection: &Selection,
) -> Result<Vec<DocumentSet>, BackupError> {
    let pairs = selection.iter().flat_map(|(db, colls)| colls.iter().map(move |c| (db, c)));
    let fetched = try_join_all(pairs.map(|(db, coll)| async move {
        let docs = store.find_all(db, coll).await.map_err(|source| BackupError::Fetch {
            database: db.clone(),
            collection: coll.clone(),
            source,
        })?;
        log::debug!("fetch: {db}.{coll} -> {} documents", docs.len());
        Ok::<_, BackupError>((db, coll, docs))
    }))
    .await?;

    let mut out: Vec<DocumentSet> = Vec::new();
    for (db, coll, docs) in fetched {
        match out.last_mut() {
            Some(set) if &set.db == db => {
                set.collections.push(CollectionDocuments { collection: coll.clone(), documents: docs });
            }
            _ => out.push(DocumentSet::new(db.as_str()).with_collection(coll.as_str(), docs)),
        }
    }
    Ok(out.into_iter().filter_map(DocumentSet::without_empty).collect())
}
