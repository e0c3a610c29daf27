//! Writing backup contents back into a server.

use futures::future::join_all;

use crate::errors::StoreError;
use crate::model::DocumentSet;
use crate::store::DocumentStore;

/// Keep the document sets whose database is named in `names`, in file order.
#[must_use]
pub fn select_databases(data: &[DocumentSet], names: &[String]) -> Vec<DocumentSet> {
    data.iter().filter(|set| names.contains(&set.db)).cloned().collect()
}

/// Outcome of one collection's ordered insert.
#[derive(Debug)]
pub struct CollectionRestore {
    pub db: String,
    pub collection: String,
    pub attempted: usize,
    pub inserted: usize,
    /// False when the server did not report where the insert stopped;
    /// `inserted` is then a lower bound.
    pub exact: bool,
    pub error: Option<StoreError>,
}

impl CollectionRestore {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Default)]
pub struct RestoreReport {
    pub collections: Vec<CollectionRestore>,
}

impl RestoreReport {
    pub fn failed(&self) -> impl Iterator<Item = &CollectionRestore> {
        self.collections.iter().filter(|c| !c.succeeded())
    }

    #[must_use]
    pub fn inserted(&self) -> usize {
        self.collections.iter().map(|c| c.inserted).sum()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed().next().is_none()
    }
}

/// Insert every non-empty collection with one ordered bulk insert each.
///
/// Collections run concurrently and a failure in one never stops the others;
/// failures are logged and recorded in the report.
pub async fn restore<S: DocumentStore + ?Sized>(store: &S, data: &[DocumentSet]) -> RestoreReport {
    let jobs = data.iter().flat_map(|set| {
        set.collections
            .iter()
            .filter(|c| !c.documents.is_empty())
            .map(move |c| (set.db.as_str(), c))
    });
    let collections = join_all(jobs.map(|(db, coll)| async move {
        let attempted = coll.documents.len();
        match store.insert_ordered(db, &coll.collection, coll.documents.clone()).await {
            Ok(inserted) => {
                log::info!(target: "mongoba::audit", "restore {db}.{} inserted={inserted}", coll.collection);
                CollectionRestore {
                    db: db.into(),
                    collection: coll.collection.clone(),
                    attempted,
                    inserted,
                    exact: true,
                    error: None,
                }
            }
            Err(failure) => {
                let bound = if failure.is_exact() { "" } else { "at least " };
                log::warn!(
                    "restore {db}.{}: stopped after {bound}{} of {attempted} documents: {}",
                    coll.collection,
                    failure.inserted,
                    failure.source
                );
                log::warn!(
                    target: "mongoba::audit",
                    "restore {db}.{} partial inserted={} exact={} attempted={attempted}",
                    coll.collection,
                    failure.inserted,
                    failure.is_exact()
                );
                CollectionRestore {
                    db: db.into(),
                    collection: coll.collection.clone(),
                    attempted,
                    inserted: failure.inserted,
                    exact: failure.is_exact(),
                    error: Some(failure.source),
                }
            }
        }
    }))
    .await;
    RestoreReport { collections }
}
