//! The database seam: every component talks to the server through [`DocumentStore`].

use async_trait::async_trait;
use bson::Document;

use crate::errors::StoreError;

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// One entry of a database listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseEntry {
    pub name: String,
}

impl DatabaseEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// An ordered bulk insert that stopped early.
#[derive(Debug)]
pub struct InsertFailure {
    /// Documents known to be written. Exact when `index` is known, otherwise
    /// a lower bound.
    pub inserted: usize,
    /// Position of the failing document in the batch, when known.
    pub index: Option<usize>,
    pub source: StoreError,
}

impl InsertFailure {
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.index.is_some()
    }
}

/// Operations the backup pipeline needs from a document database.
///
/// Implementations must tolerate concurrent calls on disjoint
/// (database, collection) pairs through a shared reference.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_databases(&self) -> Result<Vec<DatabaseEntry>, StoreError>;

    async fn list_collections(&self, database: &str) -> Result<Vec<String>, StoreError>;

    /// Every document in the collection, unfiltered.
    async fn find_all(&self, database: &str, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Insert `documents` in order, stopping at the first failure.
    async fn insert_ordered(
        &self,
        database: &str,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<usize, InsertFailure>;

    /// Drop the collection itself, not just its documents.
    async fn drop_collection(&self, database: &str, collection: &str) -> Result<(), StoreError>;
}
