use async_trait::async_trait;
use bson::{Document, doc};
use futures::TryStreamExt;
use mongodb::error::ErrorKind;
use mongodb::{Client, Collection, options::ClientOptions};

use super::{DatabaseEntry, DocumentStore, InsertFailure};
use crate::connection::ConnectionDescriptor;
use crate::errors::{BackupError, StoreError};

/// [`DocumentStore`] backed by the official MongoDB driver.
///
/// `Client` is reference-counted internally, so one handle serves every
/// concurrent per-collection operation.
#[derive(Clone, Debug)]
pub struct MongoStore {
    client: Client,
}

impl MongoStore {
    /// Connect and verify the server accepts the credentials with a `ping`.
    ///
    /// # Errors
    /// Returns `Connection` if options cannot be parsed or the server rejects us.
    pub async fn connect(descriptor: &ConnectionDescriptor) -> Result<Self, BackupError> {
        log::info!("connect: uri={}", descriptor.redacted());
        let options = ClientOptions::parse(descriptor.uri())
            .await
            .map_err(|e| BackupError::Connection(e.into()))?;
        let client = Client::with_options(options).map_err(|e| BackupError::Connection(e.into()))?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| BackupError::Connection(e.into()))?;
        log::debug!("connect: ping ok");
        Ok(Self { client })
    }

    pub async fn close(self) {
        self.client.shutdown().await;
        log::debug!("connection closed");
    }

    fn collection(&self, database: &str, collection: &str) -> Collection<Document> {
        self.client.database(database).collection::<Document>(collection)
    }
}

// Documents per `insert_many` call; earlier chunks are counted exactly.
const INSERT_CHUNK: usize = 1000;

fn insert_failure(err: mongodb::error::Error, written: usize) -> InsertFailure {
    let first = match err.kind.as_ref() {
        ErrorKind::InsertMany(failure) => {
            failure.write_errors.as_ref().and_then(|w| w.iter().map(|e| e.index).min())
        }
        _ => None,
    };
    let index = first.map(|i| written + i);
    InsertFailure { inserted: index.unwrap_or(written), index, source: StoreError::Driver(err) }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn list_databases(&self) -> Result<Vec<DatabaseEntry>, StoreError> {
        let names = self.client.list_database_names().await?;
        Ok(names.into_iter().map(DatabaseEntry::new).collect())
    }

    async fn list_collections(&self, database: &str) -> Result<Vec<String>, StoreError> {
        Ok(self.client.database(database).list_collection_names().await?)
    }

    async fn find_all(&self, database: &str, collection: &str) -> Result<Vec<Document>, StoreError> {
        let cursor = self.collection(database, collection).find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert_ordered(
        &self,
        database: &str,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<usize, InsertFailure> {
        let target = self.collection(database, collection);
        let mut written = 0;
        let mut rest = documents;
        while !rest.is_empty() {
            let tail = rest.split_off(rest.len().min(INSERT_CHUNK));
            let chunk = std::mem::replace(&mut rest, tail);
            match target.insert_many(chunk).ordered(true).await {
                Ok(r) => written += r.inserted_ids.len(),
                Err(e) => return Err(insert_failure(e, written)),
            }
        }
        Ok(written)
    }

    async fn drop_collection(&self, database: &str, collection: &str) -> Result<(), StoreError> {
        Ok(self.collection(database, collection).drop().await?)
    }
}
