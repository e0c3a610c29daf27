//! In-process [`DocumentStore`] with `_id` uniqueness and failure injection.

use async_trait::async_trait;
use bson::{Bson, Document, oid::ObjectId};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::{DatabaseEntry, DocumentStore, InsertFailure};
use crate::errors::StoreError;

type Namespace = (String, String);

#[derive(Default)]
struct Inner {
    databases: BTreeMap<String, BTreeMap<String, Vec<Document>>>,
    fail_find: HashSet<Namespace>,
    fail_drop: HashSet<Namespace>,
    fail_list: HashSet<String>,
    fail_insert: HashMap<Namespace, usize>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

fn ns(database: &str, collection: &str) -> Namespace {
    (database.to_string(), collection.to_string())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a collection; an empty `documents` creates an empty collection.
    #[must_use]
    pub fn with_collection(self, database: &str, collection: &str, documents: Vec<Document>) -> Self {
        self.inner
            .lock()
            .databases
            .entry(database.to_string())
            .or_default()
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
        self
    }

    #[must_use]
    pub fn fail_find_on(self, database: &str, collection: &str) -> Self {
        self.inner.lock().fail_find.insert(ns(database, collection));
        self
    }

    #[must_use]
    pub fn fail_drop_on(self, database: &str, collection: &str) -> Self {
        self.inner.lock().fail_drop.insert(ns(database, collection));
        self
    }

    /// Writes `written` documents of the next insert, then fails without
    /// reporting which document broke the batch.
    #[must_use]
    pub fn fail_insert_after(self, database: &str, collection: &str, written: usize) -> Self {
        self.inner.lock().fail_insert.insert(ns(database, collection), written);
        self
    }

    #[must_use]
    pub fn fail_list_on(self, database: &str) -> Self {
        self.inner.lock().fail_list.insert(database.to_string());
        self
    }

    pub fn documents(&self, database: &str, collection: &str) -> Vec<Document> {
        self.inner
            .lock()
            .databases
            .get(database)
            .and_then(|d| d.get(collection))
            .cloned()
            .unwrap_or_default()
    }

    pub fn has_collection(&self, database: &str, collection: &str) -> bool {
        self.inner.lock().databases.get(database).is_some_and(|d| d.contains_key(collection))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_databases(&self) -> Result<Vec<DatabaseEntry>, StoreError> {
        Ok(self.inner.lock().databases.keys().map(DatabaseEntry::new).collect())
    }

    async fn list_collections(&self, database: &str) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock();
        if inner.fail_list.contains(database) {
            return Err(StoreError::Rejected(format!("listCollections failed on {database}")));
        }
        Ok(inner.databases.get(database).map(|d| d.keys().cloned().collect()).unwrap_or_default())
    }

    async fn find_all(&self, database: &str, collection: &str) -> Result<Vec<Document>, StoreError> {
        let inner = self.inner.lock();
        if inner.fail_find.contains(&ns(database, collection)) {
            return Err(StoreError::Rejected(format!("find failed on {database}.{collection}")));
        }
        Ok(inner
            .databases
            .get(database)
            .and_then(|d| d.get(collection))
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_ordered(
        &self,
        database: &str,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<usize, InsertFailure> {
        let mut inner = self.inner.lock();
        let cutoff = inner.fail_insert.remove(&ns(database, collection));
        let target = inner
            .databases
            .entry(database.to_string())
            .or_default()
            .entry(collection.to_string())
            .or_default();
        let total = documents.len();
        for (index, mut doc) in documents.into_iter().enumerate() {
            if cutoff == Some(index) {
                return Err(InsertFailure {
                    inserted: index,
                    index: None,
                    source: StoreError::Rejected("connection lost during insert".into()),
                });
            }
            let id = match doc.get("_id") {
                Some(id) => id.clone(),
                None => {
                    let id = Bson::ObjectId(ObjectId::new());
                    doc.insert("_id", id.clone());
                    id
                }
            };
            if target.iter().any(|d| d.get("_id") == Some(&id)) {
                return Err(InsertFailure {
                    inserted: index,
                    index: Some(index),
                    source: StoreError::DuplicateKey(id.to_string()),
                });
            }
            target.push(doc);
        }
        Ok(total)
    }

    async fn drop_collection(&self, database: &str, collection: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.fail_drop.contains(&ns(database, collection)) {
            return Err(StoreError::Rejected(format!("drop failed on {database}.{collection}")));
        }
        if let Some(db) = inner.databases.get_mut(database) {
            db.remove(collection);
            if db.is_empty() {
                inner.databases.remove(database);
            }
        }
        Ok(())
    }
}
