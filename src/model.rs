//! Backup file data model.
//!
//! The JSON field names (`db`, `collection`, `documents`) are the ones every
//! existing backup file uses, so they are part of the file format.

use bson::Document;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Database name → collection names, as chosen by the operator.
pub type Selection = BTreeMap<String, Vec<String>>;

/// Database name → collection names, as reported by the server.
pub type CollectionCatalog = BTreeMap<String, Vec<String>>;

/// One database's selected collections and their documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSet {
    pub db: String,
    pub collections: Vec<CollectionDocuments>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDocuments {
    pub collection: String,
    #[serde(with = "crate::serializer::extjson")]
    pub documents: Vec<Document>,
}

impl DocumentSet {
    pub fn new(db: impl Into<String>) -> Self {
        Self { db: db.into(), collections: Vec::new() }
    }

    pub fn with_collection(mut self, name: impl Into<String>, documents: Vec<Document>) -> Self {
        self.collections.push(CollectionDocuments { collection: name.into(), documents });
        self
    }

    #[must_use]
    pub fn document_count(&self) -> usize {
        self.collections.iter().map(|c| c.documents.len()).sum()
    }

    /// Drops empty collection entries. Returns `None` when nothing is left.
    #[must_use]
    pub fn without_empty(mut self) -> Option<Self> {
        self.collections.retain(|c| !c.documents.is_empty());
        if self.collections.is_empty() { None } else { Some(self) }
    }
}

/// Totals over a sequence of document sets, used in console summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackupStats {
    pub databases: usize,
    pub collections: usize,
    pub documents: usize,
}

impl BackupStats {
    #[must_use]
    pub fn of(data: &[DocumentSet]) -> Self {
        data.iter().fold(Self::default(), |mut acc, set| {
            acc.databases += 1;
            acc.collections += set.collections.len();
            acc.documents += set.document_count();
            acc
        })
    }
}
