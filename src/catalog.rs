//! Database and collection enumeration, plus the choice lists shown to the operator.

use futures::future::try_join_all;

use crate::errors::BackupError;
use crate::model::CollectionCatalog;
use crate::store::{DatabaseEntry, DocumentStore};

/// Databases the server uses for its own bookkeeping.
pub const SYSTEM_DATABASES: [&str; 3] = ["admin", "config", "local"];

#[must_use]
pub fn is_system_database(name: &str) -> bool {
    SYSTEM_DATABASES.contains(&name)
}

/// List every database, freshly, on each call.
///
/// # Errors
/// Returns `Enumeration` when the server refuses the listing.
pub async fn list_databases<S: DocumentStore + ?Sized>(store: &S) -> Result<Vec<DatabaseEntry>, BackupError> {
    let entries = store
        .list_databases()
        .await
        .map_err(|source| BackupError::Enumeration { what: "databases".into(), source })?;
    log::debug!("list_databases: {} entries", entries.len());
    Ok(entries)
}

/// One `listCollections` per database, issued concurrently. Any failure is fatal.
///
/// # Errors
/// Returns `Enumeration` naming the first database whose listing failed.
pub async fn list_collections<S: DocumentStore + ?Sized>(
    store: &S,
    databases: &[String],
) -> Result<CollectionCatalog, BackupError> {
    let listings = try_join_all(databases.iter().map(|db| async move {
        store
            .list_collections(db)
            .await
            .map(|names| (db.clone(), names))
            .map_err(|source| BackupError::Enumeration { what: format!("collections of {db}"), source })
    }))
    .await?;
    Ok(listings.into_iter().collect())
}

/// Which interactive flow a choice list is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Backup,
    Purge,
    Restore,
}

/// One selectable line in a multi-select prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub name: String,
    pub checked: bool,
    pub disabled: bool,
}

impl Choice {
    pub fn new(name: impl Into<String>, checked: bool, disabled: bool) -> Self {
        Self { name: name.into(), checked, disabled }
    }
}

/// Sorted database choices.
///
/// System databases are listed unchecked for backups and disabled for purges.
#[must_use]
pub fn database_choices<'a, I>(names: I, flow: Flow) -> Vec<Choice>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut names: Vec<&str> = names.into_iter().collect();
    names.sort_unstable();
    names.dedup();
    names
        .into_iter()
        .map(|name| {
            let system = is_system_database(name);
            match flow {
                Flow::Backup => Choice::new(name, !system, false),
                Flow::Purge => Choice::new(name, false, system),
                Flow::Restore => Choice::new(name, true, false),
            }
        })
        .collect()
}

/// Sorted collection choices, all pre-checked.
#[must_use]
pub fn collection_choices(names: &[String]) -> Vec<Choice> {
    let mut sorted: Vec<&String> = names.iter().collect();
    sorted.sort_unstable();
    sorted.into_iter().map(|n| Choice::new(n.as_str(), true, false)).collect()
}
