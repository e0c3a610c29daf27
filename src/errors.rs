use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a [`crate::store::DocumentStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Driver(#[from] mongodb::error::Error),

    #[error("duplicate key on _id: {0}")]
    DuplicateKey(String),

    #[error("namespace not found: {0}")]
    NamespaceNotFound(String),

    #[error("{0}")]
    Rejected(String),
}

/// Problems with the shape, suffix or envelope of a backup file.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error(
        "{} looks encrypted; decrypt it first with `mongoba decrypt`",
        .0.display()
    )]
    EncryptedInput(PathBuf),

    #[error(
        "{} is not a backup file; the file extension must be \".json\"",
        .0.display()
    )]
    NotJson(PathBuf),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("encrypted payload is not valid hex text")]
    InvalidHex,

    #[error("encrypted payload header is malformed: {0}")]
    BadHeader(&'static str),
}

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("failed to connect to MongoDB server: {0}")]
    Connection(#[source] StoreError),

    #[error("invalid connection settings: {0}")]
    InvalidConnection(String),

    #[error("failed to list {what}: {source}")]
    Enumeration {
        what: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to fetch {database}.{collection}: {source}")]
    Fetch {
        database: String,
        collection: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to insert into {database}.{collection}: {source}")]
    Insert {
        database: String,
        collection: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to drop {database}.{collection}: {source}")]
    Purge {
        database: String,
        collection: String,
        #[source]
        source: StoreError,
    },

    #[error("'{0}' is a system database and cannot be purged")]
    ReservedDatabase(String),

    #[error("file already exists: {}", .0.display())]
    FileExists(PathBuf),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("decryption failed: wrong password or corrupted file")]
    Decryption,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("prompt error: {0}")]
    Prompt(String),

    #[error("invalid stage transition: {0}")]
    Stage(String),
}
