//! Interactive backup, restore and purge for MongoDB deployments.
//!
//! The core is a data-flow pipeline: enumerate → select → fetch → serialize →
//! [encrypt] → persist, and its inverse. Every server interaction goes through
//! [`store::DocumentStore`]; the interactive shell in [`cli`] only gathers
//! answers and hands resolved selections to [`pipeline`].

pub mod catalog;
pub mod cli;
pub mod config;
pub mod connection;
pub mod crypto;
pub mod errors;
pub mod fetch;
pub mod fsutil;
pub mod logger;
pub mod model;
pub mod paths;
pub mod pipeline;
pub mod purge;
pub mod restore;
pub mod serializer;
pub mod store;

pub use errors::BackupError;
pub use model::{CollectionDocuments, DocumentSet, Selection};
pub use store::{DocumentStore, MemoryStore, MongoStore};
