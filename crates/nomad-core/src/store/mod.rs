//! Persisted document store contract.
//!
//! The managed document database is treated as an opaque key-value store of
//! JSON documents addressed by `collection/id/collection/id...` paths.
//!
//! - `path`: typed collection and document paths
//! - `repository`: the `DocumentStore` adapter trait

mod path;
mod repository;

pub use path::{CollectionPath, DocumentPath};
pub use repository::DocumentStore;
