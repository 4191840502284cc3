//! Document store trait.

use async_trait::async_trait;
use serde_json::Value;

use super::path::{CollectionPath, DocumentPath};
use crate::error::Result;

/// An abstract persisted document store.
///
/// This trait decouples the managers from the specific backend (managed cloud
/// database, local JSON files, in-memory map). Documents are JSON objects.
///
/// # Implementation Notes
///
/// - `set` replaces the whole document (last write wins)
/// - `merge` shallow-merges top-level fields, creating the document if missing
/// - `delete` of a missing document is not an error
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads a document.
    ///
    /// - `Ok(Some(value))`: document found
    /// - `Ok(None)`: document does not exist
    async fn get(&self, path: &DocumentPath) -> Result<Option<Value>>;

    /// Writes a whole document, replacing any previous content.
    async fn set(&self, path: &DocumentPath, document: Value) -> Result<()>;

    /// Merges top-level fields into a document.
    async fn merge(&self, path: &DocumentPath, fields: Value) -> Result<()>;

    /// Deletes a document.
    async fn delete(&self, path: &DocumentPath) -> Result<()>;

    /// Lists `(id, document)` pairs of a collection, sorted by id.
    async fn list(&self, collection: &CollectionPath) -> Result<Vec<(String, Value)>>;
}
