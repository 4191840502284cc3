//! In-memory `DocumentStore`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use nomad_core::error::{NomadError, Result};
use nomad_core::store::{CollectionPath, DocumentPath, DocumentStore};
use serde_json::Value;
use tokio::sync::RwLock;

/// Document store backed by a map, for development and tests.
///
/// Keeps a count of write operations (`set`, `merge`, `delete`) so callers can
/// check that nothing was persisted.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<BTreeMap<DocumentPath, Value>>,
    writes: AtomicUsize,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of write operations received so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Value>> {
        Ok(self.documents.read().await.get(path).cloned())
    }

    async fn set(&self, path: &DocumentPath, document: Value) -> Result<()> {
        self.record_write();
        self.documents.write().await.insert(path.clone(), document);
        Ok(())
    }

    async fn merge(&self, path: &DocumentPath, fields: Value) -> Result<()> {
        self.record_write();
        let Value::Object(fields) = fields else {
            return Err(NomadError::validation("merge expects a JSON object"));
        };

        let mut documents = self.documents.write().await;
        let entry = documents
            .entry(path.clone())
            .or_insert_with(|| Value::Object(Default::default()));
        match entry {
            Value::Object(existing) => existing.extend(fields),
            other => *other = Value::Object(fields),
        }
        Ok(())
    }

    async fn delete(&self, path: &DocumentPath) -> Result<()> {
        self.record_write();
        self.documents.write().await.remove(path);
        Ok(())
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<(String, Value)>> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|(path, _)| &path.parent() == collection)
            .map(|(path, doc)| (path.id().to_string(), doc.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chats(uid: &str) -> CollectionPath {
        CollectionPath::root("users").doc(uid).collection("chats")
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryDocumentStore::new();
        let path = chats("u1").doc("c1");

        assert!(store.get(&path).await.unwrap().is_none());
        store.set(&path, json!({"title": "Bali"})).await.unwrap();
        assert_eq!(store.get(&path).await.unwrap(), Some(json!({"title": "Bali"})));

        store.delete(&path).await.unwrap();
        assert!(store.get(&path).await.unwrap().is_none());
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn test_merge_keeps_other_fields() {
        let store = MemoryDocumentStore::new();
        let path = chats("u1").doc("c1");
        store
            .set(&path, json!({"title": "Bali", "destinations": []}))
            .await
            .unwrap();
        store
            .merge(&path, json!({"destinations": [{"id": "1"}]}))
            .await
            .unwrap();

        let doc = store.get(&path).await.unwrap().unwrap();
        assert_eq!(doc["title"], "Bali");
        assert_eq!(doc["destinations"][0]["id"], "1");
    }

    #[tokio::test]
    async fn test_list_only_direct_children() {
        let store = MemoryDocumentStore::new();
        store.set(&chats("u1").doc("b"), json!({})).await.unwrap();
        store.set(&chats("u1").doc("a"), json!({})).await.unwrap();
        store.set(&chats("u2").doc("c"), json!({})).await.unwrap();
        store
            .set(&CollectionPath::root("users").doc("u1"), json!({}))
            .await
            .unwrap();

        let ids: Vec<_> = store
            .list(&chats("u1"))
            .await
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
