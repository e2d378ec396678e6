//! In-memory implementation of DocumentStore for testing and development

use crate::core::document::{Document, StoreTimestamp};
use crate::core::service::DocumentStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

type Collections = HashMap<String, HashMap<String, Document>>;

/// In-memory document store
///
/// Owned and cloneable; clones share the same collections. Each test or run
/// builds its own instance, so there is no process-wide state.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
}

impl InMemoryDocumentStore {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a fully formed document in place, bypassing id and timestamp
    /// assignment. Useful for loading documents written by other clients.
    pub fn put_document(&self, collection: &str, doc: Document) -> Result<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        collections
            .entry(collection.to_string())
            .or_default()
            .insert(doc.id.clone(), doc);
        Ok(())
    }

    /// Number of documents in a collection
    pub fn count(&self, collection: &str) -> Result<usize> {
        let collections = self
            .collections
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(collections.get(collection).map_or(0, HashMap::len))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn backend_name(&self) -> &'static str {
        "in_memory"
    }

    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>> {
        let collections = self
            .collections
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn fetch(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let collections = self
            .collections
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(collections.get(collection).and_then(|docs| docs.get(id)).cloned())
    }

    async fn insert(&self, collection: &str, fields: Map<String, Value>) -> Result<Document> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let now = StoreTimestamp::now();
        let doc = Document {
            id: Uuid::new_v4().to_string(),
            fields,
            create_time: now,
            update_time: now,
        };

        collections
            .entry(collection.to_string())
            .or_default()
            .insert(doc.id.clone(), doc.clone());

        Ok(doc)
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Option<Document>> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(doc) = collections.get_mut(collection).and_then(|docs| docs.get_mut(id)) else {
            return Ok(None);
        };

        doc.fields.extend(fields);
        // Two writes within one clock tick must still order
        doc.update_time = StoreTimestamp::now().max(doc.update_time.next());

        Ok(Some(doc.clone()))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        Ok(collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_equal_timestamps() {
        let store = InMemoryDocumentStore::new();
        let doc = store
            .insert("inventory", fields(json!({"name": "Masks"})))
            .await
            .unwrap();

        assert!(Uuid::parse_str(&doc.id).is_ok());
        assert_eq!(doc.create_time, doc.update_time);
        assert_eq!(doc.fields["name"], "Masks");
    }

    #[tokio::test]
    async fn test_insert_ids_are_unique() {
        let store = InMemoryDocumentStore::new();
        let a = store.insert("staff", Map::new()).await.unwrap();
        let b = store.insert("staff", Map::new()).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.count("staff").unwrap(), 2);
    }

    #[tokio::test]
    async fn test_fetch_unknown_collection_is_empty() {
        let store = InMemoryDocumentStore::new();
        assert!(store.fetch_all("nothing").await.unwrap().is_empty());
        assert!(store.fetch("nothing", "x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_merge_keeps_unsupplied_fields_and_advances_update_time() {
        let store = InMemoryDocumentStore::new();
        let doc = store
            .insert("inventory", fields(json!({"name": "Masks", "quantity": 10})))
            .await
            .unwrap();

        let merged = store
            .merge("inventory", &doc.id, fields(json!({"quantity": 4})))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(merged.fields["name"], "Masks");
        assert_eq!(merged.fields["quantity"], 4);
        assert_eq!(merged.create_time, doc.create_time);
        assert!(merged.update_time > doc.update_time);
    }

    #[tokio::test]
    async fn test_merge_missing_returns_none() {
        let store = InMemoryDocumentStore::new();
        let result = store.merge("inventory", "ghost", Map::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let store = InMemoryDocumentStore::new();
        let doc = store.insert("staff", Map::new()).await.unwrap();

        assert!(store.delete("staff", &doc.id).await.unwrap());
        assert!(!store.delete("staff", &doc.id).await.unwrap());
        assert!(store.fetch("staff", &doc.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clones_share_collections() {
        let store = InMemoryDocumentStore::new();
        let clone = store.clone();
        clone.insert("staff", Map::new()).await.unwrap();
        assert_eq!(store.count("staff").unwrap(), 1);
    }
}
