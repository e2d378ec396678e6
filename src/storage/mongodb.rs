//! MongoDB storage backend using the official MongoDB async driver.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag:
//! ```toml
//! [dependencies]
//! medstock = { version = "0.1", features = ["mongodb_backend"] }
//! ```
//!
//! # Storage model
//!
//! One MongoDB collection per record collection ("inventory", "staff").
//! The store-assigned identifier is a UUID string kept in `_id`. The two
//! store timestamps live in `_create_time` / `_update_time` as
//! `{seconds, nanos}` sub-documents, the same shape date fields use, so
//! nanosecond ordering survives the round trip.

use crate::core::document::{Document as StoredDocument, StoreTimestamp};
use crate::core::service::DocumentStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::{Client, Database};
use serde_json::{Map, Value};
use uuid::Uuid;

const CREATE_TIME: &str = "_create_time";
const UPDATE_TIME: &str = "_update_time";

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a JSON field map into a BSON document
fn fields_to_document(fields: Map<String, Value>) -> Result<Document> {
    match mongodb::bson::to_bson(&Value::Object(fields))
        .map_err(|e| anyhow!("Failed to convert JSON to BSON: {}", e))?
    {
        Bson::Document(d) => Ok(d),
        _ => Err(anyhow!("Expected BSON document, got non-object")),
    }
}

fn timestamp_bson(ts: StoreTimestamp) -> Bson {
    Bson::Document(doc! { "seconds": ts.seconds, "nanos": i64::from(ts.nanos) })
}

fn take_timestamp(fields: &mut Map<String, Value>, key: &str, id: &str) -> Result<StoreTimestamp> {
    fields
        .remove(key)
        .as_ref()
        .and_then(StoreTimestamp::from_value)
        .ok_or_else(|| anyhow!("Document '{}' has no valid {}", id, key))
}

/// Convert a BSON document back into the store's document shape
fn document_to_stored(mut doc: Document) -> Result<StoredDocument> {
    let id = match doc.remove("_id") {
        Some(Bson::String(s)) => s,
        Some(other) => other.to_string(),
        None => return Err(anyhow!("Document without _id")),
    };

    let mut fields = match Bson::Document(doc).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => return Err(anyhow!("Document '{}' is not an object", id)),
    };

    let create_time = take_timestamp(&mut fields, CREATE_TIME, &id)?;
    let update_time = take_timestamp(&mut fields, UPDATE_TIME, &id)?;

    Ok(StoredDocument {
        id,
        fields,
        create_time,
        update_time,
    })
}

// ---------------------------------------------------------------------------
// MongoDocumentStore
// ---------------------------------------------------------------------------

/// Document store backed by MongoDB.
///
/// # Example
///
/// ```rust,ignore
/// use medstock::storage::MongoDocumentStore;
///
/// let store = MongoDocumentStore::connect("mongodb://localhost:27017", "medstock").await?;
/// ```
#[derive(Clone, Debug)]
pub struct MongoDocumentStore {
    database: Database,
}

impl MongoDocumentStore {
    /// Create a new `MongoDocumentStore` with the given database handle.
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Build a client from a connection string and select a database.
    ///
    /// The driver connects lazily, so this only fails on a malformed URI.
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| anyhow!("Failed to create MongoDB client: {}", e))?;
        Ok(Self::new(client.database(database)))
    }

    /// Get a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.database
    }

    fn collection(&self, name: &str) -> mongodb::Collection<Document> {
        self.database.collection(name)
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    async fn fetch_all(&self, collection: &str) -> Result<Vec<StoredDocument>> {
        let cursor = self
            .collection(collection)
            .find(doc! {})
            .await
            .map_err(|e| anyhow!("Failed to list documents: {}", e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect documents: {}", e))?;

        docs.into_iter().map(document_to_stored).collect()
    }

    async fn fetch(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>> {
        let doc = self
            .collection(collection)
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| anyhow!("Failed to get document: {}", e))?;

        doc.map(document_to_stored).transpose()
    }

    async fn insert(&self, collection: &str, fields: Map<String, Value>) -> Result<StoredDocument> {
        let id = Uuid::new_v4().to_string();
        let now = StoreTimestamp::now();

        let mut doc = fields_to_document(fields)?;
        doc.insert("_id", id.clone());
        doc.insert(CREATE_TIME, timestamp_bson(now));
        doc.insert(UPDATE_TIME, timestamp_bson(now));

        self.collection(collection)
            .insert_one(doc.clone())
            .await
            .map_err(|e| anyhow!("Failed to insert document: {}", e))?;

        document_to_stored(doc)
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Option<StoredDocument>> {
        let Some(current) = self.fetch(collection, id).await? else {
            return Ok(None);
        };

        let mut set = fields_to_document(fields)?;
        set.insert(
            UPDATE_TIME,
            timestamp_bson(StoreTimestamp::now().max(current.update_time.next())),
        );

        let result = self
            .collection(collection)
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await
            .map_err(|e| anyhow!("Failed to update document: {}", e))?;

        if result.matched_count == 0 {
            return Ok(None);
        }

        self.fetch(collection, id).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let result = self
            .collection(collection)
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| anyhow!("Failed to delete document: {}", e))?;

        Ok(result.deleted_count > 0)
    }
}
