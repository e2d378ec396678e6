//! Persistence service trait and the record store adapter
//!
//! [`DocumentStore`] is the opaque persistence service: it knows documents,
//! collections and timestamps, nothing about inventory or staff.
//! [`RecordStore`] translates between those documents and typed records and
//! owns payload validation for writes.

use crate::core::auth::User;
use crate::core::document::{Document, encode_date_fields};
use crate::core::error::{AppResult, RecordError, StorageError, ValidationError};
use crate::core::record::Record;
use crate::core::validation::{blanked_required, filters, missing_required, parse_payload};
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::marker::PhantomData;
use std::sync::Arc;

/// The document store backing every collection
///
/// Implementations assign identifiers and both timestamps. Writes are
/// single-document and atomic; nothing here spans documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs and errors (e.g., "in_memory")
    fn backend_name(&self) -> &'static str;

    /// Read every document in a collection
    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>>;

    /// Read one document
    async fn fetch(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Store a new document; the store assigns id, `create_time` and
    /// `update_time` (equal on insert)
    async fn insert(&self, collection: &str, fields: Map<String, Value>) -> Result<Document>;

    /// Merge fields into an existing document and stamp `update_time`
    /// strictly later than before. `None` if the document does not exist.
    async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Option<Document>>;

    /// Delete a document. `false` if it did not exist.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool>;
}

/// Typed access to one collection
///
/// Built without a store when the persistence service failed to
/// initialise; every operation then fails with `StoreUnavailable`.
pub struct RecordStore<R: Record> {
    store: Option<Arc<dyn DocumentStore>>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Clone for RecordStore<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: Record> RecordStore<R> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::from_option(Some(store))
    }

    /// A record store whose persistence service never came up
    pub fn unavailable() -> Self {
        Self::from_option(None)
    }

    pub fn from_option(store: Option<Arc<dyn DocumentStore>>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    fn store(&self) -> Result<&Arc<dyn DocumentStore>, StorageError> {
        self.store.as_ref().ok_or_else(|| {
            tracing::error!(collection = R::collection_name(), "document store is not initialised");
            StorageError::Unavailable {
                backend: "uninitialised".to_string(),
            }
        })
    }

    fn read_failure(err: impl std::fmt::Display) -> StorageError {
        tracing::error!(collection = R::collection_name(), error = %err, "read failed");
        StorageError::ReadFailure {
            collection: R::collection_name().to_string(),
            message: err.to_string(),
        }
    }

    fn write_failure(err: impl std::fmt::Display) -> StorageError {
        tracing::error!(collection = R::collection_name(), error = %err, "write failed");
        StorageError::WriteFailure {
            collection: R::collection_name().to_string(),
            message: err.to_string(),
        }
    }

    fn not_found(id: &str) -> RecordError {
        tracing::warn!(collection = R::collection_name(), id, "record not found");
        RecordError::NotFound {
            collection: R::collection_name().to_string(),
            id: id.to_string(),
        }
    }

    /// Read the whole collection
    ///
    /// A single document that cannot be converted fails the whole read.
    pub async fn fetch_all(&self) -> AppResult<Vec<R>> {
        let docs = self
            .store()?
            .fetch_all(R::collection_name())
            .await
            .map_err(Self::read_failure)?;

        let records = docs
            .into_iter()
            .map(R::from_document)
            .collect::<Result<Vec<R>>>()
            .map_err(Self::read_failure)?;

        Ok(records)
    }

    pub async fn get(&self, id: &str) -> AppResult<R> {
        let doc = self
            .store()?
            .fetch(R::collection_name(), id)
            .await
            .map_err(Self::read_failure)?
            .ok_or_else(|| Self::not_found(id))?;

        Ok(R::from_document(doc).map_err(Self::read_failure)?)
    }

    /// Validate a payload and store it as a new record
    pub async fn insert(&self, mut fields: Map<String, Value>, actor: &User) -> AppResult<R> {
        let store = self.store()?;

        filters::trim_strings(&mut fields);
        let missing = missing_required(&fields, R::required_fields());
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing).into());
        }

        let draft: R::Draft = parse_payload(fields)?;
        let mut fields = to_fields(&draft)?;
        R::stamp_actor(&mut fields, actor);
        encode_date_fields(&mut fields, R::date_fields());

        let doc = store
            .insert(R::collection_name(), fields)
            .await
            .map_err(Self::write_failure)?;

        tracing::info!(
            collection = R::collection_name(),
            id = %doc.id,
            actor = %actor.id,
            "record created"
        );
        Ok(R::from_document(doc).map_err(Self::read_failure)?)
    }

    /// Merge the supplied fields into an existing record
    ///
    /// Unknown and store-managed fields are ignored. Supplied required
    /// fields must not be blank.
    pub async fn update(&self, id: &str, mut fields: Map<String, Value>) -> AppResult<R> {
        let store = self.store()?;

        filters::trim_strings(&mut fields);
        let blanked = blanked_required(&fields, R::required_fields());
        if !blanked.is_empty() {
            return Err(ValidationError::MissingFields(blanked).into());
        }

        let patch: R::Patch = parse_payload(fields)?;
        let mut fields = to_fields(&patch)?;
        encode_date_fields(&mut fields, R::date_fields());

        let doc = store
            .merge(R::collection_name(), id, fields)
            .await
            .map_err(Self::write_failure)?
            .ok_or_else(|| Self::not_found(id))?;

        tracing::info!(collection = R::collection_name(), id, "record updated");
        Ok(R::from_document(doc).map_err(Self::read_failure)?)
    }

    /// Delete a record; absent identifiers are `NotFound`
    pub async fn remove(&self, id: &str) -> AppResult<()> {
        let deleted = self
            .store()?
            .delete(R::collection_name(), id)
            .await
            .map_err(Self::write_failure)?;

        if !deleted {
            return Err(Self::not_found(id).into());
        }

        tracing::info!(collection = R::collection_name(), id, "record deleted");
        Ok(())
    }
}

/// Serialize a typed payload back into the field map sent to the store
fn to_fields<T: Serialize>(payload: &T) -> Result<Map<String, Value>, ValidationError> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(ValidationError::InvalidJson {
            message: "payload did not serialize to an object".to_string(),
        }),
        Err(e) => Err(ValidationError::InvalidJson {
            message: e.to_string(),
        }),
    }
}
