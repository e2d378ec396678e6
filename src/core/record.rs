//! The record abstraction shared by inventory items and staff members

use crate::core::auth::User;
use crate::core::document::{Document, decode_date_fields};
use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::Validate;

/// A record kind stored in its own collection.
///
/// All records have:
/// - id: store-assigned identifier, never reassigned
/// - created_at: set by the store on insert
/// - updated_at: refreshed by the store on every mutation
///
/// The associated `Draft` and `Patch` types describe the payloads accepted
/// on insert and on partial update. Neither carries the store-managed fields,
/// so callers cannot overwrite them.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Payload accepted when creating a record
    type Draft: DeserializeOwned + Serialize + Validate + Send;

    /// Payload accepted when updating a record; every field optional
    type Patch: DeserializeOwned + Serialize + Validate + Send;

    /// Collection name in the document store (e.g., "inventory")
    fn collection_name() -> &'static str;

    /// Human-readable kind used in response messages (e.g., "Inventory item")
    fn kind_label() -> &'static str;

    /// Fields that must be present and non-empty on insert
    fn required_fields() -> &'static [&'static str];

    /// Fields holding dates, stored as store timestamps
    fn date_fields() -> &'static [&'static str] {
        &[]
    }

    fn id(&self) -> &str;

    /// Display name used by free-text search
    fn name(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;

    fn updated_at(&self) -> DateTime<Utc>;

    /// Add fields derived from the acting user to a new record
    fn stamp_actor(_fields: &mut Map<String, Value>, _actor: &User) {}

    /// Convert a stored document into a record.
    ///
    /// Store timestamps become `createdAt` / `updatedAt`, date fields are
    /// normalised, and absent optional fields take the defaults declared on
    /// the record type.
    fn from_document(doc: Document) -> Result<Self> {
        let Document {
            id,
            mut fields,
            create_time,
            update_time,
        } = doc;

        let created_at = create_time
            .to_datetime()
            .ok_or_else(|| anyhow!("document '{}' has an out-of-range create time", id))?;
        let updated_at = update_time
            .to_datetime()
            .ok_or_else(|| anyhow!("document '{}' has an out-of-range update time", id))?;

        decode_date_fields(&mut fields, Self::date_fields());
        fields.insert("id".into(), Value::String(id.clone()));
        fields.insert("createdAt".into(), Value::String(created_at.to_rfc3339()));
        fields.insert("updatedAt".into(), Value::String(updated_at.to_rfc3339()));

        serde_json::from_value(Value::Object(fields)).map_err(|e| {
            anyhow!(
                "document '{}' does not match {}: {}",
                id,
                Self::collection_name(),
                e
            )
        })
    }
}
