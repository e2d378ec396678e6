//! Axum extractor for JSON object payloads
//!
//! Record payloads must be JSON objects. This extractor rejects anything
//! else with the standard error envelope instead of axum's plain-text
//! rejection.

use crate::core::error::{AppError, ValidationError};
use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde_json::{Map, Value};

/// A request body that parsed as a JSON object
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_item(JsonObject(fields): JsonObject) -> AppResult<Json<Value>> {
///     // fields is a serde_json::Map
/// }
/// ```
pub struct JsonObject(pub Map<String, Value>);

impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload): Json<Value> = Json::from_request(req, state)
            .await
            .map_err(|e| ValidationError::InvalidJson {
                message: e.body_text(),
            })?;

        match payload {
            Value::Object(fields) => Ok(JsonObject(fields)),
            _ => Err(ValidationError::InvalidJson {
                message: "expected a JSON object".to_string(),
            }
            .into()),
        }
    }
}
