//! Payload filters
//!
//! These transform incoming field values before validation

use serde_json::{Map, Value};

/// Filter: trim whitespace from every top-level string field
pub fn trim_strings(fields: &mut Map<String, Value>) {
    for value in fields.values_mut() {
        if let Value::String(s) = value {
            let trimmed = s.trim();
            if trimmed.len() != s.len() {
                *s = trimmed.to_string();
            }
        }
    }
}
