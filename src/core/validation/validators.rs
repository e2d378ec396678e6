//! Reusable field validators
//!
//! Presence checks run on the raw JSON payload so that every missing field
//! can be named at once. Format and range checks run afterwards on the typed
//! payload through the `validator` crate.

use crate::core::error::{FieldValidationError, ValidationError};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use validator::{Validate, ValidationErrors};

/// True when a value counts as "not supplied"
///
/// `null`, the empty string and whitespace-only strings are empty. Numbers,
/// including zero, and booleans are never empty.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Required fields that are absent or empty, in declaration order
pub fn missing_required(fields: &Map<String, Value>, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|name| fields.get(**name).is_none_or(is_empty_value))
        .map(|name| name.to_string())
        .collect()
}

/// Required fields that are supplied but empty
///
/// Used on partial updates, where absence means "leave unchanged" but an
/// explicit blank would wipe a required value.
pub fn blanked_required(fields: &Map<String, Value>, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|name| fields.get(**name).is_some_and(is_empty_value))
        .map(|name| name.to_string())
        .collect()
}

/// Deserialize a payload into its typed form and run its validators
pub fn parse_payload<T>(fields: Map<String, Value>) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    let typed: T = serde_json::from_value(Value::Object(fields)).map_err(|e| {
        ValidationError::InvalidJson {
            message: e.to_string(),
        }
    })?;
    typed.validate().map_err(field_errors)?;
    Ok(typed)
}

/// Flatten `validator` errors into our field error list
pub fn field_errors(errors: ValidationErrors) -> ValidationError {
    let mut list: Vec<FieldValidationError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter()
                .map(|e| FieldValidationError {
                    field: camel_case(&field),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
                .collect::<Vec<_>>()
        })
        .collect();
    list.sort_by(|a, b| a.field.cmp(&b.field));
    ValidationError::FieldErrors(list)
}

/// Payload keys are camelCase; validator reports Rust field names
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Validator: contact number looks like a phone number
///
/// Digits with an optional leading `+`, spaces or dashes as separators,
/// 7 to 15 digits in total.
pub fn contact_number(value: &str) -> Result<(), validator::ValidationError> {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PHONE_REGEX.get_or_init(|| {
        Regex::new(r"^\+?[0-9][0-9 \-]*[0-9]$").expect("phone regex is valid")
    });

    let digits = value.chars().filter(char::is_ascii_digit).count();
    if regex.is_match(value.trim()) && (7..=15).contains(&digits) {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("contact_number");
        err.message = Some("must be a phone number of 7 to 15 digits".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn test_missing_required_lists_absent_and_blank() {
        let fields = map(json!({"name": "Masks", "unit": "  ", "location": null}));
        let missing = missing_required(&fields, &["name", "location", "unit", "purpose"]);
        assert_eq!(missing, vec!["location", "unit", "purpose"]);
    }

    #[test]
    fn test_zero_counts_as_present() {
        let fields = map(json!({"quantity": 0}));
        assert!(missing_required(&fields, &["quantity"]).is_empty());
    }

    #[test]
    fn test_blanked_required_ignores_absent() {
        let fields = map(json!({"name": "", "email": "a@b.org"}));
        let blank = blanked_required(&fields, &["name", "location", "email"]);
        assert_eq!(blank, vec!["name"]);
    }

    #[test]
    fn test_contact_number_accepts_common_shapes() {
        assert!(contact_number("+91-9876543210").is_ok());
        assert!(contact_number("9876543210").is_ok());
        assert!(contact_number("+44 20 7946 0958").is_ok());
    }

    #[test]
    fn test_contact_number_rejects_garbage() {
        assert!(contact_number("call me").is_err());
        assert!(contact_number("12345").is_err());
        assert!(contact_number("+1-").is_err());
    }

    #[test]
    fn test_camel_case_field_names() {
        assert_eq!(camel_case("contact_number"), "contactNumber");
        assert_eq!(camel_case("min_stock_level"), "minStockLevel");
        assert_eq!(camel_case("email"), "email");
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Sample {
        #[validate(email)]
        email: String,
        #[validate(range(min = 0.0))]
        cost: f64,
    }

    #[test]
    fn test_parse_payload_reports_type_errors() {
        let result = parse_payload::<Sample>(map(json!({"email": "a@b.org", "cost": "free"})));
        assert!(matches!(result, Err(ValidationError::InvalidJson { .. })));
    }

    #[test]
    fn test_parse_payload_reports_every_invalid_field() {
        let result = parse_payload::<Sample>(map(json!({"email": "nope", "cost": -1.0})));
        match result {
            Err(ValidationError::FieldErrors(errors)) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["cost", "email"]);
            }
            other => panic!("expected field errors, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_payload_accepts_valid() {
        let sample =
            parse_payload::<Sample>(map(json!({"email": "a@b.org", "cost": 2.5}))).unwrap();
        assert_eq!(sample.email, "a@b.org");
        assert_eq!(sample.cost, 2.5);
    }
}
