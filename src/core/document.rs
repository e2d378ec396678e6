//! The persistence service's native document shape
//!
//! Documents carry a free-form field map plus two store-managed timestamps.
//! Dates inside the field map are written as `{ "seconds": .., "nanos": .. }`
//! objects, the same shape the store uses for its own timestamps.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};

/// A point in time as the document store represents it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreTimestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl StoreTimestamp {
    /// The current instant
    pub fn now() -> Self {
        Utc::now().into()
    }

    /// Convert to a chrono date-time, if the value is in range
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.seconds, self.nanos)
    }

    /// The smallest timestamp strictly after `self`
    pub fn next(self) -> Self {
        if self.nanos >= 999_999_999 {
            Self {
                seconds: self.seconds + 1,
                nanos: 0,
            }
        } else {
            Self {
                seconds: self.seconds,
                nanos: self.nanos + 1,
            }
        }
    }

    /// Encode as a field value inside a document
    pub fn to_value(self) -> Value {
        json!({ "seconds": self.seconds, "nanos": self.nanos })
    }

    /// Decode a field value written by [`StoreTimestamp::to_value`]
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let seconds = obj.get("seconds")?.as_i64()?;
        let nanos = obj.get("nanos").and_then(Value::as_u64).unwrap_or(0);
        Some(Self {
            seconds,
            nanos: u32::try_from(nanos).ok()?,
        })
    }
}

impl From<DateTime<Utc>> for StoreTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self {
            seconds: dt.timestamp(),
            nanos: dt.timestamp_subsec_nanos(),
        }
    }
}

/// A stored document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store-assigned identifier, unique within the collection
    pub id: String,
    /// User-supplied fields
    pub fields: Map<String, Value>,
    /// Set once by the store on insert
    pub create_time: StoreTimestamp,
    /// Set by the store on insert and on every merge
    pub update_time: StoreTimestamp,
}

/// Parse a date the way records accept them on input
///
/// Accepts RFC 3339 date-times and bare `YYYY-MM-DD` dates (taken as
/// midnight UTC).
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Decode any accepted date representation to a date-time
///
/// Stored documents may hold either a store timestamp object or a string,
/// depending on which client wrote them.
pub fn decode_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date(s),
        Value::Object(_) => StoreTimestamp::from_value(value)?.to_datetime(),
        _ => None,
    }
}

/// Rewrite the named date fields into store timestamps before a write
pub fn encode_date_fields(fields: &mut Map<String, Value>, names: &[&str]) {
    for name in names {
        if let Some(value) = fields.get_mut(*name)
            && let Some(dt) = decode_date(value)
        {
            *value = StoreTimestamp::from(dt).to_value();
        }
    }
}

/// Rewrite the named date fields into RFC 3339 strings after a read
///
/// Values that are not a recognisable date are left untouched so that
/// deserialization reports them.
pub fn decode_date_fields(fields: &mut Map<String, Value>, names: &[&str]) {
    for name in names {
        if let Some(value) = fields.get_mut(*name)
            && let Some(dt) = decode_date(value)
        {
            *value = Value::String(dt.to_rfc3339());
        }
    }
}

/// Serde helper: deserialize a date from any accepted input shape
pub fn deserialize_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    decode_date(&value).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "invalid date {}, expected YYYY-MM-DD or RFC 3339",
            value
        ))
    })
}

/// Serde helper: optional variant of [`deserialize_date`]; `null` is `None`
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    decode_date(&value).map(Some).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "invalid date {}, expected YYYY-MM-DD or RFC 3339",
            value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn test_parse_bare_date_is_midnight_utc() {
        let dt = parse_date("2024-12-31").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 12);
        assert_eq!(dt.day(), 31);
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let dt = parse_date("2025-06-30T10:00:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 6, 30, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert!(parse_date("next week").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_store_timestamp_value_shape() {
        let ts = StoreTimestamp {
            seconds: 1_700_000_000,
            nanos: 42,
        };
        let value = ts.to_value();
        assert_eq!(value["seconds"], 1_700_000_000i64);
        assert_eq!(StoreTimestamp::from_value(&value), Some(ts));
    }

    #[test]
    fn test_next_is_strictly_later() {
        let ts = StoreTimestamp {
            seconds: 10,
            nanos: 999_999_999,
        };
        assert!(ts.next() > ts);
        assert_eq!(ts.next().seconds, 11);
    }

    #[test]
    fn test_date_fields_encode_then_decode() {
        let mut fields = Map::new();
        fields.insert("expiryDate".into(), json!("2026-12-31"));
        fields.insert("name".into(), json!("Masks"));

        encode_date_fields(&mut fields, &["expiryDate"]);
        assert!(fields["expiryDate"].is_object());
        assert_eq!(fields["name"], "Masks");

        decode_date_fields(&mut fields, &["expiryDate"]);
        let decoded = parse_date(fields["expiryDate"].as_str().unwrap()).unwrap();
        assert_eq!(decoded, Utc.with_ymd_and_hms(2026, 12, 31, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_unrecognised_date_left_alone() {
        let mut fields = Map::new();
        fields.insert("expiryDate".into(), json!(12));
        decode_date_fields(&mut fields, &["expiryDate"]);
        assert_eq!(fields["expiryDate"], 12);
    }
}
