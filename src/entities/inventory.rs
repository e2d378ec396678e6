//! Medical inventory items

use crate::core::auth::User;
use crate::core::document::{deserialize_date, deserialize_optional_date};
use crate::core::error::ValidationError;
use crate::core::field::FieldValue;
use crate::core::query::{ListParams, Queryable, contains_ignore_case};
use crate::core::record::Record;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Inventory category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Medicine,
    Equipment,
    Supplies,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Medicine => "medicine",
            Category::Equipment => "equipment",
            Category::Supplies => "supplies",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "medicine" => Ok(Category::Medicine),
            "equipment" => Ok(Category::Equipment),
            "supplies" => Ok(Category::Supplies),
            _ => Err(ValidationError::invalid_parameter(
                "category",
                format!("'{}' is not one of medicine, equipment, supplies", s),
            )),
        }
    }
}

/// An inventory item as stored and returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub cost: f64,
    pub location: String,
    pub expiry_date: DateTime<Utc>,
    pub purpose: String,
    pub category: Category,
    #[serde(default)]
    pub min_stock_level: u32,
    pub unit: String,
    #[serde(default)]
    pub donor: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: String,
}

/// Where an item stands relative to its expiry date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStatus {
    Expired,
    Expiring,
    Fresh,
}

impl InventoryItem {
    /// Stock at or below the minimum level. Derived, never stored.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_stock_level
    }

    /// A window reaching past the representable range covers every
    /// future date.
    pub fn expiry_status(&self, now: DateTime<Utc>, window: Duration) -> ExpiryStatus {
        if self.expiry_date < now {
            return ExpiryStatus::Expired;
        }
        match now.checked_add_signed(window) {
            Some(horizon) if self.expiry_date >= horizon => ExpiryStatus::Fresh,
            _ => ExpiryStatus::Expiring,
        }
    }

    pub fn total_value(&self) -> f64 {
        f64::from(self.quantity) * self.cost
    }
}

/// Payload accepted by `POST /api/inventory`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryItem {
    pub name: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub cost: Option<f64>,
    pub location: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub expiry_date: DateTime<Utc>,
    pub purpose: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_stock_level: Option<u32>,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donor: Option<String>,
}

/// Payload accepted by `PUT /api/inventory/{id}`
///
/// Only supplied fields are serialized, so only they are merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InventoryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_stock_level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donor: Option<String>,
}

impl Record for InventoryItem {
    type Draft = NewInventoryItem;
    type Patch = InventoryPatch;

    fn collection_name() -> &'static str {
        "inventory"
    }

    fn kind_label() -> &'static str {
        "Inventory item"
    }

    fn required_fields() -> &'static [&'static str] {
        &[
            "name",
            "quantity",
            "location",
            "expiryDate",
            "purpose",
            "category",
            "unit",
        ]
    }

    fn date_fields() -> &'static [&'static str] {
        &["expiryDate"]
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn stamp_actor(fields: &mut Map<String, Value>, actor: &User) {
        fields.insert("createdBy".into(), Value::String(actor.id.clone()));
    }
}

/// Sortable inventory fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InventorySortField {
    Name,
    Quantity,
    Cost,
    Location,
    ExpiryDate,
    Purpose,
    Category,
    MinStockLevel,
    Unit,
    Donor,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl FromStr for InventorySortField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "name" => Self::Name,
            "quantity" => Self::Quantity,
            "cost" => Self::Cost,
            "location" => Self::Location,
            "expiryDate" => Self::ExpiryDate,
            "purpose" => Self::Purpose,
            "category" => Self::Category,
            "minStockLevel" => Self::MinStockLevel,
            "unit" => Self::Unit,
            "donor" => Self::Donor,
            "createdAt" => Self::CreatedAt,
            "updatedAt" => Self::UpdatedAt,
            other => {
                return Err(ValidationError::invalid_parameter(
                    "sortBy",
                    format!("'{}' is not a sortable inventory field", other),
                ));
            }
        })
    }
}

/// Active inventory list filters
#[derive(Debug, Clone, Default)]
pub struct InventoryFilter {
    pub search: Option<String>,
    pub category: Option<Category>,
    pub location: Option<String>,
}

impl Queryable for InventoryItem {
    type Filter = InventoryFilter;
    type SortField = InventorySortField;

    fn filter_from(params: &ListParams) -> Result<Self::Filter, ValidationError> {
        Ok(InventoryFilter {
            search: params.search().map(str::to_string),
            category: params.category().map(str::parse).transpose()?,
            location: params.location().map(str::to_string),
        })
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.search.as_deref().is_none_or(|needle| {
            contains_ignore_case(&self.name, needle) || contains_ignore_case(&self.location, needle)
        }) && filter.category.is_none_or(|c| self.category == c)
            && filter
                .location
                .as_deref()
                .is_none_or(|needle| contains_ignore_case(&self.location, needle))
    }

    fn sort_value(&self, field: Self::SortField) -> FieldValue {
        match field {
            InventorySortField::Name => self.name.as_str().into(),
            InventorySortField::Quantity => self.quantity.into(),
            InventorySortField::Cost => self.cost.into(),
            InventorySortField::Location => self.location.as_str().into(),
            InventorySortField::ExpiryDate => self.expiry_date.into(),
            InventorySortField::Purpose => self.purpose.as_str().into(),
            InventorySortField::Category => self.category.as_str().into(),
            InventorySortField::MinStockLevel => self.min_stock_level.into(),
            InventorySortField::Unit => self.unit.as_str().into(),
            InventorySortField::Donor => self.donor.as_str().into(),
            InventorySortField::CreatedAt => self.created_at.into(),
            InventorySortField::UpdatedAt => self.updated_at.into(),
        }
    }
}

/// Demo inventory used to seed a fresh store
pub fn demo_fixtures() -> Vec<Map<String, Value>> {
    [
        json!({
            "name": "Paracetamol 500mg",
            "quantity": 50,
            "cost": 2.5,
            "location": "Medical Store A",
            "expiryDate": "2024-12-31",
            "purpose": "Pain relief",
            "category": "medicine",
            "minStockLevel": 20,
            "unit": "tablets"
        }),
        json!({
            "name": "Surgical Masks",
            "quantity": 200,
            "cost": 1.0,
            "location": "Medical Store B",
            "expiryDate": "2025-06-30",
            "purpose": "Protection",
            "category": "supplies",
            "minStockLevel": 100,
            "unit": "pieces"
        }),
        json!({
            "name": "Blood Pressure Monitor",
            "quantity": 5,
            "cost": 1500.0,
            "location": "Equipment Room",
            "expiryDate": "2026-12-31",
            "purpose": "Patient monitoring",
            "category": "equipment",
            "minStockLevel": 2,
            "unit": "units"
        }),
    ]
    .into_iter()
    .filter_map(|v| v.as_object().cloned())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::{Document, StoreTimestamp};
    use crate::core::query::ListQuery;
    use chrono::TimeZone;

    fn item(name: &str, quantity: u32, min: u32) -> InventoryItem {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        InventoryItem {
            id: name.to_lowercase(),
            name: name.to_string(),
            quantity,
            cost: 2.0,
            location: "Medical Store A".to_string(),
            expiry_date: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            purpose: "Pain relief".to_string(),
            category: Category::Medicine,
            min_stock_level: min,
            unit: "tablets".to_string(),
            donor: String::new(),
            created_at: t,
            updated_at: t,
            created_by: "admin".to_string(),
        }
    }

    #[test]
    fn test_low_stock_is_inclusive() {
        assert!(item("a", 20, 20).is_low_stock());
        assert!(item("b", 0, 0).is_low_stock());
        assert!(!item("c", 21, 20).is_low_stock());
    }

    #[test]
    fn test_expiry_status() {
        let it = item("a", 1, 0);
        let window = Duration::days(30);
        let before = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let close = Utc.with_ymd_and_hms(2025, 2, 15, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap();

        assert_eq!(it.expiry_status(before, window), ExpiryStatus::Fresh);
        assert_eq!(it.expiry_status(close, window), ExpiryStatus::Expiring);
        assert_eq!(it.expiry_status(after, window), ExpiryStatus::Expired);
    }

    #[test]
    fn test_oversized_window_does_not_overflow() {
        let it = item("a", 1, 0);
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let window = Duration::days(4_000_000_000);

        assert_eq!(it.expiry_status(now, window), ExpiryStatus::Expiring);
    }

    #[test]
    fn test_total_value() {
        assert_eq!(item("a", 10, 0).total_value(), 20.0);
    }

    #[test]
    fn test_unknown_sort_field_rejected() {
        assert_eq!(
            "expiryDate".parse::<InventorySortField>().unwrap(),
            InventorySortField::ExpiryDate
        );
        assert!("expiryWeeks".parse::<InventorySortField>().is_err());
    }

    #[test]
    fn test_search_matches_name_or_location() {
        let it = item("Paracetamol", 1, 0);
        let by_name = InventoryFilter {
            search: Some("PARA".into()),
            ..Default::default()
        };
        let by_location = InventoryFilter {
            search: Some("store a".into()),
            ..Default::default()
        };
        let neither = InventoryFilter {
            search: Some("gauze".into()),
            ..Default::default()
        };
        assert!(it.matches(&by_name));
        assert!(it.matches(&by_location));
        assert!(!it.matches(&neither));
    }

    #[test]
    fn test_unknown_category_filter_rejected() {
        let params = ListParams {
            category: Some("snacks".into()),
            ..Default::default()
        };
        assert!(InventoryItem::filter_from(&params).is_err());
    }

    fn named(id: &str, name: &str, quantity: u32) -> InventoryItem {
        InventoryItem {
            id: id.to_string(),
            ..item(name, quantity, 0)
        }
    }

    fn run_ids(query: &ListQuery<InventoryItem>, records: Vec<InventoryItem>) -> Vec<String> {
        query.run(records).data.into_iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_equal_sort_keys_order_by_id_whatever_the_input_order() {
        let query = ListQuery::<InventoryItem>::from_params(&ListParams {
            sort_by: Some("name".into()),
            sort_order: Some("asc".into()),
            ..Default::default()
        })
        .unwrap();
        let records = || {
            vec![
                named("c", "Gauze", 5),
                named("a", "Gauze", 5),
                named("z", "Aspirin", 5),
                named("b", "Gauze", 5),
            ]
        };

        let forward = run_ids(&query, records());
        let mut reversed_input = records();
        reversed_input.reverse();
        let backward = run_ids(&query, reversed_input);

        assert_eq!(forward, vec!["z", "a", "b", "c"]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_tie_break_stays_ascending_when_sorting_descending() {
        let query = ListQuery::<InventoryItem>::from_params(&ListParams {
            sort_by: Some("quantity".into()),
            sort_order: Some("desc".into()),
            ..Default::default()
        })
        .unwrap();
        let records = vec![
            named("b", "Masks", 10),
            named("c", "Gloves", 99),
            named("a", "Syringes", 10),
        ];
        let mut rotated = records.clone();
        rotated.rotate_left(1);

        assert_eq!(run_ids(&query, records), vec!["c", "a", "b"]);
        assert_eq!(run_ids(&query, rotated), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_from_document_applies_defaults_and_timestamps() {
        let created = StoreTimestamp {
            seconds: 1_700_000_000,
            nanos: 0,
        };
        let mut fields = demo_fixtures()[0].clone();
        fields.remove("cost");
        fields.remove("minStockLevel");
        fields.insert("expiryDate".into(), json!({"seconds": 1_735_603_200i64, "nanos": 0}));

        let doc = Document {
            id: "doc-1".into(),
            fields,
            create_time: created,
            update_time: created,
        };
        let it = InventoryItem::from_document(doc).unwrap();

        assert_eq!(it.id, "doc-1");
        assert_eq!(it.cost, 0.0);
        assert_eq!(it.min_stock_level, 0);
        assert_eq!(it.donor, "");
        assert_eq!(it.created_at, it.updated_at);
        assert_eq!(it.expiry_date, Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_draft_rejects_negative_cost() {
        let mut fields = demo_fixtures()[0].clone();
        fields.insert("cost".into(), json!(-1.0));
        let draft: NewInventoryItem = serde_json::from_value(Value::Object(fields)).unwrap();
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_patch_serializes_only_supplied_fields() {
        let patch: InventoryPatch = serde_json::from_value(json!({
            "quantity": 3,
            "id": "forged",
            "createdBy": "mallory"
        }))
        .unwrap();
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, json!({"quantity": 3}));
    }

    #[test]
    fn test_demo_fixtures_cover_every_category() {
        let fixtures = demo_fixtures();
        assert_eq!(fixtures.len(), 3);
        let categories: Vec<&str> = fixtures
            .iter()
            .filter_map(|f| f["category"].as_str())
            .collect();
        assert_eq!(categories, vec!["medicine", "supplies", "equipment"]);
    }
}
