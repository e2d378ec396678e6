//! Staff roster

use crate::core::error::ValidationError;
use crate::core::field::FieldValue;
use crate::core::query::{ListParams, Queryable, contains_ignore_case};
use crate::core::record::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Staff role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Doctor,
    Nurse,
    Volunteer,
    Coordinator,
    Admin,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Doctor => "doctor",
            StaffRole::Nurse => "nurse",
            StaffRole::Volunteer => "volunteer",
            StaffRole::Coordinator => "coordinator",
            StaffRole::Admin => "admin",
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StaffRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "doctor" => Ok(StaffRole::Doctor),
            "nurse" => Ok(StaffRole::Nurse),
            "volunteer" => Ok(StaffRole::Volunteer),
            "coordinator" => Ok(StaffRole::Coordinator),
            "admin" => Ok(StaffRole::Admin),
            _ => Err(ValidationError::invalid_parameter(
                "role",
                format!(
                    "'{}' is not one of doctor, nurse, volunteer, coordinator, admin",
                    s
                ),
            )),
        }
    }
}

fn default_active() -> bool {
    true
}

/// A staff member as stored and returned by the API
///
/// Shift bounds are free-form strings: clock times such as `09:00` or full
/// date-times, depending on how the roster was entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: String,
    pub name: String,
    pub role: StaffRole,
    #[serde(default)]
    pub specialty: String,
    pub shift_start: String,
    pub shift_end: String,
    #[serde(default)]
    pub patients_served: u32,
    pub location: String,
    pub contact_number: String,
    pub email: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload accepted by `POST /api/staff`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewStaffMember {
    pub name: String,
    pub role: StaffRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    pub shift_start: String,
    pub shift_end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patients_served: Option<u32>,
    pub location: String,
    #[validate(custom(function = "crate::core::validation::validators::contact_number"))]
    pub contact_number: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Payload accepted by `PUT /api/staff/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StaffPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<StaffRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patients_served: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::core::validation::validators::contact_number"))]
    pub contact_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Record for StaffMember {
    type Draft = NewStaffMember;
    type Patch = StaffPatch;

    fn collection_name() -> &'static str {
        "staff"
    }

    fn kind_label() -> &'static str {
        "Staff member"
    }

    fn required_fields() -> &'static [&'static str] {
        &[
            "name",
            "role",
            "shiftStart",
            "shiftEnd",
            "location",
            "contactNumber",
            "email",
        ]
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
}

/// Sortable staff fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaffSortField {
    Name,
    Role,
    Specialty,
    ShiftStart,
    ShiftEnd,
    PatientsServed,
    Location,
    Email,
    IsActive,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl FromStr for StaffSortField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "name" => Self::Name,
            "role" => Self::Role,
            "specialty" => Self::Specialty,
            "shiftStart" => Self::ShiftStart,
            "shiftEnd" => Self::ShiftEnd,
            "patientsServed" => Self::PatientsServed,
            "location" => Self::Location,
            "email" => Self::Email,
            "isActive" => Self::IsActive,
            "createdAt" => Self::CreatedAt,
            "updatedAt" => Self::UpdatedAt,
            other => {
                return Err(ValidationError::invalid_parameter(
                    "sortBy",
                    format!("'{}' is not a sortable staff field", other),
                ));
            }
        })
    }
}

/// Active staff list filters
#[derive(Debug, Clone, Default)]
pub struct StaffFilter {
    pub search: Option<String>,
    pub role: Option<StaffRole>,
    pub location: Option<String>,
    pub is_active: Option<bool>,
}

impl Queryable for StaffMember {
    type Filter = StaffFilter;
    type SortField = StaffSortField;

    fn filter_from(params: &ListParams) -> Result<Self::Filter, ValidationError> {
        Ok(StaffFilter {
            search: params.search().map(str::to_string),
            role: params.role().map(str::parse).transpose()?,
            location: params.location().map(str::to_string),
            is_active: params.is_active()?,
        })
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter
            .search
            .as_deref()
            .is_none_or(|needle| contains_ignore_case(&self.name, needle))
            && filter.role.is_none_or(|r| self.role == r)
            && filter
                .location
                .as_deref()
                .is_none_or(|needle| contains_ignore_case(&self.location, needle))
            && filter.is_active.is_none_or(|a| self.is_active == a)
    }

    fn sort_value(&self, field: Self::SortField) -> FieldValue {
        match field {
            StaffSortField::Name => self.name.as_str().into(),
            StaffSortField::Role => self.role.as_str().into(),
            StaffSortField::Specialty => self.specialty.as_str().into(),
            StaffSortField::ShiftStart => self.shift_start.as_str().into(),
            StaffSortField::ShiftEnd => self.shift_end.as_str().into(),
            StaffSortField::PatientsServed => self.patients_served.into(),
            StaffSortField::Location => self.location.as_str().into(),
            StaffSortField::Email => self.email.as_str().into(),
            StaffSortField::IsActive => self.is_active.into(),
            StaffSortField::CreatedAt => self.created_at.into(),
            StaffSortField::UpdatedAt => self.updated_at.into(),
        }
    }
}

/// Demo roster used to seed a fresh store
pub fn demo_fixtures() -> Vec<Map<String, Value>> {
    [
        json!({
            "name": "Dr. Sarah Johnson",
            "role": "doctor",
            "specialty": "General Medicine",
            "shiftStart": "09:00",
            "shiftEnd": "17:00",
            "patientsServed": 45,
            "location": "Clinic A",
            "contactNumber": "+91-9876543210",
            "email": "sarah.johnson@jsf.org",
            "isActive": true
        }),
        json!({
            "name": "Nurse Priya Sharma",
            "role": "nurse",
            "specialty": "Emergency Care",
            "shiftStart": "08:00",
            "shiftEnd": "16:00",
            "patientsServed": 38,
            "location": "Clinic B",
            "contactNumber": "+91-9876543211",
            "email": "priya.sharma@jsf.org",
            "isActive": true
        }),
        json!({
            "name": "Dr. Rajesh Kumar",
            "role": "doctor",
            "specialty": "Cardiology",
            "shiftStart": "10:00",
            "shiftEnd": "18:00",
            "patientsServed": 52,
            "location": "Clinic C",
            "contactNumber": "+91-9876543212",
            "email": "rajesh.kumar@jsf.org",
            "isActive": true
        }),
    ]
    .into_iter()
    .filter_map(|v| v.as_object().cloned())
    .collect()
}
