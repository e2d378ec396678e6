//! Validation and filtering of record payloads
//!
//! Payloads go through three stages before they reach the store: string
//! trimming, presence checks on required fields, and typed format/range
//! validation.

pub mod extractor;
pub mod filters;
pub mod validators;

pub use extractor::JsonObject;
pub use validators::{blanked_required, missing_required, parse_payload};
