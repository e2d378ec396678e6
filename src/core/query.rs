//! List query parameters, pagination and the list query engine
//!
//! The engine is a pure function from `(records, params)` to one page of
//! results: filter, then sort, then slice. It never touches the store.

use crate::core::error::ValidationError;
use crate::core::field::FieldValue;
use crate::core::record::Record;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Query parameters for list endpoints
///
/// Every value arrives as a raw string so that malformed input can be
/// reported as `INVALID_PARAMETER` rather than a generic extractor
/// rejection. Empty strings mean "not supplied".
///
/// # Example
/// ```rust,ignore
/// // In handler:
/// pub async fn list_items(
///     Query(params): Query<ListParams>,
/// ) -> AppResult<Json<PaginatedResponse<Item>>> {
///     // params.page() defaults to 1
///     // params.limit() defaults to 10
/// }
///
/// // Usage:
/// GET /api/inventory?page=2&limit=10
/// GET /api/inventory?category=medicine&sortBy=expiryDate&sortOrder=asc
/// GET /api/staff?role=nurse&isActive=true&search=anita
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListParams {
    /// Case-insensitive substring match on the display name
    pub search: Option<String>,

    /// Exact inventory category
    pub category: Option<String>,

    /// Exact staff role
    pub role: Option<String>,

    /// Case-insensitive substring match on location
    pub location: Option<String>,

    /// Staff only: `true` or `false`
    pub is_active: Option<String>,

    /// Field to sort by, defaults to `createdAt`
    pub sort_by: Option<String>,

    /// `asc`/`ascending` or `desc`/`descending`, defaults to descending
    pub sort_order: Option<String>,

    /// Page number (starts at 1)
    pub page: Option<String>,

    /// Number of items per page
    pub limit: Option<String>,
}

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 10;

fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn positive(name: &str, value: &Option<String>, default: usize) -> Result<usize, ValidationError> {
    match supplied(value) {
        None => Ok(default),
        Some(raw) => match raw.parse::<usize>() {
            Ok(0) => Err(ValidationError::invalid_parameter(name, "must be at least 1")),
            Ok(n) => Ok(n),
            Err(_) => Err(ValidationError::invalid_parameter(
                name,
                format!("'{}' is not a positive integer", raw),
            )),
        },
    }
}

impl ListParams {
    pub fn search(&self) -> Option<&str> {
        supplied(&self.search)
    }

    pub fn category(&self) -> Option<&str> {
        supplied(&self.category)
    }

    pub fn role(&self) -> Option<&str> {
        supplied(&self.role)
    }

    pub fn location(&self) -> Option<&str> {
        supplied(&self.location)
    }

    /// Get page number; zero and non-numeric values are rejected
    pub fn page(&self) -> Result<usize, ValidationError> {
        positive("page", &self.page, DEFAULT_PAGE)
    }

    /// Get page size; zero and non-numeric values are rejected
    pub fn limit(&self) -> Result<usize, ValidationError> {
        positive("limit", &self.limit, DEFAULT_LIMIT)
    }

    pub fn sort_order(&self) -> Result<SortOrder, ValidationError> {
        supplied(&self.sort_order)
            .map(str::parse)
            .unwrap_or(Ok(SortOrder::default()))
    }

    /// Parse `sortBy` into the record's sortable field set
    pub fn sort_field<F>(&self) -> Result<F, ValidationError>
    where
        F: FromStr<Err = ValidationError> + Default,
    {
        supplied(&self.sort_by)
            .map(str::parse)
            .unwrap_or_else(|| Ok(F::default()))
    }

    /// Tri-state activity filter
    pub fn is_active(&self) -> Result<Option<bool>, ValidationError> {
        match supplied(&self.is_active) {
            None => Ok(None),
            Some(raw) if raw.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Some(raw) if raw.eq_ignore_ascii_case("false") => Ok(Some(false)),
            Some(raw) => Err(ValidationError::invalid_parameter(
                "isActive",
                format!("'{}' is not a boolean", raw),
            )),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    /// Orient an ascending comparison
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(ValidationError::invalid_parameter(
                "sortOrder",
                format!("'{}' is not one of asc, ascending, desc, descending", s),
            )),
        }
    }
}

/// Case-insensitive substring test used by search and location filters
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// A record kind the list query engine can filter and sort
///
/// Sortable fields form a closed set per record kind. Each maps to a typed
/// accessor, so an unknown `sortBy` is rejected instead of comparing nothing.
pub trait Queryable: Record {
    /// Parsed, validated filter predicates
    type Filter: Send + Sync;

    /// Enumerated sortable fields; the default is the creation timestamp
    type SortField: Copy + Default + FromStr<Err = ValidationError> + Send + Sync;

    /// Build the filter from the raw parameters
    fn filter_from(params: &ListParams) -> Result<Self::Filter, ValidationError>;

    /// True when the record satisfies every active predicate
    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Value of a sortable field; optional fields sort as their default
    /// (empty string or zero)
    fn sort_value(&self, field: Self::SortField) -> FieldValue;
}

/// A fully validated list query
#[derive(Debug)]
pub struct ListQuery<R: Queryable> {
    pub filter: R::Filter,
    pub sort_field: R::SortField,
    pub sort_order: SortOrder,
    pub page: usize,
    pub limit: usize,
}

impl<R: Queryable> ListQuery<R> {
    /// Validate every parameter up front, before any data is read
    pub fn from_params(params: &ListParams) -> Result<Self, ValidationError> {
        Ok(Self {
            filter: R::filter_from(params)?,
            sort_field: params.sort_field()?,
            sort_order: params.sort_order()?,
            page: params.page()?,
            limit: params.limit()?,
        })
    }

    /// Filter, sort and slice a materialized collection
    pub fn run(&self, records: Vec<R>) -> QueryPage<R> {
        let mut matching: Vec<R> = records
            .into_iter()
            .filter(|r| r.matches(&self.filter))
            .collect();

        sort_records(&mut matching, self.sort_field, self.sort_order);

        let total = matching.len();
        let start = (self.page - 1).saturating_mul(self.limit);
        let data = matching.into_iter().skip(start).take(self.limit).collect();

        QueryPage {
            data,
            pagination: PaginationMeta::new(self.page, self.limit, total),
        }
    }
}

/// Stable sort by one field, ties broken by ascending identifier
pub fn sort_records<R: Queryable>(records: &mut [R], field: R::SortField, order: SortOrder) {
    records.sort_by(|a, b| {
        order
            .apply(a.sort_value(field).compare(&b.sort_value(field)))
            .then_with(|| a.id().cmp(b.id()))
    });
}

/// Parse parameters and run the query in one step
pub fn execute<R: Queryable>(
    records: Vec<R>,
    params: &ListParams,
) -> Result<QueryPage<R>, ValidationError> {
    Ok(ListQuery::<R>::from_params(params)?.run(records))
}

/// One page of query results
#[derive(Debug, Clone)]
pub struct QueryPage<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Paginated response structure
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub success: bool,

    /// The paginated data
    pub data: Vec<T>,

    /// Pagination metadata
    pub pagination: PaginationMeta,
}

impl<T> From<QueryPage<T>> for PaginatedResponse<T> {
    fn from(page: QueryPage<T>) -> Self {
        Self {
            success: true,
            data: page.data,
            pagination: page.pagination,
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    /// Total number of items (after filters)
    pub total: usize,

    /// Total number of pages
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Create pagination metadata; `page` and `limit` are at least 1
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        let total_pages = total.div_ceil(limit);
        let start = (page - 1).saturating_mul(limit);

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: start.saturating_add(limit) < total,
            has_prev: page > 1,
        }
    }
}

/// Standard success envelope for single-record responses
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}
