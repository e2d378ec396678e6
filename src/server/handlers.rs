//! HTTP handlers for records, the dashboard and the current user
//!
//! The CRUD handlers are generic over the record kind; each
//! [`RecordDescriptor`](super::entity_registry::RecordDescriptor) mounts one
//! instantiation under `/api/{collection}`.

use crate::core::auth::User;
use crate::core::error::AppResult;
use crate::core::query::{ApiResponse, ListParams, ListQuery, PaginatedResponse, Queryable};
use crate::core::record::Record;
use crate::core::validation::JsonObject;
use crate::entities::{DashboardSummary, InventoryItem, StaffMember};
use crate::server::extractors::CurrentUser;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;

/// List records with search, filters, sorting and pagination
///
/// Parameters are validated before anything is read from the store.
pub async fn list_records<R: Queryable>(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<PaginatedResponse<R>>> {
    let query = ListQuery::<R>::from_params(&params)?;
    let records = state.records::<R>().fetch_all().await?;
    let fetched = records.len();

    let page = query.run(records);
    tracing::debug!(
        collection = R::collection_name(),
        fetched,
        matched = page.pagination.total,
        returned = page.data.len(),
        "list query"
    );

    Ok(Json(page.into()))
}

/// Get one record by identifier
pub async fn get_record<R: Record>(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<R>>> {
    let record = state.records::<R>().get(&id).await?;
    Ok(Json(ApiResponse::data(record)))
}

/// Create a record from a JSON object
pub async fn create_record<R: Record>(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    JsonObject(fields): JsonObject,
) -> AppResult<(StatusCode, Json<ApiResponse<R>>)> {
    let record = state.records::<R>().insert(fields, &user).await?;
    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::data(record)
                .with_message(format!("{} created successfully", R::kind_label())),
        ),
    ))
}

/// Merge the supplied fields into a record
pub async fn update_record<R: Record>(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<String>,
    JsonObject(fields): JsonObject,
) -> AppResult<Json<ApiResponse<R>>> {
    let record = state.records::<R>().update(&id, fields).await?;
    Ok(Json(
        ApiResponse::data(record).with_message(format!("{} updated successfully", R::kind_label())),
    ))
}

/// Delete a record
pub async fn delete_record<R: Record>(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.records::<R>().remove(&id).await?;
    Ok(Json(ApiResponse::message(format!(
        "{} deleted successfully",
        R::kind_label()
    ))))
}

/// Derived dashboard figures and alerts
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> AppResult<Json<ApiResponse<DashboardSummary>>> {
    let inventory_store = state.records::<InventoryItem>();
    let staff_store = state.records::<StaffMember>();
    let (inventory, staff) =
        tokio::try_join!(inventory_store.fetch_all(), staff_store.fetch_all())?;

    let summary = DashboardSummary::compute(inventory, staff, Utc::now(), state.dashboard);
    Ok(Json(ApiResponse::data(summary)))
}

/// The authenticated user
pub async fn current_user(CurrentUser(user): CurrentUser) -> Json<ApiResponse<User>> {
    Json(ApiResponse::data(user))
}
