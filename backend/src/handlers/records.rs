//! HTTP handlers for commodity transaction records
//!
//! One set of handlers serves every record kind; the `:kind` path segment
//! selects the configuration entry.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::types::{PaginatedResponse, Pagination, SortOrder};

use crate::error::{AppError, AppResult};
use crate::models::{RecordDraft, RecordKind, RecordPatch};
use crate::middleware::AuthUser;
use crate::services::records::{RecordFilter, RecordService, RecordSummary, SourceRecord};
use crate::AppState;

/// Query parameters for listing records
#[derive(Debug, Deserialize)]
pub struct ListRecordsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub search: Option<String>,
    pub sort: Option<SortOrder>,
}

/// Query parameters for the kind summary
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Input for bulk deletion
#[derive(Debug, Deserialize)]
pub struct BulkDeleteInput {
    pub ids: Vec<Uuid>,
}

/// Response for bulk deletion
#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub deleted: u64,
}

fn service(state: &AppState, slug: &str) -> AppResult<RecordService> {
    let kind = RecordKind::from_slug(slug)
        .ok_or_else(|| AppError::NotFound(format!("Record kind '{}'", slug)))?;
    Ok(RecordService::new(
        state.db.clone(),
        state.sequencer.clone(),
        kind,
    ))
}

/// List records of one kind
pub async fn list_records(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(kind): Path<String>,
    Query(query): Query<ListRecordsQuery>,
) -> AppResult<Json<PaginatedResponse<SourceRecord>>> {
    let service = service(&state, &kind)?;

    let filter = RecordFilter {
        start_date: query.start_date,
        end_date: query.end_date,
        search: query.search,
    };
    let pagination = Pagination {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    };

    let records = service
        .list(
            user.mill_id,
            &filter,
            &pagination,
            query.sort.unwrap_or_default(),
        )
        .await?;
    Ok(Json(records))
}

/// Create a record of one kind
pub async fn create_record(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(kind): Path<String>,
    Json(draft): Json<RecordDraft>,
) -> AppResult<Json<SourceRecord>> {
    let service = service(&state, &kind)?;
    let record = service.create(user.mill_id, draft, user.user_id).await?;
    Ok(Json(record))
}

/// Get one record by id
pub async fn get_record(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> AppResult<Json<SourceRecord>> {
    let service = service(&state, &kind)?;
    let record = service.get_by_id(user.mill_id, id).await?;
    Ok(Json(record))
}

/// Update one record
pub async fn update_record(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((kind, id)): Path<(String, Uuid)>,
    Json(patch): Json<RecordPatch>,
) -> AppResult<Json<SourceRecord>> {
    let service = service(&state, &kind)?;
    let record = service
        .update(user.mill_id, id, patch, user.user_id)
        .await?;
    Ok(Json(record))
}

/// Delete one record
pub async fn delete_record(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> AppResult<Json<()>> {
    let service = service(&state, &kind)?;
    service.delete(user.mill_id, id).await?;
    Ok(Json(()))
}

/// Delete many records by id, ignoring ids that match nothing
pub async fn bulk_delete_records(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(kind): Path<String>,
    Json(input): Json<BulkDeleteInput>,
) -> AppResult<Json<BulkDeleteResponse>> {
    let service = service(&state, &kind)?;
    let deleted = service.bulk_delete(user.mill_id, &input.ids).await?;
    Ok(Json(BulkDeleteResponse { deleted }))
}

/// Summarize records of one kind over a date window
pub async fn record_summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(kind): Path<String>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<RecordSummary>> {
    let service = service(&state, &kind)?;
    let summary = service
        .summary(user.mill_id, query.start_date, query.end_date)
        .await?;
    Ok(Json(summary))
}
