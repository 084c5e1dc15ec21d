//! HTTP handlers for stock ledger queries

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use shared::types::{PaginatedResponse, Pagination, SortOrder};

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::services::ledger::{
    BalanceEntry, BalanceFilter, EventFilter, LedgerService, LedgerSummary, StockEvent,
    SummaryFilter,
};
use crate::AppState;

/// Query parameters for the event listing
#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub search: Option<String>,
    pub sort: Option<SortOrder>,
}

/// Query parameters for balance queries
#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub commodity: Option<String>,
    pub variety: Option<String>,
    pub as_of: Option<NaiveDate>,
}

/// Query parameters for movement summaries
#[derive(Debug, Deserialize)]
pub struct LedgerSummaryQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub commodity: Option<String>,
    pub variety: Option<String>,
}

/// List stock events
pub async fn list_events(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListEventsQuery>,
) -> AppResult<Json<PaginatedResponse<StockEvent>>> {
    let service = LedgerService::new(state.db);

    let filter = EventFilter {
        start_date: query.start_date,
        end_date: query.end_date,
        search: query.search,
    };
    let pagination = Pagination {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    };

    let events = service
        .list(
            user.mill_id,
            &filter,
            &pagination,
            query.sort.unwrap_or_default(),
        )
        .await?;
    Ok(Json(events))
}

/// Get per-commodity balances
pub async fn get_balance(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<BalanceQuery>,
) -> AppResult<Json<Vec<BalanceEntry>>> {
    let service = LedgerService::new(state.db);
    let balances = service
        .balance(
            user.mill_id,
            &BalanceFilter {
                commodity: query.commodity,
                variety: query.variety,
                as_of: query.as_of,
            },
        )
        .await?;
    Ok(Json(balances))
}

/// Get the movement summary over a window
pub async fn get_summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<LedgerSummaryQuery>,
) -> AppResult<Json<LedgerSummary>> {
    let service = LedgerService::new(state.db);
    let summary = service
        .summary(
            user.mill_id,
            &SummaryFilter {
                start_date: query.start_date,
                end_date: query.end_date,
                commodity: query.commodity,
                variety: query.variety,
            },
        )
        .await?;
    Ok(Json(summary))
}
