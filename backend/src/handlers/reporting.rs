//! Reporting handlers for cross-cutting stock views and data export

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use shared::types::DateRange;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::services::reporting::ReportingService;
use crate::AppState;

/// Actions included in the daily position when none are named
const DEFAULT_DAILY_ACTIONS: [&str; 4] = ["Purchase", "Sale", "Inward", "Outward"];

#[derive(Debug, Deserialize)]
pub struct PositionQuery {
    pub as_of: Option<NaiveDate>,
    pub format: Option<String>, // "json" or "csv"
}

#[derive(Debug, Deserialize)]
pub struct MovementQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub commodity: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub date: NaiveDate,
    /// Comma-joined action labels, OR semantics
    pub actions: Option<String>,
}

/// Get the stock position of every commodity and variety
pub async fn get_stock_position(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<PositionQuery>,
) -> AppResult<impl IntoResponse> {
    let service = ReportingService::new(state.db.clone());
    let positions = service.stock_position(user.mill_id, query.as_of).await?;

    if query.format.as_deref() == Some("csv") {
        let csv = ReportingService::export_to_csv(&positions)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"stock_position.csv\"",
                ),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(positions).into_response())
    }
}

/// Get the position of one commodity
pub async fn get_commodity_position(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(commodity): Path<String>,
    Query(query): Query<PositionQuery>,
) -> AppResult<impl IntoResponse> {
    let service = ReportingService::new(state.db.clone());
    let position = service
        .commodity_position(user.mill_id, &commodity, query.as_of)
        .await?;
    Ok(Json(position))
}

/// Get the movement summary over a window
pub async fn get_movement_summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<MovementQuery>,
) -> AppResult<impl IntoResponse> {
    let service = ReportingService::new(state.db.clone());
    let summary = service
        .movement_summary(
            user.mill_id,
            DateRange {
                start_date: query.start_date,
                end_date: query.end_date,
            },
            query.commodity,
        )
        .await?;
    Ok(Json(summary))
}

/// Get one day's position restricted to named actions
pub async fn get_daily_position(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<DailyQuery>,
) -> AppResult<impl IntoResponse> {
    let actions: Vec<String> = match query.actions.as_deref() {
        Some(joined) => joined
            .split(',')
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect(),
        None => DEFAULT_DAILY_ACTIONS.iter().map(|a| a.to_string()).collect(),
    };

    let service = ReportingService::new(state.db.clone());
    let position = service
        .daily_position(user.mill_id, query.date, actions)
        .await?;
    Ok(Json(position))
}

/// Get the mill-wide overview
pub async fn get_mill_overview(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<impl IntoResponse> {
    let service = ReportingService::new(state.db.clone());
    let overview = service.mill_overview(user.mill_id).await?;
    Ok(Json(overview))
}
