//! Route definitions for the Mill Records Platform

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - transaction records, one surface per kind
        .nest("/records/:kind", record_routes())
        // Protected routes - stock ledger queries
        .nest("/ledger", ledger_routes())
        // Protected routes - cross-cutting reports
        .nest("/reports", report_routes())
}

/// Transaction record routes (protected)
///
/// The `:kind` segment is a configuration-table slug; unknown slugs 404.
fn record_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_records).post(handlers::create_record),
        )
        .route("/summary", get(handlers::record_summary))
        .route("/bulk-delete", post(handlers::bulk_delete_records))
        .route(
            "/:record_id",
            get(handlers::get_record)
                .put(handlers::update_record)
                .delete(handlers::delete_record),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock ledger routes (protected)
fn ledger_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(handlers::list_events))
        .route("/balance", get(handlers::get_balance))
        .route("/summary", get(handlers::get_summary))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Reporting routes (protected)
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/position", get(handlers::get_stock_position))
        .route("/position/:commodity", get(handlers::get_commodity_position))
        .route("/movement", get(handlers::get_movement_summary))
        .route("/daily", get(handlers::get_daily_position))
        .route("/overview", get(handlers::get_mill_overview))
        .route_layer(middleware::from_fn(auth_middleware))
}
