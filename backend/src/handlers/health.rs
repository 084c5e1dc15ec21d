//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

/// Liveness probe with a database ping
///
/// Reports degraded rather than failing the request when the pool is
/// unreachable, so load balancers can tell the two states apart.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_ok = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();

    Json(HealthResponse {
        status: if db_ok { "healthy" } else { "degraded" },
        service: "mill-records",
        version: env!("CARGO_PKG_VERSION"),
        database: if db_ok { "connected" } else { "disconnected" },
    })
}
