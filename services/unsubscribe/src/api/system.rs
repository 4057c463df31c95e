//! Health API handler.
//!
//! # Key invariants and assumptions
//! - The health check is fast and side-effect free; it does not touch the
//!   store.
use crate::api::types::HealthStatus;
use crate::model::now_iso8601;
use axum::Json;

#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is alive", body = HealthStatus)
    )
)]
/// Return `ok` with the current server time.
pub(crate) async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        timestamp: now_iso8601(),
    })
}
