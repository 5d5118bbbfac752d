use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::api::AppState;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub dataset_rows: usize,
    pub catalog_source: String,
    pub checked_at: String,
}

/// Probe endpoint: degraded (not down) when the current snapshot is empty.
pub async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let snapshot = state.store.current();
    let ready = !snapshot.is_empty();

    let payload = HealthResponse {
        status: if ready { "ok" } else { "degraded" },
        dataset_rows: snapshot.len(),
        catalog_source: snapshot.source().to_string(),
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

/// Back-compat plain probe kept for older monitoring.
pub async fn health() -> &'static str {
    "ok"
}
