use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{ApiResponse, AppState, HealthResponse};

/// `GET /api/system/health`
///
/// Liveness plus a database ping. Answers 503 while the database is down.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let database = state.store.ping().await.is_ok();

    let body = HealthResponse {
        status: if database { "ok" } else { "degraded" },
        database,
        model_classes: state.classifier.labels().len(),
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.start_time.elapsed().as_secs(),
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ApiResponse::success(body))).into_response()
}
