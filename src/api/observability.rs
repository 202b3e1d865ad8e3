//! Request spans, HTTP metrics and response hardening.
//!
//! Every `/api` request runs inside a `request` span. Handlers fill in the
//! domain fields they know about: `user_id` once the visitor is resolved,
//! `image_id` and `produce_type` on uploads and feedback.

use crate::api::AppState;
use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, Span, info, info_span};
use uuid::Uuid;

/// GET /metrics
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Response {
    state.prometheus_handle.as_ref().map_or_else(
        || (StatusCode::SERVICE_UNAVAILABLE, "Metrics are disabled").into_response(),
        |handle| handle.render().into_response(),
    )
}

/// Attaches the image a request worked on to the request span.
pub fn record_image(image_id: i32) {
    Span::current().record("image_id", image_id);
}

/// Attaches the selected produce group to the request span.
pub fn record_produce_type(produce_type: &str) {
    Span::current().record("produce_type", produce_type);
}

fn outcome(status: StatusCode) -> &'static str {
    match status {
        StatusCode::PAYLOAD_TOO_LARGE => "upload_rejected",
        s if s.is_server_error() => "error",
        s if s.is_client_error() => "client_error",
        _ => "success",
    }
}

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4();
    let method = req.method().to_string();

    // Route templates keep label cardinality bounded.
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |mp| mp.as_str().to_string());

    let span = info_span!(
        "request",
        %request_id,
        %method,
        path = %req.uri().path(),
        %route,
        user_id = tracing::field::Empty,
        image_id = tracing::field::Empty,
        produce_type = tracing::field::Empty,
    );

    async move {
        let response = next.run(req).await;
        let status = response.status();
        let elapsed = start.elapsed();

        let labels = [
            ("method", method),
            ("path", route),
            ("status", status.as_u16().to_string()),
        ];
        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(elapsed.as_secs_f64());

        info!(
            duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            status_code = status.as_u16(),
            outcome = outcome(status),
            "Request finished"
        );

        response
    }
    .instrument(span)
    .await
}

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    response
}
