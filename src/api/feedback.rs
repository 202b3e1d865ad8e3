use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header},
};
use serde_json::Value;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, FeedbackCreatedDto, auth, observability};
use crate::services::feedback_service::{normalize_helpful, parse_image_id};

/// POST /feedback
///
/// Accepts `{image_id, helpful, explanation}` as JSON or as a urlencoded form.
pub async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    session: Session,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<FeedbackCreatedDto>>, ApiError> {
    let payload = parse_body(&headers, &body)?;

    let image_id = parse_image_id(payload.get("image_id"))
        .ok_or_else(|| ApiError::image_not_found(display_id(payload.get("image_id"))))?;
    observability::record_image(image_id);
    let helpful = normalize_helpful(payload.get("helpful"));
    let explanation = payload
        .get("explanation")
        .and_then(Value::as_str)
        .map(str::to_string);

    let visitor = auth::current_visitor(&session).await?;

    let feedback = state
        .feedback_service
        .submit(image_id, helpful, explanation, &visitor)
        .await?;

    Ok(Json(ApiResponse::success(FeedbackCreatedDto {
        feedback_id: feedback.id,
    })))
}

fn parse_body(
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<serde_json::Map<String, Value>, ApiError> {
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    if is_form {
        return Ok(url::form_urlencoded::parse(body)
            .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
            .collect());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::validation("Expected a JSON object")),
        Err(_) => Err(ApiError::validation("Invalid JSON")),
    }
}

fn display_id(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(v) => v.to_string(),
        None => "(missing)".to_string(),
    }
}
