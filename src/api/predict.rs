use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, PredictionDto, auth, observability};
use crate::services::Upload;

/// POST /predict
///
/// Multipart form with an `image` file and an optional `produce_type`.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<PredictionDto>>, ApiError> {
    let mut upload: Option<Upload> = None;
    let mut produce_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Invalid multipart body", &e))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Failed to read upload", &e))?;
                if !bytes.is_empty() {
                    upload = Some(Upload {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            Some("produce_type") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| multipart_error("Invalid produce_type", &e))?;
                produce_type = Some(value);
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| ApiError::validation("No image uploaded"))?;
    let user_id = auth::session_user(&session).await?.map(|u| u.id);
    if let Some(id) = user_id {
        tracing::Span::current().record("user_id", id);
    }
    if let Some(kind) = produce_type.as_deref() {
        observability::record_produce_type(kind);
    }

    let outcome = state
        .prediction_service
        .analyze_upload(upload, produce_type.as_deref(), user_id)
        .await?;
    observability::record_image(outcome.image_id);

    Ok(Json(ApiResponse::success(PredictionDto {
        image_id: outcome.image_id,
        predictions: outcome.predictions,
        segmented: outcome.segmented,
    })))
}

/// Keeps the body-limit status, everything else is a malformed request.
fn multipart_error(context: &str, err: &MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(format!("{context}: upload exceeds the size limit"))
    } else {
        ApiError::validation(format!("{context}: {err}"))
    }
}
