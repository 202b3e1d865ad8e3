use axum::{Json, body::Bytes, extract::State};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, CreateReviewRequest, ReviewDto, auth};

/// POST /reviews
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    session: Session,
    body: Bytes,
) -> Result<Json<ApiResponse<ReviewDto>>, ApiError> {
    let user = auth::require_user(&session).await?;
    let payload: CreateReviewRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::validation(format!("Invalid review: {e}")))?;

    let review = state
        .review_service
        .create(user.id, payload.produce_id, payload.rating, payload.comment)
        .await?;

    tracing::info!(
        review_id = review.id,
        produce_id = review.produce_id,
        rating = review.rating,
        "Review created"
    );

    Ok(Json(ApiResponse::success(ReviewDto::from(review))))
}
