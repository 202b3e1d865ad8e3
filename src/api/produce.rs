use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, ProduceDto, ProduceGroupDto, ReviewDto};
use crate::classifier::PRODUCE_GROUPS;

/// GET /produce
pub async fn list_produce(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ProduceDto>>>, ApiError> {
    let produce = state.store.list_produce().await?;
    Ok(Json(ApiResponse::success(
        produce.into_iter().map(ProduceDto::from).collect(),
    )))
}

/// GET /produce/groups
pub async fn list_groups() -> Json<ApiResponse<Vec<ProduceGroupDto>>> {
    let groups = PRODUCE_GROUPS
        .iter()
        .map(|g| ProduceGroupDto {
            key: g.key,
            category: g.category,
            fresh_label: g.fresh_label,
            rotten_label: g.rotten_label,
        })
        .collect();
    Json(ApiResponse::success(groups))
}

/// GET /produce/{id}/reviews
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ReviewDto>>>, ApiError> {
    let id = super::validation::parse_id("Produce", &id)?;
    let reviews = state.review_service.list_for_produce(id).await?;
    Ok(Json(ApiResponse::success(
        reviews.into_iter().map(ReviewDto::from).collect(),
    )))
}
