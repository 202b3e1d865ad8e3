use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, ImageDto, auth, validation};

/// GET /images
/// The signed-in user's uploads, newest first.
pub async fn list_images(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<ImageDto>>>, ApiError> {
    let user = auth::require_user(&session).await?;
    let images = state.store.list_images_for_user(user.id).await?;

    let mut dtos = Vec::with_capacity(images.len());
    for image in images {
        let analysis = state.store.latest_analysis(image.id).await?;
        dtos.push(ImageDto::new(image, analysis));
    }

    Ok(Json(ApiResponse::success(dtos)))
}

/// GET /images/{id}
/// Anonymous uploads are readable by anyone, a user's uploads only by them.
pub async fn get_image(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ImageDto>>, ApiError> {
    let id = validation::parse_id("Image", &id)?;
    let viewer = auth::session_user(&session).await?.map(|u| u.id);
    let image = state
        .store
        .get_image(id)
        .await?
        .filter(|img| !img.deleted && visible_to(img.user_id, viewer))
        .ok_or_else(|| ApiError::image_not_found(id))?;

    let analysis = state.store.latest_analysis(image.id).await?;
    Ok(Json(ApiResponse::success(ImageDto::new(image, analysis))))
}

/// DELETE /images/{id}
/// Soft delete. Images owned by someone else read as missing.
pub async fn delete_image(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user = auth::require_user(&session).await?;
    let id = validation::parse_id("Image", &id)?;

    state
        .store
        .get_image(id)
        .await?
        .filter(|img| !img.deleted && img.user_id == Some(user.id))
        .ok_or_else(|| ApiError::image_not_found(id))?;

    state.store.soft_delete_image(id).await?;
    tracing::info!(image_id = id, user_id = user.id, "Image deleted");

    Ok(Json(ApiResponse::success(())))
}

fn visible_to(owner: Option<i32>, viewer: Option<i32>) -> bool {
    owner.is_none() || owner == viewer
}

#[cfg(test)]
mod tests {
    use super::visible_to;

    #[test]
    fn owned_images_are_private() {
        assert!(visible_to(None, None));
        assert!(visible_to(None, Some(3)));
        assert!(visible_to(Some(3), Some(3)));
        assert!(!visible_to(Some(3), Some(4)));
        assert!(!visible_to(Some(3), None));
    }
}
