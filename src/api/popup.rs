use axum::{Json, body::Bytes, extract::State};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, PopupStateDto, auth};

const HIDE_POPUP_KEY: &str = "hide_instruction_popup";

/// Body of `POST /instruction-popup/hide`. A missing `hide` means hide.
#[derive(Debug, Deserialize)]
struct HidePopupRequest {
    #[serde(default = "default_hide")]
    hide: bool,
}

const fn default_hide() -> bool {
    true
}

/// GET /instruction-popup
pub async fn get_state(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<PopupStateDto>>, ApiError> {
    let hide = match auth::session_user(&session).await? {
        Some(user) => !state.store.show_instruction_popup(user.id).await?,
        None => session
            .get::<bool>(HIDE_POPUP_KEY)
            .await
            .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
            .unwrap_or(false),
    };

    Ok(Json(ApiResponse::success(PopupStateDto { hide })))
}

/// POST /instruction-popup/hide
///
/// Signed-in users keep the choice on their profile, anonymous visitors in
/// their session.
pub async fn set_hidden(
    State(state): State<Arc<AppState>>,
    session: Session,
    body: Bytes,
) -> Result<Json<ApiResponse<PopupStateDto>>, ApiError> {
    let HidePopupRequest { hide } =
        serde_json::from_slice(&body).map_err(|_| ApiError::validation("Invalid JSON"))?;

    match auth::session_user(&session).await? {
        Some(user) => state.store.set_show_instruction_popup(user.id, !hide).await?,
        None => session
            .insert(HIDE_POPUP_KEY, hide)
            .await
            .map_err(|e| ApiError::internal(format!("Session error: {e}")))?,
    }

    Ok(Json(ApiResponse::success(PopupStateDto { hide })))
}
