use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState};
use crate::models::visitor::Visitor;
use crate::services::UserInfo;

const USER_KEY: &str = "user";
const VISITOR_KEY: &str = "visitor";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// What the session remembers about a signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i32,
    pub username: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let user = state
        .auth_service
        .login(payload.username.trim(), &payload.password)
        .await?;

    start_session(&session, &user).await?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/signup
/// Creates the account and signs it in.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let user = state
        .auth_service
        .signup(&payload.username, &payload.password, &payload.email)
        .await?;

    start_session(&session, &user).await?;

    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Logged out".to_string(),
    })))
}

/// GET /auth/me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let user = require_user(&session).await?;
    let info = state.auth_service.get_user_info(user.id).await?;
    Ok(Json(ApiResponse::success(info)))
}

// ============================================================================
// Helpers
// ============================================================================

async fn start_session(session: &Session, user: &UserInfo) -> Result<(), ApiError> {
    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;
    session
        .insert(
            USER_KEY,
            SessionUser {
                id: user.id,
                username: user.username.clone(),
            },
        )
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))
}

/// Signed-in user of this session, if any.
pub async fn session_user(session: &Session) -> Result<Option<SessionUser>, ApiError> {
    session
        .get::<SessionUser>(USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))
}

/// Get the signed-in user, returns error if not authenticated
pub async fn require_user(session: &Session) -> Result<SessionUser, ApiError> {
    session_user(session)
        .await?
        .ok_or_else(ApiError::unauthorized)
}

/// Resolves who is making the request.
///
/// Anonymous visitors are identified by their session id, so a session is
/// saved for them on first use.
pub async fn current_visitor(session: &Session) -> Result<Visitor, ApiError> {
    if let Some(user) = session_user(session).await? {
        tracing::Span::current().record("user_id", user.id);
        return Ok(Visitor::User {
            id: user.id,
            username: user.username,
        });
    }

    if session.id().is_none() {
        session
            .insert(VISITOR_KEY, true)
            .await
            .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;
        session
            .save()
            .await
            .map_err(|e| ApiError::internal(format!("Failed to save session: {e}")))?;
    }

    let session_key = session
        .id()
        .map(|id| id.to_string())
        .ok_or_else(|| ApiError::internal("Session has no id"))?;

    Ok(Visitor::Anonymous { session_key })
}
