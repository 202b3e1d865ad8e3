//! Domain service for authentication and user management.
//!
//! Handles signup, login and lookups of the signed-in user.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// User info DTO for responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and returns user info.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, username: &str, password: &str) -> Result<UserInfo, AuthError>;

    /// Creates a user (and its profile).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UsernameTaken`] for a duplicate username and
    /// [`AuthError::Validation`] for missing fields or a short password.
    async fn signup(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<UserInfo, AuthError>;

    /// Gets information for a specific user.
    async fn get_user_info(&self, user_id: i32) -> Result<UserInfo, AuthError>;
}
