//! `SeaORM` implementation of the `AuthService` trait.

use crate::config::SecurityConfig;
use crate::db::{Store, User};
use crate::services::auth_service::{AuthError, AuthService, UserInfo};
use async_trait::async_trait;

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<UserInfo, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Missing username or password".to_string(),
            ));
        }

        self.store
            .verify_user_password(username, password)
            .await?
            .map(UserInfo::from)
            .ok_or(AuthError::InvalidCredentials)
    }

    async fn signup(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<UserInfo, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Missing username or password".to_string(),
            ));
        }

        if self.store.user_exists(username).await? {
            return Err(AuthError::UsernameTaken);
        }

        if password.chars().count() < self.security.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.security.min_password_length
            )));
        }

        // A concurrent signup can still win between the check and the insert.
        let user = self
            .store
            .create_user(username, email.trim(), password, &self.security)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AuthError::UsernameTaken
                } else {
                    AuthError::from(e)
                }
            })?;

        tracing::info!(user_id = user.id, username = %user.username, "User signed up");

        Ok(UserInfo::from(user))
    }

    async fn get_user_info(&self, user_id: i32) -> Result<UserInfo, AuthError> {
        self.store
            .get_user_by_id(user_id)
            .await?
            .map(UserInfo::from)
            .ok_or(AuthError::UserNotFound)
    }
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<sea_orm::DbErr>()
            .and_then(sea_orm::DbErr::sql_err),
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
    )
}
