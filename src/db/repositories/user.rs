use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionTrait,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::{prelude::*, user_profiles, users};

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Creates the user and its profile row in one transaction.
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password: &str,
        config: &SecurityConfig,
    ) -> Result<User> {
        let password = password.to_string();
        let config = config.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, Some(&config)))
            .await
            .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.conn.begin().await?;

        let user = users::ActiveModel {
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert user")?;

        user_profiles::ActiveModel {
            user_id: Set(user.id),
            show_instruction_popup: Set(true),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert user profile")?;

        txn.commit().await?;

        Ok(User::from(user))
    }

    pub async fn exists(&self, username: &str) -> Result<bool> {
        let count = Users::find()
            .filter(users::Column::Username.eq(username))
            .count(&self.conn)
            .await
            .context("Failed to count users")?;
        Ok(count > 0)
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    /// Verify password for a user
    /// Note: This uses `spawn_blocking` because Argon2 hashing is CPU-intensive
    /// and would block the async runtime if run directly.
    pub async fn verify_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(None);
        };

        let password_hash = user.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            Ok::<bool, anyhow::Error>(
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid.then(|| User::from(user)))
    }

    /// Whether the instruction popup should still be shown to this user.
    /// Users without a profile row get the default (shown).
    pub async fn show_instruction_popup(&self, user_id: i32) -> Result<bool> {
        let profile = UserProfiles::find()
            .filter(user_profiles::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query user profile")?;

        Ok(profile.is_none_or(|p| p.show_instruction_popup))
    }

    pub async fn set_show_instruction_popup(&self, user_id: i32, show: bool) -> Result<()> {
        let profile = UserProfiles::find()
            .filter(user_profiles::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query user profile")?;

        match profile {
            Some(profile) => {
                let mut active: user_profiles::ActiveModel = profile.into();
                active.show_instruction_popup = Set(show);
                active.update(&self.conn).await?;
            }
            None => {
                user_profiles::ActiveModel {
                    user_id: Set(user_id),
                    show_instruction_popup: Set(show),
                    ..Default::default()
                }
                .insert(&self.conn)
                .await?;
            }
        }

        Ok(())
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses default (high memory) params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None, // output length (use default)
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
