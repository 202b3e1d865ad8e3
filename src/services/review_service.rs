//! Domain service for star ratings on produce.

use thiserror::Error;

use crate::models::review::ReviewRecord;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Produce not found: {0}")]
    ProduceNotFound(i32),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ReviewError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ReviewError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait ReviewService: Send + Sync {
    async fn create(
        &self,
        user_id: i32,
        produce_id: i32,
        rating: i32,
        comment: Option<String>,
    ) -> Result<ReviewRecord, ReviewError>;

    async fn list_for_produce(&self, produce_id: i32) -> Result<Vec<ReviewRecord>, ReviewError>;
}
