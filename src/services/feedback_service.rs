//! Domain service for user feedback on analysed images.

use thiserror::Error;

use crate::models::feedback::FeedbackRecord;
use crate::models::visitor::Visitor;

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("Image not found")]
    ImageNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for FeedbackError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for FeedbackError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait FeedbackService: Send + Sync {
    /// Records feedback for an image.
    ///
    /// Signed-in visitors are linked through the user; anonymous visitors
    /// through their session key.
    ///
    /// # Errors
    ///
    /// Returns [`FeedbackError::ImageNotFound`] for a missing or deleted image.
    async fn submit(
        &self,
        image_id: i32,
        helpful: Option<bool>,
        explanation: Option<String>,
        visitor: &Visitor,
    ) -> Result<FeedbackRecord, FeedbackError>;
}

/// Interprets the loosely typed `helpful` field of a feedback body.
///
/// Strings count as true when they read `true`, `1`, `yes` or `y`
/// (any case); numbers when non-zero.
#[must_use]
pub fn normalize_helpful(value: Option<&serde_json::Value>) -> Option<bool> {
    use serde_json::Value;

    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => Some(matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "y"
        )),
        Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Reads an image id from a JSON number or numeric string.
#[must_use]
pub fn parse_image_id(value: Option<&serde_json::Value>) -> Option<i32> {
    use serde_json::Value;

    match value? {
        Value::Number(n) => n.as_i64().and_then(|i| i32::try_from(i).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
