//! `SeaORM` implementation of the `FeedbackService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::Store;
use crate::models::feedback::FeedbackRecord;
use crate::models::visitor::Visitor;
use crate::services::feedback_service::{FeedbackError, FeedbackService};

pub struct SeaOrmFeedbackService {
    store: Store,
}

impl SeaOrmFeedbackService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl FeedbackService for SeaOrmFeedbackService {
    async fn submit(
        &self,
        image_id: i32,
        helpful: Option<bool>,
        explanation: Option<String>,
        visitor: &Visitor,
    ) -> Result<FeedbackRecord, FeedbackError> {
        let image = self
            .store
            .get_image(image_id)
            .await?
            .filter(|img| !img.deleted)
            .ok_or(FeedbackError::ImageNotFound)?;

        let explanation = explanation.filter(|e| !e.trim().is_empty());

        let feedback = self
            .store
            .create_feedback(
                image.id,
                visitor.user_id(),
                helpful,
                explanation.as_deref(),
                visitor.session_key(),
            )
            .await?;

        info!(
            feedback_id = feedback.id,
            image_id = image.id,
            helpful = ?helpful,
            anonymous = visitor.user_id().is_none(),
            "Feedback recorded"
        );

        Ok(feedback)
    }
}
