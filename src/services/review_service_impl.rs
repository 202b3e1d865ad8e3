use async_trait::async_trait;

use crate::db::Store;
use crate::models::review::{MAX_RATING, MIN_RATING, ReviewRecord};
use crate::services::review_service::{ReviewError, ReviewService};

pub struct SeaOrmReviewService {
    store: Store,
}

impl SeaOrmReviewService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn ensure_produce(&self, produce_id: i32) -> Result<(), ReviewError> {
        self.store
            .get_produce(produce_id)
            .await?
            .map(|_| ())
            .ok_or(ReviewError::ProduceNotFound(produce_id))
    }
}

#[async_trait]
impl ReviewService for SeaOrmReviewService {
    async fn create(
        &self,
        user_id: i32,
        produce_id: i32,
        rating: i32,
        comment: Option<String>,
    ) -> Result<ReviewRecord, ReviewError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(ReviewError::Validation(format!(
                "Rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }

        self.ensure_produce(produce_id).await?;

        let comment = comment.filter(|c| !c.trim().is_empty());
        let review = self
            .store
            .create_review(user_id, produce_id, rating, comment.as_deref())
            .await?;

        Ok(review)
    }

    async fn list_for_produce(&self, produce_id: i32) -> Result<Vec<ReviewRecord>, ReviewError> {
        self.ensure_produce(produce_id).await?;
        Ok(self.store.list_reviews_for_produce(produce_id).await?)
    }
}
