use crate::entities::{prelude::*, reviews};
use crate::models::review::{MAX_RATING, MIN_RATING, ReviewRecord};
use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

pub struct ReviewRepository {
    conn: DatabaseConnection,
}

impl ReviewRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: reviews::Model) -> ReviewRecord {
        ReviewRecord {
            id: m.id,
            user_id: m.user_id,
            produce_id: m.produce_id,
            rating: m.rating,
            comment: m.comment,
            created_at: m.created_at,
        }
    }

    pub async fn create(
        &self,
        user_id: i32,
        produce_id: i32,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<ReviewRecord> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            anyhow::bail!("Rating {rating} outside {MIN_RATING}-{MAX_RATING}");
        }

        let created = reviews::ActiveModel {
            user_id: Set(user_id),
            produce_id: Set(produce_id),
            rating: Set(rating),
            comment: Set(comment.map(str::to_string)),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert review")?;

        Ok(Self::map_model(created))
    }

    pub async fn list_for_produce(&self, produce_id: i32) -> Result<Vec<ReviewRecord>> {
        let rows = Reviews::find()
            .filter(reviews::Column::ProduceId.eq(produce_id))
            .order_by_desc(reviews::Column::CreatedAt)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(Self::map_model).collect())
    }
}
