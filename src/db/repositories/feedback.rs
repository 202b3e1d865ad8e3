use crate::entities::{feedback, prelude::*};
use crate::models::feedback::FeedbackRecord;
use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

pub struct FeedbackRepository {
    conn: DatabaseConnection,
}

impl FeedbackRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: feedback::Model) -> FeedbackRecord {
        FeedbackRecord {
            id: m.id,
            image_id: m.image_id,
            user_id: m.user_id,
            is_helpful: m.is_helpful,
            explanation: m.explanation,
            session_key: m.session_key,
            created_at: m.created_at,
        }
    }

    pub async fn create(
        &self,
        image_id: i32,
        user_id: Option<i32>,
        is_helpful: Option<bool>,
        explanation: Option<&str>,
        session_key: Option<&str>,
    ) -> Result<FeedbackRecord> {
        let created = feedback::ActiveModel {
            image_id: Set(image_id),
            user_id: Set(user_id),
            is_helpful: Set(is_helpful),
            explanation: Set(explanation.map(str::to_string)),
            session_key: Set(session_key.map(str::to_string)),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert feedback")?;

        Ok(Self::map_model(created))
    }

    pub async fn get(&self, id: i32) -> Result<Option<FeedbackRecord>> {
        let row = Feedback::find_by_id(id).one(&self.conn).await?;
        Ok(row.map(Self::map_model))
    }

    pub async fn list_for_image(&self, image_id: i32) -> Result<Vec<FeedbackRecord>> {
        let rows = Feedback::find()
            .filter(feedback::Column::ImageId.eq(image_id))
            .order_by_asc(feedback::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(Self::map_model).collect())
    }
}
