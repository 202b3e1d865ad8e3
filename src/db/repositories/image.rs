use crate::entities::{images, prelude::*};
use crate::models::image::{ImageRecord, ImageStatus};
use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

pub struct ImageRepository {
    conn: DatabaseConnection,
}

impl ImageRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: images::Model) -> ImageRecord {
        ImageRecord {
            id: m.id,
            produce_id: m.produce_id,
            user_id: m.user_id,
            image_path: m.image_path,
            upload_timestamp: m.upload_timestamp,
            status: m.status.parse().unwrap_or(ImageStatus::Pending),
            deleted: m.deleted,
        }
    }

    pub async fn create(
        &self,
        produce_id: i32,
        user_id: Option<i32>,
        status: ImageStatus,
    ) -> Result<ImageRecord> {
        let created = images::ActiveModel {
            produce_id: Set(produce_id),
            user_id: Set(user_id),
            image_path: Set(None),
            upload_timestamp: Set(chrono::Utc::now().to_rfc3339()),
            status: Set(status.to_string()),
            deleted: Set(false),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert image")?;

        Ok(Self::map_model(created))
    }

    /// Returns the row regardless of the soft-delete flag.
    pub async fn get(&self, id: i32) -> Result<Option<ImageRecord>> {
        let row = Images::find_by_id(id).one(&self.conn).await?;
        Ok(row.map(Self::map_model))
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<ImageRecord>> {
        let rows = Images::find()
            .filter(images::Column::UserId.eq(user_id))
            .filter(images::Column::Deleted.eq(false))
            .order_by_desc(images::Column::UploadTimestamp)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    pub async fn set_path(&self, id: i32, path: &str) -> Result<()> {
        self.update(id, |active| active.image_path = Set(Some(path.to_string())))
            .await
    }

    pub async fn set_status(&self, id: i32, status: ImageStatus) -> Result<()> {
        self.update(id, |active| active.status = Set(status.to_string()))
            .await
    }

    pub async fn soft_delete(&self, id: i32) -> Result<()> {
        self.update(id, |active| active.deleted = Set(true)).await
    }

    async fn update(&self, id: i32, apply: impl FnOnce(&mut images::ActiveModel)) -> Result<()> {
        let row = Images::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Image not found: {id}"))?;

        let mut active: images::ActiveModel = row.into();
        apply(&mut active);
        active.update(&self.conn).await?;
        Ok(())
    }
}
