use crate::entities::{prelude::*, produce};
use crate::models::produce::ProduceRecord;
use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;

pub struct ProduceRepository {
    conn: DatabaseConnection,
}

impl ProduceRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: produce::Model) -> ProduceRecord {
        ProduceRecord {
            id: m.id,
            name: m.name,
            category: m.category,
            description: m.description,
            created_at: m.created_at,
        }
    }

    pub async fn get(&self, id: i32) -> Result<Option<ProduceRecord>> {
        let row = Produce::find_by_id(id).one(&self.conn).await?;
        Ok(row.map(Self::map_model))
    }

    pub async fn list(&self) -> Result<Vec<ProduceRecord>> {
        let rows = Produce::find()
            .order_by_asc(produce::Column::Name)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    pub async fn get_or_create(&self, name: &str, category: &str) -> Result<ProduceRecord> {
        if let Some(existing) = Produce::find()
            .filter(produce::Column::Name.eq(name))
            .one(&self.conn)
            .await
            .context("Failed to query produce by name")?
        {
            return Ok(Self::map_model(existing));
        }

        let created = produce::ActiveModel {
            name: Set(name.to_string()),
            category: Set(category.to_string()),
            description: Set(None),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert produce")?;

        info!(produce = %name, category = %category, "Created produce");
        Ok(Self::map_model(created))
    }
}
