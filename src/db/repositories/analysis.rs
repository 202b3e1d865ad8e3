use crate::entities::{analysis_results, prelude::*};
use crate::models::analysis::{AnalysisInput, AnalysisRecord, MAX_SCORE, MIN_SCORE};
use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

pub struct AnalysisRepository {
    conn: DatabaseConnection,
}

impl AnalysisRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: analysis_results::Model) -> AnalysisRecord {
        AnalysisRecord {
            id: m.id,
            image_id: m.image_id,
            freshness_score: m.freshness_score,
            freshness_label: m.freshness_label,
            defects_detected: m.defects_detected,
            confidence_score: m.confidence_score,
            analyzed_at: m.analyzed_at,
        }
    }

    pub async fn record(&self, image_id: i32, input: AnalysisInput) -> Result<AnalysisRecord> {
        if let Some(score) = input.freshness_score
            && !(MIN_SCORE..=MAX_SCORE).contains(&score)
        {
            anyhow::bail!("Freshness score {score} outside {MIN_SCORE}-{MAX_SCORE}");
        }

        let created = analysis_results::ActiveModel {
            image_id: Set(image_id),
            freshness_score: Set(input.freshness_score),
            freshness_label: Set(input.freshness_label),
            defects_detected: Set(input.defects_detected),
            confidence_score: Set(input.confidence_score),
            analyzed_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert analysis result")?;

        Ok(Self::map_model(created))
    }

    pub async fn latest_for_image(&self, image_id: i32) -> Result<Option<AnalysisRecord>> {
        let row = AnalysisResults::find()
            .filter(analysis_results::Column::ImageId.eq(image_id))
            .order_by_desc(analysis_results::Column::Id)
            .one(&self.conn)
            .await?;
        Ok(row.map(Self::map_model))
    }
}
