//! `SeaORM` implementation of the `PredictionService` trait.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use image::DynamicImage;
use tokio::task;
use tracing::{info, warn};

use crate::classifier::{Classification, Classifier, ProduceGroup, find_group};
use crate::db::Store;
use crate::models::analysis::{AnalysisInput, MAX_SCORE, MIN_SCORE};
use crate::models::image::ImageStatus;
use crate::models::produce::{UNSPECIFIED_CATEGORY, UNSPECIFIED_NAME};
use crate::services::UploadStorage;
use crate::services::prediction_service::{
    PredictionError, PredictionOutcome, PredictionService, Upload,
};

pub struct SeaOrmPredictionService {
    store: Store,
    classifier: Arc<dyn Classifier>,
    storage: UploadStorage,
    top_k: usize,
}

impl SeaOrmPredictionService {
    #[must_use]
    pub fn new(
        store: Store,
        classifier: Arc<dyn Classifier>,
        storage: UploadStorage,
        top_k: usize,
    ) -> Self {
        Self {
            store,
            classifier,
            storage,
            top_k,
        }
    }

    async fn run_inference(
        &self,
        image: DynamicImage,
        group: Option<&'static ProduceGroup>,
    ) -> Result<Classification, PredictionError> {
        let classifier = self.classifier.clone();
        let k = self.top_k;
        let started = Instant::now();

        let classification = task::spawn_blocking(move || classifier.classify(&image, k, group))
            .await
            .map_err(|e| PredictionError::Internal(format!("Inference task panicked: {e}")))??;

        let mode = if group.is_some() { "segmented" } else { "top_k" };
        metrics::counter!("predictions_total", "mode" => mode).increment(1);
        metrics::histogram!("inference_duration_seconds").record(started.elapsed().as_secs_f64());

        Ok(classification)
    }

    /// Everything that happens once the image row exists.
    async fn process(
        &self,
        image_id: i32,
        file_name: &str,
        bytes: &[u8],
        image: DynamicImage,
        group: Option<&'static ProduceGroup>,
    ) -> Result<Classification, PredictionError> {
        let relative = self
            .storage
            .save(file_name, bytes)
            .await
            .map_err(|e| PredictionError::Storage(e.to_string()))?;
        self.store.set_image_path(image_id, &relative).await?;

        let classification = self.run_inference(image, group).await?;

        self.store
            .record_analysis(image_id, analysis_input(&classification))
            .await?;
        self.store
            .set_image_status(image_id, ImageStatus::Analyzed)
            .await?;

        Ok(classification)
    }

    /// Puts a half-processed image back to `pending` and hands the error on.
    async fn fail(&self, image_id: i32, err: PredictionError) -> PredictionError {
        warn!(image_id, error = %err, "Image analysis failed");
        if let Err(reset) = self
            .store
            .set_image_status(image_id, ImageStatus::Pending)
            .await
        {
            warn!(image_id, error = %reset, "Could not reset image status");
        }
        err
    }
}

/// Decodes an upload on the blocking pool.
pub async fn decode_image(bytes: Vec<u8>) -> Result<DynamicImage, PredictionError> {
    task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| PredictionError::Internal(format!("Decode task panicked: {e}")))?
        .map(|img| DynamicImage::ImageRgb8(img.to_rgb8()))
        .map_err(|e| PredictionError::InvalidImage(e.to_string()))
}

/// Maps a classification onto the persisted analysis columns.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn analysis_input(classification: &Classification) -> AnalysisInput {
    let defects_detected = serde_json::to_value(&classification.predictions).ok();

    match &classification.segmented {
        Some(seg) => AnalysisInput {
            freshness_score: Some((seg.freshness_score.round() as i32).clamp(MIN_SCORE, MAX_SCORE)),
            freshness_label: Some(seg.status.as_label().to_string()),
            defects_detected,
            confidence_score: Some(f64::from(seg.confidence())),
        },
        None => AnalysisInput {
            freshness_score: None,
            freshness_label: None,
            defects_detected,
            confidence_score: classification
                .predictions
                .first()
                .map(|p| f64::from(p.prob)),
        },
    }
}

#[async_trait]
impl PredictionService for SeaOrmPredictionService {
    async fn analyze_upload(
        &self,
        upload: Upload,
        produce_type: Option<&str>,
        user_id: Option<i32>,
    ) -> Result<PredictionOutcome, PredictionError> {
        let group = match produce_type.map(str::trim).filter(|s| !s.is_empty()) {
            Some(key) => Some(
                find_group(key).ok_or_else(|| PredictionError::UnknownProduce(key.to_string()))?,
            ),
            None => None,
        };

        let Upload { file_name, bytes } = upload;
        let image = decode_image(bytes.clone()).await?;

        let (name, category) =
            group.map_or((UNSPECIFIED_NAME, UNSPECIFIED_CATEGORY), |g| (g.key, g.category));
        let produce = self.store.get_or_create_produce(name, category).await?;

        let record = self
            .store
            .create_image(produce.id, user_id, ImageStatus::Processing)
            .await?;

        let classification = match self
            .process(record.id, &file_name, &bytes, image, group)
            .await
        {
            Ok(c) => c,
            Err(e) => return Err(self.fail(record.id, e).await),
        };

        info!(
            image_id = record.id,
            produce = %produce.name,
            top_label = classification.predictions.first().map_or("", |p| p.label.as_str()),
            "Image analyzed"
        );

        Ok(PredictionOutcome {
            image_id: record.id,
            predictions: classification.predictions,
            segmented: classification.segmented,
        })
    }
}
