//! Domain service for analysing uploaded produce photos.
//!
//! Decodes the upload, records it, runs the classifier off the async
//! executor and stores the resulting analysis.

use serde::Serialize;
use thiserror::Error;

use crate::classifier::{ClassifierError, Prediction, SegmentedPrediction};

/// Errors specific to prediction operations.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Unknown produce type: {0}")]
    UnknownProduce(String),

    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for PredictionError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for PredictionError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A photo as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Result of a stored analysis.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionOutcome {
    pub image_id: i32,
    pub predictions: Vec<Prediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segmented: Option<SegmentedPrediction>,
}

/// Domain service trait for predictions.
#[async_trait::async_trait]
pub trait PredictionService: Send + Sync {
    /// Stores the upload, classifies it and records an analysis result.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::InvalidImage`] if the bytes do not decode,
    /// [`PredictionError::UnknownProduce`] for an unsupported produce type.
    async fn analyze_upload(
        &self,
        upload: Upload,
        produce_type: Option<&str>,
        user_id: Option<i32>,
    ) -> Result<PredictionOutcome, PredictionError>;
}
