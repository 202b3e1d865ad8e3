use serde::{Deserialize, Serialize};

use crate::classifier::{Prediction, SegmentedPrediction};
use crate::models::analysis::AnalysisRecord;
use crate::models::image::{ImageRecord, ImageStatus};
use crate::models::produce::ProduceRecord;
use crate::models::review::ReviewRecord;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictionDto {
    pub image_id: i32,
    pub predictions: Vec<Prediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segmented: Option<SegmentedPrediction>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackCreatedDto {
    pub feedback_id: i32,
}

#[derive(Debug, Serialize)]
pub struct PopupStateDto {
    pub hide: bool,
}

#[derive(Debug, Serialize)]
pub struct ProduceDto {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
}

impl From<ProduceRecord> for ProduceDto {
    fn from(p: ProduceRecord) -> Self {
        Self {
            id: p.id,
            name: p.name,
            category: p.category,
            description: p.description,
        }
    }
}

/// A selectable produce type for segmented prediction.
#[derive(Debug, Serialize)]
pub struct ProduceGroupDto {
    pub key: &'static str,
    pub category: &'static str,
    pub fresh_label: &'static str,
    pub rotten_label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReviewDto {
    pub id: i32,
    pub user_id: i32,
    pub produce_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: String,
}

impl From<ReviewRecord> for ReviewDto {
    fn from(r: ReviewRecord) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            produce_id: r.produce_id,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub produce_id: i32,
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImageDto {
    pub id: i32,
    pub produce_id: i32,
    pub image_url: Option<String>,
    pub upload_timestamp: String,
    pub status: ImageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisRecord>,
}

impl ImageDto {
    #[must_use]
    pub fn new(image: ImageRecord, analysis: Option<AnalysisRecord>) -> Self {
        Self {
            id: image.id,
            produce_id: image.produce_id,
            image_url: image.image_path.map(|p| format!("/{p}")),
            upload_timestamp: image.upload_timestamp,
            status: image.status,
            analysis,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub model_classes: usize,
    pub version: &'static str,
    pub uptime: u64,
}
