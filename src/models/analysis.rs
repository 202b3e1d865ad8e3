use serde::Serialize;

pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 100;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRecord {
    pub id: i32,
    pub image_id: i32,
    pub freshness_score: Option<i32>,
    pub freshness_label: Option<String>,
    pub defects_detected: Option<serde_json::Value>,
    pub confidence_score: Option<f64>,
    pub analyzed_at: String,
}

/// Fields written for a new analysis row.
#[derive(Debug, Clone, Default)]
pub struct AnalysisInput {
    pub freshness_score: Option<i32>,
    pub freshness_label: Option<String>,
    pub defects_detected: Option<serde_json::Value>,
    pub confidence_score: Option<f64>,
}
