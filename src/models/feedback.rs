use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRecord {
    pub id: i32,
    pub image_id: i32,
    pub user_id: Option<i32>,
    pub is_helpful: Option<bool>,
    pub explanation: Option<String>,
    pub session_key: Option<String>,
    pub created_at: String,
}
