use serde::Serialize;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, Serialize)]
pub struct ReviewRecord {
    pub id: i32,
    pub user_id: i32,
    pub produce_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: String,
}
