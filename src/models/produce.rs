use serde::Serialize;

/// Name/category pair attached to uploads that carry no produce selection.
pub const UNSPECIFIED_NAME: &str = "unspecified";
pub const UNSPECIFIED_CATEGORY: &str = "unknown";

#[derive(Debug, Clone, Serialize)]
pub struct ProduceRecord {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub created_at: String,
}
