use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Processing state of an uploaded photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    Pending,
    Processing,
    Analyzed,
}

impl ImageStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Analyzed => "analyzed",
        }
    }
}

impl fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "analyzed" => Ok(Self::Analyzed),
            other => Err(format!("unknown image status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageRecord {
    pub id: i32,
    pub produce_id: i32,
    pub user_id: Option<i32>,
    pub image_path: Option<String>,
    pub upload_timestamp: String,
    pub status: ImageStatus,
    pub deleted: bool,
}
