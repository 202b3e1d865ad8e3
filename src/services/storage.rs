use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

/// Writes uploaded photos below the configured uploads root, laid out as
/// `uploads/%Y/%m/%d/<uuid>_<name>`.
#[derive(Clone)]
pub struct UploadStorage {
    root: PathBuf,
}

impl UploadStorage {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Stores `bytes` and returns the path relative to the uploads root.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        let relative = Self::relative_path(original_name, chrono::Utc::now());
        let full = self.root.join(&relative);

        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&full, bytes)
            .await
            .with_context(|| format!("Failed to write upload to {}", full.display()))?;

        info!(path = %full.display(), bytes = bytes.len(), "Stored upload");

        Ok(relative)
    }

    fn relative_path(original_name: &str, now: chrono::DateTime<chrono::Utc>) -> String {
        format!(
            "uploads/{}/{}_{}",
            now.format("%Y/%m/%d"),
            uuid::Uuid::new_v4().simple(),
            sanitize_file_name(original_name)
        )
    }
}

/// Keeps the final path component and replaces anything outside
/// `[A-Za-z0-9._-]`.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
