use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::config::ClassifierConfig;

/// Local mirror of the checkpoint files published on the model hub.
pub struct ModelHub {
    client: reqwest::Client,
    config: ClassifierConfig,
}

/// Paths of a checkpoint that is ready to load.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub model: PathBuf,
    pub config: PathBuf,
}

impl ModelHub {
    #[must_use]
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn repo_dir(&self) -> PathBuf {
        Path::new(&self.config.cache_dir).join(&self.config.model_repo)
    }

    #[must_use]
    pub fn file_url(&self, file: &str) -> String {
        format!(
            "{}/{}/resolve/{}/{}",
            self.config.hub_url.trim_end_matches('/'),
            self.config.model_repo,
            self.config.revision,
            file
        )
    }

    /// Downloads whichever checkpoint files are not cached yet.
    pub async fn ensure_files(&self) -> Result<ModelFiles> {
        let model = self.ensure(&self.config.model_file).await?;
        let config = self.ensure(&self.config.config_file).await?;
        Ok(ModelFiles { model, config })
    }

    async fn ensure(&self, file: &str) -> Result<PathBuf> {
        let path = self.repo_dir().join(file);
        if path.exists() {
            return Ok(path);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let url = self.file_url(file);
        info!(url = %url, path = %path.display(), "Downloading model file");

        let bytes = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {url}"))?
            .error_for_status()
            .with_context(|| format!("Model hub rejected {url}"))?
            .bytes()
            .await?;

        // A cache entry only appears once fully written.
        let partial = path.with_extension("partial");
        fs::write(&partial, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", partial.display()))?;
        fs::rename(&partial, &path).await?;

        Ok(path)
    }
}
