//! Offline classification of a single file.

use anyhow::Context;
use std::path::Path;

use crate::api::load_classifier;
use crate::classifier::find_group;
use crate::config::Config;

pub async fn cmd_predict(
    config: &Config,
    path: &Path,
    produce: Option<&str>,
    top_k: Option<usize>,
) -> anyhow::Result<()> {
    let group = produce
        .map(|key| find_group(key).with_context(|| format!("Unknown produce type: {key}")))
        .transpose()?;
    let k = top_k.unwrap_or(config.classifier.top_k);

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let image = image::load_from_memory(&bytes)
        .with_context(|| format!("Could not decode {}", path.display()))?;

    let classifier = load_classifier(config).await?;
    let classification =
        tokio::task::spawn_blocking(move || classifier.classify(&image, k, group)).await??;

    println!("{}", serde_json::to_string_pretty(&classification)?);
    Ok(())
}
