//! Fetch model command handler

use crate::classifier::ModelHub;
use crate::config::Config;

pub async fn cmd_fetch_model(config: &Config) -> anyhow::Result<()> {
    let hub = ModelHub::new(config.classifier.clone());
    println!(
        "Fetching {}@{} into {}",
        config.classifier.model_repo,
        config.classifier.revision,
        hub.repo_dir().display()
    );

    let files = hub.ensure_files().await?;

    println!("  model:  {}", files.model.display());
    println!("  config: {}", files.config.display());
    Ok(())
}
