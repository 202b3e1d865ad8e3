use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use super::ClassifierError;

/// Class index → label, in model output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    labels: Vec<String>,
}

#[derive(Deserialize)]
struct CheckpointConfig {
    id2label: HashMap<String, String>,
}

impl LabelMap {
    #[must_use]
    pub const fn from_labels(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Parses the `id2label` table of a checkpoint `config.json`.
    ///
    /// Indices must be contiguous from zero.
    pub fn from_config_json(json: &str) -> Result<Self, ClassifierError> {
        let config: CheckpointConfig = serde_json::from_str(json)
            .map_err(|e| ClassifierError::InvalidLabels(format!("config.json: {e}")))?;

        let mut indexed = config
            .id2label
            .into_iter()
            .map(|(id, label)| {
                id.parse::<usize>()
                    .map(|idx| (idx, label))
                    .map_err(|_| ClassifierError::InvalidLabels(format!("non-numeric id {id:?}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if indexed.is_empty() {
            return Err(ClassifierError::InvalidLabels("id2label is empty".into()));
        }

        indexed.sort_by_key(|(idx, _)| *idx);

        for (expected, (idx, _)) in indexed.iter().enumerate() {
            if *idx != expected {
                return Err(ClassifierError::InvalidLabels(format!(
                    "missing class index {expected}"
                )));
            }
        }

        Ok(Self {
            labels: indexed.into_iter().map(|(_, label)| label).collect(),
        })
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model config: {}", path.display()))?;
        Ok(Self::from_config_json(&json)?)
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.labels.get(idx).map(String::as_str)
    }

    #[must_use]
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
