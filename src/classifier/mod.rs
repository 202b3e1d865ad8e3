//! Produce classification on top of a pretrained checkpoint.
//!
//! A [`Classifier`] only has to expose its label map and a softmax
//! distribution for one image. Top-k and segmented (fresh vs. rotten)
//! predictions are derived from that distribution here, so every backend
//! shares the same post-processing.

pub mod groups;
pub mod hub;
pub mod labels;
pub mod onnx;
pub mod postprocess;
pub mod preprocess;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use groups::{PRODUCE_GROUPS, ProduceGroup, find_group};
pub use hub::ModelHub;
pub use labels::LabelMap;
pub use onnx::OnnxClassifier;
pub use postprocess::{freshness_score, softmax, top_k};
pub use preprocess::Preprocessor;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Unknown produce type: {0}")]
    UnknownProduce(String),

    #[error("Could not find fresh/rotten classes for {0}")]
    ClassesNotFound(String),

    #[error("Invalid model labels: {0}")]
    InvalidLabels(String),

    #[error("Model output has {got} classes, label map has {expected}")]
    OutputMismatch { expected: usize, got: usize },

    #[error("Inference failed: {0}")]
    Inference(String),
}

impl From<anyhow::Error> for ClassifierError {
    fn from(err: anyhow::Error) -> Self {
        Self::Inference(err.to_string())
    }
}

/// One entry of a top-k prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub prob: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FreshnessStatus {
    Fresh,
    Rotten,
}

impl FreshnessStatus {
    /// Label stored on `analysis_results.freshness_label`.
    #[must_use]
    pub const fn as_label(self) -> &'static str {
        match self {
            Self::Fresh => "good",
            Self::Rotten => "bad",
        }
    }
}

/// Fresh vs. rotten breakdown for one user-selected produce type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentedPrediction {
    pub produce_type: String,
    pub fresh_prob: f32,
    pub rotten_prob: f32,
    pub freshness_score: f64,
    pub status: FreshnessStatus,
}

impl SegmentedPrediction {
    /// Probability of whichever class won.
    #[must_use]
    pub fn confidence(&self) -> f32 {
        self.fresh_prob.max(self.rotten_prob)
    }
}

/// Top-k predictions plus the optional segmented breakdown, computed from a
/// single forward pass.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub predictions: Vec<Prediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segmented: Option<SegmentedPrediction>,
}

pub trait Classifier: Send + Sync {
    fn labels(&self) -> &LabelMap;

    /// Softmax distribution over [`Classifier::labels`] for a single image.
    fn probabilities(&self, image: &DynamicImage) -> Result<Vec<f32>, ClassifierError>;

    fn classify(
        &self,
        image: &DynamicImage,
        k: usize,
        group: Option<&ProduceGroup>,
    ) -> Result<Classification, ClassifierError> {
        let probs = self.probabilities(image)?;
        let predictions = top_k(&probs, self.labels(), k);
        let segmented = group
            .map(|g| segment(&probs, self.labels(), g))
            .transpose()?;

        Ok(Classification {
            predictions,
            segmented,
        })
    }

    fn predict(&self, image: &DynamicImage, k: usize) -> Result<Vec<Prediction>, ClassifierError> {
        let probs = self.probabilities(image)?;
        Ok(top_k(&probs, self.labels(), k))
    }

    fn segmented_predict(
        &self,
        image: &DynamicImage,
        selected_label: &str,
    ) -> Result<SegmentedPrediction, ClassifierError> {
        let group = find_group(selected_label)
            .ok_or_else(|| ClassifierError::UnknownProduce(selected_label.to_string()))?;
        let probs = self.probabilities(image)?;
        segment(&probs, self.labels(), group)
    }
}

/// Reads the fresh and rotten probabilities of `group` out of a full
/// distribution.
pub fn segment(
    probs: &[f32],
    labels: &LabelMap,
    group: &ProduceGroup,
) -> Result<SegmentedPrediction, ClassifierError> {
    let (Some(fresh_idx), Some(rotten_idx)) = (
        labels.index_of(group.fresh_label),
        labels.index_of(group.rotten_label),
    ) else {
        return Err(ClassifierError::ClassesNotFound(group.key.to_string()));
    };

    let (Some(&fresh_prob), Some(&rotten_prob)) = (probs.get(fresh_idx), probs.get(rotten_idx))
    else {
        return Err(ClassifierError::OutputMismatch {
            expected: labels.len(),
            got: probs.len(),
        });
    };

    let status = if fresh_prob > rotten_prob {
        FreshnessStatus::Fresh
    } else {
        FreshnessStatus::Rotten
    };

    Ok(SegmentedPrediction {
        produce_type: group.key.to_string(),
        fresh_prob,
        rotten_prob,
        freshness_score: freshness_score(fresh_prob),
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> LabelMap {
        LabelMap::from_labels(vec![
            "Fresh Apple(s)".to_string(),
            "Rotten Apple(s)".to_string(),
            "Fresh Banana(s)".to_string(),
            "Rotten Banana(s)".to_string(),
        ])
    }

    struct Fixed(LabelMap, Vec<f32>);

    impl Classifier for Fixed {
        fn labels(&self) -> &LabelMap {
            &self.0
        }

        fn probabilities(&self, _image: &DynamicImage) -> Result<Vec<f32>, ClassifierError> {
            Ok(self.1.clone())
        }
    }

    #[test]
    fn segment_picks_group_classes() {
        let probs = [0.1, 0.2, 0.6, 0.1];
        let group = find_group("banana").unwrap();
        let seg = segment(&probs, &labels(), group).unwrap();

        assert_eq!(seg.produce_type, "banana");
        assert!((seg.fresh_prob - 0.6).abs() < f32::EPSILON);
        assert!((seg.rotten_prob - 0.1).abs() < f32::EPSILON);
        assert!((seg.freshness_score - 60.0).abs() < 1e-9);
        assert_eq!(seg.status, FreshnessStatus::Fresh);
        assert!((seg.confidence() - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn segment_tie_is_rotten() {
        let probs = [0.25, 0.25, 0.25, 0.25];
        let group = find_group("apple").unwrap();
        let seg = segment(&probs, &labels(), group).unwrap();
        assert_eq!(seg.status, FreshnessStatus::Rotten);
        assert_eq!(seg.status.as_label(), "bad");
    }

    #[test]
    fn segment_missing_classes() {
        let probs = [0.25, 0.25, 0.25, 0.25];
        let group = find_group("okra").unwrap();
        let err = segment(&probs, &labels(), group).unwrap_err();
        assert!(matches!(err, ClassifierError::ClassesNotFound(ref k) if k == "okra"));
    }

    #[test]
    fn segment_short_output() {
        let probs = [0.5, 0.5];
        let group = find_group("banana").unwrap();
        let err = segment(&probs, &labels(), group).unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::OutputMismatch {
                expected: 4,
                got: 2
            }
        ));
    }

    #[test]
    fn segmented_predict_unknown_produce() {
        let classifier = Fixed(labels(), vec![0.25; 4]);
        let image = DynamicImage::new_rgb8(2, 2);
        let err = classifier.segmented_predict(&image, "durian").unwrap_err();
        assert_eq!(err.to_string(), "Unknown produce type: durian");
    }

    #[test]
    fn classify_without_group_has_no_breakdown() {
        let classifier = Fixed(labels(), vec![0.1, 0.5, 0.3, 0.1]);
        let image = DynamicImage::new_rgb8(2, 2);
        let out = classifier.classify(&image, 3, None).unwrap();
        assert_eq!(out.predictions.len(), 3);
        assert!(out.segmented.is_none());

        let out = classifier
            .classify(&image, 1, find_group("apple"))
            .unwrap();
        let seg = out.segmented.unwrap();
        assert_eq!(seg.status, FreshnessStatus::Rotten);
        assert!((seg.freshness_score - 10.0).abs() < 1e-6);
    }

    #[test]
    fn predict_returns_top_k() {
        let classifier = Fixed(labels(), vec![0.1, 0.5, 0.3, 0.1]);
        let image = DynamicImage::new_rgb8(2, 2);
        let preds = classifier.predict(&image, 2).unwrap();
        assert_eq!(preds.len(), 2);
        assert_eq!(preds[0].label, "Rotten Apple(s)");
        assert_eq!(preds[1].label, "Fresh Banana(s)");
    }
}
