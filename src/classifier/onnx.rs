//! ONNX backend for [`Classifier`].

use std::path::Path;

use anyhow::Context;
use image::DynamicImage;
use tract_onnx::prelude::*;
use tracing::info;

use super::hub::ModelFiles;
use super::{Classifier, ClassifierError, LabelMap, Preprocessor, softmax};

type Plan = TypedRunnableModel<TypedModel>;

pub struct OnnxClassifier {
    plan: Plan,
    labels: LabelMap,
    preprocessor: Preprocessor,
}

impl OnnxClassifier {
    pub fn load(files: &ModelFiles, preprocessor: Preprocessor) -> anyhow::Result<Self> {
        let labels = LabelMap::load(&files.config)?;
        let plan = Self::build_plan(&files.model, &preprocessor)?;

        info!(
            model = %files.model.display(),
            classes = labels.len(),
            image_size = preprocessor.image_size,
            "Classifier loaded"
        );

        Ok(Self {
            plan,
            labels,
            preprocessor,
        })
    }

    fn build_plan(path: &Path, preprocessor: &Preprocessor) -> anyhow::Result<Plan> {
        let shape = preprocessor.input_shape();
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .with_context(|| format!("Failed to read ONNX graph: {}", path.display()))?
            .with_input_fact(0, f32::fact(shape).into())?
            .into_optimized()?
            .into_runnable()?;
        Ok(plan)
    }
}

impl Classifier for OnnxClassifier {
    fn labels(&self) -> &LabelMap {
        &self.labels
    }

    fn probabilities(&self, image: &DynamicImage) -> Result<Vec<f32>, ClassifierError> {
        let shape = self.preprocessor.input_shape();
        let input = tract_ndarray::Array4::from_shape_vec(
            (shape[0], shape[1], shape[2], shape[3]),
            self.preprocessor.run(image),
        )
        .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(Tensor::from(input).into()))
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let logits: Vec<f32> = outputs
            .first()
            .ok_or_else(|| ClassifierError::Inference("model produced no outputs".into()))?
            .to_array_view::<f32>()
            .map_err(|e| ClassifierError::Inference(e.to_string()))?
            .iter()
            .copied()
            .collect();

        if logits.len() != self.labels.len() {
            return Err(ClassifierError::OutputMismatch {
                expected: self.labels.len(),
                got: logits.len(),
            });
        }

        Ok(softmax(&logits))
    }
}
