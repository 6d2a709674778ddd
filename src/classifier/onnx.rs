//! `ONNX` Runtime backed emotion oracle.

use super::EmotionOracle;
use crate::preprocess::NormalizedTensor;
use crate::{Error, Result};
use ndarray::CowArray;
use ort::{Environment, Session, Value};
use std::path::Path;
use std::sync::Arc;

/// Emotion classifier loaded from an `ONNX` file
///
/// Expects one `(1, H, W, 1)` f32 input and one score vector output.
pub struct OnnxOracle {
    session: Session,
    class_count: usize,
}

impl OnnxOracle {
    /// Load a model for the default seven-class output
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The ONNX runtime environment cannot be created
    /// - The model file cannot be loaded
    /// - The model has no inputs or outputs
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        Self::with_class_count(model_path, crate::labels::NativeClass::COUNT)
    }

    /// Load a model with an explicit output length
    ///
    /// # Errors
    ///
    /// Same as [`OnnxOracle::new`]
    pub fn with_class_count<P: AsRef<Path>>(model_path: P, class_count: usize) -> Result<Self> {
        log::info!("Initializing OnnxOracle with model: {}", model_path.as_ref().display());

        let environment = Arc::new(
            Environment::builder()
                .with_name("emotion_classifier")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        if session.inputs.is_empty() {
            return Err(Error::ModelError("Model has no inputs".to_string()));
        }
        if session.outputs.is_empty() {
            return Err(Error::ModelError("Model has no outputs".to_string()));
        }

        Ok(Self { session, class_count })
    }
}

impl EmotionOracle for OnnxOracle {
    fn name(&self) -> &str {
        "onnx"
    }

    fn class_count(&self) -> usize {
        self.class_count
    }

    fn predict(&self, input: &NormalizedTensor) -> Result<Vec<f32>> {
        let cow_array = CowArray::from(input.data().view().into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;

        let scores_output = outputs
            .into_iter()
            .next()
            .ok_or_else(|| Error::ModelOutputError("No output from model".to_string()))?;

        let scores_tensor = scores_output.try_extract::<f32>()?;
        let scores_view = scores_tensor.view();

        Ok(scores_view.iter().copied().collect())
    }
}
