//! Classifier adapter: runs the emotion oracle and normalizes its output.
//!
//! The oracle is chosen once at construction. When no model is available
//! the adapter answers from a deterministic intensity heuristic instead,
//! so the pipeline always gets a distribution or an explicit failure tag.

pub mod heuristic;
#[cfg(feature = "onnx")]
pub mod onnx;

use crate::config::ModelConfig;
use crate::labels::NativeClass;
use crate::preprocess::NormalizedTensor;
use crate::probability::ProbabilityVector;
use crate::Result;
use log::{info, warn};
use std::fmt;
use std::path::Path;

/// An opaque pre-trained emotion classifier
///
/// Implementations are loaded once and shared read-only across calls.
pub trait EmotionOracle: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Number of scores `predict` returns
    fn class_count(&self) -> usize {
        NativeClass::COUNT
    }

    /// Raw scores (logits or probabilities) for one input tensor
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails
    fn predict(&self, input: &NormalizedTensor) -> Result<Vec<f32>>;
}

/// Outcome of one classifier call
#[derive(Debug, Clone, PartialEq)]
pub enum Inference {
    /// Distribution produced by the loaded oracle
    Model(ProbabilityVector),
    /// Distribution produced by the degraded heuristic
    Heuristic(ProbabilityVector),
    /// The oracle call or its output was unusable
    Failed(String),
}

impl Inference {
    #[must_use]
    pub fn probabilities(&self) -> Option<&ProbabilityVector> {
        match self {
            Self::Model(pv) | Self::Heuristic(pv) => Some(pv),
            Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Classifier availability, decided at construction
pub enum Classifier {
    Loaded(Box<dyn EmotionOracle>),
    Unavailable,
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded(oracle) => f.debug_tuple("Loaded").field(&oracle.name()).finish(),
            Self::Unavailable => f.write_str("Unavailable"),
        }
    }
}

impl Classifier {
    /// Wrap an already constructed oracle
    #[must_use]
    pub fn loaded<O: EmotionOracle + 'static>(oracle: O) -> Self {
        Self::Loaded(Box::new(oracle))
    }

    /// Load the configured model, degrading to the heuristic if that fails
    #[must_use]
    pub fn from_config(config: &ModelConfig) -> Self {
        match &config.path {
            Some(path) => Self::load(path),
            None => {
                info!("No emotion model configured, using intensity heuristic");
                Self::Unavailable
            }
        }
    }

    #[cfg(feature = "onnx")]
    fn load(path: &Path) -> Self {
        match onnx::OnnxOracle::new(path) {
            Ok(oracle) => {
                info!("Loaded emotion model: {}", path.display());
                Self::loaded(oracle)
            }
            Err(e) => {
                warn!("Failed to load emotion model {}: {e}; using intensity heuristic", path.display());
                Self::Unavailable
            }
        }
    }

    #[cfg(not(feature = "onnx"))]
    fn load(path: &Path) -> Self {
        warn!(
            "Built without ONNX support, ignoring model {}; using intensity heuristic",
            path.display()
        );
        Self::Unavailable
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Classify one tensor
    ///
    /// Never returns an error: oracle failures come back as [`Inference::Failed`].
    #[must_use]
    pub fn infer(&self, tensor: &NormalizedTensor) -> Inference {
        match self {
            Self::Loaded(oracle) => {
                let result = oracle
                    .predict(tensor)
                    .and_then(|raw| ProbabilityVector::from_raw(&raw, oracle.class_count()));
                match result {
                    Ok(pv) => Inference::Model(pv),
                    Err(e) => {
                        warn!("Inference with {} failed: {e}", oracle.name());
                        Inference::Failed(e.to_string())
                    }
                }
            }
            Self::Unavailable => Inference::Heuristic(heuristic::estimate(tensor)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    struct FixedOracle(Vec<f32>);

    impl EmotionOracle for FixedOracle {
        fn name(&self) -> &str {
            "fixed"
        }

        fn predict(&self, _input: &NormalizedTensor) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenOracle;

    impl EmotionOracle for BrokenOracle {
        fn name(&self) -> &str {
            "broken"
        }

        fn predict(&self, _input: &NormalizedTensor) -> Result<Vec<f32>> {
            Err(Error::ModelError("session closed".to_string()))
        }
    }

    #[test]
    fn test_loaded_oracle_logits_are_normalized() {
        let classifier = Classifier::loaded(FixedOracle(vec![0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0]));
        let inference = classifier.infer(&NormalizedTensor::neutral(48));

        let Inference::Model(pv) = inference else {
            panic!("expected model inference, got {inference:?}");
        };
        assert_eq!(pv.argmax().map(|(i, _)| i), Some(NativeClass::Happy.index()));
        assert!((pv.values().iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_oracle_error_is_tagged() {
        let classifier = Classifier::loaded(BrokenOracle);
        assert!(classifier.infer(&NormalizedTensor::neutral(48)).is_failed());
    }

    #[test]
    fn test_wrong_length_output_is_tagged() {
        let classifier = Classifier::loaded(FixedOracle(vec![0.5, 0.5]));
        let inference = classifier.infer(&NormalizedTensor::neutral(48));

        assert!(inference.is_failed());
        assert!(inference.probabilities().is_none());
    }

    #[test]
    fn test_unavailable_uses_heuristic() {
        let classifier = Classifier::Unavailable;
        let inference = classifier.infer(&NormalizedTensor::neutral(48));

        assert!(matches!(inference, Inference::Heuristic(_)));
        assert!(!classifier.is_loaded());
    }

    #[test]
    fn test_from_config_without_model() {
        let classifier = Classifier::from_config(&ModelConfig::default());
        assert!(matches!(classifier, Classifier::Unavailable));
    }

    #[test]
    fn test_from_config_with_missing_model_degrades() {
        let config = ModelConfig {
            path: Some("/nonexistent/emotion.onnx".into()),
            ..ModelConfig::default()
        };
        assert!(!Classifier::from_config(&config).is_loaded());
    }
}
