//! Tests for ONNX emotion model loading and inference

#![cfg(feature = "onnx")]


use emotion_detection::classifier::onnx::OnnxOracle;
use emotion_detection::classifier::{Classifier, EmotionOracle};
use emotion_detection::config::Config;
use emotion_detection::pipeline::{DecisionSource, EmotionPipeline};
use emotion_detection::preprocess::NormalizedTensor;
use emotion_detection::session::EmotionSession;
use emotion_detection::Result;
use std::path::Path;

const MODEL_PATH: &str = "assets/emotion_model.onnx";

#[test]
fn test_missing_model_fails_to_load() {
    assert!(OnnxOracle::new("/nonexistent/emotion_model.onnx").is_err());
}

#[test]
#[ignore = "Requires ONNX models"]
fn test_model_output_has_seven_scores() -> Result<()> {
    assert!(Path::new(MODEL_PATH).exists(), "Emotion model not found");

    let oracle = OnnxOracle::new(MODEL_PATH)?;
    let scores = oracle.predict(&NormalizedTensor::neutral(48))?;
    assert_eq!(scores.len(), oracle.class_count());

    Ok(())
}

#[test]
#[ignore = "Requires ONNX models"]
fn test_pipeline_with_model() -> Result<()> {
    let mut config = Config::default();
    config.model.path = Some(MODEL_PATH.into());

    let pipeline = EmotionPipeline::from_config(&config)?;
    assert!(pipeline.classifier().is_loaded());
    let session = EmotionSession::from_config(&config.smoothing)?;

    let result = pipeline.analyze(Some(&test_helpers::single_face_frame()), &session);
    assert_eq!(result.source, Some(DecisionSource::Model));

    Ok(())
}

#[test]
fn test_unloadable_model_degrades_to_heuristic() {
    let mut config = Config::default();
    config.model.path = Some("/nonexistent/emotion_model.onnx".into());

    assert!(matches!(Classifier::from_config(&config.model), Classifier::Unavailable));
}
