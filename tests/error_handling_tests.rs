//! Error handling tests for configuration and pipeline construction


use emotion_detection::classifier::Classifier;
use emotion_detection::config::{Config, EXAMPLE_CONFIG};
use emotion_detection::face_detection::{CascadeDetector, FaceCascade, FaceLocator};
use emotion_detection::pipeline::EmotionPipeline;
use emotion_detection::session::EmotionSession;
use emotion_detection::Error;
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("emotion_detection_{}_{name}", std::process::id()))
}

#[test]
fn test_config_file_round_trip() {
    let path = temp_path("config.yaml");
    let mut config = Config::default();
    config.smoothing.window_size = 7;
    config.to_file(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.smoothing.window_size, 7);
    assert!(loaded.validate().is_ok());

    std::fs::remove_file(path).ok();
}

#[test]
fn test_missing_config_file() {
    let result = Config::from_file("/nonexistent/emotion.yaml");
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_config_validation_messages() {
    let mut config = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
    config.quality.blur_threshold = -1.0;

    match config.validate() {
        Err(Error::ConfigError(msg)) => assert!(msg.contains("Blur threshold")),
        other => panic!("Expected ConfigError, got {other:?}"),
    }

    let mut config = Config::default();
    config.face_detection.grouping_eps = 1.5;
    match config.validate() {
        Err(Error::ConfigError(msg)) => assert!(msg.contains("Grouping eps")),
        other => panic!("Expected ConfigError, got {other:?}"),
    }
}

#[test]
fn test_pipeline_rejects_bad_detector_settings() {
    let mut config = Config::default();
    config.face_detection.scale_factor = 0.9;

    let result = EmotionPipeline::with_classifier(&config, Classifier::Unavailable);
    assert!(matches!(result, Err(Error::DetectionError(_))));
}

#[test]
fn test_custom_cascade_must_have_stages() {
    let config = Config::default();
    let result = CascadeDetector::with_cascade(FaceCascade { stages: Vec::new() }, &config.face_detection);
    assert!(result.is_err());
    assert!(FaceLocator::from_config(&config.face_detection).is_ok());
}

#[test]
fn test_session_rejects_bad_settings() {
    let mut config = Config::default();
    config.smoothing.window_size = 0;
    assert!(matches!(EmotionSession::from_config(&config.smoothing), Err(Error::InvalidInput(_))));
}

#[test]
fn test_analyze_file_errors() {
    let config = Config::default();
    let pipeline = EmotionPipeline::with_classifier(&config, Classifier::Unavailable).unwrap();
    let session = EmotionSession::from_config(&config.smoothing).unwrap();

    assert!(pipeline.analyze_file("/nonexistent/frame.png", &session).is_err());

    let path = temp_path("not_an_image.png");
    std::fs::write(&path, b"definitely not a png").unwrap();
    assert!(pipeline.analyze_file(&path, &session).is_err());
    std::fs::remove_file(path).ok();
}

#[test]
fn test_analyze_file_decodes_frame() {
    let config = Config::default();
    let pipeline = EmotionPipeline::with_classifier(&config, Classifier::Unavailable).unwrap();
    let session = EmotionSession::from_config(&config.smoothing).unwrap();

    let path = temp_path("face.png");
    test_helpers::single_face_frame().save(&path).unwrap();

    let result = pipeline.analyze_file(&path, &session).unwrap();
    assert!(result.label.is_emotion());
    std::fs::remove_file(path).ok();
}
