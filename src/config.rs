//! Configuration management for the emotion detection pipeline

use crate::constants::{
    BLUR_THRESHOLD, BRIGHTNESS_THRESHOLD_HIGH, BRIGHTNESS_THRESHOLD_LOW, DEFAULT_DIVERSIFICATION_THRESHOLD,
    DEFAULT_SMOOTHING_WINDOW, DETECTION_GROUPING_EPS, DETECTION_MIN_NEIGHBORS, DETECTION_SCALE_FACTOR, FACE_MIN_SIZE,
    MODEL_INPUT_SIZE,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Frame quality thresholds
    pub quality: QualityConfig,

    /// Face locator configuration
    pub face_detection: FaceDetectionConfig,

    /// Classifier model configuration
    pub model: ModelConfig,

    /// Temporal smoothing and diversification
    pub smoothing: SmoothingConfig,
}

/// Frame quality thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Mean brightness below this is too dark (0-255)
    pub brightness_low: f64,

    /// Mean brightness above this is too bright (0-255)
    pub brightness_high: f64,

    /// Laplacian variance below this is blurred
    pub blur_threshold: f64,
}

/// Which face locator to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorMode {
    /// Cascade detector with the single-face policy
    #[default]
    Cascade,
    /// Fixed upper-middle crop, no detection
    CenterCrop,
}

impl fmt::Display for LocatorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cascade => f.write_str("cascade"),
            Self::CenterCrop => f.write_str("center_crop"),
        }
    }
}

/// Face detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceDetectionConfig {
    /// Locator mode
    pub locator: LocatorMode,

    /// Smallest face side in pixels
    pub min_face_size: u32,

    /// Window growth factor between scan scales
    pub scale_factor: f32,

    /// Raw detections needed to keep a grouped face
    pub min_neighbors: usize,

    /// Relative tolerance for grouping raw detections
    pub grouping_eps: f32,
}

/// Classifier model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to an ONNX emotion model; none runs the degraded heuristic
    pub path: Option<PathBuf>,

    /// Side length of the square model input
    pub input_size: u32,
}

/// Temporal smoothing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Number of recent predictions averaged
    pub window_size: usize,

    /// Consecutive repeats of one label before the runner-up is emitted
    pub diversification_threshold: u32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            brightness_low: BRIGHTNESS_THRESHOLD_LOW,
            brightness_high: BRIGHTNESS_THRESHOLD_HIGH,
            blur_threshold: BLUR_THRESHOLD,
        }
    }
}

impl Default for FaceDetectionConfig {
    fn default() -> Self {
        Self {
            locator: LocatorMode::Cascade,
            min_face_size: FACE_MIN_SIZE,
            scale_factor: DETECTION_SCALE_FACTOR,
            min_neighbors: DETECTION_MIN_NEIGHBORS,
            grouping_eps: DETECTION_GROUPING_EPS,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: None,
            input_size: MODEL_INPUT_SIZE,
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_SMOOTHING_WINDOW,
            diversification_threshold: DEFAULT_DIVERSIFICATION_THRESHOLD,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns the first inconsistent setting found
    pub fn validate(&self) -> Result<()> {
        let quality = &self.quality;
        for (name, value) in [
            ("Low brightness threshold", quality.brightness_low),
            ("High brightness threshold", quality.brightness_high),
        ] {
            if !(0.0..=255.0).contains(&value) {
                return Err(Error::ConfigError(format!("{name} must be between 0 and 255")));
            }
        }
        if quality.brightness_low >= quality.brightness_high {
            return Err(Error::ConfigError(
                "Low brightness threshold must be below the high threshold".to_string(),
            ));
        }
        if !(quality.blur_threshold.is_finite() && quality.blur_threshold >= 0.0) {
            return Err(Error::ConfigError("Blur threshold must be non-negative".to_string()));
        }

        // Face detection
        let detection = &self.face_detection;
        if detection.min_face_size == 0 {
            return Err(Error::ConfigError("Minimum face size must be greater than 0".to_string()));
        }
        if !(detection.scale_factor.is_finite() && detection.scale_factor > 1.0) {
            return Err(Error::ConfigError("Scale factor must be greater than 1.0".to_string()));
        }
        if detection.min_neighbors == 0 {
            return Err(Error::ConfigError("Minimum neighbours must be at least 1".to_string()));
        }
        if !(detection.grouping_eps > 0.0 && detection.grouping_eps < 1.0) {
            return Err(Error::ConfigError("Grouping eps must be between 0.0 and 1.0".to_string()));
        }

        // Model
        if self.model.input_size == 0 {
            return Err(Error::ConfigError("Model input size must be greater than 0".to_string()));
        }
        if let Some(path) = &self.model.path {
            if !path.exists() {
                return Err(Error::ConfigError(format!("Emotion model not found: {}", path.display())));
            }
        }

        // Smoothing
        if self.smoothing.window_size == 0 {
            return Err(Error::ConfigError("Smoothing window size must be greater than 0".to_string()));
        }
        if self.smoothing.diversification_threshold < 2 {
            return Err(Error::ConfigError("Diversification threshold must be at least 2".to_string()));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Emotion Detection Configuration

# Frame quality gate
quality:
  brightness_low: 30.0
  brightness_high: 220.0
  blur_threshold: 100.0

# Face locator: "cascade" or "center_crop"
face_detection:
  locator: cascade
  min_face_size: 48
  scale_factor: 1.1
  min_neighbors: 3
  grouping_eps: 0.2

# Emotion classifier; leave path unset to run the degraded heuristic
model:
  input_size: 48

# Temporal smoothing
smoothing:
  window_size: 5
  diversification_threshold: 4
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.face_detection.locator, LocatorMode::Cascade);
        assert_eq!(config.smoothing.window_size, 5);
        assert!(config.model.path.is_none());
    }

    #[test]
    fn test_example_config_parses() {
        let config = Config::from_yaml(EXAMPLE_CONFIG).unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.face_detection.min_neighbors, 3);
        assert_eq!(config.smoothing.diversification_threshold, 4);
        assert!((config.quality.blur_threshold - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_yaml("face_detection:\n  locator: center_crop\n").unwrap();

        assert_eq!(config.face_detection.locator, LocatorMode::CenterCrop);
        assert_eq!(config.face_detection.min_face_size, FACE_MIN_SIZE);
        assert_eq!(config.model.input_size, MODEL_INPUT_SIZE);
    }

    #[test]
    fn test_malformed_config() {
        let result = Config::from_yaml("face_detection:\n  locator: retina\n");
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.quality.brightness_low = 230.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.face_detection.scale_factor = 1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.smoothing.window_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.smoothing.diversification_threshold = 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.model.path = Some(PathBuf::from("/nonexistent/emotion.onnx"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_locator_mode_display() {
        assert_eq!(LocatorMode::CenterCrop.to_string(), "center_crop");
        assert_eq!(LocatorMode::default(), LocatorMode::Cascade);
    }
}
