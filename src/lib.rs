//! Emotion detection library: from a single camera frame to a stable emotion label.
//!
//! The pipeline consists of:
//! 1. A frame quality gate rejecting dark, washed-out and blurred frames
//! 2. A cascade face locator enforcing exactly one face
//! 3. Preprocessing of the face region into a 48x48 normalized tensor
//! 4. A classifier adapter around an opaque model (or an intensity heuristic)
//! 5. Temporal smoothing over a sliding window of probability vectors
//! 6. A diversification guard that breaks long runs of one label
//! 7. Mapping of classifier classes onto the emotion vocabulary
//!
//! # Examples
//!
//! ```no_run
//! use emotion_detection::{config::Config, pipeline::EmotionPipeline, session::EmotionSession};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let pipeline = EmotionPipeline::from_config(&config)?;
//! let session = EmotionSession::from_config(&config.smoothing)?;
//!
//! let frame = image::open("frame.jpg")?;
//! let result = pipeline.analyze(Some(&frame), &session);
//! println!("{} ({}): {}", result.label, result.reason, result.suggestion());
//! # Ok(())
//! # }
//! ```
//!
//! ## Plugging in a classifier
//!
//! ```
//! use emotion_detection::classifier::{Classifier, EmotionOracle};
//! use emotion_detection::preprocess::NormalizedTensor;
//!
//! struct AlwaysHappy;
//!
//! impl EmotionOracle for AlwaysHappy {
//!     fn name(&self) -> &str {
//!         "always_happy"
//!     }
//!
//!     fn predict(&self, _input: &NormalizedTensor) -> emotion_detection::Result<Vec<f32>> {
//!         Ok(vec![0.0, 0.0, 0.0, 4.0, 0.0, 0.0, 0.0])
//!     }
//! }
//!
//! let classifier = Classifier::loaded(AlwaysHappy);
//! assert!(classifier.is_loaded());
//! ```

/// Frame validation outcomes and rejection reasons
pub mod validation;

/// Brightness and blur checks on raw frames
pub mod frame_quality;

/// Cascade face detection and the single-face policy
pub mod face_detection;

/// Face region to tensor conversion
pub mod preprocess;

/// Probability vectors and softmax normalization
pub mod probability;

/// Classifier adapter, oracle trait and degraded heuristic
pub mod classifier;

/// Sliding window smoothing of probability vectors
pub mod smoothing;

/// Anti-stickiness diversification
pub mod diversification;

/// Native classes, emotion vocabulary and label mapping
pub mod labels;

/// Shared smoothing session
pub mod session;

/// Pipeline driver
pub mod pipeline;

/// Suggestion lookup for results
pub mod suggestion;

/// Utility functions for image conversion and bounding boxes
pub mod utils;

/// Error types and result handling
pub mod error;

/// Constants used throughout the library
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
