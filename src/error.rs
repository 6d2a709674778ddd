//! Error types for the emotion detection library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or processing failed
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// `ONNX` Runtime inference failed
    #[cfg(feature = "onnx")]
    #[error("ONNX Runtime error: {0}")]
    OnnxRuntime(#[from] ort::OrtError),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model loading or inference error
    #[error("Model error: {0}")]
    ModelError(String),

    /// Model output could not be turned into a probability distribution
    #[error("Model output error: {0}")]
    ModelOutputError(String),

    /// Face detection or cropping failed
    #[error("Face detection error: {0}")]
    DetectionError(String),

    /// Face region could not be converted into a model tensor
    #[error("Preprocessing error: {0}")]
    PreprocessError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
