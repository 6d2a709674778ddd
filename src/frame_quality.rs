//! Frame quality gate: brightness and blur checks run before any detection work.

use crate::config::QualityConfig;
use crate::utils::image_conversion::frame_to_gray;
use crate::validation::{ValidationOutcome, ValidationReason};
use image::{DynamicImage, GrayImage};
use imageproc::filter::laplacian_filter;
use log::debug;

/// Brightness and sharpness measured on a grayscale frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMetrics {
    /// Mean grayscale intensity in [0, 255]
    pub brightness: f64,
    /// Variance of the Laplacian response
    pub sharpness: f64,
}

/// Rejects frames that are too dark, washed out or blurred
#[derive(Debug, Clone)]
pub struct QualityGate {
    brightness_low: f64,
    brightness_high: f64,
    blur_threshold: f64,
}

impl Default for QualityGate {
    fn default() -> Self {
        Self::new(&QualityConfig::default())
    }
}

impl QualityGate {
    /// Create a gate from configured thresholds
    #[must_use]
    pub fn new(config: &QualityConfig) -> Self {
        Self {
            brightness_low: config.brightness_low,
            brightness_high: config.brightness_high,
            blur_threshold: config.blur_threshold,
        }
    }

    /// Check a possibly missing frame
    ///
    /// Missing or empty frames are rejected with [`ValidationReason::InvalidFrame`].
    #[must_use]
    pub fn check(&self, frame: Option<&DynamicImage>) -> ValidationOutcome {
        let Some(frame) = frame else {
            return ValidationOutcome::rejected(ValidationReason::InvalidFrame, 0);
        };

        match frame_to_gray(frame) {
            Ok(gray) => self.check_gray(&gray),
            Err(e) => {
                debug!("Rejecting frame: {e}");
                ValidationOutcome::rejected(ValidationReason::InvalidFrame, 0)
            }
        }
    }

    /// Check an already converted grayscale frame
    #[must_use]
    pub fn check_gray(&self, gray: &GrayImage) -> ValidationOutcome {
        if gray.width() == 0 || gray.height() == 0 {
            return ValidationOutcome::rejected(ValidationReason::InvalidFrame, 0);
        }

        let brightness = mean_brightness(gray);
        if brightness < self.brightness_low {
            debug!("Frame too dark: mean brightness {brightness:.1}");
            return ValidationOutcome::rejected(ValidationReason::TooDark, 0);
        }
        if brightness > self.brightness_high {
            debug!("Frame too bright: mean brightness {brightness:.1}");
            return ValidationOutcome::rejected(ValidationReason::TooBright, 0);
        }

        let sharpness = laplacian_variance(gray);
        if sharpness < self.blur_threshold {
            debug!("Frame blurred: Laplacian variance {sharpness:.1}");
            return ValidationOutcome::rejected(ValidationReason::Blurred, 0);
        }

        debug!("Frame quality ok: brightness {brightness:.1}, sharpness {sharpness:.1}");
        ValidationOutcome::quality_passed()
    }

    /// Measure a grayscale frame without judging it
    #[must_use]
    pub fn measure(gray: &GrayImage) -> FrameMetrics {
        FrameMetrics {
            brightness: mean_brightness(gray),
            sharpness: laplacian_variance(gray),
        }
    }
}

/// Mean intensity of a grayscale image, 0 for an empty image
#[must_use]
#[allow(clippy::cast_precision_loss)] // Pixel counts are far below f64 precision limits
pub fn mean_brightness(gray: &GrayImage) -> f64 {
    let pixels = gray.as_raw();
    if pixels.is_empty() {
        return 0.0;
    }

    let total: u64 = pixels.iter().map(|&p| u64::from(p)).sum();
    total as f64 / pixels.len() as f64
}

/// Variance of the 3x3 Laplacian response, 0 for an empty image
///
/// Motion blur and defocus both flatten second derivatives, so low
/// variance means little high-frequency detail survived.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Pixel counts are far below f64 precision limits
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
    if gray.width() == 0 || gray.height() == 0 {
        return 0.0;
    }

    let response = laplacian_filter(gray);
    let n = response.as_raw().len() as f64;
    let mean = response.as_raw().iter().map(|&v| f64::from(v)).sum::<f64>() / n;

    response
        .as_raw()
        .iter()
        .map(|&v| (f64::from(v) - mean).powi(2))
        .sum::<f64>()
        / n
}
