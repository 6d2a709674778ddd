//! Frame validation outcomes shared by the quality gate and the face locator.

use image::GrayImage;
use std::fmt;

/// Why a frame was accepted or rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationReason {
    /// Frame passed every check
    Ok,
    /// Frame was missing or had no pixels
    InvalidFrame,
    /// Mean brightness below the low threshold
    TooDark,
    /// Mean brightness above the high threshold
    TooBright,
    /// Laplacian variance below the blur threshold
    Blurred,
    /// Detector found no face
    NoFace,
    /// Detector found more than one face
    MultipleFaces,
    /// Detector or cropping failed
    ExtractionFailed,
}

impl ValidationReason {
    /// Stable machine-readable name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::InvalidFrame => "invalid_frame",
            Self::TooDark => "too_dark",
            Self::TooBright => "too_bright",
            Self::Blurred => "blurred",
            Self::NoFace => "no_face",
            Self::MultipleFaces => "multiple_faces",
            Self::ExtractionFailed => "extraction_failed",
        }
    }

    /// Human-readable description
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Ok => "Valid single face detected",
            Self::InvalidFrame => "Frame is missing or empty",
            Self::TooDark | Self::TooBright => "Frame is too dark or too bright",
            Self::Blurred => "Frame is too blurred",
            Self::NoFace => "No face detected in frame",
            Self::MultipleFaces => "Multiple faces detected",
            Self::ExtractionFailed => "Failed to extract face region",
        }
    }
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of validating one frame
///
/// Built once per frame and never mutated afterwards; the fields are
/// read through accessors only.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    reason: ValidationReason,
    face_region: Option<GrayImage>,
    face_count: usize,
}

impl ValidationOutcome {
    /// Frame passed the quality checks; no face information yet
    #[must_use]
    pub fn quality_passed() -> Self {
        Self {
            reason: ValidationReason::Ok,
            face_region: None,
            face_count: 0,
        }
    }

    /// Frame passed every check and a face region was cropped
    #[must_use]
    pub fn with_face(face_region: GrayImage, face_count: usize) -> Self {
        Self {
            reason: ValidationReason::Ok,
            face_region: Some(face_region),
            face_count,
        }
    }

    /// Frame was rejected
    #[must_use]
    pub fn rejected(reason: ValidationReason, face_count: usize) -> Self {
        Self {
            reason,
            face_region: None,
            face_count,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.reason == ValidationReason::Ok
    }

    #[must_use]
    pub fn reason(&self) -> ValidationReason {
        self.reason
    }

    #[must_use]
    pub fn face_region(&self) -> Option<&GrayImage> {
        self.face_region.as_ref()
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.face_count
    }

    /// Take the cropped face region out of the outcome
    #[must_use]
    pub fn into_face_region(self) -> Option<GrayImage> {
        self.face_region
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_outcome() {
        let outcome = ValidationOutcome::rejected(ValidationReason::MultipleFaces, 2);

        assert!(!outcome.is_valid());
        assert_eq!(outcome.reason(), ValidationReason::MultipleFaces);
        assert_eq!(outcome.face_count(), 2);
        assert!(outcome.face_region().is_none());
    }

    #[test]
    fn test_with_face_outcome() {
        let outcome = ValidationOutcome::with_face(GrayImage::new(8, 8), 1);

        assert!(outcome.is_valid());
        assert_eq!(outcome.face_count(), 1);
        assert_eq!(outcome.into_face_region().map(|r| r.dimensions()), Some((8, 8)));
    }

    #[test]
    fn test_reason_names_are_stable() {
        assert_eq!(ValidationReason::TooDark.to_string(), "too_dark");
        assert_eq!(ValidationReason::ExtractionFailed.as_str(), "extraction_failed");
        assert_eq!(ValidationReason::TooBright.message(), ValidationReason::TooDark.message());
    }
}
