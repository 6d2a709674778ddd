//! Suggestion text attached to pipeline results by the calling layer.

use crate::labels::{EmotionLabel, OutputLabel};
use crate::validation::ValidationReason;

/// Used when no specific suggestion exists
pub const DEFAULT_SUGGESTION: &str = "Keep going, you're doing fine!";

const CAMERA_NOT_CLEAR: &str = "Camera not clear. Please face the camera properly.";
const NO_FACE: &str = "No face detected. Please stay in front of the camera.";
const MULTIPLE_FACES: &str = "Multiple faces detected. Please ensure only one person is visible.";

/// Learning suggestion for an emotion
#[must_use]
pub fn for_emotion(label: EmotionLabel) -> &'static str {
    match label {
        EmotionLabel::Happy => "Great! Keep learning or try a quiz.",
        EmotionLabel::Neutral => "Stay focused and continue learning.",
        EmotionLabel::Confused => "Try revisiting the topic with a simpler explanation.",
        EmotionLabel::Bored => "Let's switch to an interactive activity.",
        EmotionLabel::Frustrated => "Take a short break and come back refreshed.",
        EmotionLabel::Sad => "Take a short break and try a simpler example.",
        EmotionLabel::Anxiety => DEFAULT_SUGGESTION,
    }
}

/// Guidance for a rejected frame, `None` for accepted frames
#[must_use]
pub fn for_rejection(reason: ValidationReason) -> Option<&'static str> {
    match reason {
        ValidationReason::Ok => None,
        ValidationReason::NoFace => Some(NO_FACE),
        ValidationReason::MultipleFaces => Some(MULTIPLE_FACES),
        ValidationReason::InvalidFrame
        | ValidationReason::TooDark
        | ValidationReason::TooBright
        | ValidationReason::Blurred
        | ValidationReason::ExtractionFailed => Some(CAMERA_NOT_CLEAR),
    }
}

/// Text for a complete pipeline result
#[must_use]
pub fn for_output(label: OutputLabel, reason: ValidationReason) -> &'static str {
    match label {
        OutputLabel::Emotion(emotion) => for_emotion(emotion),
        OutputLabel::MultiFaces => MULTIPLE_FACES,
        OutputLabel::Unknown => for_rejection(reason).unwrap_or(CAMERA_NOT_CLEAR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_emotion_has_text() {
        for label in EmotionLabel::ALL {
            assert!(!for_emotion(label).is_empty());
        }
        assert_eq!(for_emotion(EmotionLabel::Anxiety), DEFAULT_SUGGESTION);
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(for_rejection(ValidationReason::Ok), None);
        assert_eq!(for_rejection(ValidationReason::NoFace), Some(NO_FACE));
        assert_eq!(for_rejection(ValidationReason::Blurred), Some(CAMERA_NOT_CLEAR));
    }

    #[test]
    fn test_sentinel_output_text() {
        assert_eq!(for_output(OutputLabel::MultiFaces, ValidationReason::MultipleFaces), MULTIPLE_FACES);
        assert_eq!(for_output(OutputLabel::Unknown, ValidationReason::TooDark), CAMERA_NOT_CLEAR);
        assert_eq!(
            for_output(OutputLabel::Emotion(EmotionLabel::Bored), ValidationReason::Ok),
            "Let's switch to an interactive activity."
        );
    }
}
