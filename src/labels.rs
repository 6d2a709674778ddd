//! Native classifier classes, the application emotion vocabulary and the mapping between them.

use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output categories of the emotion classifier, in model output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NativeClass {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    Neutral,
}

impl NativeClass {
    /// All classes in model output order
    pub const ALL: [Self; 7] = [
        Self::Angry,
        Self::Disgust,
        Self::Fear,
        Self::Happy,
        Self::Sad,
        Self::Surprise,
        Self::Neutral,
    ];

    /// Number of classes the classifier emits
    pub const COUNT: usize = Self::ALL.len();

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Angry => "angry",
            Self::Disgust => "disgust",
            Self::Fear => "fear",
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Surprise => "surprise",
            Self::Neutral => "neutral",
        }
    }
}

/// Application emotion vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmotionLabel {
    Happy,
    Neutral,
    Confused,
    Sad,
    Frustrated,
    Bored,
    Anxiety,
}

impl EmotionLabel {
    pub const ALL: [Self; 7] = [
        Self::Happy,
        Self::Neutral,
        Self::Confused,
        Self::Sad,
        Self::Frustrated,
        Self::Bored,
        Self::Anxiety,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Happy => "Happy",
            Self::Neutral => "Neutral",
            Self::Confused => "Confused",
            Self::Sad => "Sad",
            Self::Frustrated => "Frustrated",
            Self::Bored => "Bored",
            Self::Anxiety => "Anxiety",
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final pipeline output: an emotion or one of the two rejection sentinels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputLabel {
    Emotion(EmotionLabel),
    /// Frame rejected for quality, missing face or extraction failure
    Unknown,
    /// More than one face in frame
    MultiFaces,
}

impl OutputLabel {
    /// Whether this is a genuine emotion rather than a sentinel
    #[must_use]
    pub fn is_emotion(self) -> bool {
        matches!(self, Self::Emotion(_))
    }

    #[must_use]
    pub fn emotion(self) -> Option<EmotionLabel> {
        match self {
            Self::Emotion(label) => Some(label),
            Self::Unknown | Self::MultiFaces => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Emotion(label) => label.as_str(),
            Self::Unknown => "Unknown",
            Self::MultiFaces => "Multi faces",
        }
    }
}

impl From<EmotionLabel> for OutputLabel {
    fn from(label: EmotionLabel) -> Self {
        Self::Emotion(label)
    }
}

impl fmt::Display for OutputLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a native class to the emotion vocabulary
#[must_use]
pub fn map_class(class: NativeClass) -> EmotionLabel {
    match class {
        NativeClass::Angry => EmotionLabel::Frustrated,
        NativeClass::Disgust => EmotionLabel::Bored,
        NativeClass::Fear => EmotionLabel::Anxiety,
        NativeClass::Happy => EmotionLabel::Happy,
        NativeClass::Sad => EmotionLabel::Sad,
        NativeClass::Surprise => EmotionLabel::Confused,
        NativeClass::Neutral => EmotionLabel::Neutral,
    }
}

/// Map a native class index to the emotion vocabulary
///
/// Total: indices outside the class table map to [`EmotionLabel::Neutral`].
#[must_use]
pub fn map_index(index: usize) -> EmotionLabel {
    NativeClass::from_index(index).map_or_else(
        || {
            warn!("Unmapped class index {index}, defaulting to Neutral");
            EmotionLabel::Neutral
        },
        map_class,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_indices_round_trip() {
        for (i, class) in NativeClass::ALL.iter().enumerate() {
            assert_eq!(class.index(), i);
            assert_eq!(NativeClass::from_index(i), Some(*class));
        }
        assert_eq!(NativeClass::from_index(NativeClass::COUNT), None);
    }

    #[test]
    fn test_mapping_table() {
        assert_eq!(map_index(0), EmotionLabel::Frustrated);
        assert_eq!(map_index(1), EmotionLabel::Bored);
        assert_eq!(map_index(2), EmotionLabel::Anxiety);
        assert_eq!(map_index(3), EmotionLabel::Happy);
        assert_eq!(map_index(4), EmotionLabel::Sad);
        assert_eq!(map_index(5), EmotionLabel::Confused);
        assert_eq!(map_index(6), EmotionLabel::Neutral);
    }

    #[test]
    fn test_unmapped_index_defaults_to_neutral() {
        assert_eq!(map_index(7), EmotionLabel::Neutral);
        assert_eq!(map_index(usize::MAX), EmotionLabel::Neutral);
    }

    #[test]
    fn test_every_label_is_reachable() {
        for label in EmotionLabel::ALL {
            assert!(NativeClass::ALL.iter().any(|&c| map_class(c) == label));
        }
    }

    #[test]
    fn test_sentinel_names() {
        assert_eq!(OutputLabel::Unknown.to_string(), "Unknown");
        assert_eq!(OutputLabel::MultiFaces.to_string(), "Multi faces");
        assert_eq!(OutputLabel::from(EmotionLabel::Confused).to_string(), "Confused");
        assert!(!OutputLabel::MultiFaces.is_emotion());
        assert_eq!(OutputLabel::Emotion(EmotionLabel::Sad).emotion(), Some(EmotionLabel::Sad));
    }
}
