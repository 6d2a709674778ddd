//! Intensity heuristic used when no emotion model is loaded.

use crate::constants::{HEURISTIC_BRIGHT_MEAN, HEURISTIC_DARK_MEAN, HEURISTIC_PRIMARY_MASS, HEURISTIC_SECONDARY_MASS};
use crate::labels::NativeClass;
use crate::preprocess::NormalizedTensor;
use crate::probability::ProbabilityVector;

/// First and second choice for a mean normalized intensity
#[must_use]
pub fn choices(mean: f32) -> (NativeClass, NativeClass) {
    if mean < HEURISTIC_DARK_MEAN {
        (NativeClass::Sad, NativeClass::Neutral)
    } else if mean > HEURISTIC_BRIGHT_MEAN {
        (NativeClass::Happy, NativeClass::Surprise)
    } else {
        (NativeClass::Neutral, NativeClass::Happy)
    }
}

/// Peaked distribution over native classes derived from mean intensity
///
/// Deterministic in the tensor contents.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Class count is tiny
pub fn estimate(tensor: &NormalizedTensor) -> ProbabilityVector {
    let (primary, secondary) = choices(tensor.mean());
    let rest = (1.0 - HEURISTIC_PRIMARY_MASS - HEURISTIC_SECONDARY_MASS) / (NativeClass::COUNT - 2) as f32;

    let values = NativeClass::ALL
        .iter()
        .map(|&class| {
            if class == primary {
                HEURISTIC_PRIMARY_MASS
            } else if class == secondary {
                HEURISTIC_SECONDARY_MASS
            } else {
                rest
            }
        })
        .collect();

    ProbabilityVector::from_distribution(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_bands() {
        assert_eq!(choices(0.1), (NativeClass::Sad, NativeClass::Neutral));
        assert_eq!(choices(0.5), (NativeClass::Neutral, NativeClass::Happy));
        assert_eq!(choices(0.9), (NativeClass::Happy, NativeClass::Surprise));
        assert_eq!(choices(f32::NAN).0, NativeClass::Neutral);
    }

    #[test]
    fn test_estimate_is_a_distribution() {
        let pv = estimate(&NormalizedTensor::neutral(48));

        assert_eq!(pv.len(), NativeClass::COUNT);
        assert!((pv.values().iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert_eq!(pv.argmax().map(|(i, _)| i), Some(NativeClass::Neutral.index()));
        assert_eq!(pv.second_best(), Some(NativeClass::Happy.index()));
    }
}
