//! Probability vectors over native classifier classes.

use crate::constants::NORMALIZATION_TOLERANCE;
use crate::{Error, Result};

/// Non-negative values summing to 1, one per native class
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityVector {
    values: Vec<f32>,
}

impl ProbabilityVector {
    /// Turn raw oracle output into a distribution
    ///
    /// Output that is already a distribution (non-negative, summing to 1
    /// within tolerance) is kept as is; anything else is treated as logits
    /// and passed through softmax.
    ///
    /// # Errors
    ///
    /// Returns an error if the output is empty, has the wrong length or
    /// contains non-finite values
    pub fn from_raw(raw: &[f32], expected_len: usize) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::ModelOutputError("Empty model output".to_string()));
        }
        if raw.len() != expected_len {
            return Err(Error::ModelOutputError(format!(
                "Expected {expected_len} class scores, got {}",
                raw.len()
            )));
        }
        if raw.iter().any(|v| !v.is_finite()) {
            return Err(Error::ModelOutputError("Model output contains non-finite values".to_string()));
        }

        if is_distribution(raw) {
            Ok(Self { values: raw.to_vec() })
        } else {
            Ok(Self { values: softmax(raw) })
        }
    }

    /// Wrap values that are known to form a distribution
    pub(crate) fn from_distribution(values: Vec<f32>) -> Self {
        debug_assert!(is_distribution(&values));
        Self { values }
    }

    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index and value of the largest entry
    #[must_use]
    pub fn argmax(&self) -> Option<(usize, f32)> {
        argmax(&self.values)
    }

    /// Index of the second largest entry
    #[must_use]
    pub fn second_best(&self) -> Option<usize> {
        ranked(&self.values).get(1).copied()
    }
}

/// Whether values already form a distribution within tolerance
#[must_use]
pub fn is_distribution(values: &[f32]) -> bool {
    !values.is_empty()
        && values.iter().all(|&v| v >= 0.0)
        && (values.iter().sum::<f32>() - 1.0).abs() <= NORMALIZATION_TOLERANCE
}

/// Numerically stable softmax
#[must_use]
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();

    exps.into_iter().map(|e| e / sum).collect()
}

/// Index and value of the largest entry; the first one wins ties
#[must_use]
pub fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    values
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (i, v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
}

/// Indices sorted by descending value, ties in index order
#[must_use]
pub fn ranked(values: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    order
}
