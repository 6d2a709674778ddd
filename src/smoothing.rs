//! Temporal smoothing over a sliding window of probability vectors.

use crate::labels::NativeClass;
use crate::probability::{argmax, ProbabilityVector};
use crate::{Error, Result};
use log::{debug, warn};
use std::collections::VecDeque;

/// Smoothed class decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedDecision {
    /// Native class index with the highest mean probability
    pub class_index: usize,
    /// Mean probability of that class across the window
    pub confidence: f32,
}

/// Bounded FIFO of the most recent probability vectors
#[derive(Debug, Clone)]
pub struct PredictionHistory {
    window_size: usize,
    entries: VecDeque<ProbabilityVector>,
}

impl PredictionHistory {
    /// # Errors
    ///
    /// Returns an error if the window size is zero
    pub fn new(window_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(Error::InvalidInput("Window size must be greater than 0".to_string()));
        }

        Ok(Self {
            window_size,
            entries: VecDeque::with_capacity(window_size),
        })
    }

    /// Append a vector, evicting the oldest once the window is full
    pub fn push(&mut self, pv: ProbabilityVector) {
        if self.entries.len() >= self.window_size {
            self.entries.pop_front();
        }
        self.entries.push_back(pv);
    }

    /// Element-wise mean of all vectors in the window
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Window sizes are tiny
    pub fn mean(&self) -> Option<Vec<f32>> {
        let first = self.entries.front()?;
        let mut sums = vec![0.0f32; first.len()];

        for pv in &self.entries {
            for (sum, &v) in sums.iter_mut().zip(pv.values()) {
                *sum += v;
            }
        }

        let n = self.entries.len() as f32;
        Some(sums.into_iter().map(|s| s / n).collect())
    }

    /// Length of the vectors currently held
    #[must_use]
    pub fn vector_len(&self) -> Option<usize> {
        self.entries.front().map(ProbabilityVector::len)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Averages recent distributions into a stable decision
#[derive(Debug, Clone)]
pub struct TemporalSmoother {
    history: PredictionHistory,
}

impl TemporalSmoother {
    /// # Errors
    ///
    /// Returns an error if the window size is zero
    pub fn new(window_size: usize) -> Result<Self> {
        Ok(Self {
            history: PredictionHistory::new(window_size)?,
        })
    }

    /// Add a distribution and return the smoothed decision
    pub fn update(&mut self, pv: ProbabilityVector) -> SmoothedDecision {
        if let Some(len) = self.history.vector_len() {
            if len != pv.len() {
                warn!(
                    "Probability vector length changed from {len} to {}, clearing history",
                    pv.len()
                );
                self.history.clear();
            }
        }

        let latest = pv.argmax();
        self.history.push(pv);

        let decision = self
            .history
            .mean()
            .as_deref()
            .and_then(argmax)
            .or(latest)
            .map_or(
                SmoothedDecision {
                    class_index: NativeClass::Neutral.index(),
                    confidence: 0.0,
                },
                |(class_index, confidence)| SmoothedDecision {
                    class_index,
                    confidence,
                },
            );

        debug!(
            "Smoothed over {} frames: class {} ({:.3})",
            self.history.len(),
            decision.class_index,
            decision.confidence
        );

        decision
    }

    /// Element-wise mean of the current window
    #[must_use]
    pub fn averaged(&self) -> Option<Vec<f32>> {
        self.history.mean()
    }

    #[must_use]
    pub fn history(&self) -> &PredictionHistory {
        &self.history
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pv(values: &[f32]) -> ProbabilityVector {
        ProbabilityVector::from_raw(values, values.len()).unwrap()
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(TemporalSmoother::new(0).is_err());
    }

    #[test]
    fn test_first_update_uses_latest_vector() {
        let mut smoother = TemporalSmoother::new(3).unwrap();
        let decision = smoother.update(pv(&[0.2, 0.7, 0.1]));

        assert_eq!(decision.class_index, 1);
        assert!((decision.confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_window_average() {
        let mut smoother = TemporalSmoother::new(3).unwrap();
        smoother.update(pv(&[0.9, 0.1]));
        smoother.update(pv(&[0.2, 0.8]));
        let decision = smoother.update(pv(&[0.2, 0.8]));

        assert_eq!(decision.class_index, 1);
        assert!((decision.confidence - 1.7 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_oldest_entry_evicted() {
        let mut smoother = TemporalSmoother::new(2).unwrap();
        smoother.update(pv(&[1.0, 0.0]));
        smoother.update(pv(&[0.0, 1.0]));
        let decision = smoother.update(pv(&[0.0, 1.0]));

        assert_eq!(smoother.history().len(), 2);
        assert_eq!(decision.class_index, 1);
        assert!((decision.confidence - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_length_change_clears_history() {
        let mut smoother = TemporalSmoother::new(5).unwrap();
        smoother.update(pv(&[0.5, 0.5]));
        smoother.update(pv(&[0.1, 0.1, 0.8]));

        assert_eq!(smoother.history().len(), 1);
        assert_eq!(smoother.history().vector_len(), Some(3));
    }

    #[test]
    fn test_reset() {
        let mut smoother = TemporalSmoother::new(5).unwrap();
        smoother.update(pv(&[0.5, 0.5]));
        smoother.reset();

        assert!(smoother.history().is_empty());
        assert!(smoother.averaged().is_none());
    }
}
