//! Shared smoothing context carried across pipeline calls.

use crate::config::SmoothingConfig;
use crate::diversification::{DiversificationGuard, StickinessState};
use crate::labels::{map_index, EmotionLabel};
use crate::probability::ProbabilityVector;
use crate::smoothing::TemporalSmoother;
use crate::Result;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Result of folding one distribution into the session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    /// Label to report
    pub label: EmotionLabel,
    /// Label of the smoothed class before diversification
    pub candidate: EmotionLabel,
    /// Smoothed native class index
    pub class_index: usize,
    /// Smoothed confidence of that class
    pub confidence: f32,
    /// Whether the guard replaced the candidate
    pub diversified: bool,
}

#[derive(Debug)]
struct SessionState {
    smoother: TemporalSmoother,
    guard: DiversificationGuard,
}

/// Prediction history and stickiness state behind one lock
///
/// Share one session between all calls that should smooth together; every
/// read-modify-write happens under the same mutex.
#[derive(Debug)]
pub struct EmotionSession {
    state: Mutex<SessionState>,
}

impl EmotionSession {
    /// # Errors
    ///
    /// Returns an error if the window is zero or the threshold is below 2
    pub fn new(window_size: usize, diversification_threshold: u32) -> Result<Self> {
        Ok(Self {
            state: Mutex::new(SessionState {
                smoother: TemporalSmoother::new(window_size)?,
                guard: DiversificationGuard::new(diversification_threshold)?,
            }),
        })
    }

    /// # Errors
    ///
    /// Returns an error if the smoothing settings are invalid
    pub fn from_config(config: &SmoothingConfig) -> Result<Self> {
        Self::new(config.window_size, config.diversification_threshold)
    }

    // A panic while holding the lock leaves consistent state behind
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Smooth, diversify and map one distribution
    pub fn record(&self, pv: ProbabilityVector) -> Decision {
        let mut state = self.lock();
        let smoothed = state.smoother.update(pv);
        let candidate = map_index(smoothed.class_index);
        let averaged = state.smoother.averaged();
        let guarded = state.guard.apply(candidate, averaged.as_deref());

        Decision {
            label: guarded.label,
            candidate,
            class_index: smoothed.class_index,
            confidence: smoothed.confidence,
            diversified: guarded.diversified,
        }
    }

    /// Last label the guard tracked, `Neutral` before any decision
    #[must_use]
    pub fn last_known_label(&self) -> EmotionLabel {
        self.lock().guard.last_known_label()
    }

    #[must_use]
    pub fn stickiness(&self) -> StickinessState {
        *self.lock().guard.state()
    }

    #[must_use]
    pub fn history_len(&self) -> usize {
        self.lock().smoother.history().len()
    }

    /// Forget history and stickiness
    pub fn reset(&self) {
        let mut state = self.lock();
        state.smoother.reset();
        state.guard.reset();
    }
}
