//! Anti-stickiness guard that breaks long runs of one emotion label.

use crate::labels::{map_index, EmotionLabel};
use crate::probability::ranked;
use crate::{Error, Result};
use log::debug;

/// How many consecutive decisions carried the same label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StickinessState {
    last_label: Option<EmotionLabel>,
    repeat_count: u32,
}

impl StickinessState {
    #[must_use]
    pub fn last_label(&self) -> Option<EmotionLabel> {
        self.last_label
    }

    #[must_use]
    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    fn observe(&mut self, label: EmotionLabel) {
        if self.last_label == Some(label) {
            self.repeat_count = self.repeat_count.saturating_add(1);
        } else {
            self.last_label = Some(label);
            self.repeat_count = 1;
        }
    }
}

/// Label emitted by the guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardDecision {
    pub label: EmotionLabel,
    /// Whether the runner-up replaced the candidate
    pub diversified: bool,
}

/// Emits the runner-up class on every `threshold`-th identical decision
#[derive(Debug, Clone)]
pub struct DiversificationGuard {
    threshold: u32,
    state: StickinessState,
}

impl DiversificationGuard {
    /// # Errors
    ///
    /// Returns an error if the threshold is below 2
    pub fn new(threshold: u32) -> Result<Self> {
        if threshold < 2 {
            return Err(Error::InvalidInput(format!(
                "Diversification threshold must be at least 2, got {threshold}"
            )));
        }

        Ok(Self {
            threshold,
            state: StickinessState::default(),
        })
    }

    /// Record `candidate` and pick the label to emit
    ///
    /// `averaged` is the mean distribution over the smoothing window. The
    /// override only changes the emitted label; the stickiness state keeps
    /// tracking the candidate stream.
    pub fn apply(&mut self, candidate: EmotionLabel, averaged: Option<&[f32]>) -> GuardDecision {
        self.state.observe(candidate);

        if self.state.repeat_count % self.threshold == 0 {
            if let Some(&runner_up) = averaged.map(ranked).as_deref().and_then(|order| order.get(1)) {
                let label = map_index(runner_up);
                debug!(
                    "{candidate} repeated {} times, emitting runner-up {label}",
                    self.state.repeat_count
                );
                return GuardDecision {
                    label,
                    diversified: true,
                };
            }
        }

        GuardDecision {
            label: candidate,
            diversified: false,
        }
    }

    /// Label to report when a decision cannot be made
    #[must_use]
    pub fn last_known_label(&self) -> EmotionLabel {
        self.state.last_label.unwrap_or(EmotionLabel::Neutral)
    }

    #[must_use]
    pub fn state(&self) -> &StickinessState {
        &self.state
    }

    #[must_use]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn reset(&mut self) {
        self.state = StickinessState::default();
    }
}
