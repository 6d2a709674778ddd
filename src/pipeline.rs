//! Frame-to-label pipeline driver.
//!
//! Gate → Locator → Preprocessor → Classifier → Smoother → Guard → Mapper.
//! Every stage can end the run early with a sentinel; no error escapes
//! [`EmotionPipeline::analyze`].

use crate::classifier::{Classifier, Inference};
use crate::config::Config;
use crate::face_detection::FaceLocator;
use crate::frame_quality::QualityGate;
use crate::labels::OutputLabel;
use crate::preprocess::Preprocessor;
use crate::session::EmotionSession;
use crate::suggestion;
use crate::utils::image_conversion::frame_to_gray;
use crate::validation::{ValidationOutcome, ValidationReason};
use crate::Result;
use image::DynamicImage;
use log::{debug, info, warn};
use std::fmt;
use std::path::Path;

/// Where an emotion label came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    /// Loaded classifier model
    Model,
    /// Intensity heuristic (no model loaded)
    Heuristic,
    /// Inference failed; last label the session tracked
    LastKnown,
}

impl fmt::Display for DecisionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model => f.write_str("model"),
            Self::Heuristic => f.write_str("heuristic"),
            Self::LastKnown => f.write_str("last_known"),
        }
    }
}

/// Complete result for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub label: OutputLabel,
    pub reason: ValidationReason,
    pub face_count: usize,
    /// Smoothed confidence; `None` for sentinels and last-known fallbacks
    pub confidence: Option<f32>,
    /// `None` for sentinels
    pub source: Option<DecisionSource>,
    pub diversified: bool,
}

impl AnalysisResult {
    fn rejected(outcome: &ValidationOutcome) -> Self {
        let label = match outcome.reason() {
            ValidationReason::MultipleFaces => OutputLabel::MultiFaces,
            _ => OutputLabel::Unknown,
        };

        Self {
            label,
            reason: outcome.reason(),
            face_count: outcome.face_count(),
            confidence: None,
            source: None,
            diversified: false,
        }
    }

    /// Suggestion text for this result
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        suggestion::for_output(self.label, self.reason)
    }
}

/// Stateless pipeline stages; per-session state lives in [`EmotionSession`]
#[derive(Debug)]
pub struct EmotionPipeline {
    gate: QualityGate,
    locator: FaceLocator,
    preprocessor: Preprocessor,
    classifier: Classifier,
}

impl EmotionPipeline {
    #[must_use]
    pub fn new(gate: QualityGate, locator: FaceLocator, preprocessor: Preprocessor, classifier: Classifier) -> Self {
        Self {
            gate,
            locator,
            preprocessor,
            classifier,
        }
    }

    /// Build every stage from configuration, loading the model if one is set
    ///
    /// # Errors
    ///
    /// Returns an error if the face detector settings are invalid
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_classifier(config, Classifier::from_config(&config.model))
    }

    /// Build the stages from configuration around a given classifier
    ///
    /// # Errors
    ///
    /// Returns an error if the face detector settings are invalid
    pub fn with_classifier(config: &Config, classifier: Classifier) -> Result<Self> {
        let locator = FaceLocator::from_config(&config.face_detection)?;
        info!(
            "Emotion pipeline ready: locator {}, classifier {:?}",
            locator.mode(),
            classifier
        );

        Ok(Self::new(
            QualityGate::new(&config.quality),
            locator,
            Preprocessor::new(config.model.input_size),
            classifier,
        ))
    }

    #[must_use]
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    #[must_use]
    pub fn locator(&self) -> &FaceLocator {
        &self.locator
    }

    /// Run one frame through every stage
    #[must_use]
    pub fn analyze(&self, frame: Option<&DynamicImage>, session: &EmotionSession) -> AnalysisResult {
        let Some(frame) = frame else {
            return AnalysisResult::rejected(&ValidationOutcome::rejected(ValidationReason::InvalidFrame, 0));
        };
        let gray = match frame_to_gray(frame) {
            Ok(gray) => gray,
            Err(e) => {
                debug!("Rejecting frame: {e}");
                return AnalysisResult::rejected(&ValidationOutcome::rejected(ValidationReason::InvalidFrame, 0));
            }
        };

        let quality = self.gate.check_gray(&gray);
        if !quality.is_valid() {
            return AnalysisResult::rejected(&quality);
        }

        let located = self.locator.extract(&gray);
        if !located.is_valid() {
            return AnalysisResult::rejected(&located);
        }
        let face_count = located.face_count();
        let Some(face) = located.face_region() else {
            return AnalysisResult::rejected(&ValidationOutcome::rejected(
                ValidationReason::ExtractionFailed,
                face_count,
            ));
        };

        let tensor = self.preprocessor.preprocess(face);

        let (pv, source) = match self.classifier.infer(&tensor) {
            Inference::Model(pv) => (pv, DecisionSource::Model),
            Inference::Heuristic(pv) => (pv, DecisionSource::Heuristic),
            Inference::Failed(reason) => {
                let label = session.last_known_label();
                warn!("Returning last known label {label}: {reason}");
                return AnalysisResult {
                    label: OutputLabel::Emotion(label),
                    reason: ValidationReason::Ok,
                    face_count,
                    confidence: None,
                    source: Some(DecisionSource::LastKnown),
                    diversified: false,
                };
            }
        };

        let decision = session.record(pv);
        debug!(
            "Candidate {} -> {} (confidence {:.3}, source {source})",
            decision.candidate, decision.label, decision.confidence
        );

        AnalysisResult {
            label: OutputLabel::Emotion(decision.label),
            reason: ValidationReason::Ok,
            face_count,
            confidence: Some(decision.confidence),
            source: Some(source),
            diversified: decision.diversified,
        }
    }

    /// Decode an image file and analyze it
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or decoded
    pub fn analyze_file<P: AsRef<Path>>(&self, path: P, session: &EmotionSession) -> Result<AnalysisResult> {
        let frame = image::open(path)?;
        Ok(self.analyze(Some(&frame), session))
    }
}
