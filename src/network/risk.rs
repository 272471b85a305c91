//! Adapter for an external risk model.
//!
//! The risk model scores each segment independently. Only the resulting
//! [`Danger`] classification reaches the optimization model.

use super::segment::{Danger, SegmentSpec};

/// Default score at or above which a segment counts as dangerous.
pub const DEFAULT_RISK_THRESHOLD: f64 = 0.5;

/// Per-segment output of the risk model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskAssessment {
    /// Binary danger flag from the classifier.
    pub dangerous: bool,
    /// Continuous risk score in `[0, 1]` from the regressor.
    pub score: f64,
}

impl RiskAssessment {
    /// Creates an assessment.
    pub fn new(dangerous: bool, score: f64) -> Self {
        Self { dangerous, score }
    }

    /// Hard when either predictor reports danger, soft otherwise.
    pub fn classify(&self, threshold: f64) -> Danger {
        if self.dangerous || self.score >= threshold {
            Danger::Hard
        } else {
            Danger::Soft
        }
    }

    /// The two predictors disagree: no flag, but a high score.
    pub fn is_conflicting(&self, threshold: f64) -> bool {
        !self.dangerous && self.score >= threshold
    }
}

impl SegmentSpec {
    /// Builds a descriptor from a legal limit and a risk assessment.
    pub fn from_risk(
        id: impl Into<String>,
        legal_limit: u32,
        assessment: &RiskAssessment,
        threshold: f64,
    ) -> Self {
        match assessment.classify(threshold) {
            Danger::Hard => SegmentSpec::dangerous_with_limit(id, legal_limit),
            Danger::Soft | Danger::None => SegmentSpec::limited(id, legal_limit),
        }
    }
}
