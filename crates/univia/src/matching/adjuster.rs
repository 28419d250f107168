//! Pluggable adjustment of the deterministic fit score.
//!
//! The engine only ever sees the [`ScoreAdjuster`] capability. Enhanced
//! implementations (for example one backed by an external model) are injected
//! by the caller; the engine itself performs no I/O.

use serde::{Deserialize, Serialize};

use super::domain::{Slot, StudentProfile, University};
use super::fit::FitScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecisionHint {
    Go,
    Maybe,
    NoGo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitAdjustment {
    pub score: f64,
    pub missing_slots: Vec<Slot>,
    pub hint: DecisionHint,
}

impl FitAdjustment {
    pub fn unchanged(fit: &FitScore) -> Self {
        Self {
            score: fit.overall,
            missing_slots: Vec::new(),
            hint: DecisionHint::Maybe,
        }
    }
}

pub trait ScoreAdjuster: Send + Sync {
    fn adjust(&self, profile: &StudentProfile, option: &University, fit: &FitScore)
        -> FitAdjustment;

    /// Whether adjustments may change when any profile field changes.
    /// When true, every profile update drops all cached hybrid scores.
    fn depends_on_profile(&self) -> bool {
        true
    }
}

/// Default adjuster: passes the deterministic score through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAdjuster;

impl ScoreAdjuster for NoopAdjuster {
    fn adjust(
        &self,
        _profile: &StudentProfile,
        _option: &University,
        fit: &FitScore,
    ) -> FitAdjustment {
        FitAdjustment::unchanged(fit)
    }

    fn depends_on_profile(&self) -> bool {
        false
    }
}
