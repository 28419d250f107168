//! Preference-and-ranking engine.
//!
//! A deterministic attribute-fit rubric is blended with an online pairwise
//! preference model; the blend weight shifts toward learned preference as
//! feedback accumulates. Everything here is synchronous and in-memory; a
//! [`MatchingEngine`] is owned by exactly one session.

pub mod adjuster;
pub mod cache;
mod config;
pub mod domain;
mod engine;
pub mod fit;
pub mod hybrid;
pub mod preference;
pub mod selection;
pub mod slots;

#[cfg(test)]
mod tests;

pub use adjuster::{DecisionHint, FitAdjustment, NoopAdjuster, ScoreAdjuster};
pub use config::EngineConfig;
pub use domain::{
    Academics, Admissions, BudgetProfile, Campus, CampusSetting, Constraints, EnglishProficiency,
    EnglishRequirement, Fees, Grades, Money, Offer, OptionId, Preferences, ProfileField, Slot,
    StudentProfile, University,
};
pub use engine::{
    EngineError, EngineSnapshot, MatchingEngine, OptionScores, RankedOption, StopSignalInput,
};
pub use fit::{AttributeFitScorer, Criterion, FitConfig, FitScore, FitWeights};
pub use hybrid::{BlendConfig, HybridRanker, PreferenceComponent};
pub use preference::{PreferenceConfig, PreferenceModel, PreferenceRating};
pub use selection::{SelectionConfig, SubsetReplacement};
pub use slots::{AnswerOutcome, SlotTracker};
