mod config;
mod rules;

pub use config::{
    AccessibilityRule, AccreditationRule, BudgetRule, CampusRule, EnglishRule, FitConfig,
    FitWeights, PortfolioRule, StaffRatioRule, Step, StepDirection, StepScale,
};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{ProfileField, StudentProfile, University};

/// Named sub-criteria contributing to the attribute fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Accreditation,
    Portfolio,
    CampusSetting,
    BudgetGap,
    StudentStaffRatio,
    EnglishReady,
    Accessibility,
}

impl Criterion {
    pub const ALL: [Criterion; 7] = [
        Criterion::Accreditation,
        Criterion::Portfolio,
        Criterion::CampusSetting,
        Criterion::BudgetGap,
        Criterion::StudentStaffRatio,
        Criterion::EnglishReady,
        Criterion::Accessibility,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Criterion::Accreditation => "accreditation",
            Criterion::Portfolio => "portfolio",
            Criterion::CampusSetting => "campus_setting",
            Criterion::BudgetGap => "budget_gap",
            Criterion::StudentStaffRatio => "student_staff_ratio",
            Criterion::EnglishReady => "english_ready",
            Criterion::Accessibility => "accessibility",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Overall fit in [0, 1] plus the per-criterion breakdown it was summed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitScore {
    pub overall: f64,
    pub breakdown: BTreeMap<Criterion, f64>,
}

impl FitScore {
    pub fn sub_score(&self, criterion: Criterion) -> Option<f64> {
        self.breakdown.get(&criterion).copied()
    }
}

/// Stateless scorer applying the rubric configuration to a profile/option pair.
#[derive(Debug, Clone)]
pub struct AttributeFitScorer {
    config: FitConfig,
}

impl AttributeFitScorer {
    pub fn new(config: FitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    pub fn score(&self, profile: &StudentProfile, option: &University) -> FitScore {
        self.score_traced(profile, option).0
    }

    /// Scores the pair and reports which profile fields the rules consulted.
    pub fn score_traced(
        &self,
        profile: &StudentProfile,
        option: &University,
    ) -> (FitScore, BTreeSet<ProfileField>) {
        let mut reads = BTreeSet::new();
        let breakdown = rules::evaluate(profile, option, &self.config, &mut reads);

        let overall = breakdown
            .iter()
            .map(|(criterion, score)| self.config.weights.weight(*criterion) * score)
            .sum::<f64>()
            .clamp(0.0, 1.0);

        (FitScore { overall, breakdown }, reads)
    }
}

impl Default for AttributeFitScorer {
    fn default() -> Self {
        Self::new(FitConfig::default())
    }
}
