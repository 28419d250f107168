use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::Criterion;

/// Weight vector applied to the sub-scores. Must sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitWeights {
    pub accreditation: f64,
    pub portfolio: f64,
    pub campus_setting: f64,
    pub budget_gap: f64,
    pub student_staff_ratio: f64,
    pub english_ready: f64,
    pub accessibility: f64,
}

impl FitWeights {
    pub fn weight(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::Accreditation => self.accreditation,
            Criterion::Portfolio => self.portfolio,
            Criterion::CampusSetting => self.campus_setting,
            Criterion::BudgetGap => self.budget_gap,
            Criterion::StudentStaffRatio => self.student_staff_ratio,
            Criterion::EnglishReady => self.english_ready,
            Criterion::Accessibility => self.accessibility,
        }
    }

    pub fn total(&self) -> f64 {
        Criterion::ALL
            .iter()
            .map(|criterion| self.weight(*criterion))
            .sum()
    }
}

impl Default for FitWeights {
    fn default() -> Self {
        Self {
            accreditation: 0.24,
            portfolio: 0.16,
            campus_setting: 0.12,
            budget_gap: 0.18,
            student_staff_ratio: 0.10,
            english_ready: 0.10,
            accessibility: 0.10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepDirection {
    /// A step matches when the value is greater than or equal to its bound.
    AtLeast,
    /// A step matches when the value is less than or equal to its bound.
    AtMost,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub bound: f64,
    pub score: f64,
    /// The bound itself does not match.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub exclusive: bool,
}

/// Piecewise-constant scale with named breakpoints. Steps are tried in order; the first match wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepScale {
    pub direction: StepDirection,
    pub steps: Vec<Step>,
    pub fallback: f64,
}

impl StepScale {
    pub fn new(direction: StepDirection, steps: &[(f64, f64)], fallback: f64) -> Self {
        Self {
            direction,
            steps: steps
                .iter()
                .map(|&(bound, score)| Step {
                    bound,
                    score,
                    exclusive: false,
                })
                .collect(),
            fallback,
        }
    }

    /// Makes the step at `bound` exclusive.
    pub fn exclusive_at(mut self, bound: f64) -> Self {
        for step in self.steps.iter_mut().filter(|step| step.bound == bound) {
            step.exclusive = true;
        }
        self
    }

    pub fn score(&self, value: f64) -> f64 {
        self.steps
            .iter()
            .find(|step| match (self.direction, step.exclusive) {
                (StepDirection::AtLeast, false) => value >= step.bound,
                (StepDirection::AtLeast, true) => value > step.bound,
                (StepDirection::AtMost, false) => value <= step.bound,
                (StepDirection::AtMost, true) => value < step.bound,
            })
            .map(|step| step.score)
            .unwrap_or(self.fallback)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccreditationRule {
    pub recognized: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRule {
    /// Arts grade (out of 20) taken as a hint that a portfolio can be produced.
    pub ready_grade: f64,
    pub unready_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampusRule {
    pub unknown_score: f64,
    pub built_up_score: f64,
    pub mismatch_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRule {
    pub living_cost: f64,
    pub urban_living_premium: f64,
    /// Converts tuition + living (GBP) into the budget currency (EUR).
    pub cost_multiplier: f64,
    pub missing_score: f64,
    pub gap: StepScale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffRatioRule {
    pub missing_score: f64,
    pub scale: StepScale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnglishRule {
    pub no_requirement_score: f64,
    pub missing_score: f64,
    pub margin: StepScale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityRule {
    pub unmet_score: f64,
}

/// Rubric configuration: weights plus every breakpoint and default used by the fit rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    pub weights: FitWeights,
    pub accreditation: AccreditationRule,
    pub portfolio: PortfolioRule,
    pub campus: CampusRule,
    pub budget: BudgetRule,
    pub staff_ratio: StaffRatioRule,
    pub english: EnglishRule,
    pub accessibility: AccessibilityRule,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            weights: FitWeights::default(),
            accreditation: AccreditationRule {
                recognized: ["RIBA", "ARB"].iter().map(|s| s.to_string()).collect(),
            },
            portfolio: PortfolioRule {
                ready_grade: 14.0,
                unready_score: 0.4,
            },
            campus: CampusRule {
                unknown_score: 0.5,
                built_up_score: 0.5,
                mismatch_score: 0.0,
            },
            budget: BudgetRule {
                living_cost: 12_000.0,
                urban_living_premium: 3_000.0,
                cost_multiplier: 1.15,
                missing_score: 0.6,
                gap: StepScale::new(
                    StepDirection::AtLeast,
                    &[(5_000.0, 1.0), (0.0, 0.8), (-5_000.0, 0.5)],
                    0.2,
                )
                .exclusive_at(-5_000.0),
            },
            staff_ratio: StaffRatioRule {
                missing_score: 0.6,
                scale: StepScale::new(
                    StepDirection::AtMost,
                    &[(12.0, 1.0), (16.0, 0.8), (20.0, 0.6)],
                    0.4,
                ),
            },
            english: EnglishRule {
                no_requirement_score: 0.7,
                missing_score: 0.6,
                margin: StepScale::new(
                    StepDirection::AtLeast,
                    &[(0.5, 1.0), (0.0, 0.8), (-0.5, 0.6)],
                    0.3,
                ),
            },
            accessibility: AccessibilityRule { unmet_score: 0.3 },
        }
    }
}
