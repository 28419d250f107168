use serde::{Deserialize, Serialize};

use super::domain::OptionId;
use super::preference::{logistic, PreferenceModel};

/// Blend weight schedule: trust the fit rules early, learned preference later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendConfig {
    pub alpha_start: f64,
    pub alpha_step: f64,
    pub alpha_floor: f64,
    /// Elo spreads at or below this are treated as collapsed.
    pub range_epsilon: f64,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            alpha_start: 0.65,
            alpha_step: 0.03,
            alpha_floor: 0.35,
            range_epsilon: 1e-6,
        }
    }
}

/// Preference side of the blend, each part already mapped into [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreferenceComponent {
    pub elo: f64,
    pub strength: f64,
    pub combined: f64,
}

#[derive(Debug, Clone)]
pub struct HybridRanker {
    config: BlendConfig,
    alpha: f64,
    feedback_events: u32,
}

impl HybridRanker {
    pub fn new(config: BlendConfig) -> Self {
        let alpha = config.alpha_start;
        Self {
            config,
            alpha,
            feedback_events: 0,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn feedback_events(&self) -> u32 {
        self.feedback_events
    }

    /// Moves alpha one step toward its floor. Alpha never increases.
    pub fn record_feedback(&mut self) -> f64 {
        self.feedback_events += 1;
        let next = (self.alpha - self.config.alpha_step).max(self.config.alpha_floor);
        self.alpha = next.min(self.alpha);
        self.alpha
    }

    pub fn preference_component(&self, model: &PreferenceModel, id: &OptionId) -> PreferenceComponent {
        let elo = match model.elo_range() {
            Some((min, max)) if model.tracked() >= 2 && max - min > self.config.range_epsilon => {
                (model.elo(id) - min) / (max - min + self.config.range_epsilon)
            }
            _ => 0.5,
        };
        let strength = logistic(model.strength(id));

        PreferenceComponent {
            elo,
            strength,
            combined: 0.5 * elo + 0.5 * strength,
        }
    }

    pub fn blend(&self, fit: f64, preference: f64) -> f64 {
        self.alpha * fit + (1.0 - self.alpha) * preference
    }
}

impl Default for HybridRanker {
    fn default() -> Self {
        Self::new(BlendConfig::default())
    }
}
