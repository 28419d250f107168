//! Online relative-preference learner fed by pairwise judgments.
//!
//! Two ratings are kept side by side for every option: an Elo rating and a
//! Bradley-Terry latent strength. Both updates are zero-sum, so only rating
//! differences carry meaning and nothing is normalized here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::domain::OptionId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceConfig {
    pub initial_elo: f64,
    pub initial_strength: f64,
    pub elo_k: f64,
    pub strength_learning_rate: f64,
}

impl Default for PreferenceConfig {
    fn default() -> Self {
        Self {
            initial_elo: 1000.0,
            initial_strength: 0.0,
            elo_k: 24.0,
            strength_learning_rate: 0.08,
        }
    }
}

/// Ratings held for one option.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRating {
    pub elo: f64,
    pub strength: f64,
}

#[derive(Debug, Clone)]
pub struct PreferenceModel {
    config: PreferenceConfig,
    elo: HashMap<OptionId, f64>,
    strength: HashMap<OptionId, f64>,
}

impl PreferenceModel {
    pub fn new(config: PreferenceConfig) -> Self {
        Self {
            config,
            elo: HashMap::new(),
            strength: HashMap::new(),
        }
    }

    /// Seeds neutral ratings for every id up front.
    pub fn seeded<'a>(config: PreferenceConfig, ids: impl IntoIterator<Item = &'a OptionId>) -> Self {
        let mut model = Self::new(config);
        for id in ids {
            model.ensure(id);
        }
        model
    }

    pub fn config(&self) -> &PreferenceConfig {
        &self.config
    }

    fn ensure(&mut self, id: &OptionId) {
        if !self.elo.contains_key(id) {
            self.elo.insert(id.clone(), self.config.initial_elo);
        }
        if !self.strength.contains_key(id) {
            self.strength.insert(id.clone(), self.config.initial_strength);
        }
    }

    pub fn is_tracked(&self, id: &OptionId) -> bool {
        self.elo.contains_key(id)
    }

    pub fn tracked(&self) -> usize {
        self.elo.len()
    }

    pub fn elo(&self, id: &OptionId) -> f64 {
        self.elo.get(id).copied().unwrap_or(self.config.initial_elo)
    }

    pub fn strength(&self, id: &OptionId) -> f64 {
        self.strength
            .get(id)
            .copied()
            .unwrap_or(self.config.initial_strength)
    }

    pub fn rating(&self, id: &OptionId) -> PreferenceRating {
        PreferenceRating {
            elo: self.elo(id),
            strength: self.strength(id),
        }
    }

    /// Lowest and highest tracked Elo rating, if anything is tracked.
    pub fn elo_range(&self) -> Option<(f64, f64)> {
        self.elo.values().fold(None, |range, &rating| match range {
            None => Some((rating, rating)),
            Some((min, max)) => Some((min.min(rating), max.max(rating))),
        })
    }

    pub fn elo_total(&self) -> f64 {
        self.elo.values().sum()
    }

    /// Bradley-Terry probability that `a` is preferred over `b`.
    pub fn probability_preferred(&self, a: &OptionId, b: &OptionId) -> f64 {
        logistic(self.strength(a) - self.strength(b))
    }

    /// Applies one "winner preferred over loser" judgment to both ratings.
    ///
    /// A self-pair carries no information and leaves the model untouched.
    pub fn record_pairwise(&mut self, winner: &OptionId, loser: &OptionId) {
        if winner == loser {
            return;
        }

        self.ensure(winner);
        self.ensure(loser);

        let rating_winner = self.elo(winner);
        let rating_loser = self.elo(loser);
        let expected_win = 1.0 / (1.0 + 10f64.powf((rating_loser - rating_winner) / 400.0));
        let delta = self.config.elo_k * (1.0 - expected_win);
        self.elo.insert(winner.clone(), rating_winner + delta);
        self.elo.insert(loser.clone(), rating_loser - delta);

        let p = self.probability_preferred(winner, loser);
        let step = self.config.strength_learning_rate * (1.0 - p);
        if let Some(strength) = self.strength.get_mut(winner) {
            *strength += step;
        }
        if let Some(strength) = self.strength.get_mut(loser) {
            *strength -= step;
        }
    }
}

impl Default for PreferenceModel {
    fn default() -> Self {
        Self::new(PreferenceConfig::default())
    }
}

pub(crate) fn logistic(value: f64) -> f64 {
    1.0 / (1.0 + (-value).exp())
}
