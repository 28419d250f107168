use std::collections::{BTreeSet, HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::matching::OptionId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// Trailing scores kept per option.
    pub window: usize,
    /// Scores needed before an option can be declared stable.
    pub min_points: usize,
    /// Largest step between consecutive scores still counted as stable.
    pub delta_epsilon: f64,
    /// Confident options needed to stop; capped at catalog size.
    pub target: usize,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            window: 5,
            min_points: 3,
            delta_epsilon: 0.015,
            target: 10,
        }
    }
}

/// Watches hybrid-score history per option and flags the ones that stopped moving.
#[derive(Debug, Clone, Default)]
pub struct ConfidenceMonitor {
    config: ConfidenceConfig,
    history: HashMap<OptionId, VecDeque<f64>>,
    confident: BTreeSet<OptionId>,
}

impl ConfidenceMonitor {
    pub fn new(config: ConfidenceConfig) -> Self {
        Self {
            config,
            history: HashMap::new(),
            confident: BTreeSet::new(),
        }
    }

    pub fn record(&mut self, id: &OptionId, score: f64) {
        let window = self.config.window.max(1);
        let history = self.history.entry(id.clone()).or_default();
        history.push_back(score);
        while history.len() > window {
            history.pop_front();
        }
    }

    pub fn history(&self, id: &OptionId) -> Vec<f64> {
        self.history
            .get(id)
            .map(|scores| scores.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Recomputes the confident set from the current histories.
    pub fn refresh(&mut self) -> &BTreeSet<OptionId> {
        let config = &self.config;
        self.confident = self
            .history
            .iter()
            .filter(|(_, scores)| is_stable(scores, config))
            .map(|(id, _)| id.clone())
            .collect();
        &self.confident
    }

    pub fn confident(&self) -> &BTreeSet<OptionId> {
        &self.confident
    }

    pub fn target_for(&self, total_options: usize) -> usize {
        self.config.target.min(total_options)
    }

    pub fn converged(&self, total_options: usize) -> bool {
        self.confident.len() >= self.target_for(total_options)
    }
}

fn is_stable(scores: &VecDeque<f64>, config: &ConfidenceConfig) -> bool {
    if scores.len() < config.min_points.max(2) {
        return false;
    }

    let deltas: Vec<f64> = scores
        .iter()
        .zip(scores.iter().skip(1))
        .map(|(previous, next)| (next - previous).abs())
        .collect();
    let recent = config.min_points.saturating_sub(1).max(1);

    deltas
        .iter()
        .rev()
        .take(recent)
        .all(|delta| *delta <= config.delta_epsilon)
}
