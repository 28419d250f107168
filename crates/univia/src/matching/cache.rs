use std::collections::{BTreeSet, HashMap};

use super::domain::{OptionId, ProfileField};
use super::fit::FitScore;

#[derive(Debug, Clone)]
struct CachedFit {
    score: FitScore,
    depends_on: BTreeSet<ProfileField>,
}

/// Fit and hybrid scores keyed by option, each fit entry remembering the profile fields it read.
#[derive(Debug, Clone, Default)]
pub struct ScoreCache {
    fit: HashMap<OptionId, CachedFit>,
    hybrid: HashMap<OptionId, f64>,
}

impl ScoreCache {
    pub fn fit(&self, id: &OptionId) -> Option<&FitScore> {
        self.fit.get(id).map(|entry| &entry.score)
    }

    pub fn store_fit(&mut self, id: OptionId, score: FitScore, depends_on: BTreeSet<ProfileField>) {
        self.fit.insert(id, CachedFit { score, depends_on });
    }

    pub fn hybrid(&self, id: &OptionId) -> Option<f64> {
        self.hybrid.get(id).copied()
    }

    pub fn store_hybrid(&mut self, id: OptionId, score: f64) {
        self.hybrid.insert(id, score);
    }

    /// Drops every fit entry that consulted `field`, plus the hybrid scores built on them.
    /// Returns how many fit entries were dropped.
    pub fn invalidate_field(&mut self, field: ProfileField) -> usize {
        let stale: Vec<OptionId> = self
            .fit
            .iter()
            .filter(|(_, entry)| entry.depends_on.contains(&field))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &stale {
            self.fit.remove(id);
            self.hybrid.remove(id);
        }

        stale.len()
    }

    /// Drops every hybrid entry; preference updates shift the normalization for all options.
    pub fn invalidate_hybrid(&mut self) {
        self.hybrid.clear();
    }

    pub fn cached_fit_count(&self) -> usize {
        self.fit.len()
    }

    pub fn cached_hybrid_count(&self) -> usize {
        self.hybrid.len()
    }
}
