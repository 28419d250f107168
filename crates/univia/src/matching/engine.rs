use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::adjuster::{NoopAdjuster, ScoreAdjuster};
use super::cache::ScoreCache;
use super::config::EngineConfig;
use super::domain::{OptionId, Slot, StudentProfile, University};
use super::fit::{AttributeFitScorer, Criterion, FitScore};
use super::hybrid::HybridRanker;
use super::preference::PreferenceModel;
use super::selection::{diversified_pick, plan_replacement, SubsetReplacement};
use super::slots::{AnswerOutcome, SlotTracker};

/// Construction failures. Everything after construction degrades instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("catalog is empty; nothing to rank")]
    EmptyCatalog,
    #[error("fit weights must sum to 1.0 (found {total:.6})")]
    InvalidWeights { total: f64 },
    #[error("fit weight for {criterion} must be a non-negative number (found {weight})")]
    NegativeWeight { criterion: Criterion, weight: f64 },
    #[error("active subset size must be at least 1")]
    InvalidSubsetSize,
    #[error("alpha schedule invalid (start {start}, step {step}, floor {floor})")]
    InvalidBlend { start: f64, step: f64, floor: f64 },
}

/// Scores reported for one option.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionScores {
    pub fit: f64,
    /// Raw Elo rating.
    pub elo: f64,
    /// Normalized preference component in [0, 1].
    pub preference: f64,
    pub hybrid: f64,
}

/// Inputs a caller needs to decide whether to stop soliciting feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopSignalInput {
    pub alpha: f64,
    pub feedback_events: u32,
    pub total_options: usize,
    pub seen_count: usize,
    pub pending_slots: Vec<Slot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub active_subset: Vec<OptionId>,
    pub scores: BTreeMap<OptionId, OptionScores>,
    pub seen: BTreeSet<OptionId>,
    pub stop_signal_input: StopSignalInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedOption {
    pub id: OptionId,
    pub name: String,
    pub fit: f64,
    pub hybrid: f64,
}

/// Session-scoped ranking state for one student against a fixed catalog.
#[derive(Clone)]
pub struct MatchingEngine {
    config: EngineConfig,
    profile: StudentProfile,
    catalog: Vec<University>,
    positions: HashMap<OptionId, usize>,
    scorer: AttributeFitScorer,
    preferences: PreferenceModel,
    ranker: HybridRanker,
    slots: SlotTracker,
    cache: ScoreCache,
    active: Vec<OptionId>,
    seen: BTreeSet<OptionId>,
    adjuster: Arc<dyn ScoreAdjuster>,
}

impl MatchingEngine {
    /// Builds the session: seeded catalog order, neutral ratings and the initial subset.
    pub fn initialize(
        profile: StudentProfile,
        catalog: Vec<University>,
        seed: u64,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let mut unique: Vec<University> = Vec::with_capacity(catalog.len());
        let mut ids = BTreeSet::new();
        for option in catalog {
            if ids.insert(option.id.clone()) {
                unique.push(option);
            } else {
                warn!(option = %option.id, "duplicate catalog id ignored");
            }
        }

        if unique.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        unique.shuffle(&mut rng);

        let positions = unique
            .iter()
            .enumerate()
            .map(|(index, option)| (option.id.clone(), index))
            .collect();
        let preferences =
            PreferenceModel::seeded(config.preference.clone(), unique.iter().map(|u| &u.id));

        let mut engine = Self {
            scorer: AttributeFitScorer::new(config.fit.clone()),
            ranker: HybridRanker::new(config.blend.clone()),
            preferences,
            profile,
            catalog: unique,
            positions,
            slots: SlotTracker::new(),
            cache: ScoreCache::default(),
            active: Vec::new(),
            seen: BTreeSet::new(),
            adjuster: Arc::new(NoopAdjuster),
            config,
        };

        let active = engine.select_initial_subset(engine.config.selection.subset_size);
        engine.seen.extend(active.iter().cloned());
        engine.active = active;

        info!(
            student = %engine.profile.id,
            options = engine.catalog.len(),
            seed,
            active = ?engine.active,
            "ranking session initialized"
        );

        Ok(engine)
    }

    /// Replaces the fit adjuster. Cached hybrid scores are dropped.
    pub fn with_adjuster(mut self, adjuster: Arc<dyn ScoreAdjuster>) -> Self {
        self.adjuster = adjuster;
        self.cache.invalidate_hybrid();
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn profile(&self) -> &StudentProfile {
        &self.profile
    }

    pub fn preferences(&self) -> &PreferenceModel {
        &self.preferences
    }

    pub fn alpha(&self) -> f64 {
        self.ranker.alpha()
    }

    pub fn active_subset(&self) -> &[OptionId] {
        &self.active
    }

    pub fn seen(&self) -> &BTreeSet<OptionId> {
        &self.seen
    }

    /// Catalog in the seeded session order.
    pub fn catalog(&self) -> &[University] {
        &self.catalog
    }

    pub fn option(&self, id: &OptionId) -> Option<&University> {
        self.positions.get(id).map(|&index| &self.catalog[index])
    }

    pub fn contains(&self, id: &OptionId) -> bool {
        self.positions.contains_key(id)
    }

    pub fn asked_slots(&self) -> Vec<Slot> {
        self.slots.asked().collect()
    }

    pub fn cache(&self) -> &ScoreCache {
        &self.cache
    }

    fn fit_at(&mut self, index: usize) -> FitScore {
        let id = &self.catalog[index].id;
        if let Some(score) = self.cache.fit(id) {
            return score.clone();
        }

        let (score, reads) = self
            .scorer
            .score_traced(&self.profile, &self.catalog[index]);
        self.cache.store_fit(id.clone(), score.clone(), reads);
        score
    }

    fn fit_component_at(&mut self, index: usize) -> f64 {
        let fit = self.fit_at(index);
        self.adjuster
            .adjust(&self.profile, &self.catalog[index], &fit)
            .score
            .clamp(0.0, 1.0)
    }

    fn hybrid_at(&mut self, index: usize) -> f64 {
        if let Some(score) = self.cache.hybrid(&self.catalog[index].id) {
            return score;
        }

        let fit = self.fit_component_at(index);
        let id = self.catalog[index].id.clone();
        let preference = self
            .ranker
            .preference_component(&self.preferences, &id)
            .combined;
        let hybrid = self.ranker.blend(fit, preference);
        self.cache.store_hybrid(id, hybrid);
        hybrid
    }

    pub fn fit_score(&mut self, id: &OptionId) -> Option<FitScore> {
        let index = *self.positions.get(id)?;
        Some(self.fit_at(index))
    }

    pub fn hybrid_score(&mut self, id: &OptionId) -> Option<f64> {
        let index = *self.positions.get(id)?;
        Some(self.hybrid_at(index))
    }

    pub fn scores(&mut self, id: &OptionId) -> Option<OptionScores> {
        let index = *self.positions.get(id)?;
        let fit = self.fit_component_at(index);
        let hybrid = self.hybrid_at(index);
        let preference = self
            .ranker
            .preference_component(&self.preferences, id)
            .combined;

        Some(OptionScores {
            fit,
            elo: self.preferences.elo(id),
            preference,
            hybrid,
        })
    }

    /// Top-`k` options by fit, diversified across campus setting and price tier.
    pub fn select_initial_subset(&mut self, k: usize) -> Vec<OptionId> {
        let mut ranked: Vec<(usize, f64)> = (0..self.catalog.len())
            .map(|index| (index, self.fit_at(index).overall))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let candidates: Vec<&University> = ranked
            .iter()
            .map(|&(index, _)| &self.catalog[index])
            .collect();
        diversified_pick(&candidates, k, &self.config.selection)
    }

    /// Swaps the weakest active member for the strongest option outside the subset.
    pub fn refresh_subset(&mut self) -> Option<SubsetReplacement> {
        let member_indices: Vec<usize> = self
            .active
            .iter()
            .filter_map(|id| self.positions.get(id).copied())
            .collect();
        let members: Vec<(OptionId, f64)> = member_indices
            .into_iter()
            .map(|index| (self.catalog[index].id.clone(), self.hybrid_at(index)))
            .collect();

        let outside: Vec<usize> = (0..self.catalog.len())
            .filter(|&index| !self.active.contains(&self.catalog[index].id))
            .collect();
        let candidates: Vec<(OptionId, f64)> = outside
            .into_iter()
            .map(|index| (self.catalog[index].id.clone(), self.hybrid_at(index)))
            .collect();

        let Some(replacement) = plan_replacement(&members, &candidates) else {
            debug!("no replacement candidates remain");
            return None;
        };

        self.active[replacement.position] = replacement.added.clone();
        self.seen.insert(replacement.added.clone());
        info!(
            removed = %replacement.removed,
            added = %replacement.added,
            "active subset refreshed"
        );

        Some(replacement)
    }

    /// Records that `better` was preferred over `worse`.
    ///
    /// Returns false, leaving state untouched, for a self-pair or ids outside the catalog.
    pub fn record_pairwise(&mut self, better: &OptionId, worse: &OptionId) -> bool {
        if better == worse {
            debug!(option = %better, "ignoring self comparison");
            return false;
        }
        if !self.contains(better) || !self.contains(worse) {
            warn!(%better, %worse, "pairwise feedback references unknown option");
            return false;
        }

        self.preferences.record_pairwise(better, worse);
        let alpha = self.ranker.record_feedback();
        self.cache.invalidate_hybrid();

        debug!(
            %better,
            %worse,
            alpha,
            better_elo = self.preferences.elo(better),
            worse_elo = self.preferences.elo(worse),
            "pairwise feedback recorded"
        );
        true
    }

    pub fn pending_questions(&self, max_count: usize) -> Vec<Slot> {
        self.slots.pending_questions(max_count)
    }

    /// Unasked slots the adjuster flags for the active subset, or the fixed priority order.
    pub fn suggest_questions(&mut self, max_count: usize) -> Vec<Slot> {
        let mut suggested: Vec<Slot> = Vec::new();
        let indices: Vec<usize> = self
            .active
            .iter()
            .filter_map(|id| self.positions.get(id).copied())
            .collect();

        for index in indices {
            let fit = self.fit_at(index);
            let adjustment = self
                .adjuster
                .adjust(&self.profile, &self.catalog[index], &fit);
            for slot in adjustment.missing_slots {
                if !self.slots.is_asked(slot) && !suggested.contains(&slot) {
                    suggested.push(slot);
                }
            }
        }

        if suggested.is_empty() {
            return self.pending_questions(max_count);
        }
        suggested.truncate(max_count);
        suggested
    }

    pub fn mark_asked(&mut self, slot: Slot) {
        self.slots.mark_asked(slot);
    }

    /// Applies an answer and drops exactly the cached scores that read the changed field.
    pub fn apply_answer(&mut self, slot: Slot, raw: &str) -> AnswerOutcome {
        let outcome = self.slots.apply_answer(&mut self.profile, slot, raw);

        if let Some(field) = outcome.changed_field {
            let dropped = self.cache.invalidate_field(field);
            if self.adjuster.depends_on_profile() {
                self.cache.invalidate_hybrid();
            }
            debug!(slot = slot.id(), ?field, dropped, "profile updated from answer");
        }

        outcome
    }

    pub fn current_state(&mut self) -> EngineSnapshot {
        let active = self.active.clone();
        let scores = active
            .iter()
            .filter_map(|id| self.scores(id).map(|scores| (id.clone(), scores)))
            .collect();

        EngineSnapshot {
            active_subset: active,
            scores,
            seen: self.seen.clone(),
            stop_signal_input: StopSignalInput {
                alpha: self.ranker.alpha(),
                feedback_events: self.ranker.feedback_events(),
                total_options: self.catalog.len(),
                seen_count: self.seen.len(),
                pending_slots: self.pending_questions(Slot::PRIORITY.len()),
            },
        }
    }

    /// Every option ordered by hybrid score, best first; ties keep session order.
    pub fn ranking(&mut self) -> Vec<RankedOption> {
        let mut ranked: Vec<RankedOption> = (0..self.catalog.len())
            .map(|index| {
                let fit = self.fit_component_at(index);
                let hybrid = self.hybrid_at(index);
                let option = &self.catalog[index];
                RankedOption {
                    id: option.id.clone(),
                    name: option.display_name().to_string(),
                    fit,
                    hybrid,
                }
            })
            .collect();
        ranked.sort_by(|a, b| b.hybrid.partial_cmp(&a.hybrid).unwrap_or(Ordering::Equal));
        ranked
    }
}
