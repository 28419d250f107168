use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::confidence::{ConfidenceConfig, ConfidenceMonitor};
use crate::matching::{
    AnswerOutcome, EngineSnapshot, MatchingEngine, OptionId, Slot, SubsetReplacement,
};

/// Quotas and stopping rules applied around the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionPolicy {
    pub confidence: ConfidenceConfig,
    pub max_questions_per_option: u32,
    pub questions_per_comment: usize,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            confidence: ConfidenceConfig::default(),
            max_questions_per_option: 5,
            questions_per_comment: 3,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("option {0} is not part of the catalog")]
    UnknownOption(OptionId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub student_id: String,
    /// Profile the engine scores against; differs from `student_id` after a directory fallback.
    pub profile_id: String,
    #[serde(flatten)]
    pub engine: EngineSnapshot,
    pub confident: BTreeSet<OptionId>,
    pub should_stop: bool,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEffect {
    pub outcome: AnswerOutcome,
    pub next_slots: Vec<Slot>,
    pub replacement: Option<SubsetReplacement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub option_id: OptionId,
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingTable {
    pub stop: bool,
    pub ranking: Vec<RankingEntry>,
}

/// One student's interactive ranking session: the engine plus the question
/// quotas, comments and convergence tracking layered on top of it.
#[derive(Clone)]
pub struct RankingSession {
    student_id: String,
    engine: MatchingEngine,
    policy: SessionPolicy,
    monitor: ConfidenceMonitor,
    comments: HashMap<OptionId, Vec<String>>,
    questions_asked: HashMap<OptionId, u32>,
    question_log: HashMap<OptionId, Vec<Slot>>,
    started_at: DateTime<Utc>,
}

impl RankingSession {
    pub fn new(engine: MatchingEngine, policy: SessionPolicy) -> Self {
        let monitor = ConfidenceMonitor::new(policy.confidence.clone());
        Self {
            student_id: engine.profile().id.clone(),
            engine,
            policy,
            monitor,
            comments: HashMap::new(),
            questions_asked: HashMap::new(),
            question_log: HashMap::new(),
            started_at: Utc::now(),
        }
    }

    /// Keys the session under `student_id` instead of the scored profile's id.
    pub fn with_student_id(mut self, student_id: impl Into<String>) -> Self {
        self.student_id = student_id.into();
        self
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }

    pub fn monitor(&self) -> &ConfidenceMonitor {
        &self.monitor
    }

    pub fn comments(&self, option: &OptionId) -> &[String] {
        self.comments.get(option).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn questions_asked(&self, option: &OptionId) -> u32 {
        self.questions_asked.get(option).copied().unwrap_or(0)
    }

    pub fn asked_for(&self, option: &OptionId) -> &[Slot] {
        self.question_log.get(option).map(Vec::as_slice).unwrap_or(&[])
    }

    fn ensure_known(&self, option: &OptionId) -> Result<(), SessionError> {
        if self.engine.contains(option) {
            Ok(())
        } else {
            Err(SessionError::UnknownOption(option.clone()))
        }
    }

    /// Asks `slots` about `option` while its quota lasts; returns what was asked.
    fn ask(&mut self, option: &OptionId, slots: Vec<Slot>) -> Vec<Slot> {
        let quota = self.policy.max_questions_per_option;
        let mut asked = Vec::new();
        for slot in slots {
            let count = self.questions_asked.entry(option.clone()).or_insert(0);
            if *count >= quota {
                break;
            }
            *count += 1;
            asked.push(slot);
        }
        self.question_log
            .entry(option.clone())
            .or_default()
            .extend(asked.iter().copied());
        asked
    }

    /// Snapshot plus convergence bookkeeping. Each call appends the active
    /// subset's hybrid scores to the confidence history.
    pub fn state(&mut self) -> SessionState {
        let snapshot = self.engine.current_state();
        for (id, scores) in &snapshot.scores {
            self.monitor.record(id, scores.hybrid);
        }
        let confident = self.monitor.refresh().clone();
        let should_stop = self.should_stop();

        SessionState {
            student_id: self.student_id.clone(),
            profile_id: self.engine.profile().id.clone(),
            engine: snapshot,
            confident,
            should_stop,
            started_at: self.started_at,
        }
    }

    /// Stops once every active option used its question quota or enough options converged.
    pub fn should_stop(&self) -> bool {
        let quota = self.policy.max_questions_per_option;
        let quotas_exhausted = self
            .engine
            .active_subset()
            .iter()
            .all(|option| self.questions_asked(option) >= quota);

        quotas_exhausted || self.monitor.converged(self.engine.catalog().len())
    }

    /// Stores a comment; the first comment on an option opens its questions.
    pub fn comment(&mut self, option: &OptionId, text: &str) -> Result<Vec<Slot>, SessionError> {
        self.ensure_known(option)?;

        let comments = self.comments.entry(option.clone()).or_default();
        comments.push(text.to_string());
        if comments.len() != 1 {
            return Ok(Vec::new());
        }

        let suggested = self
            .engine
            .suggest_questions(self.policy.questions_per_comment);
        let asked = self.ask(option, suggested);
        debug!(%option, asked = asked.len(), "questions opened by first comment");
        Ok(asked)
    }

    /// Applies an answer, asks the next question within quota and refreshes the subset.
    pub fn answer(
        &mut self,
        option: &OptionId,
        slot: Slot,
        value: &str,
    ) -> Result<AnswerEffect, SessionError> {
        self.ensure_known(option)?;

        let outcome = self.engine.apply_answer(slot, value);
        let next = self.engine.pending_questions(1);
        let next_slots = self.ask(option, next);

        let replacement = if self.should_stop() {
            None
        } else {
            self.engine.refresh_subset()
        };

        Ok(AnswerEffect {
            outcome,
            next_slots,
            replacement,
        })
    }

    pub fn pairwise(&mut self, better: &OptionId, worse: &OptionId) -> bool {
        self.engine.record_pairwise(better, worse)
    }

    /// Full ranking by hybrid score, rounded to three decimals.
    pub fn ranking(&mut self) -> RankingTable {
        let ranking = self
            .engine
            .ranking()
            .into_iter()
            .map(|entry| RankingEntry {
                option_id: entry.id,
                name: entry.name,
                score: (entry.hybrid * 1000.0).round() / 1000.0,
            })
            .collect();

        RankingTable {
            stop: self.should_stop(),
            ranking,
        }
    }
}
