use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::prompts::{Question, SlotPrompts};
use super::ranking::{RankingSession, RankingTable, SessionError, SessionPolicy, SessionState};
use super::repository::{RepositoryError, SessionRepository};
use crate::catalog::StudentDirectory;
use crate::matching::{
    AnswerOutcome, EngineConfig, EngineError, MatchingEngine, NoopAdjuster, OptionId,
    ScoreAdjuster, Slot, SubsetReplacement, University,
};

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub option_id: OptionId,
    pub questions: Vec<Question>,
    pub state: SessionState,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerView {
    pub outcome: AnswerOutcome,
    pub questions: Vec<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement: Option<SubsetReplacement>,
    pub state: SessionState,
}

#[derive(Debug, Clone, Serialize)]
pub struct PairwiseView {
    pub recorded: bool,
    pub alpha: f64,
    pub state: SessionState,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartRequest {
    #[serde(default)]
    pub student_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentRequest {
    pub option_id: OptionId,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerRequest {
    pub option_id: OptionId,
    pub slot: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PairwiseRequest {
    pub better: OptionId,
    pub worse: OptionId,
}

/// Service owning the catalog and building one ranking session per student.
///
/// Every operation on a student's session runs fetch, mutate and save under
/// that student's guard, so concurrent requests for one student are applied
/// one after the other.
pub struct SessionService<R> {
    repository: Arc<R>,
    guards: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    catalog: Arc<Vec<University>>,
    students: Arc<StudentDirectory>,
    engine_config: EngineConfig,
    policy: SessionPolicy,
    prompts: SlotPrompts,
    seed: u64,
    adjuster: Arc<dyn ScoreAdjuster>,
}

impl<R> SessionService<R>
where
    R: SessionRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        catalog: Vec<University>,
        students: StudentDirectory,
        seed: u64,
    ) -> Self {
        Self {
            repository,
            guards: Mutex::new(HashMap::new()),
            catalog: Arc::new(catalog),
            students: Arc::new(students),
            engine_config: EngineConfig::default(),
            policy: SessionPolicy::default(),
            prompts: SlotPrompts::default(),
            seed,
            adjuster: Arc::new(NoopAdjuster),
        }
    }

    pub fn with_engine_config(mut self, config: EngineConfig) -> Self {
        self.engine_config = config;
        self
    }

    pub fn with_policy(mut self, policy: SessionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_prompts(mut self, prompts: SlotPrompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_adjuster(mut self, adjuster: Arc<dyn ScoreAdjuster>) -> Self {
        self.adjuster = adjuster;
        self
    }

    pub fn catalog_size(&self) -> usize {
        self.catalog.len()
    }

    fn questions(&self, slots: &[Slot]) -> Vec<Question> {
        slots.iter().map(|slot| self.prompts.question(*slot)).collect()
    }

    fn guard(&self, student_id: &str) -> Arc<Mutex<()>> {
        self.guards
            .lock()
            .expect("session guards poisoned")
            .entry(student_id.to_string())
            .or_default()
            .clone()
    }

    /// Runs `apply` on the stored session and saves the result, holding the student's guard throughout.
    fn with_session<T>(
        &self,
        student_id: &str,
        apply: impl FnOnce(&mut RankingSession) -> Result<T, SessionServiceError>,
    ) -> Result<T, SessionServiceError> {
        let guard = self.guard(student_id);
        let _held = guard.lock().expect("session guard poisoned");

        let mut session = self
            .repository
            .fetch(student_id)?
            .ok_or(RepositoryError::NotFound)?;
        let value = apply(&mut session)?;
        self.repository.save(session)?;
        Ok(value)
    }

    /// Starts (or restarts) a session, replacing any previous one stored under
    /// the requested id. Unknown ids are scored against the directory fallback.
    pub fn start(&self, request: StartRequest) -> Result<SessionState, SessionServiceError> {
        let requested = request
            .student_id
            .unwrap_or_else(|| self.students.default_id());
        let profile = self.students.resolve(&requested);

        let engine = MatchingEngine::initialize(
            profile,
            self.catalog.as_ref().clone(),
            self.seed,
            self.engine_config.clone(),
        )?
        .with_adjuster(self.adjuster.clone());

        let mut session =
            RankingSession::new(engine, self.policy.clone()).with_student_id(requested.as_str());
        let state = session.state();

        let guard = self.guard(&requested);
        let _held = guard.lock().expect("session guard poisoned");
        self.repository.save(session)?;
        info!(
            student = %requested,
            profile = %state.profile_id,
            "ranking session started"
        );
        Ok(state)
    }

    pub fn state(&self, student_id: &str) -> Result<SessionState, SessionServiceError> {
        self.with_session(student_id, |session| Ok(session.state()))
    }

    pub fn comment(
        &self,
        student_id: &str,
        request: CommentRequest,
    ) -> Result<CommentView, SessionServiceError> {
        self.with_session(student_id, |session| {
            let slots = session.comment(&request.option_id, &request.text)?;
            Ok(CommentView {
                questions: self.questions(&slots),
                state: session.state(),
                option_id: request.option_id,
            })
        })
    }

    pub fn answer(
        &self,
        student_id: &str,
        request: AnswerRequest,
    ) -> Result<AnswerView, SessionServiceError> {
        let slot = Slot::from_id(&request.slot)
            .ok_or_else(|| SessionServiceError::UnknownSlot(request.slot.clone()))?;

        self.with_session(student_id, |session| {
            let effect = session.answer(&request.option_id, slot, &request.value)?;
            Ok(AnswerView {
                questions: self.questions(&effect.next_slots),
                outcome: effect.outcome,
                replacement: effect.replacement,
                state: session.state(),
            })
        })
    }

    pub fn pairwise(
        &self,
        student_id: &str,
        request: PairwiseRequest,
    ) -> Result<PairwiseView, SessionServiceError> {
        self.with_session(student_id, |session| {
            for id in [&request.better, &request.worse] {
                if !session.engine().contains(id) {
                    return Err(SessionError::UnknownOption(id.clone()).into());
                }
            }

            let recorded = session.pairwise(&request.better, &request.worse);
            Ok(PairwiseView {
                recorded,
                alpha: session.engine().alpha(),
                state: session.state(),
            })
        })
    }

    pub fn ranking(&self, student_id: &str) -> Result<RankingTable, SessionServiceError> {
        self.with_session(student_id, |session| Ok(session.ranking()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("unknown question slot {0}")]
    UnknownSlot(String),
}
