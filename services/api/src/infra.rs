use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use univia::session::{RankingSession, RepositoryError, SessionRepository};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local session store keyed by student id.
#[derive(Default, Clone)]
pub(crate) struct InMemorySessionRepository {
    sessions: Arc<Mutex<HashMap<String, RankingSession>>>,
}

impl SessionRepository for InMemorySessionRepository {
    fn save(&self, session: RankingSession) -> Result<(), RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        guard.insert(session.student_id().to_string(), session);
        Ok(())
    }

    fn fetch(&self, student_id: &str) -> Result<Option<RankingSession>, RepositoryError> {
        let guard = self.sessions.lock().expect("repository mutex poisoned");
        Ok(guard.get(student_id).cloned())
    }
}
