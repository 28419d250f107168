use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use axum::response::Response;
use serde_json::Value;

use crate::catalog::StudentDirectory;
use crate::matching::{
    CampusSetting, EngineConfig, MatchingEngine, Money, OptionId, StudentProfile, University,
};
use crate::session::repository::{RepositoryError, SessionRepository};
use crate::session::{RankingSession, SessionPolicy, SessionService};

pub(super) fn id(raw: &str) -> OptionId {
    OptionId::from(raw)
}

fn university(
    raw_id: &str,
    setting: CampusSetting,
    tuition: f64,
    accredited: bool,
    ratio: f64,
) -> University {
    let mut option = University::new(raw_id);
    option.name = Some(format!("{raw_id} School of Architecture"));
    option.campus.setting = Some(setting);
    option.campus.accessible = true;
    option.fees.tuition = Some(Money::eur(tuition));
    option.offer.student_staff_ratio = Some(ratio);
    if accredited {
        option.offer.accreditations.insert("RIBA".to_string());
    }
    option
}

pub(super) fn catalog() -> Vec<University> {
    vec![
        university("bath", CampusSetting::Suburban, 26_000.0, true, 13.0),
        university("ucl", CampusSetting::Urban, 32_000.0, true, 11.0),
        university("lincoln", CampusSetting::Rural, 17_000.0, false, 19.0),
        university("leeds", CampusSetting::Urban, 21_000.0, true, 15.0),
        university("kent", CampusSetting::Rural, 23_000.0, false, 22.0),
    ]
}

pub(super) fn student() -> StudentProfile {
    let mut profile = StudentProfile {
        id: "stu-1".to_string(),
        ..StudentProfile::default()
    };
    profile.preferences.campus_setting = Some(CampusSetting::Urban);
    profile.academics.english.score = Some(7.0);
    profile
}

pub(super) fn directory() -> StudentDirectory {
    StudentDirectory::new(vec![student()])
}

pub(super) fn session() -> RankingSession {
    session_with(SessionPolicy::default())
}

pub(super) fn session_with(policy: SessionPolicy) -> RankingSession {
    let engine = MatchingEngine::initialize(student(), catalog(), 42, EngineConfig::default())
        .expect("engine initializes");
    RankingSession::new(engine, policy)
}

pub(super) fn build_service() -> (SessionService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = SessionService::new(repository.clone(), catalog(), directory(), 42);
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    sessions: Arc<Mutex<HashMap<String, RankingSession>>>,
}

impl MemoryRepository {
    pub(super) fn len(&self) -> usize {
        self.sessions
            .lock()
            .expect("repository mutex poisoned")
            .len()
    }
}

impl SessionRepository for MemoryRepository {
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

/// Memory store that stalls between reading a session and handing it out,
/// widening the window in which unserialized writers would overwrite each other.
#[derive(Default, Clone)]
pub(super) struct SlowRepository {
    pub(super) inner: MemoryRepository,
}

impl SessionRepository for SlowRepository {
    fn save(&self, session: RankingSession) -> Result<(), RepositoryError> {
        self.inner.save(session)
    }

    fn fetch(&self, student_id: &str) -> Result<Option<RankingSession>, RepositoryError> {
        let session = self.inner.fetch(student_id)?;
        thread::sleep(Duration::from_millis(15));
        Ok(session)
    }
}

pub(super) struct UnavailableRepository;

impl SessionRepository for UnavailableRepository {
    fn save(&self, _session: RankingSession) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn fetch(&self, _student_id: &str) -> Result<Option<RankingSession>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
