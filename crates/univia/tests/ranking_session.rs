//! End-to-end ranking sessions driven from normalized JSON stores.
//!
//! Scenarios go through the public catalog loader, the session service and the
//! HTTP router without reaching into private modules.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use univia::catalog::{parse_records, StudentDirectory};
    use univia::matching::{StudentProfile, University};
    use univia::session::{RankingSession, RepositoryError, SessionRepository, SessionService};

    pub(super) const UNIVERSITIES: &str = r#"{
        "bath": { "normalized": {
            "name": "University of Bath",
            "offer": { "accreditations": ["RIBA"], "student_staff_ratio": 13 },
            "admissions": { "requires_portfolio": true, "english_min": { "ielts_overall": 6.5 } },
            "fees": { "tuition": { "amount": 26500, "currency": "GBP" } },
            "campus": { "setting": "suburban", "pmr_ok": true }
        } },
        "ucl": { "normalized": {
            "name": "UCL Bartlett",
            "offer": { "accreditations": ["RIBA", "ARB"], "student_staff_ratio": 10 },
            "admissions": { "requires_portfolio": true, "english_min": { "ielts_overall": 7.0 } },
            "fees": { "tuition": { "amount": 35000, "currency": "GBP" } },
            "campus": { "setting": "urban", "pmr_ok": true }
        } },
        "lincoln": { "normalized": {
            "name": "University of Lincoln",
            "offer": { "student_staff_ratio": 19 },
            "fees": { "tuition": { "amount": 17000, "currency": "GBP" } },
            "campus": { "setting": "rural" }
        } },
        "leeds": { "normalized": {
            "name": "Leeds Beckett",
            "offer": { "accreditations": ["ARB"], "student_staff_ratio": 16 },
            "admissions": { "english_min": { "ielts_overall": 6.0 } },
            "fees": { "tuition": { "amount": 21000, "currency": "GBP" } },
            "campus": { "setting": "urban", "pmr_ok": true }
        } },
        "kent": { "normalized": {
            "name": "University of Kent",
            "offer": { "accreditations": ["RIBA"] },
            "campus": { "setting": "campus-town" }
        } },
        "dundee": { "normalized": {
            "name": "University of Dundee",
            "offer": { "accreditations": ["RIBA"], "student_staff_ratio": 14 },
            "fees": { "tuition": { "amount": 23000, "currency": "GBP" } },
            "campus": { "setting": "suburban", "pmr_ok": false }
        } }
    }"#;

    pub(super) const STUDENTS: &str = r#"[
        {
            "id": "stu-amelie",
            "academics": {
                "grades": { "arts_plastiques": 15.5 },
                "english": { "score": 7.0 }
            },
            "preferences": { "campus_setting": "urban" },
            "constraints": { "pmr": false }
        }
    ]"#;

    pub(super) fn universities() -> Vec<University> {
        parse_records(UNIVERSITIES).expect("university store parses")
    }

    pub(super) fn students() -> StudentDirectory {
        let profiles: Vec<StudentProfile> = parse_records(STUDENTS).expect("student store parses");
        StudentDirectory::new(profiles)
    }

    pub(super) fn service() -> Arc<SessionService<MemoryRepository>> {
        Arc::new(SessionService::new(
            Arc::new(MemoryRepository::default()),
            universities(),
            students(),
            42,
        ))
    }

    #[derive(Default)]
    pub(super) struct MemoryRepository {
        sessions: Mutex<HashMap<String, RankingSession>>,
    }

    impl SessionRepository for MemoryRepository {
        fn save(&self, session: RankingSession) -> Result<(), RepositoryError> {
            self.sessions
                .lock()
                .expect("repository mutex poisoned")
                .insert(session.student_id().to_string(), session);
            Ok(())
        }

        fn fetch(&self, student_id: &str) -> Result<Option<RankingSession>, RepositoryError> {
            Ok(self
                .sessions
                .lock()
                .expect("repository mutex poisoned")
                .get(student_id)
                .cloned())
        }
    }
}

use std::collections::BTreeSet;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use univia::catalog::load_catalog;
use univia::matching::{
    CampusSetting, EngineConfig, MatchingEngine, OptionId, ProfileField, Slot,
};
use univia::session::{
    session_router, AnswerRequest, CommentRequest, PairwiseRequest, RankingSession,
    SessionPolicy, StartRequest,
};

use common::*;

fn option(raw: &str) -> OptionId {
    OptionId::from(raw)
}

#[test]
fn normalized_store_maps_onto_typed_records() {
    let catalog = universities();
    assert_eq!(catalog.len(), 6);

    let kent = catalog
        .iter()
        .find(|university| university.id == option("kent"))
        .expect("kent present");
    assert_eq!(kent.campus.setting, None);
    assert_eq!(kent.tuition(), None);

    let student = students().resolve("stu-amelie");
    assert_eq!(student.academics.grades.arts, Some(15.5));
    assert_eq!(student.preferences.campus_setting, Some(CampusSetting::Urban));
    assert_eq!(student.constraints.accessibility, Some(false));
}

#[test]
fn catalog_files_load_from_disk() {
    let dir = std::env::temp_dir().join(format!("univia-catalog-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let universities_path = dir.join("universities.json");
    std::fs::write(&universities_path, UNIVERSITIES).expect("write store");

    let (catalog, students) =
        load_catalog(&universities_path, dir.join("missing-students.json")).expect("loads");

    assert_eq!(catalog.len(), 6);
    assert!(students.is_empty());
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn simulated_session_learns_from_feedback() {
    let profile = students().resolve("stu-amelie");
    let engine = MatchingEngine::initialize(profile, universities(), 42, EngineConfig::default())
        .expect("engine initializes");
    let mut session = RankingSession::new(engine, SessionPolicy::default());

    let initial = session.state();
    let initial_active: BTreeSet<OptionId> =
        initial.engine.active_subset.iter().cloned().collect();
    assert_eq!(initial_active.len(), 3);

    let questions = session
        .comment(&initial.engine.active_subset[0], "love the studio culture")
        .expect("known option");
    assert_eq!(questions[0], Slot::Budget);

    let effect = session
        .answer(&initial.engine.active_subset[0], Slot::Budget, "48 000 €")
        .expect("known option");
    assert_eq!(effect.outcome.changed_field, Some(ProfileField::Budget));

    let before = session.engine().preferences().elo(&option("lincoln"));
    for _ in 0..3 {
        assert!(session.pairwise(&option("lincoln"), &option("ucl")));
    }
    assert!(session.engine().preferences().elo(&option("lincoln")) > before);
    assert!((session.engine().alpha() - 0.56).abs() < 1e-9);

    let table = session.ranking();
    assert_eq!(table.ranking.len(), 6);
    let ids: BTreeSet<OptionId> = table
        .ranking
        .iter()
        .map(|entry| entry.option_id.clone())
        .collect();
    assert_eq!(ids.len(), 6);
    assert!(table
        .ranking
        .iter()
        .all(|entry| (0.0..=1.0).contains(&entry.score)));
}

#[test]
fn service_round_trip_keeps_session_state() {
    let service = service();

    let state = service
        .start(StartRequest::default())
        .expect("session starts");
    assert_eq!(state.student_id, "stu-amelie");

    let view = service
        .comment(
            "stu-amelie",
            CommentRequest {
                option_id: option("leeds"),
                text: "affordable".to_string(),
            },
        )
        .expect("comment accepted");
    assert_eq!(view.questions.len(), 3);

    service
        .answer(
            "stu-amelie",
            AnswerRequest {
                option_id: option("leeds"),
                slot: "campus_setting".to_string(),
                value: "mega-city".to_string(),
            },
        )
        .expect("answer accepted");

    service
        .pairwise(
            "stu-amelie",
            PairwiseRequest {
                better: option("leeds"),
                worse: option("bath"),
            },
        )
        .expect("pairwise accepted");

    let state = service.state("stu-amelie").expect("state available");
    assert_eq!(state.engine.stop_signal_input.feedback_events, 1);
    assert!(!state
        .engine
        .stop_signal_input
        .pending_slots
        .contains(&Slot::CampusSetting));
}

async fn send(router: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("route executes");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let payload = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, payload)
}

fn post(uri: &str, payload: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn http_session_flow() {
    let router = session_router(service());

    let (status, payload) = send(
        router.clone(),
        post("/api/v1/sessions", json!({ "student_id": "stu-amelie" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let first = payload["active_subset"][0]
        .as_str()
        .expect("active option")
        .to_string();

    let (status, payload) = send(
        router.clone(),
        post(
            "/api/v1/sessions/stu-amelie/answer",
            json!({ "option_id": first, "slot": "budget_range", "value": "12,000" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["outcome"]["applied"], json!(true));

    let (status, _) = send(
        router.clone(),
        post(
            "/api/v1/sessions/stu-amelie/pairwise",
            json!({ "better": "kent", "worse": "nowhere" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, payload) = send(
        router.clone(),
        Request::get("/api/v1/sessions/stu-amelie/state")
            .body(Body::empty())
            .expect("request builds"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["stop_signal_input"]["total_options"], json!(6));

    let (status, _) = send(
        router,
        Request::get("/api/v1/sessions/someone-else/ranking")
            .body(Body::empty())
            .expect("request builds"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
