use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use super::repository::{RepositoryError, SessionRepository};
use super::service::{
    AnswerRequest, CommentRequest, PairwiseRequest, SessionService, SessionServiceError,
    StartRequest,
};

/// Router exposing the interactive ranking session over HTTP.
pub fn session_router<R>(service: Arc<SessionService<R>>) -> Router
where
    R: SessionRepository + 'static,
{
    Router::new()
        .route("/api/v1/sessions", post(start_handler::<R>))
        .route(
            "/api/v1/sessions/:student_id/state",
            get(state_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:student_id/comment",
            post(comment_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:student_id/answer",
            post(answer_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:student_id/pairwise",
            post(pairwise_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:student_id/ranking",
            get(ranking_handler::<R>),
        )
        .with_state(service)
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, SessionServiceError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: SessionServiceError) -> Response {
    let status = match &error {
        SessionServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        SessionServiceError::Session(_) | SessionServiceError::UnknownSlot(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SessionServiceError::Repository(RepositoryError::Unavailable(_))
        | SessionServiceError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        warn!(error = %error, "session request failed");
    }

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

pub(crate) async fn start_handler<R>(
    State(service): State<Arc<SessionService<R>>>,
    body: Option<Json<StartRequest>>,
) -> Response
where
    R: SessionRepository + 'static,
{
    let request = body.map(|Json(request)| request).unwrap_or_default();
    respond(StatusCode::CREATED, service.start(request))
}

pub(crate) async fn state_handler<R>(
    State(service): State<Arc<SessionService<R>>>,
    Path(student_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    respond(StatusCode::OK, service.state(&student_id))
}

pub(crate) async fn comment_handler<R>(
    State(service): State<Arc<SessionService<R>>>,
    Path(student_id): Path<String>,
    Json(request): Json<CommentRequest>,
) -> Response
where
    R: SessionRepository + 'static,
{
    respond(StatusCode::OK, service.comment(&student_id, request))
}

pub(crate) async fn answer_handler<R>(
    State(service): State<Arc<SessionService<R>>>,
    Path(student_id): Path<String>,
    Json(request): Json<AnswerRequest>,
) -> Response
where
    R: SessionRepository + 'static,
{
    respond(StatusCode::OK, service.answer(&student_id, request))
}

pub(crate) async fn pairwise_handler<R>(
    State(service): State<Arc<SessionService<R>>>,
    Path(student_id): Path<String>,
    Json(request): Json<PairwiseRequest>,
) -> Response
where
    R: SessionRepository + 'static,
{
    respond(StatusCode::OK, service.pairwise(&student_id, request))
}

pub(crate) async fn ranking_handler<R>(
    State(service): State<Arc<SessionService<R>>>,
    Path(student_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    respond(StatusCode::OK, service.ranking(&student_id))
}
