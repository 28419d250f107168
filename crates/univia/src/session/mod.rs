//! Interactive ranking sessions built on top of the matching engine.
//!
//! A session adds what the engine leaves to its caller: comment-driven
//! questions with a per-option quota, prompt text, convergence tracking and
//! HTTP exposure through a repository-backed service.

pub mod confidence;
pub mod prompts;
pub mod ranking;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use confidence::{ConfidenceConfig, ConfidenceMonitor};
pub use prompts::{Question, SlotPrompts};
pub use ranking::{
    AnswerEffect, RankingEntry, RankingSession, RankingTable, SessionError, SessionPolicy,
    SessionState,
};
pub use repository::{RepositoryError, SessionRepository};
pub use router::session_router;
pub use service::{
    AnswerRequest, AnswerView, CommentRequest, CommentView, PairwiseRequest, PairwiseView,
    SessionService, SessionServiceError, StartRequest,
};
