use super::ranking::RankingSession;

/// Storage abstraction so the service can be exercised without a server.
pub trait SessionRepository: Send + Sync {
    /// Inserts or replaces the session stored under its student id.
    fn save(&self, session: RankingSession) -> Result<(), RepositoryError>;
    fn fetch(&self, student_id: &str) -> Result<Option<RankingSession>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("session not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
