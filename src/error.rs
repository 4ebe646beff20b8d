use thiserror::Error;

/// Result type for game engine operations
pub type GameResult<T> = Result<T, GameError>;

/// Errors reported by the game engine.
///
/// Every variant carries a human-readable reason that can be shown to the
/// player. An operation that returns an error has not mutated any state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    /// Missing or malformed input (e.g. joining without a name)
    #[error("{0}")]
    Validation(String),

    /// Wrong phase or role for the requested action
    #[error("{0}")]
    Precondition(String),

    /// Card id not held by the claimed owner
    #[error("{0}")]
    Ownership(String),

    /// A deck has no cards left to deal
    #[error("{0}")]
    ResourceExhausted(String),

    /// Unknown session, round or party
    #[error("{0}")]
    NotFound(String),

    /// Session key already registered in this game
    #[error("{0}")]
    Conflict(String),
}

impl GameError {
    /// Stable error code sent to clients alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            GameError::Validation(_) => "VALIDATION_FAILED",
            GameError::Precondition(_) => "PRECONDITION_FAILED",
            GameError::Ownership(_) => "OWNERSHIP_VIOLATION",
            GameError::ResourceExhausted(_) => "RESOURCE_EXHAUSTED",
            GameError::NotFound(_) => "NOT_FOUND",
            GameError::Conflict(_) => "CONFLICT",
        }
    }
}
