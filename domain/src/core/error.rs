//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No agents configured for the council")]
    NoAgents,

    #[error("Too many agents: {count} (at most {max} can be anonymized)")]
    TooManyAgents { count: usize, max: usize },

    #[error("Duplicate agent: {0}")]
    DuplicateAgent(String),

    #[error("Invalid round count: {0} (at least one round is required)")]
    InvalidRounds(u32),

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}
