//! Error types for shared domain parsing

use thiserror::Error;

/// Result type for parsing shared types
pub type Result<T> = std::result::Result<T, CommonError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommonError {
    #[error("Transaction ID must not be empty")]
    EmptyTransactionId,

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Unknown protocol: {0}")]
    UnknownProtocol(String),

    #[error("Unknown vote: {0}")]
    UnknownVote(String),

    #[error("Unknown decision: {0}")]
    UnknownDecision(String),

    #[error("Unknown participant state: {0}")]
    UnknownState(String),

    #[error("Invalid participant address: {0}")]
    InvalidParticipant(String),
}
