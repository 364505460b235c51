//! Error types for the coordinator

use acp_common::TransactionId;
use thiserror::Error;

/// Coordinator error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    #[error("Transaction already exists: {0}")]
    DuplicateTransaction(TransactionId),

    #[error("Invalid transaction state: {0}")]
    InvalidState(String),

    #[error("Empty operation")]
    EmptyOperation,

    #[error("Coordinator is shutting down")]
    ShuttingDown,
}

/// Result type for coordinator operations
pub type Result<T> = std::result::Result<T, CoordinatorError>;
