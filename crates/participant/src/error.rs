//! Error types for the participant

use acp_common::{ParticipantState, TransactionId};
use thiserror::Error;

/// Result type for participant operations
pub type Result<T> = std::result::Result<T, ParticipantError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParticipantError {
    #[error("Unknown transaction: {0}")]
    UnknownTransaction(TransactionId),

    #[error("Transaction {tx_id} cannot move from {from} to {to}")]
    InvalidTransition {
        tx_id: TransactionId,
        from: ParticipantState,
        to: ParticipantState,
    },

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Balance of {resource} would overflow")]
    BalanceOverflow { resource: String },
}
