//! Error types for message parsing and transport calls

use thiserror::Error;

/// Errors that can occur when parsing requests or replies
///
/// These are the protocol-misuse class: the caller sent something the
/// receiver cannot act on. No transaction state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("Malformed body: {0}")]
    MalformedBody(String),
}

/// Failure to obtain a usable reply from a participant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Request timed out")]
    Timeout,

    #[error("Participant unreachable: {0}")]
    Unreachable(String),

    #[error("Malformed reply: {0}")]
    Malformed(String),

    #[error("Participant returned an error: {0}")]
    Remote(String),
}

impl From<ProtocolError> for TransportError {
    fn from(e: ProtocolError) -> Self {
        TransportError::Malformed(e.to_string())
    }
}
