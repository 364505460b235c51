//! Error types for the node adapters

use acp_coordinator::CoordinatorError;
use acp_participant::ParticipantError;
use acp_protocol::{ErrorBody, ProtocolError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Result type for node operations
pub type Result<T> = std::result::Result<T, NodeError>;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Participant(#[from] ParticipantError),

    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A remote node answered with a non-success status
    #[error("Request rejected with {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NodeError {
    /// HTTP status reported to the caller
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Protocol(_) => StatusCode::BAD_REQUEST,
            Self::Participant(_) => StatusCode::CONFLICT,
            Self::Coordinator(e) => match e {
                CoordinatorError::TransactionNotFound(_) => StatusCode::NOT_FOUND,
                CoordinatorError::DuplicateTransaction(_) | CoordinatorError::InvalidState(_) => {
                    StatusCode::CONFLICT
                }
                CoordinatorError::EmptyOperation => StatusCode::BAD_REQUEST,
                CoordinatorError::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
            },
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for NodeError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("rejecting request: {}", self);
        }
        (status, Json(ErrorBody::new(&self))).into_response()
    }
}
