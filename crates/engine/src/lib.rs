//! In-memory mock engine for exercising the commit protocols
//!
//! Nodes register request handlers on named subjects and peers call them with
//! a bounded timeout. This stands in for a network transport so coordinators
//! and participants can run in one process.

use thiserror::Error;

pub mod client;
pub mod engine;
pub mod message;

pub use client::{MockClient, RequestStream};
pub use engine::MockEngine;
pub use message::Message;

/// Mock engine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MockEngineError {
    #[error("No handler for subject: {0}")]
    NoSubscribers(String),

    #[error("Operation timed out")]
    Timeout,

    #[error("Channel closed")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, MockEngineError>;
