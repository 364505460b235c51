//! Core mock engine implementation
//!
//! Holds the table of request handlers keyed by subject and routes each
//! request to the handler's channel together with a one-shot reply sender.

use crate::{Message, MockEngineError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// A request paired with the channel its reply must be sent on
pub type Request = (Message, oneshot::Sender<Message>);

/// Type alias for request handler channels
type RequestHandler = mpsc::UnboundedSender<Request>;

/// Mock engine that simulates a request/reply network
#[derive(Default)]
pub struct MockEngine {
    /// Request/reply handlers
    request_handlers: Mutex<HashMap<String, RequestHandler>>,
}

impl MockEngine {
    /// Create a new mock engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request handler for a subject, replacing any previous one
    pub fn register_handler(&self, subject: &str) -> mpsc::UnboundedReceiver<Request> {
        let (tx, rx) = mpsc::unbounded_channel();

        let previous = self.request_handlers.lock().insert(subject.to_string(), tx);
        if previous.is_some() {
            tracing::debug!("Replaced request handler for {}", subject);
        }

        rx
    }

    /// Remove the handler for a subject; later requests see no subscriber
    pub fn unregister_handler(&self, subject: &str) -> bool {
        self.request_handlers.lock().remove(subject).is_some()
    }

    /// Check whether a handler is registered for a subject
    pub fn has_handler(&self, subject: &str) -> bool {
        self.request_handlers.lock().contains_key(subject)
    }

    /// Send a request and wait for reply
    pub async fn request(
        &self,
        subject: &str,
        message: Message,
        timeout: Duration,
    ) -> Result<Message> {
        let reply_rx = {
            let mut handlers = self.request_handlers.lock();
            let handler = handlers
                .get(subject)
                .ok_or_else(|| MockEngineError::NoSubscribers(subject.to_string()))?;

            let (reply_tx, reply_rx) = oneshot::channel();
            if handler.send((message, reply_tx)).is_err() {
                // Receiver side is gone; forget the stale handler
                handlers.remove(subject);
                return Err(MockEngineError::ChannelClosed);
            }
            reply_rx
        };

        match tokio::time::timeout(timeout, reply_rx).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(MockEngineError::ChannelClosed),
            Err(_) => Err(MockEngineError::Timeout),
        }
    }
}
