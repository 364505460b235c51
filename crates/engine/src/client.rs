//! Node-scoped handle onto the mock engine

use crate::engine::Request;
use crate::{Message, MockEngine, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Mock client for interacting with the mock engine
#[derive(Clone)]
pub struct MockClient {
    /// Node ID
    node_id: String,

    /// Reference to the mock engine
    engine: Arc<MockEngine>,
}

impl MockClient {
    /// Create a new mock client
    pub fn new(node_id: String, engine: Arc<MockEngine>) -> Self {
        Self { node_id, engine }
    }

    pub fn engine(&self) -> &Arc<MockEngine> {
        &self.engine
    }

    /// Send a request and wait for a reply
    pub async fn request(
        &self,
        subject: &str,
        message: Message,
        timeout: Duration,
    ) -> Result<Message> {
        tracing::trace!("{} -> {}", self.node_id, subject);
        self.engine.request(subject, message, timeout).await
    }

    /// Start serving requests addressed to a subject
    pub fn serve(&self, subject: &str) -> RequestStream {
        tracing::debug!("{} serving {}", self.node_id, subject);
        RequestStream {
            receiver: self.engine.register_handler(subject),
        }
    }
}

/// Stream of inbound requests for a served subject
pub struct RequestStream {
    receiver: mpsc::UnboundedReceiver<Request>,
}

impl RequestStream {
    /// Receive the next request with its reply channel
    pub async fn recv(&mut self) -> Option<Request> {
        self.receiver.recv().await
    }
}
