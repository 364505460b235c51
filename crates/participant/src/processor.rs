//! Serves a participant engine on the in-memory bus

use crate::engine::ParticipantEngine;
use acp_engine::{Message, MockClient};
use acp_protocol::{ParticipantReply, ParticipantRequest, participant_subject};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Background task answering requests addressed to `participant.<id>`
pub struct ParticipantProcessor {
    engine: Arc<ParticipantEngine>,
    client: MockClient,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ParticipantProcessor {
    pub fn new(engine: Arc<ParticipantEngine>, client: MockClient) -> Self {
        Self {
            engine,
            client,
            task: Mutex::new(None),
        }
    }

    pub fn engine(&self) -> &Arc<ParticipantEngine> {
        &self.engine
    }

    pub fn subject(&self) -> String {
        participant_subject(self.engine.node_id())
    }

    /// Register the subject and start answering requests
    ///
    /// The subject is registered before this returns, so requests sent
    /// immediately afterwards are not lost.
    pub fn start(&self) {
        let engine = self.engine.clone();
        let mut requests = self.client.serve(&self.subject());

        let task = tokio::spawn(async move {
            while let Some((msg, reply_tx)) = requests.recv().await {
                // One task per request so concurrent calls contend on the store
                let engine = engine.clone();
                tokio::spawn(async move {
                    let reply = Self::process(&engine, msg);
                    if reply_tx.send(reply).is_err() {
                        tracing::debug!(
                            "[Participant {}] requester went away before reply",
                            engine.node_id()
                        );
                    }
                });
            }
        });

        *self.task.lock() = Some(task);
    }

    fn process(engine: &ParticipantEngine, msg: Message) -> Message {
        let request = match ParticipantRequest::from_message(msg) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("[Participant {}] bad request: {}", engine.node_id(), e);
                return ParticipantReply::error_message(e);
            }
        };

        match engine.handle(request) {
            Ok(reply) => reply.into_message(),
            Err(e) => {
                tracing::warn!("[Participant {}] {}", engine.node_id(), e);
                ParticipantReply::error_message(e)
            }
        }
    }

    /// Unregister the subject and stop the background task
    pub async fn stop(&self) {
        self.client.engine().unregister_handler(&self.subject());
        let task = self.task.lock().take();
        if let Some(task) = task {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for ParticipantProcessor {
    fn drop(&mut self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}
