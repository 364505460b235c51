//! Transport contract between the coordinator and its participants
//!
//! The coordinator never talks to a network directly. Every call goes through
//! `Transport`, which maps timeouts, connection failures and undecodable
//! replies onto `TransportError` so the protocol logic can treat them alike.

use crate::error::TransportError;
use crate::messages::ParticipantRequest;
use crate::responses::ParticipantReply;
use acp_common::ParticipantRecord;
use acp_engine::{MockClient, MockEngineError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Request/response RPC with a per-call timeout
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(
        &self,
        participant: &ParticipantRecord,
        request: ParticipantRequest,
        timeout: Duration,
    ) -> Result<ParticipantReply, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn call(
        &self,
        participant: &ParticipantRecord,
        request: ParticipantRequest,
        timeout: Duration,
    ) -> Result<ParticipantReply, TransportError> {
        (**self).call(participant, request, timeout).await
    }
}

/// Engine subject a participant serves its requests on
pub fn participant_subject(participant_id: &str) -> String {
    format!("participant.{}", participant_id)
}

/// Transport over the in-memory engine
///
/// Participants are addressed by id; host and port are ignored.
#[derive(Clone)]
pub struct EngineTransport {
    client: MockClient,
}

impl EngineTransport {
    pub fn new(client: MockClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for EngineTransport {
    async fn call(
        &self,
        participant: &ParticipantRecord,
        request: ParticipantRequest,
        timeout: Duration,
    ) -> Result<ParticipantReply, TransportError> {
        let endpoint = request.endpoint();
        let subject = participant_subject(&participant.id);

        let reply = self
            .client
            .request(&subject, request.into_message(), timeout)
            .await
            .map_err(|e| match e {
                MockEngineError::Timeout => TransportError::Timeout,
                other => TransportError::Unreachable(other.to_string()),
            })?;

        ParticipantReply::from_message(endpoint, reply)
    }
}
