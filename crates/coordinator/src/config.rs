//! Coordinator configuration

use acp_common::{ParticipantRecord, Protocol};
use std::time::Duration;

/// Per-call timeout used when none is configured
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for a coordinator node
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Coordinator identifier
    pub coordinator_id: String,
    /// Participants in registration order; every phase contacts them in this order
    pub participants: Vec<ParticipantRecord>,
    /// Protocol used when a trigger does not name one
    pub default_protocol: Protocol,
    /// Timeout applied to each participant call
    pub rpc_timeout: Duration,
}

impl CoordinatorConfig {
    pub fn new(coordinator_id: impl Into<String>) -> Self {
        Self {
            coordinator_id: coordinator_id.into(),
            participants: Vec::new(),
            default_protocol: Protocol::default(),
            rpc_timeout: DEFAULT_RPC_TIMEOUT,
        }
    }

    pub fn with_participants(mut self, participants: Vec<ParticipantRecord>) -> Self {
        self.participants = participants;
        self
    }

    /// Appends one participant after those already registered.
    pub fn with_participant(mut self, participant: ParticipantRecord) -> Self {
        self.participants.push(participant);
        self
    }

    pub fn with_default_protocol(mut self, protocol: Protocol) -> Self {
        self.default_protocol = protocol;
        self
    }

    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }
}
