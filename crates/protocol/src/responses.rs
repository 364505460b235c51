//! Typed replies from participants

use crate::error::{ProtocolError, TransportError};
use crate::messages::Endpoint;
use acp_common::{ParticipantState, TransactionId, Vote};
use acp_engine::Message;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fixed acknowledgment token returned by non-voting endpoints
pub const ACK: &str = "ACK";

/// Header carrying `ok` or `error` on engine replies
pub const STATUS_HEADER: &str = "status";

/// Header carrying the error text when the status is `error`
pub const ERROR_HEADER: &str = "error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteBody {
    pub vote: Vote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckBody {
    pub result: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateBody {
    pub tx_id: String,
    pub state: ParticipantState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthBody {
    pub status: String,
    pub node_id: String,
}

impl HealthBody {
    pub fn healthy(node_id: impl Into<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            node_id: node_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl ToString) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

/// Successful participant reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantReply {
    Vote(Vote),
    Ack,
    State {
        tx_id: TransactionId,
        state: ParticipantState,
    },
    Health {
        node_id: String,
    },
}

impl ParticipantReply {
    /// JSON body for this reply
    pub fn to_json(&self) -> serde_json::Value {
        let value = match self {
            Self::Vote(vote) => serde_json::to_value(VoteBody { vote: *vote }),
            Self::Ack => serde_json::to_value(AckBody {
                result: ACK.to_string(),
            }),
            Self::State { tx_id, state } => serde_json::to_value(StateBody {
                tx_id: tx_id.to_string(),
                state: *state,
            }),
            Self::Health { node_id } => serde_json::to_value(HealthBody::healthy(node_id)),
        };
        value.unwrap_or(serde_json::Value::Null)
    }

    /// Decode the JSON body returned by an endpoint
    pub fn from_json(endpoint: Endpoint, value: serde_json::Value) -> Result<Self, ProtocolError> {
        fn decode<T: serde::de::DeserializeOwned>(
            value: serde_json::Value,
        ) -> Result<T, ProtocolError> {
            serde_json::from_value(value).map_err(|e| ProtocolError::MalformedBody(e.to_string()))
        }

        match endpoint {
            Endpoint::Prepare | Endpoint::CanCommit => {
                let body: VoteBody = decode(value)?;
                Ok(Self::Vote(body.vote))
            }
            Endpoint::Decision | Endpoint::PreCommit | Endpoint::DoCommit => {
                let body: AckBody = decode(value)?;
                if body.result != ACK {
                    return Err(ProtocolError::InvalidField {
                        field: "result",
                        reason: format!("expected {}, got {}", ACK, body.result),
                    });
                }
                Ok(Self::Ack)
            }
            Endpoint::State => {
                let body: StateBody = decode(value)?;
                let tx_id =
                    TransactionId::parse(&body.tx_id).map_err(|e| ProtocolError::InvalidField {
                        field: "tx_id",
                        reason: e.to_string(),
                    })?;
                Ok(Self::State {
                    tx_id,
                    state: body.state,
                })
            }
            Endpoint::Health => {
                let body: HealthBody = decode(value)?;
                Ok(Self::Health {
                    node_id: body.node_id,
                })
            }
        }
    }

    /// Convert to a raw Message for replying over the engine
    pub fn into_message(self) -> Message {
        let body = serde_json::to_vec(&self.to_json()).unwrap_or_default();
        let mut headers = HashMap::new();
        headers.insert(STATUS_HEADER.to_string(), "ok".to_string());
        Message::new(body, headers)
    }

    /// Build an engine reply reporting a failure to the caller
    pub fn error_message(error: impl ToString) -> Message {
        let mut headers = HashMap::new();
        headers.insert(STATUS_HEADER.to_string(), "error".to_string());
        headers.insert(ERROR_HEADER.to_string(), error.to_string());
        Message::new(Vec::new(), headers)
    }

    /// Parse an engine reply to a request sent on `endpoint`
    pub fn from_message(endpoint: Endpoint, msg: Message) -> Result<Self, TransportError> {
        match msg.get_header(STATUS_HEADER) {
            Some("ok") => {
                let value: serde_json::Value = serde_json::from_slice(&msg.body)
                    .map_err(|e| TransportError::Malformed(e.to_string()))?;
                Ok(Self::from_json(endpoint, value)?)
            }
            Some("error") => Err(TransportError::Remote(
                msg.get_header(ERROR_HEADER)
                    .unwrap_or("Unknown error")
                    .to_string(),
            )),
            Some(other) => Err(TransportError::Malformed(format!(
                "invalid status: {}",
                other
            ))),
            None => Err(ProtocolError::MissingHeader(STATUS_HEADER).into()),
        }
    }

    /// Extract a vote, treating any other reply as malformed
    pub fn into_vote(self) -> Result<Vote, TransportError> {
        match self {
            Self::Vote(vote) => Ok(vote),
            other => Err(TransportError::Malformed(format!(
                "expected vote, got {:?}",
                other
            ))),
        }
    }

    /// Check for an acknowledgment, treating any other reply as malformed
    pub fn into_ack(self) -> Result<(), TransportError> {
        match self {
            Self::Ack => Ok(()),
            other => Err(TransportError::Malformed(format!(
                "expected ack, got {:?}",
                other
            ))),
        }
    }
}
