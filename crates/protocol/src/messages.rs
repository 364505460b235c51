//! Typed requests sent from the coordinator (or an operator) to participants

use crate::error::ProtocolError;
use acp_common::{Decision, TransactionId};
use acp_engine::Message;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Header naming the participant endpoint a bus message is addressed to
pub const ENDPOINT_HEADER: &str = "acp_endpoint";

/// Header duplicating the transaction id for routing and logs
pub const TX_ID_HEADER: &str = "tx_id";

/// Participant endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Prepare,
    Decision,
    CanCommit,
    PreCommit,
    DoCommit,
    State,
    Health,
}

impl Endpoint {
    /// Parse from string header value
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "prepare" => Some(Self::Prepare),
            "decision" => Some(Self::Decision),
            "can_commit" => Some(Self::CanCommit),
            "pre_commit" => Some(Self::PreCommit),
            "do_commit" => Some(Self::DoCommit),
            "state" => Some(Self::State),
            "health" => Some(Self::Health),
            _ => None,
        }
    }

    /// Convert to string header value (also the HTTP path segment)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prepare => "prepare",
            Self::Decision => "decision",
            Self::CanCommit => "can_commit",
            Self::PreCommit => "pre_commit",
            Self::DoCommit => "do_commit",
            Self::State => "state",
            Self::Health => "health",
        }
    }

    /// Read-only endpoints are served over GET
    pub fn is_query(&self) -> bool {
        matches!(self, Self::State | Self::Health)
    }
}

/// JSON body shared by all participant requests
///
/// Every field is optional on the wire so that a missing field surfaces as a
/// `ProtocolError` instead of a decoder failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,
}

/// A request addressed to a participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantRequest {
    /// 2PC phase 1: vote on the operation
    Prepare {
        tx_id: TransactionId,
        operation: String,
    },
    /// 2PC phase 2, and the abort path of 3PC
    Decision {
        tx_id: TransactionId,
        decision: Decision,
    },
    /// 3PC phase 1: vote without recording READY
    CanCommit {
        tx_id: TransactionId,
        operation: String,
    },
    /// 3PC phase 2
    PreCommit { tx_id: TransactionId },
    /// 3PC phase 3
    DoCommit { tx_id: TransactionId },
    /// Query the locally recorded state
    GetState { tx_id: TransactionId },
    Health,
}

impl ParticipantRequest {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Prepare { .. } => Endpoint::Prepare,
            Self::Decision { .. } => Endpoint::Decision,
            Self::CanCommit { .. } => Endpoint::CanCommit,
            Self::PreCommit { .. } => Endpoint::PreCommit,
            Self::DoCommit { .. } => Endpoint::DoCommit,
            Self::GetState { .. } => Endpoint::State,
            Self::Health => Endpoint::Health,
        }
    }

    /// Get transaction ID if this request has one
    pub fn tx_id(&self) -> Option<&TransactionId> {
        match self {
            Self::Prepare { tx_id, .. }
            | Self::Decision { tx_id, .. }
            | Self::CanCommit { tx_id, .. }
            | Self::PreCommit { tx_id }
            | Self::DoCommit { tx_id }
            | Self::GetState { tx_id } => Some(tx_id),
            Self::Health => None,
        }
    }

    /// Build the JSON body for this request
    pub fn to_body(&self) -> RequestBody {
        let mut body = RequestBody {
            tx_id: self.tx_id().map(|id| id.to_string()),
            ..RequestBody::default()
        };

        match self {
            Self::Prepare { operation, .. } | Self::CanCommit { operation, .. } => {
                body.operation = Some(operation.clone());
            }
            Self::Decision { decision, .. } => {
                body.decision = Some(decision.to_string());
            }
            _ => {}
        }

        body
    }

    /// Validate a JSON body received on an endpoint
    pub fn from_body(endpoint: Endpoint, body: RequestBody) -> Result<Self, ProtocolError> {
        if endpoint == Endpoint::Health {
            return Ok(Self::Health);
        }

        let tx_id = required_tx_id(body.tx_id)?;

        Ok(match endpoint {
            Endpoint::Prepare => Self::Prepare {
                tx_id,
                operation: required_text("operation", body.operation)?,
            },
            Endpoint::CanCommit => Self::CanCommit {
                tx_id,
                operation: required_text("operation", body.operation)?,
            },
            Endpoint::Decision => {
                let raw = required_text("decision", body.decision)?;
                let decision =
                    raw.parse::<Decision>()
                        .map_err(|e| ProtocolError::InvalidField {
                            field: "decision",
                            reason: e.to_string(),
                        })?;
                Self::Decision { tx_id, decision }
            }
            Endpoint::PreCommit => Self::PreCommit { tx_id },
            Endpoint::DoCommit => Self::DoCommit { tx_id },
            Endpoint::State => Self::GetState { tx_id },
            Endpoint::Health => Self::Health,
        })
    }

    /// Convert to a raw Message for sending over the engine
    pub fn into_message(self) -> Message {
        let mut headers = HashMap::new();
        headers.insert(
            ENDPOINT_HEADER.to_string(),
            self.endpoint().as_str().to_string(),
        );
        if let Some(tx_id) = self.tx_id() {
            headers.insert(TX_ID_HEADER.to_string(), tx_id.to_string());
        }

        let body = serde_json::to_vec(&self.to_body()).unwrap_or_default();
        Message::new(body, headers)
    }

    /// Parse a Message into a typed request
    pub fn from_message(msg: Message) -> Result<Self, ProtocolError> {
        let endpoint_str = msg
            .get_header(ENDPOINT_HEADER)
            .ok_or(ProtocolError::MissingHeader(ENDPOINT_HEADER))?;
        let endpoint = Endpoint::parse(endpoint_str)
            .ok_or_else(|| ProtocolError::UnknownEndpoint(endpoint_str.to_string()))?;

        let body = if msg.body.is_empty() {
            RequestBody::default()
        } else {
            serde_json::from_slice(&msg.body)
                .map_err(|e| ProtocolError::MalformedBody(e.to_string()))?
        };

        Self::from_body(endpoint, body)
    }
}

fn required_text(field: &'static str, value: Option<String>) -> Result<String, ProtocolError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ProtocolError::MissingField(field)),
    }
}

fn required_tx_id(value: Option<String>) -> Result<TransactionId, ProtocolError> {
    let raw = required_text("tx_id", value)?;
    TransactionId::parse(&raw).map_err(|e| ProtocolError::InvalidField {
        field: "tx_id",
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: &str) -> TransactionId {
        TransactionId::parse(id).unwrap()
    }

    #[test]
    fn test_prepare_body_matches_wire_shape() {
        let request = ParticipantRequest::Prepare {
            tx_id: tx("T1"),
            operation: "x=-10".to_string(),
        };

        let json = serde_json::to_value(request.to_body()).unwrap();
        assert_eq!(json, serde_json::json!({"tx_id": "T1", "operation": "x=-10"}));
    }

    #[test]
    fn test_missing_fields_are_protocol_errors() {
        let body = RequestBody {
            tx_id: Some("T1".to_string()),
            ..Default::default()
        };
        assert_eq!(
            ParticipantRequest::from_body(Endpoint::Prepare, body),
            Err(ProtocolError::MissingField("operation"))
        );

        assert_eq!(
            ParticipantRequest::from_body(Endpoint::DoCommit, RequestBody::default()),
            Err(ProtocolError::MissingField("tx_id"))
        );
    }

    #[test]
    fn test_invalid_decision() {
        let body = RequestBody {
            tx_id: Some("T1".to_string()),
            decision: Some("MAYBE".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            ParticipantRequest::from_body(Endpoint::Decision, body),
            Err(ProtocolError::InvalidField {
                field: "decision",
                ..
            })
        ));
    }

    #[test]
    fn test_message_carries_endpoint_and_tx_headers() {
        let request = ParticipantRequest::Decision {
            tx_id: tx("T2"),
            decision: Decision::Commit,
        };

        let msg = request.clone().into_message();
        assert_eq!(msg.get_header(ENDPOINT_HEADER), Some("decision"));
        assert_eq!(msg.get_header(TX_ID_HEADER), Some("T2"));
        assert_eq!(ParticipantRequest::from_message(msg).unwrap(), request);
    }

    #[test]
    fn test_message_without_endpoint() {
        let msg = Message::with_body(b"{}".to_vec());
        assert_eq!(
            ParticipantRequest::from_message(msg),
            Err(ProtocolError::MissingHeader(ENDPOINT_HEADER))
        );
    }
}
