//! Client-facing trigger request and acknowledgment

use crate::error::ProtocolError;
use acp_common::{Protocol, TransactionId};
use serde::{Deserialize, Serialize};

/// Body of the transaction trigger sent to a coordinator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,

    /// `2PC` or `3PC`; absent means the coordinator's default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

impl TransactionRequest {
    pub fn new(tx_id: &TransactionId, operation: &str, protocol: Option<Protocol>) -> Self {
        Self {
            tx_id: Some(tx_id.to_string()),
            operation: Some(operation.to_string()),
            protocol: protocol.map(|p| p.to_string()),
        }
    }

    /// Validate required fields, falling back to `default` for the protocol
    pub fn validate(
        self,
        default: Protocol,
    ) -> Result<(TransactionId, String, Protocol), ProtocolError> {
        let tx_id = match self.tx_id {
            Some(raw) if !raw.trim().is_empty() => {
                TransactionId::parse(&raw).map_err(|e| ProtocolError::InvalidField {
                    field: "tx_id",
                    reason: e.to_string(),
                })?
            }
            _ => return Err(ProtocolError::MissingField("tx_id")),
        };

        let operation = match self.operation {
            Some(op) if !op.trim().is_empty() => op,
            _ => return Err(ProtocolError::MissingField("operation")),
        };

        let protocol = match self.protocol {
            Some(raw) => {
                raw.parse::<Protocol>()
                    .map_err(|e| ProtocolError::InvalidField {
                        field: "protocol",
                        reason: e.to_string(),
                    })?
            }
            None => default,
        };

        Ok((tx_id, operation, protocol))
    }
}

/// Immediate acknowledgment of a trigger; the outcome is not reported here
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionStarted {
    pub status: String,
    pub tx_id: String,
}

impl TransactionStarted {
    pub fn new(tx_id: &TransactionId) -> Self {
        Self {
            status: "started".to_string(),
            tx_id: tx_id.to_string(),
        }
    }
}
