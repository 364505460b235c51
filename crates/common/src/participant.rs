//! Static participant configuration

use crate::error::{CommonError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A participant known to the coordinator, fixed at startup
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub id: String,
    pub host: String,
    pub port: u16,
}

impl ParticipantRecord {
    pub fn new(id: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            id: id.into(),
            host: host.into(),
            port,
        }
    }

    /// `host:port` form used by network transports
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl FromStr for ParticipantRecord {
    type Err = CommonError;

    /// Parse `id:host:port`
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        let [id, host, port] = parts.as_slice() else {
            return Err(CommonError::InvalidParticipant(format!(
                "expected id:host:port, got {:?}",
                s
            )));
        };

        if id.is_empty() || host.is_empty() {
            return Err(CommonError::InvalidParticipant(s.to_string()));
        }

        let port = port
            .parse::<u16>()
            .map_err(|e| CommonError::InvalidParticipant(format!("{:?}: {}", s, e)))?;

        Ok(Self::new(*id, *host, port))
    }
}

impl fmt::Display for ParticipantRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.id, self.host, self.port)
    }
}

/// Parse a comma-separated participant list, preserving registration order
pub fn parse_participant_list(s: &str) -> Result<Vec<ParticipantRecord>> {
    s.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(str::parse)
        .collect()
}
