//! Protocol selector and the vote/decision vocabulary shared by both roles

use crate::error::CommonError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Atomic commitment protocol used for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Protocol {
    /// Two-phase commit: PREPARE, then DECISION
    #[default]
    #[serde(rename = "2PC")]
    TwoPhase,
    /// Three-phase commit: CAN_COMMIT, PRE_COMMIT, DO_COMMIT
    #[serde(rename = "3PC")]
    ThreePhase,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TwoPhase => "2PC",
            Self::ThreePhase => "3PC",
        }
    }
}

impl FromStr for Protocol {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "2PC" => Ok(Self::TwoPhase),
            "3PC" => Ok(Self::ThreePhase),
            _ => Err(CommonError::UnknownProtocol(s.to_string())),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A participant's answer to PREPARE or CAN_COMMIT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Vote {
    Yes,
    No,
}

impl Vote {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "YES",
            Self::No => "NO",
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl FromStr for Vote {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "YES" => Ok(Self::Yes),
            "NO" => Ok(Self::No),
            _ => Err(CommonError::UnknownVote(s.to_string())),
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The coordinator's global outcome for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Commit,
    Abort,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commit => "COMMIT",
            Self::Abort => "ABORT",
        }
    }

    /// COMMIT iff every vote is YES
    ///
    /// An empty vote set commits; the coordinator never calls this with
    /// fewer votes than registered participants.
    pub fn from_votes<'a>(votes: impl IntoIterator<Item = &'a Vote>) -> Self {
        if votes.into_iter().all(Vote::is_yes) {
            Self::Commit
        } else {
            Self::Abort
        }
    }
}

impl FromStr for Decision {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COMMIT" => Ok(Self::Commit),
            "ABORT" => Ok(Self::Abort),
            _ => Err(CommonError::UnknownDecision(s.to_string())),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_parse() {
        assert_eq!("2PC".parse::<Protocol>().unwrap(), Protocol::TwoPhase);
        assert_eq!("3pc".parse::<Protocol>().unwrap(), Protocol::ThreePhase);
        assert!("4PC".parse::<Protocol>().is_err());
        assert_eq!(Protocol::default(), Protocol::TwoPhase);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&Protocol::ThreePhase).unwrap(),
            "\"3PC\""
        );
        assert_eq!(serde_json::to_string(&Vote::Yes).unwrap(), "\"YES\"");
        assert_eq!(
            serde_json::from_str::<Decision>("\"ABORT\"").unwrap(),
            Decision::Abort
        );
    }

    #[test]
    fn test_decision_rule() {
        assert_eq!(
            Decision::from_votes(&[Vote::Yes, Vote::Yes]),
            Decision::Commit
        );
        assert_eq!(
            Decision::from_votes(&[Vote::Yes, Vote::No, Vote::Yes]),
            Decision::Abort
        );
    }
}
