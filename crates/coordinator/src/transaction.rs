//! Coordinator-side transaction records
//!
//! A record is created in INIT by `begin_transaction` and only moves forward.
//! Once it reaches COMMITTED or ABORTED nothing about it changes again.

use crate::error::{CoordinatorError, Result};
use acp_common::{Protocol, TransactionId, Vote};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Transaction state in the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionState {
    /// Registered, run not started yet
    Init,
    /// 2PC vote collection
    Preparing,
    /// 3PC vote collection
    CanCommit,
    /// 3PC: all voted YES, PRE_COMMIT being broadcast
    #[serde(rename = "PRECOMMITTING")]
    PreCommitting,
    /// Commit decided, commit messages being broadcast
    Committing,
    Committed,
    Aborted,
}

impl TransactionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::Preparing => "PREPARING",
            Self::CanCommit => "CAN_COMMIT",
            Self::PreCommitting => "PRECOMMITTING",
            Self::Committing => "COMMITTING",
            Self::Committed => "COMMITTED",
            Self::Aborted => "ABORTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed | Self::Aborted)
    }

    /// Whether the state may collect votes
    pub fn is_voting(&self) -> bool {
        matches!(self, Self::Preparing | Self::CanCommit)
    }

    pub fn can_transition_to(&self, next: TransactionState) -> bool {
        use TransactionState::*;

        matches!(
            (self, next),
            (Init, Preparing | CanCommit)
                | (Preparing, Committing | Aborted)
                | (CanCommit, PreCommitting | Aborted)
                | (PreCommitting, Committing)
                | (Committing, Committed)
        )
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction metadata held in the registry
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    tx_id: TransactionId,
    protocol: Protocol,
    operation: String,
    state: TransactionState,
    votes: BTreeMap<String, Vote>,
}

impl TransactionRecord {
    pub fn new(tx_id: TransactionId, protocol: Protocol, operation: String) -> Self {
        Self {
            tx_id,
            protocol,
            operation,
            state: TransactionState::Init,
            votes: BTreeMap::new(),
        }
    }

    pub fn tx_id(&self) -> &TransactionId {
        &self.tx_id
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn votes(&self) -> &BTreeMap<String, Vote> {
        &self.votes
    }

    /// Advance to `next`; an illegal step leaves the record untouched
    pub fn transition(&mut self, next: TransactionState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(CoordinatorError::InvalidState(format!(
                "transaction {} cannot move from {} to {}",
                self.tx_id, self.state, next
            )));
        }

        self.state = next;
        Ok(())
    }

    /// Record a participant's vote; only allowed while collecting votes
    pub fn record_vote(&mut self, participant_id: &str, vote: Vote) -> Result<()> {
        if !self.state.is_voting() {
            return Err(CoordinatorError::InvalidState(format!(
                "transaction {} is not collecting votes in state {}",
                self.tx_id, self.state
            )));
        }

        self.votes.insert(participant_id.to_string(), vote);
        Ok(())
    }

    pub fn snapshot(&self) -> TransactionSnapshot {
        TransactionSnapshot {
            tx_id: self.tx_id.clone(),
            protocol: self.protocol,
            operation: self.operation.clone(),
            state: self.state,
            votes: self.votes.clone(),
        }
    }
}

/// Point-in-time view of a transaction, as returned by the state query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSnapshot {
    pub tx_id: TransactionId,
    pub protocol: Protocol,
    pub operation: String,
    pub state: TransactionState,
    pub votes: BTreeMap<String, Vote>,
}
