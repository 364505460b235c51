//! Transaction registry shared by the coordinator and its runs
//!
//! Every read and write of a transaction record goes through the one mutex
//! held here. Records are never evicted, so the map grows for the lifetime
//! of the process.

use crate::error::{CoordinatorError, Result};
use crate::transaction::{TransactionRecord, TransactionSnapshot, TransactionState};
use acp_common::{TransactionId, Vote};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

#[derive(Debug, Default)]
pub struct Registry {
    transactions: Mutex<HashMap<TransactionId, TransactionRecord>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh record; an id already present is rejected
    pub fn insert(&self, record: TransactionRecord) -> Result<()> {
        match self.transactions.lock().entry(record.tx_id().clone()) {
            Entry::Occupied(entry) => {
                Err(CoordinatorError::DuplicateTransaction(entry.key().clone()))
            }
            Entry::Vacant(entry) => {
                entry.insert(record);
                Ok(())
            }
        }
    }

    pub fn transition(&self, tx_id: &TransactionId, next: TransactionState) -> Result<()> {
        self.with_record(tx_id, |record| record.transition(next))
    }

    pub fn record_vote(
        &self,
        tx_id: &TransactionId,
        participant_id: &str,
        vote: Vote,
    ) -> Result<()> {
        self.with_record(tx_id, |record| record.record_vote(participant_id, vote))
    }

    pub fn state(&self, tx_id: &TransactionId) -> Option<TransactionState> {
        self.transactions.lock().get(tx_id).map(|r| r.state())
    }

    pub fn snapshot(&self, tx_id: &TransactionId) -> Option<TransactionSnapshot> {
        self.transactions.lock().get(tx_id).map(|r| r.snapshot())
    }

    pub fn len(&self) -> usize {
        self.transactions.lock().len()
    }

    fn with_record<T>(
        &self,
        tx_id: &TransactionId,
        f: impl FnOnce(&mut TransactionRecord) -> Result<T>,
    ) -> Result<T> {
        let mut transactions = self.transactions.lock();
        let record = transactions
            .get_mut(tx_id)
            .ok_or_else(|| CoordinatorError::TransactionNotFound(tx_id.clone()))?;
        f(record)
    }
}
