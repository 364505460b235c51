//! Participant-local store: resources plus per-transaction records

use crate::error::{ParticipantError, Result};
use acp_common::{Operation, ParticipantState, TransactionId};
use std::collections::{BTreeMap, HashMap};

/// Resource name to balance
pub type Resources = BTreeMap<String, i64>;

/// What a participant remembers about one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TransactionRecord {
    pub state: ParticipantState,
    /// Operation voted on; absent when the vote request was malformed
    pub operation: Option<Operation>,
}

/// Everything guarded by the participant lock
///
/// Records are never evicted; the map grows with every transaction seen.
#[derive(Debug, Default)]
pub(crate) struct ParticipantStore {
    resources: Resources,
    transactions: HashMap<TransactionId, TransactionRecord>,
}

impl ParticipantStore {
    pub fn new(resources: Resources) -> Self {
        Self {
            resources,
            transactions: HashMap::new(),
        }
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn state(&self, tx_id: &TransactionId) -> Option<ParticipantState> {
        self.transactions.get(tx_id).map(|r| r.state)
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Record (or re-record) a transaction in INIT with the operation under vote
    pub fn begin(&mut self, tx_id: &TransactionId, operation: Option<Operation>) {
        self.transactions.insert(
            tx_id.clone(),
            TransactionRecord {
                state: ParticipantState::Init,
                operation,
            },
        );
    }

    /// Move a transaction to `next`, enforcing the transition table
    ///
    /// Unseen transactions are created in INIT first.
    pub fn transition(&mut self, tx_id: &TransactionId, next: ParticipantState) -> Result<()> {
        let record = self
            .transactions
            .entry(tx_id.clone())
            .or_insert(TransactionRecord {
                state: ParticipantState::Init,
                operation: None,
            });

        if !record.state.can_transition_to(next) {
            return Err(ParticipantError::InvalidTransition {
                tx_id: tx_id.clone(),
                from: record.state,
                to: next,
            });
        }

        record.state = next;
        Ok(())
    }

    /// Apply the stored operation and mark the transaction COMMITTED
    ///
    /// Both writes happen under the caller's lock; on error neither happens.
    /// Returns the resource name and its new balance.
    pub fn commit(&mut self, tx_id: &TransactionId) -> Result<(String, i64)> {
        let record = self
            .transactions
            .get(tx_id)
            .ok_or_else(|| ParticipantError::UnknownTransaction(tx_id.clone()))?;

        if !record.state.can_transition_to(ParticipantState::Committed) {
            return Err(ParticipantError::InvalidTransition {
                tx_id: tx_id.clone(),
                from: record.state,
                to: ParticipantState::Committed,
            });
        }

        let operation = record
            .operation
            .clone()
            .ok_or_else(|| ParticipantError::UnknownTransaction(tx_id.clone()))?;

        let balance = self
            .resources
            .get_mut(&operation.resource)
            .ok_or_else(|| ParticipantError::UnknownResource(operation.resource.clone()))?;
        let updated =
            operation
                .apply_to(*balance)
                .ok_or_else(|| ParticipantError::BalanceOverflow {
                    resource: operation.resource.clone(),
                })?;
        *balance = updated;

        if let Some(record) = self.transactions.get_mut(tx_id) {
            record.state = ParticipantState::Committed;
        }

        Ok((operation.resource, updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: &str) -> TransactionId {
        TransactionId::parse(id).unwrap()
    }

    fn store() -> ParticipantStore {
        ParticipantStore::new(BTreeMap::from([("x".to_string(), 100)]))
    }

    #[test]
    fn test_commit_applies_stored_operation() {
        let mut store = store();
        let t1 = tx("T1");

        store.begin(&t1, Some(Operation::new("x", -10)));
        store.transition(&t1, ParticipantState::Ready).unwrap();

        assert_eq!(store.commit(&t1).unwrap(), ("x".to_string(), 90));
        assert_eq!(store.state(&t1), Some(ParticipantState::Committed));
    }

    #[test]
    fn test_commit_unknown_transaction() {
        let mut store = store();
        assert_eq!(
            store.commit(&tx("T9")),
            Err(ParticipantError::UnknownTransaction(tx("T9")))
        );
        assert_eq!(store.resources().get("x"), Some(&100));
    }

    #[test]
    fn test_commit_after_abort_is_rejected() {
        let mut store = store();
        let t1 = tx("T1");

        store.begin(&t1, Some(Operation::new("x", -10)));
        store.transition(&t1, ParticipantState::Aborted).unwrap();

        assert!(matches!(
            store.commit(&t1),
            Err(ParticipantError::InvalidTransition { .. })
        ));
        assert_eq!(store.resources().get("x"), Some(&100));
    }

    #[test]
    fn test_overflow_leaves_state_untouched() {
        let mut store = ParticipantStore::new(BTreeMap::from([("x".to_string(), i64::MAX)]));
        let t1 = tx("T1");

        store.begin(&t1, Some(Operation::new("x", 1)));
        assert!(matches!(
            store.commit(&t1),
            Err(ParticipantError::BalanceOverflow { .. })
        ));
        assert_eq!(store.state(&t1), Some(ParticipantState::Init));
    }

    #[test]
    fn test_transition_creates_unseen_record() {
        let mut store = store();
        let t1 = tx("T1");

        store.transition(&t1, ParticipantState::Aborted).unwrap();
        assert_eq!(store.state(&t1), Some(ParticipantState::Aborted));
        assert_eq!(store.transaction_count(), 1);
    }
}
