//! Participant protocol engine
//!
//! Each handler takes the store lock once and performs its whole state
//! change inside it, so concurrent requests for the same transaction are
//! serialized and a transition never lands without its resource mutation.

use crate::config::ParticipantConfig;
use crate::error::{ParticipantError, Result};
use crate::storage::{ParticipantStore, Resources};
use crate::validator::{AcceptAll, Validator};
use acp_common::{Decision, Operation, ParticipantState, TransactionId, Vote};
use acp_protocol::{ParticipantReply, ParticipantRequest};
use parking_lot::Mutex;
use std::sync::Arc;

/// A participant's resources and per-transaction state
pub struct ParticipantEngine {
    node_id: String,
    store: Mutex<ParticipantStore>,
    validator: Arc<dyn Validator>,
}

impl ParticipantEngine {
    pub fn new(config: ParticipantConfig) -> Self {
        Self {
            node_id: config.node_id,
            store: Mutex::new(ParticipantStore::new(config.resources)),
            validator: Arc::new(AcceptAll),
        }
    }

    /// Replace the vote policy
    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Dispatch a typed request to its handler
    pub fn handle(&self, request: ParticipantRequest) -> Result<ParticipantReply> {
        match request {
            ParticipantRequest::Prepare { tx_id, operation } => self
                .handle_prepare(&tx_id, &operation)
                .map(ParticipantReply::Vote),
            ParticipantRequest::Decision { tx_id, decision } => self
                .handle_decision(&tx_id, decision)
                .map(|_| ParticipantReply::Ack),
            ParticipantRequest::CanCommit { tx_id, operation } => self
                .handle_can_commit(&tx_id, &operation)
                .map(ParticipantReply::Vote),
            ParticipantRequest::PreCommit { tx_id } => self
                .handle_pre_commit(&tx_id)
                .map(|_| ParticipantReply::Ack),
            ParticipantRequest::DoCommit { tx_id } => self
                .handle_do_commit(&tx_id)
                .map(|_| ParticipantReply::Ack),
            ParticipantRequest::GetState { tx_id } => {
                let state = self.get_state(&tx_id);
                Ok(ParticipantReply::State { tx_id, state })
            }
            ParticipantRequest::Health => Ok(ParticipantReply::Health {
                node_id: self.node_id.clone(),
            }),
        }
    }

    /// 2PC phase 1: vote, and record READY on YES or ABORTED on NO
    pub fn handle_prepare(&self, tx_id: &TransactionId, operation: &str) -> Result<Vote> {
        tracing::info!("[Participant {}] {} Received PREPARE", self.node_id, tx_id);
        let mut store = self.store.lock();

        match store.state(tx_id) {
            None | Some(ParticipantState::Init) => {}
            Some(ParticipantState::Ready) => {
                tracing::debug!("{} PREPARE redelivered, keeping VOTE-YES", tx_id);
                return Ok(Vote::Yes);
            }
            Some(from) => {
                return Err(ParticipantError::InvalidTransition {
                    tx_id: tx_id.clone(),
                    from,
                    to: ParticipantState::Ready,
                });
            }
        }

        let vote = self.vote(&mut store, tx_id, operation);
        if vote.is_yes() {
            store.transition(tx_id, ParticipantState::Ready)?;
        }

        tracing::info!("[Participant {}] {} VOTE-{}", self.node_id, tx_id, vote);
        Ok(vote)
    }

    /// Apply the coordinator's decision
    ///
    /// A decision equal to the current terminal state is acknowledged
    /// without touching the resources again.
    pub fn handle_decision(&self, tx_id: &TransactionId, decision: Decision) -> Result<()> {
        tracing::info!(
            "[Participant {}] {} Received {}",
            self.node_id,
            tx_id,
            decision
        );
        let mut store = self.store.lock();

        match decision {
            Decision::Commit => self.commit_locked(&mut store, tx_id),
            Decision::Abort => {
                if store.state(tx_id) == Some(ParticipantState::Aborted) {
                    tracing::debug!("{} ABORT redelivered", tx_id);
                    return Ok(());
                }
                store.transition(tx_id, ParticipantState::Aborted)?;
                tracing::info!("[Participant {}] {} ABORT", self.node_id, tx_id);
                Ok(())
            }
        }
    }

    /// 3PC phase 1: vote without recording READY
    pub fn handle_can_commit(&self, tx_id: &TransactionId, operation: &str) -> Result<Vote> {
        tracing::info!(
            "[Participant {}] {} Received CAN-COMMIT",
            self.node_id,
            tx_id
        );
        let mut store = self.store.lock();

        if let Some(from) = store.state(tx_id)
            && from != ParticipantState::Init
        {
            return Err(ParticipantError::InvalidTransition {
                tx_id: tx_id.clone(),
                from,
                to: ParticipantState::Init,
            });
        }

        let vote = self.vote(&mut store, tx_id, operation);
        tracing::info!(
            "[Participant {}] {} Response: {}",
            self.node_id,
            tx_id,
            vote
        );
        Ok(vote)
    }

    /// 3PC phase 2: record PRECOMMITTED
    pub fn handle_pre_commit(&self, tx_id: &TransactionId) -> Result<()> {
        tracing::info!(
            "[Participant {}] {} Received PRE-COMMIT",
            self.node_id,
            tx_id
        );
        let mut store = self.store.lock();

        match store.state(tx_id) {
            None => return Err(ParticipantError::UnknownTransaction(tx_id.clone())),
            Some(ParticipantState::PreCommitted) => {
                tracing::debug!("{} PRE-COMMIT redelivered", tx_id);
                return Ok(());
            }
            Some(_) => store.transition(tx_id, ParticipantState::PreCommitted)?,
        }

        tracing::info!(
            "[Participant {}] {} State: PRECOMMITTED",
            self.node_id,
            tx_id
        );
        Ok(())
    }

    /// 3PC phase 3: apply the operation and record COMMITTED
    pub fn handle_do_commit(&self, tx_id: &TransactionId) -> Result<()> {
        tracing::info!(
            "[Participant {}] {} Received DO-COMMIT",
            self.node_id,
            tx_id
        );
        let mut store = self.store.lock();
        self.commit_locked(&mut store, tx_id)
    }

    /// Locally recorded state, INIT for unseen transactions
    pub fn get_state(&self, tx_id: &TransactionId) -> ParticipantState {
        self.store
            .lock()
            .state(tx_id)
            .unwrap_or(ParticipantState::Init)
    }

    pub fn balance(&self, resource: &str) -> Option<i64> {
        self.store.lock().resources().get(resource).copied()
    }

    /// Snapshot of all resources
    pub fn resources(&self) -> Resources {
        self.store.lock().resources().clone()
    }

    pub fn transaction_count(&self) -> usize {
        self.store.lock().transaction_count()
    }

    /// Record the transaction in INIT and decide the vote
    ///
    /// NO moves the transaction to ABORTED; YES leaves it in INIT for the
    /// caller to advance.
    fn vote(&self, store: &mut ParticipantStore, tx_id: &TransactionId, operation: &str) -> Vote {
        tracing::debug!("{} Validating operation: {}", tx_id, operation);

        let parsed = match Operation::parse(operation) {
            Ok(op) => op,
            Err(e) => {
                tracing::warn!("{} rejecting malformed operation: {}", tx_id, e);
                store.begin(tx_id, None);
                return self.reject(store, tx_id);
            }
        };

        if !store.resources().contains_key(&parsed.resource) {
            tracing::warn!("{} rejecting unknown resource {}", tx_id, parsed.resource);
            store.begin(tx_id, Some(parsed));
            return self.reject(store, tx_id);
        }

        let approved = self.validator.validate(tx_id, &parsed, store.resources());
        store.begin(tx_id, Some(parsed));

        if approved {
            Vote::Yes
        } else {
            self.reject(store, tx_id)
        }
    }

    fn reject(&self, store: &mut ParticipantStore, tx_id: &TransactionId) -> Vote {
        // INIT -> ABORTED is always allowed; the record was just (re)created
        if let Err(e) = store.transition(tx_id, ParticipantState::Aborted) {
            tracing::error!("{} failed to record abort: {}", tx_id, e);
        }
        Vote::No
    }

    fn commit_locked(&self, store: &mut ParticipantStore, tx_id: &TransactionId) -> Result<()> {
        if store.state(tx_id) == Some(ParticipantState::Committed) {
            tracing::debug!("{} COMMIT redelivered, not re-applying", tx_id);
            return Ok(());
        }

        let (resource, balance) = store.commit(tx_id)?;
        tracing::info!(
            "[Participant {}] {} COMMIT ({} = {})",
            self.node_id,
            tx_id,
            resource,
            balance
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: &str) -> TransactionId {
        TransactionId::parse(id).unwrap()
    }

    fn participant() -> ParticipantEngine {
        ParticipantEngine::new(ParticipantConfig::new("B"))
    }

    #[test]
    fn test_prepare_then_commit() {
        let p = participant();
        let t1 = tx("T1");

        assert_eq!(p.handle_prepare(&t1, "x=-10").unwrap(), Vote::Yes);
        assert_eq!(p.get_state(&t1), ParticipantState::Ready);
        assert_eq!(p.balance("x"), Some(100));

        p.handle_decision(&t1, Decision::Commit).unwrap();
        assert_eq!(p.get_state(&t1), ParticipantState::Committed);
        assert_eq!(p.balance("x"), Some(90));
    }

    #[test]
    fn test_prepare_then_abort() {
        let p = participant();
        let t1 = tx("T1");

        p.handle_prepare(&t1, "x=-10").unwrap();
        p.handle_decision(&t1, Decision::Abort).unwrap();

        assert_eq!(p.get_state(&t1), ParticipantState::Aborted);
        assert_eq!(p.balance("x"), Some(100));
    }

    #[test]
    fn test_commit_redelivery_applies_once() {
        let p = participant();
        let t1 = tx("T1");

        p.handle_prepare(&t1, "x=-10").unwrap();
        p.handle_decision(&t1, Decision::Commit).unwrap();
        p.handle_decision(&t1, Decision::Commit).unwrap();
        p.handle_do_commit(&t1).unwrap();

        assert_eq!(p.balance("x"), Some(90));
        assert_eq!(p.get_state(&t1), ParticipantState::Committed);
    }

    #[test]
    fn test_conflicting_decision_is_rejected() {
        let p = participant();
        let t1 = tx("T1");

        p.handle_prepare(&t1, "x=-10").unwrap();
        p.handle_decision(&t1, Decision::Commit).unwrap();

        let err = p.handle_decision(&t1, Decision::Abort).unwrap_err();
        assert!(matches!(
            err,
            ParticipantError::InvalidTransition {
                from: ParticipantState::Committed,
                to: ParticipantState::Aborted,
                ..
            }
        ));
        assert_eq!(p.get_state(&t1), ParticipantState::Committed);
    }

    #[test]
    fn test_malformed_operation_votes_no() {
        let p = participant();
        let t1 = tx("T1");

        assert_eq!(p.handle_prepare(&t1, "withdraw ten").unwrap(), Vote::No);
        assert_eq!(p.get_state(&t1), ParticipantState::Aborted);
    }

    #[test]
    fn test_unknown_resource_votes_no() {
        let p = participant();
        let t1 = tx("T1");

        assert_eq!(p.handle_can_commit(&t1, "y=-1").unwrap(), Vote::No);
        assert_eq!(p.get_state(&t1), ParticipantState::Aborted);
    }

    #[test]
    fn test_validator_rejection() {
        let p = participant().with_validator(Arc::new(
            |_: &TransactionId, op: &Operation, resources: &Resources| {
                resources.get(&op.resource).copied().unwrap_or(0) + op.delta >= 0
            },
        ));
        let t1 = tx("T1");

        assert_eq!(p.handle_prepare(&t1, "x=-500").unwrap(), Vote::No);
        assert_eq!(p.get_state(&t1), ParticipantState::Aborted);

        let t2 = tx("T2");
        assert_eq!(p.handle_prepare(&t2, "x=-50").unwrap(), Vote::Yes);
    }

    #[test]
    fn test_prepare_on_terminal_transaction() {
        let p = participant();
        let t1 = tx("T1");

        p.handle_prepare(&t1, "x=-10").unwrap();
        p.handle_decision(&t1, Decision::Abort).unwrap();

        assert!(matches!(
            p.handle_prepare(&t1, "x=-10"),
            Err(ParticipantError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_three_phase_path() {
        let p = participant();
        let t1 = tx("T1");

        assert_eq!(p.handle_can_commit(&t1, "x=-10").unwrap(), Vote::Yes);
        assert_eq!(p.get_state(&t1), ParticipantState::Init);

        p.handle_pre_commit(&t1).unwrap();
        assert_eq!(p.get_state(&t1), ParticipantState::PreCommitted);

        p.handle_do_commit(&t1).unwrap();
        assert_eq!(p.get_state(&t1), ParticipantState::Committed);
        assert_eq!(p.balance("x"), Some(90));
    }

    #[test]
    fn test_pre_commit_unknown_transaction() {
        let p = participant();
        assert_eq!(
            p.handle_pre_commit(&tx("T9")),
            Err(ParticipantError::UnknownTransaction(tx("T9")))
        );
        assert_eq!(p.transaction_count(), 0);
    }

    #[test]
    fn test_do_commit_without_vote() {
        let p = participant();
        assert!(matches!(
            p.handle_do_commit(&tx("T9")),
            Err(ParticipantError::UnknownTransaction(_))
        ));
        assert_eq!(p.balance("x"), Some(100));
    }

    #[test]
    fn test_abort_for_unseen_transaction() {
        let p = participant();
        let t1 = tx("T1");

        p.handle_decision(&t1, Decision::Abort).unwrap();
        assert_eq!(p.get_state(&t1), ParticipantState::Aborted);
    }

    #[test]
    fn test_get_state_does_not_create_records() {
        let p = participant();
        assert_eq!(p.get_state(&tx("T1")), ParticipantState::Init);
        assert_eq!(p.transaction_count(), 0);
    }

    #[test]
    fn test_handle_dispatch() {
        let p = participant();
        let t1 = tx("T1");

        let reply = p
            .handle(ParticipantRequest::Prepare {
                tx_id: t1.clone(),
                operation: "x=-10".to_string(),
            })
            .unwrap();
        assert_eq!(reply, ParticipantReply::Vote(Vote::Yes));

        let reply = p
            .handle(ParticipantRequest::GetState { tx_id: t1.clone() })
            .unwrap();
        assert_eq!(
            reply,
            ParticipantReply::State {
                tx_id: t1,
                state: ParticipantState::Ready
            }
        );

        let reply = p.handle(ParticipantRequest::Health).unwrap();
        assert_eq!(
            reply,
            ParticipantReply::Health {
                node_id: "B".to_string()
            }
        );
    }
}
