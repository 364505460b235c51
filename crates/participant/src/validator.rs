//! Pluggable vote policy

use crate::storage::Resources;
use acp_common::{Operation, TransactionId};

/// Decides whether a participant approves an operation
///
/// Runs under the participant lock with read-only access to the current
/// resources. Returning `false` makes the participant vote NO and abort.
pub trait Validator: Send + Sync {
    fn validate(&self, tx_id: &TransactionId, operation: &Operation, resources: &Resources)
    -> bool;
}

/// Approves every well-formed operation
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Validator for AcceptAll {
    fn validate(
        &self,
        _tx_id: &TransactionId,
        _operation: &Operation,
        _resources: &Resources,
    ) -> bool {
        true
    }
}

impl<F> Validator for F
where
    F: Fn(&TransactionId, &Operation, &Resources) -> bool + Send + Sync,
{
    fn validate(
        &self,
        tx_id: &TransactionId,
        operation: &Operation,
        resources: &Resources,
    ) -> bool {
        self(tx_id, operation, resources)
    }
}
