//! Core coordinator implementation

use crate::config::CoordinatorConfig;
use crate::error::{CoordinatorError, Result};
use crate::registry::Registry;
use crate::run::TransactionRun;
use crate::transaction::{TransactionRecord, TransactionSnapshot, TransactionState};
use acp_common::{Decision, ParticipantRecord, Protocol, TransactionId};
use acp_protocol::Transport;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Distributed transaction coordinator
pub struct Coordinator {
    /// Coordinator ID
    coordinator_id: String,

    /// Participants in registration order
    participants: Arc<Vec<ParticipantRecord>>,

    /// Protocol used when a trigger does not name one
    default_protocol: Protocol,

    /// Per-call timeout
    rpc_timeout: std::time::Duration,

    /// Channel to the participants
    transport: Arc<dyn Transport>,

    /// All transactions this coordinator has started
    registry: Arc<Registry>,

    /// Background runs still to be awaited on shutdown
    runs: Mutex<Runs>,
}

/// The shutdown flag lives under the same lock as the handles, so a run is
/// either refused or visible to `shutdown`
#[derive(Default)]
struct Runs {
    handles: Vec<JoinHandle<()>>,
    shutting_down: bool,
}

/// Handle onto a background protocol run
///
/// Dropping it does not cancel the run.
pub struct RunHandle {
    tx_id: TransactionId,
    decision: oneshot::Receiver<Decision>,
}

impl RunHandle {
    pub fn tx_id(&self) -> &TransactionId {
        &self.tx_id
    }

    /// Wait for the run to finish and return its decision
    pub async fn decision(self) -> Result<Decision> {
        self.decision.await.map_err(|_| {
            CoordinatorError::InvalidState(format!("run for {} was cancelled", self.tx_id))
        })
    }
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig, transport: Arc<dyn Transport>) -> Self {
        tracing::info!(
            "[Coordinator {}] Started with protocol {}",
            config.coordinator_id,
            config.default_protocol
        );
        tracing::info!(
            "[Coordinator {}] Participants: {:?}",
            config.coordinator_id,
            config.participants.iter().map(|p| p.id.as_str()).collect::<Vec<_>>()
        );

        Self {
            coordinator_id: config.coordinator_id,
            participants: Arc::new(config.participants),
            default_protocol: config.default_protocol,
            rpc_timeout: config.rpc_timeout,
            transport,
            registry: Arc::new(Registry::new()),
            runs: Mutex::new(Runs::default()),
        }
    }

    pub fn coordinator_id(&self) -> &str {
        &self.coordinator_id
    }

    pub fn participants(&self) -> &[ParticipantRecord] {
        &self.participants
    }

    pub fn default_protocol(&self) -> Protocol {
        self.default_protocol
    }

    /// Register a transaction and start its protocol run in the background
    ///
    /// Returns as soon as the transaction is registered. `protocol` falls
    /// back to the configured default.
    pub fn begin_transaction(
        &self,
        tx_id: TransactionId,
        operation: impl Into<String>,
        protocol: Option<Protocol>,
    ) -> Result<RunHandle> {
        let mut runs = self.runs.lock();
        if runs.shutting_down {
            return Err(CoordinatorError::ShuttingDown);
        }

        let operation = operation.into();
        if operation.trim().is_empty() {
            return Err(CoordinatorError::EmptyOperation);
        }

        let protocol = protocol.unwrap_or(self.default_protocol);
        self.registry.insert(TransactionRecord::new(
            tx_id.clone(),
            protocol,
            operation.clone(),
        ))?;

        let run = TransactionRun {
            coordinator_id: self.coordinator_id.clone(),
            tx_id: tx_id.clone(),
            protocol,
            operation,
            participants: self.participants.clone(),
            transport: self.transport.clone(),
            registry: self.registry.clone(),
            rpc_timeout: self.rpc_timeout,
        };

        let (decision_tx, decision_rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let decision = run.run().await;
            // Nobody listening is fine: the trigger is fire-and-forget
            let _ = decision_tx.send(decision);
        });

        runs.handles.retain(|run| !run.is_finished());
        runs.handles.push(task);

        Ok(RunHandle {
            tx_id,
            decision: decision_rx,
        })
    }

    /// Snapshot of a transaction's state and votes
    pub fn transaction(&self, tx_id: &TransactionId) -> Result<TransactionSnapshot> {
        self.registry
            .snapshot(tx_id)
            .ok_or_else(|| CoordinatorError::TransactionNotFound(tx_id.clone()))
    }

    pub fn transaction_state(&self, tx_id: &TransactionId) -> Option<TransactionState> {
        self.registry.state(tx_id)
    }

    pub fn transaction_count(&self) -> usize {
        self.registry.len()
    }

    /// Refuse new transactions and wait for every in-flight run
    pub async fn shutdown(&self) {
        let handles = {
            let mut runs = self.runs.lock();
            runs.shutting_down = true;
            std::mem::take(&mut runs.handles)
        };
        for run in handles {
            if let Err(e) = run.await {
                tracing::error!("[Coordinator {}] run failed: {}", self.coordinator_id, e);
            }
        }
    }
}
