//! One protocol run for one transaction
//!
//! Participants are contacted one at a time in registration order, in every
//! phase. A failed vote call counts as NO. A failed broadcast call is logged
//! and does not change the outcome.

use crate::registry::Registry;
use crate::transaction::TransactionState;
use acp_common::{Decision, ParticipantRecord, Protocol, TransactionId, Vote};
use acp_protocol::{ParticipantRequest, Transport};
use std::sync::Arc;
use std::time::Duration;

pub(crate) struct TransactionRun {
    pub coordinator_id: String,
    pub tx_id: TransactionId,
    pub protocol: Protocol,
    pub operation: String,
    pub participants: Arc<Vec<ParticipantRecord>>,
    pub transport: Arc<dyn Transport>,
    pub registry: Arc<Registry>,
    pub rpc_timeout: Duration,
}

impl TransactionRun {
    pub async fn run(self) -> Decision {
        tracing::info!("[Coordinator {}] {} INIT", self.coordinator_id, self.tx_id);
        match self.protocol {
            Protocol::TwoPhase => self.run_two_phase().await,
            Protocol::ThreePhase => self.run_three_phase().await,
        }
    }

    async fn run_two_phase(&self) -> Decision {
        tracing::info!(
            "[Coordinator {}] {} PREPARE",
            self.coordinator_id,
            self.tx_id,
        );
        self.advance(TransactionState::Preparing);

        let votes = self
            .collect_votes("PREPARE", || ParticipantRequest::Prepare {
                tx_id: self.tx_id.clone(),
                operation: self.operation.clone(),
            })
            .await;

        let decision = Decision::from_votes(&votes);
        match decision {
            Decision::Commit => {
                tracing::info!(
                    "[Coordinator {}] {} GLOBAL-COMMIT",
                    self.coordinator_id,
                    self.tx_id,
                );
                self.advance(TransactionState::Committing);
            }
            Decision::Abort => {
                tracing::info!(
                    "[Coordinator {}] {} GLOBAL-ABORT",
                    self.coordinator_id,
                    self.tx_id,
                );
                self.advance(TransactionState::Aborted);
            }
        }

        self.broadcast(decision.as_str(), || ParticipantRequest::Decision {
            tx_id: self.tx_id.clone(),
            decision,
        })
        .await;

        match decision {
            Decision::Commit => {
                self.advance(TransactionState::Committed);
                tracing::info!(
                    "[Coordinator {}] {} COMMITTED",
                    self.coordinator_id,
                    self.tx_id,
                );
            }
            Decision::Abort => {
                tracing::info!(
                    "[Coordinator {}] {} ABORTED",
                    self.coordinator_id,
                    self.tx_id,
                );
            }
        }

        decision
    }

    async fn run_three_phase(&self) -> Decision {
        tracing::info!(
            "[Coordinator {}] {} CAN-COMMIT",
            self.coordinator_id,
            self.tx_id,
        );
        self.advance(TransactionState::CanCommit);

        let votes = self
            .collect_votes("CAN-COMMIT", || ParticipantRequest::CanCommit {
                tx_id: self.tx_id.clone(),
                operation: self.operation.clone(),
            })
            .await;

        if Decision::from_votes(&votes) == Decision::Abort {
            tracing::info!(
                "[Coordinator {}] {} GLOBAL-ABORT (phase 1)",
                self.coordinator_id,
                self.tx_id
            );
            self.advance(TransactionState::Aborted);
            self.broadcast("ABORT", || ParticipantRequest::Decision {
                tx_id: self.tx_id.clone(),
                decision: Decision::Abort,
            })
            .await;
            return Decision::Abort;
        }

        tracing::info!(
            "[Coordinator {}] {} PRE-COMMIT",
            self.coordinator_id,
            self.tx_id,
        );
        self.advance(TransactionState::PreCommitting);
        self.broadcast("PRE-COMMIT", || ParticipantRequest::PreCommit {
            tx_id: self.tx_id.clone(),
        })
        .await;

        tracing::info!(
            "[Coordinator {}] {} DO-COMMIT",
            self.coordinator_id,
            self.tx_id,
        );
        self.advance(TransactionState::Committing);
        self.broadcast("DO-COMMIT", || ParticipantRequest::DoCommit {
            tx_id: self.tx_id.clone(),
        })
        .await;

        self.advance(TransactionState::Committed);
        tracing::info!(
            "[Coordinator {}] {} COMMITTED (3PC)",
            self.coordinator_id,
            self.tx_id,
        );
        Decision::Commit
    }

    /// Ask every participant for a vote; never stops early
    async fn collect_votes(
        &self,
        phase: &str,
        request: impl Fn() -> ParticipantRequest,
    ) -> Vec<Vote> {
        let mut votes = Vec::with_capacity(self.participants.len());

        for participant in self.participants.iter() {
            tracing::debug!(
                "{} Sending {} to {} ({})",
                self.tx_id,
                phase,
                participant.id,
                participant.address()
            );

            let vote = match self
                .transport
                .call(participant, request(), self.rpc_timeout)
                .await
                .and_then(|reply| reply.into_vote())
            {
                Ok(vote) => {
                    tracing::info!(
                        "[Coordinator {}] {} Received VOTE-{} from {}",
                        self.coordinator_id,
                        self.tx_id,
                        vote,
                        participant.id
                    );
                    vote
                }
                Err(e) => {
                    tracing::warn!(
                        "[Coordinator {}] {} Participant {} failed at {}: {}",
                        self.coordinator_id,
                        self.tx_id,
                        participant.id,
                        phase,
                        e
                    );
                    Vote::No
                }
            };

            if let Err(e) = self.registry.record_vote(&self.tx_id, &participant.id, vote) {
                tracing::error!("{} failed to record vote: {}", self.tx_id, e);
            }
            votes.push(vote);
        }

        votes
    }

    /// Deliver a message to every participant, logging failures
    async fn broadcast(&self, phase: &str, request: impl Fn() -> ParticipantRequest) {
        for participant in self.participants.iter() {
            match self
                .transport
                .call(participant, request(), self.rpc_timeout)
                .await
                .and_then(|reply| reply.into_ack())
            {
                Ok(()) => tracing::debug!("{} Sent {} to {}", self.tx_id, phase, participant.id),
                Err(e) => tracing::warn!(
                    "[Coordinator {}] {} Failed to send {} to {}: {}",
                    self.coordinator_id,
                    self.tx_id,
                    phase,
                    participant.id,
                    e
                ),
            }
        }
    }

    fn advance(&self, next: TransactionState) {
        if let Err(e) = self.registry.transition(&self.tx_id, next) {
            tracing::error!("[Coordinator {}] {}", self.coordinator_id, e);
        }
    }
}
