//! Common types for atomic commitment
//!
//! This crate defines:
//! - Transaction identifiers
//! - The protocol selector and the vote/decision vocabulary
//! - Resource operations (`name=delta`) applied by participants
//! - Static participant records (`id:host:port`)
//! - Participant-side transaction states

mod error;
mod operation;
mod participant;
mod protocol;
mod state;
mod transaction_id;

pub use error::{CommonError, Result};
pub use operation::Operation;
pub use participant::{ParticipantRecord, parse_participant_list};
pub use protocol::{Decision, Protocol, Vote};
pub use state::ParticipantState;
pub use transaction_id::TransactionId;
