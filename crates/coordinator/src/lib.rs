//! Coordinator side of the atomic commitment protocols
//!
//! The coordinator owns a registry of transactions and drives each one through
//! two-phase or three-phase commit on a background task. It talks to its
//! participants only through the `Transport` trait, so the same logic runs over
//! the in-memory engine in tests and over HTTP in the node binaries.

mod config;
mod coordinator;
mod error;
mod registry;
mod run;
mod transaction;

pub use config::{CoordinatorConfig, DEFAULT_RPC_TIMEOUT};
pub use coordinator::{Coordinator, RunHandle};
pub use error::{CoordinatorError, Result};
pub use transaction::{TransactionRecord, TransactionSnapshot, TransactionState};
