//! Participant side of the atomic commitment protocols
//!
//! A participant holds a set of integer resources and one state record per
//! transaction it has seen. It votes on operations, remembers the operation it
//! voted on, and mutates its resources only when told to commit.
//!
//! All reads and writes of the resource map and the transaction records go
//! through a single mutex, so a state transition and the matching resource
//! mutation are always observed together.

mod config;
mod engine;
mod error;
mod processor;
mod storage;
mod validator;

pub use config::ParticipantConfig;
pub use engine::ParticipantEngine;
pub use error::{ParticipantError, Result};
pub use processor::ParticipantProcessor;
pub use storage::Resources;
pub use validator::{AcceptAll, Validator};
