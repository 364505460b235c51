//! Protocol definitions for coordinator-participant communication
//!
//! This crate defines the typed requests and replies exchanged by the commit
//! protocols, their JSON bodies, and their encoding onto the generic `Message`
//! type from acp-engine. It also defines the `Transport` contract the
//! coordinator drives participants through.

pub mod error;
pub mod messages;
pub mod responses;
pub mod transport;
pub mod trigger;

pub use error::{ProtocolError, TransportError};
pub use messages::{Endpoint, ParticipantRequest, RequestBody};
pub use responses::{ACK, ErrorBody, HealthBody, ParticipantReply, StateBody};
pub use transport::{EngineTransport, Transport, participant_subject};
pub use trigger::{TransactionRequest, TransactionStarted};
