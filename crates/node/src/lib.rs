//! Network nodes for the commit protocols
//!
//! Wraps the participant engine and the coordinator in JSON/HTTP servers,
//! provides the HTTP `Transport` the coordinator uses to reach participants,
//! and a small client for triggering transactions. The binaries in
//! `src/bin` are thin clap front-ends over these pieces.

pub mod client;
pub mod config;
pub mod coordinator_server;
pub mod error;
pub mod http_transport;
pub mod logging;
pub mod participant_server;
pub mod server;

pub use client::CoordinatorClient;
pub use config::{RPC_TIMEOUT_ENV, listen_addr, parse_resource, rpc_timeout};
pub use coordinator_server::coordinator_router;
pub use error::{NodeError, Result};
pub use http_transport::HttpTransport;
pub use logging::init_logging;
pub use participant_server::participant_router;
pub use server::serve;
