//! Node configuration helpers shared by the binaries

use crate::error::{NodeError, Result};
use acp_common::Operation;
use acp_coordinator::DEFAULT_RPC_TIMEOUT;
use std::net::SocketAddr;
use std::time::Duration;

/// Overrides the per-call timeout when `--timeout-ms` is not given
pub const RPC_TIMEOUT_ENV: &str = "ACP_RPC_TIMEOUT_MS";

/// Address a node listens on for `port`, on all interfaces
pub fn listen_addr(port: u16) -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], port))
}

pub fn rpc_timeout(timeout_ms: Option<u64>) -> Duration {
    timeout_ms
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_RPC_TIMEOUT)
}

/// Parse an initial balance given as `name=value`
pub fn parse_resource(s: &str) -> Result<(String, i64)> {
    // Same grammar as an operation; the value is the starting balance
    let parsed = Operation::parse(s).map_err(|e| NodeError::Config(e.to_string()))?;
    Ok((parsed.resource, parsed.delta))
}
