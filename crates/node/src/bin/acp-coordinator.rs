//! Coordinator node
//!
//! Accepts transaction triggers over HTTP and drives them through 2PC or 3PC
//! against the configured participants.

use acp_common::{Protocol, parse_participant_list};
use acp_coordinator::{Coordinator, CoordinatorConfig};
use acp_node::{
    HttpTransport, RPC_TIMEOUT_ENV, coordinator_router, init_logging, listen_addr, rpc_timeout,
    serve,
};
use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

/// Atomic commit coordinator.
#[derive(Parser)]
#[command(name = "acp-coordinator")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Coordinator ID
    #[arg(long)]
    id: String,

    /// Port to listen on
    #[arg(long)]
    port: u16,

    /// Comma-separated participants: B:host:port,C:host:port
    #[arg(long)]
    participants: String,

    /// Protocol used when a trigger does not name one (2PC or 3PC)
    #[arg(long, default_value = "2PC")]
    protocol: Protocol,

    /// Timeout for each participant call, in milliseconds
    #[arg(long, env = RPC_TIMEOUT_ENV)]
    timeout_ms: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let participants =
        parse_participant_list(&cli.participants).context("invalid --participants")?;
    let config = CoordinatorConfig::new(cli.id)
        .with_participants(participants)
        .with_default_protocol(cli.protocol)
        .with_rpc_timeout(rpc_timeout(cli.timeout_ms));

    let transport = Arc::new(HttpTransport::new()?);
    let coordinator = Arc::new(Coordinator::new(config, transport));

    serve(listen_addr(cli.port), coordinator_router(coordinator.clone()))
        .await
        .context("coordinator server failed")?;

    coordinator.shutdown().await;
    Ok(())
}
