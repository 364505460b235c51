//! Triggers a transaction on a coordinator

use acp_common::{Protocol, TransactionId};
use acp_node::{CoordinatorClient, NodeError};
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

/// Send a transaction to a coordinator.
#[derive(Parser)]
#[command(name = "acp-client")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Coordinator address (host:port)
    #[arg(long)]
    coordinator: String,

    /// Transaction ID
    #[arg(long)]
    tx: TransactionId,

    /// Operation, e.g. "x=-10"
    #[arg(long, allow_hyphen_values = true)]
    op: String,

    /// Protocol (2PC or 3PC)
    #[arg(long, default_value = "2PC")]
    protocol: Protocol,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    println!("Triggering transaction {}", cli.tx);
    println!("  operation:   {}", cli.op);
    println!("  protocol:    {}", cli.protocol);
    println!("  coordinator: {}", cli.coordinator);

    let client = CoordinatorClient::new(&cli.coordinator)?;
    match client
        .begin_transaction(&cli.tx, &cli.op, Some(cli.protocol))
        .await
    {
        Ok(started) => {
            println!("Transaction {} {}", started.tx_id, started.status);
            println!("Check coordinator and participant logs for the outcome.");
            Ok(ExitCode::SUCCESS)
        }
        Err(NodeError::Http(e)) if e.is_connect() => {
            eprintln!("Cannot connect to coordinator at {}", cli.coordinator);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
