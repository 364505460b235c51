//! Participant node

use acp_node::{init_logging, listen_addr, parse_resource, participant_router, serve};
use acp_participant::{ParticipantConfig, ParticipantEngine};
use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

/// Atomic commit participant holding integer resources.
#[derive(Parser)]
#[command(name = "acp-participant")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Participant ID
    #[arg(long)]
    id: String,

    /// Port to listen on
    #[arg(long)]
    port: u16,

    /// Initial resource balance as name=value; repeatable (default x=100)
    #[arg(long = "resource")]
    resources: Vec<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = ParticipantConfig::new(cli.id);
    if !cli.resources.is_empty() {
        let resources = cli
            .resources
            .iter()
            .map(|r| parse_resource(r))
            .collect::<Result<Vec<_>, _>>()
            .context("invalid --resource")?;
        config = config.with_resources(resources);
    }

    let engine = Arc::new(ParticipantEngine::new(config));
    tracing::info!(
        "[Participant {}] Started on port {} with {:?}",
        engine.node_id(),
        cli.port,
        engine.resources()
    );

    serve(listen_addr(cli.port), participant_router(engine))
        .await
        .context("participant server failed")
}
