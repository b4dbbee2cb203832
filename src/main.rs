use std::path::PathBuf;

use chord_ring::client::RingClient;
use chord_ring::config::RingConfig;
use chord_ring::coordinator::CoordinatorService;
use chord_ring::logging::{LogLevel, init_logging};
use chord_ring::peer::PeerAgent;
use chord_ring::ring::types::NodeId;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "chord-ring", about = "Coordinator-driven Chord ring", version)]
struct Cli {
    /// YAML file with deployment settings; `CHORD_*` variables override it.
    #[arg(long, global = true, env = "CHORD_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value = "info")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the coordinator until Ctrl+C.
    Coordinator,
    /// Join the ring (or rejoin it with the persisted identity) and serve keys.
    Peer,
    /// Ask the coordinator to place a key.
    Store {
        key: u64,
        /// Skip the coordinator's liveness re-check.
        #[arg(long)]
        force: bool,
    },
    /// Take a node out of the ring; its keys move to the next online node.
    Offline { node: u64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let config = RingConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Coordinator => run_coordinator(config).await,
        Command::Peer => run_peer(config).await,
        Command::Store { key, force } => {
            RingClient::from_config(&config).store(key, force).await?;
            tracing::info!("Submitted key {} to {}", key, config.coordinator_addr);
            Ok(())
        }
        Command::Offline { node } => {
            RingClient::from_config(&config)
                .take_offline(NodeId(node))
                .await?;
            tracing::info!("Requested node {} to go offline", node);
            Ok(())
        }
    }
}

async fn run_coordinator(config: RingConfig) -> anyhow::Result<()> {
    let service = CoordinatorService::bind(config).await?;
    let cancel = CancellationToken::new();

    let server = tokio::spawn(service.clone().run(cancel.clone()));
    tracing::info!("Press Ctrl+C to shutdown");

    tokio::signal::ctrl_c().await?;
    cancel.cancel();
    server.await?;
    Ok(())
}

async fn run_peer(config: RingConfig) -> anyhow::Result<()> {
    let mut agent = PeerAgent::start(config).await?;
    if let Some(id) = agent.node_id().await {
        tracing::info!("Node {} serving on port {}", id, agent.port());
    }

    tokio::select! {
        _ = agent.wait() => {
            tracing::info!("Node left the ring");
        }
        signal = tokio::signal::ctrl_c() => signal?,
    }
    agent.shutdown();
    agent.wait().await;
    Ok(())
}
