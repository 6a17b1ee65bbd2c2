//! ctstore Server Binary
//!
//! Serves a storage root over TCP.
//!
//! There is no shutdown signal handling: every committed write is already
//! durable, so killing the process is safe.

use std::sync::Arc;

use clap::Parser;
use ctstore::network::Server;
use ctstore::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// ctstore Server
#[derive(Parser, Debug)]
#[command(name = "ctstore-server")]
#[command(about = "Crash-safe sharded key-value store")]
#[command(version)]
struct Args {
    /// Storage root directory
    #[arg(short, long, default_value = "./ctstore_data")]
    root: String,

    /// Number of shard directory levels (must not change for an existing root)
    #[arg(short, long, default_value_t = ctstore::config::DEFAULT_STORAGE_DEPTH)]
    depth: usize,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8124")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "64")]
    max_connections: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ctstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("ctstore Server v{}", ctstore::VERSION);
    tracing::info!("Storage root: {} (depth {})", args.root, args.depth);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .root_dir(&args.root)
        .storage_depth(args.depth)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .build();

    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::bind(config, engine) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
