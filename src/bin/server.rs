//! scull Server Binary
//!
//! Creates the device and serves it over TCP.

use std::sync::Arc;

use clap::Parser;
use scull::network::Server;
use scull::{Config, Device};
use tracing_subscriber::{fmt, EnvFilter};

/// scull Server
#[derive(Parser, Debug)]
#[command(name = "scull-server")]
#[command(about = "In-memory quantized character device served over TCP")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7070")]
    listen: String,

    /// Bytes per quantum
    #[arg(short, long, default_value = "4000")]
    quantum: usize,

    /// Quantum slots per quantum set
    #[arg(short = 's', long, default_value = "1000")]
    qset: usize,

    /// Cap on store memory in MB (unbounded if absent)
    #[arg(short = 'm', long)]
    memory_limit_mb: Option<usize>,

    /// Maximum concurrent connections
    #[arg(short = 'c', long, default_value = "64")]
    max_connections: usize,

    /// Worker threads
    #[arg(short, long, default_value = "4")]
    workers: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,scull=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("scull Server v{}", scull::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .quantum_size(args.quantum)
        .qset_size(args.qset)
        .memory_limit(args.memory_limit_mb.map(|mb| mb * 1024 * 1024))
        .max_connections(args.max_connections)
        .worker_threads(args.workers)
        .build();

    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(2);
    }

    let device = match Device::init(&config) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("Failed to initialize device: {}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::bind(config, Arc::clone(&device)) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
    drop(server);

    if device.destroy().is_err() {
        tracing::warn!("Device still referenced at exit");
    }
    tracing::info!("Server stopped");
}
