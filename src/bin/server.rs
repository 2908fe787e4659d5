//! vstorage Server Binary
//!
//! Serves the query service over TCP from an in-memory store.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use vstorage::network::Server;
use vstorage::storage::load_snapshot;
use vstorage::{Config, Dispatcher, MemoryStore, NotFoundPolicy, QueryServer};

/// vstorage Server
#[derive(Parser, Debug)]
#[command(name = "vstorage-server")]
#[command(about = "Read-only query service over a hierarchical key/value store")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:9090")]
    listen: String,

    /// Number of connection worker threads
    #[arg(short, long, default_value = "8")]
    workers: usize,

    /// Maximum queued connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Largest request or reply payload in bytes
    #[arg(long, default_value = "16777216")]
    max_frame_size: u32,

    /// Snapshot file to load at startup
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Extra entries to load, as path=value (repeatable)
    #[arg(long = "set", value_name = "PATH=VALUE")]
    entries: Vec<String>,

    /// Page size for children queries without a limit
    #[arg(long, default_value = "100")]
    page_limit: u64,

    /// Reply to Data on a missing path with an empty value instead of NotFound
    #[arg(long)]
    empty_on_missing: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vstorage=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("vstorage Server v{}", vstorage::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    let policy = if args.empty_on_missing {
        NotFoundPolicy::EmptyValue
    } else {
        NotFoundPolicy::Error
    };

    // Build config from args
    let mut builder = Config::builder()
        .listen_addr(&args.listen)
        .worker_threads(args.workers)
        .max_connections(args.max_connections)
        .max_frame_size(args.max_frame_size)
        .default_page_limit(args.page_limit)
        .not_found_policy(policy);
    if let Some(path) = &args.snapshot {
        builder = builder.snapshot_path(path);
    }
    let config = builder.build();

    let store = match open_store(&config, &args.entries) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to load store: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Store initialized with {} paths", store.len());

    let service = Arc::new(QueryServer::with_config(store, &config));
    let dispatcher = Arc::new(Dispatcher::for_service(service));

    let mut server = Server::new(config, dispatcher);
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

/// Build the store from the snapshot and `path=value` arguments
fn open_store(config: &Config, entries: &[String]) -> vstorage::Result<MemoryStore> {
    let store = MemoryStore::with_config(config);

    if let Some(path) = &config.snapshot_path {
        let count = load_snapshot(&store, path)?;
        tracing::info!("Loaded {} entries from {}", count, path.display());
    }

    for entry in entries {
        let (path, value) = entry.split_once('=').ok_or_else(|| {
            vstorage::VstorageError::Config(format!("Expected PATH=VALUE, got {:?}", entry))
        })?;
        store.set(path, value)?;
    }

    Ok(store)
}
