//! vstorage CLI Client
//!
//! Command-line interface for querying a vstorage server.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use vstorage::network::TcpTransport;
use vstorage::storage::save_snapshot;
use vstorage::{
    ChildrenRequest, DataRequest, MemoryStore, PageRequest, QueryClient, VstorageError,
};

/// vstorage CLI
#[derive(Parser, Debug)]
#[command(name = "vstorage-cli")]
#[command(about = "CLI for the vstorage query service")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:9090")]
    server: String,

    /// Reply timeout in milliseconds (0 waits forever)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    /// Largest reply payload accepted, in bytes
    #[arg(long, default_value = "16777216")]
    max_frame_size: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get the value stored at a path
    Data {
        /// The path to read
        path: String,
    },

    /// List the children of a path
    Children {
        /// The parent path
        path: String,

        /// Maximum number of children to return
        #[arg(short, long, default_value = "0")]
        limit: u64,

        /// Resume from the cursor printed by a previous call
        #[arg(short, long)]
        key: Option<String>,

        /// Number of children to skip (without --key)
        #[arg(short, long, default_value = "0")]
        offset: u64,

        /// List in descending order
        #[arg(short, long)]
        reverse: bool,

        /// Ask the server for the total child count
        #[arg(long)]
        count_total: bool,
    },

    /// Write a snapshot file for the server to load
    Snapshot {
        /// Output file
        output: PathBuf,

        /// Entries as path=value
        #[arg(value_name = "PATH=VALUE")]
        entries: Vec<String>,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> vstorage::Result<()> {
    match args.command {
        Commands::Data { path } => {
            let client = connect(&args.server, args.timeout_ms, args.max_frame_size)?;
            let response = client.data(&DataRequest::new(path))?;
            println!("{}", response.value);
        }
        Commands::Children {
            path,
            limit,
            key,
            offset,
            reverse,
            count_total,
        } => {
            let client = connect(&args.server, args.timeout_ms, args.max_frame_size)?;
            let page = PageRequest {
                key: key.map(String::into_bytes).unwrap_or_default(),
                offset,
                limit,
                count_total,
                reverse,
            };
            let response = client.children(&ChildrenRequest::new(path).with_pagination(page))?;

            for child in &response.children {
                println!("{}", child);
            }
            if let Some(next) = response.next_key() {
                eprintln!("next key: {}", String::from_utf8_lossy(next));
            }
            if let Some(total) = response.pagination.as_ref().map(|p| p.total).filter(|t| *t > 0) {
                eprintln!("total: {}", total);
            }
        }
        Commands::Snapshot { output, entries } => {
            let store = MemoryStore::new();
            for entry in &entries {
                let (path, value) = entry.split_once('=').ok_or_else(|| {
                    VstorageError::Config(format!("Expected PATH=VALUE, got {:?}", entry))
                })?;
                store.set(path, value)?;
            }
            save_snapshot(&store, &output)?;
            println!("wrote {} paths to {}", store.len(), output.display());
        }
    }
    Ok(())
}

fn connect(
    server: &str,
    timeout_ms: u64,
    max_frame_size: u32,
) -> vstorage::Result<QueryClient<TcpTransport>> {
    let transport = TcpTransport::connect(server)?.max_frame_size(max_frame_size);
    transport.set_read_timeout_ms(timeout_ms)?;
    Ok(QueryClient::new(transport))
}
