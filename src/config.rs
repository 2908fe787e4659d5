//! Configuration for vstorage
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a vstorage instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Number of worker threads serving connections
    pub worker_threads: usize,

    /// Max accepted connections waiting for a worker
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 disables)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 disables)
    pub write_timeout_ms: u64,

    /// Largest request or reply payload accepted on a connection (bytes)
    pub max_frame_size: u32,

    // -------------------------------------------------------------------------
    // Query Configuration
    // -------------------------------------------------------------------------
    /// Page size used when a children query carries no limit
    pub default_page_limit: u64,

    /// Upper bound applied to any requested page size
    pub max_page_limit: u64,

    /// How `Data` answers for a path the store has never seen
    pub not_found_policy: NotFoundPolicy,

    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Snapshot file loaded into the store at startup
    pub snapshot_path: Option<PathBuf>,
}

/// Policy for `Data` lookups of missing paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotFoundPolicy {
    /// Reply with a `NotFound` remote error
    #[default]
    Error,

    /// Reply with an empty value, indistinguishable from an empty entry
    EmptyValue,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:9090".to_string(),
            worker_threads: 8,
            max_connections: 1024,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            max_frame_size: 16 * 1024 * 1024, // 16 MB
            default_page_limit: 100,
            max_page_limit: 1000,
            not_found_policy: NotFoundPolicy::Error,
            snapshot_path: None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of connection worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the maximum number of queued connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the maximum frame payload size (in bytes)
    pub fn max_frame_size(mut self, size: u32) -> Self {
        self.config.max_frame_size = size;
        self
    }

    /// Set the page size used when a request carries no limit
    pub fn default_page_limit(mut self, limit: u64) -> Self {
        self.config.default_page_limit = limit;
        self
    }

    /// Set the cap applied to requested page sizes
    pub fn max_page_limit(mut self, limit: u64) -> Self {
        self.config.max_page_limit = limit;
        self
    }

    /// Set how missing paths are reported by `Data`
    pub fn not_found_policy(mut self, policy: NotFoundPolicy) -> Self {
        self.config.not_found_policy = policy;
        self
    }

    /// Set the snapshot loaded at startup
    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.snapshot_path = Some(path.into());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
