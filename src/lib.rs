//! # vstorage
//!
//! A read-only query service over a hierarchical key/value store:
//! - `Data`: fetch the value stored at a path
//! - `Children`: list a path's immediate children, one page at a time
//! - Compact protobuf-style wire codec for every message
//! - Method dispatch with structured, status-coded errors
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              TCP Server / in-process Transport               │
//! │                  (framed method calls)                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Dispatcher                              │
//! │        (method name → decode → handler → encode)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Codec     │          │ QueryServer │
//!   │ (messages)  │          │ Data/Child. │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │   Storage   │
//!                           │ (RwLock map)│
//!                           └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod service;
pub mod storage;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DecodeError, DispatchError, Result, VstorageError};
pub use config::{Config, NotFoundPolicy};
pub use protocol::{
    ChildrenRequest, ChildrenResponse, Code, DataRequest, DataResponse, Message, PageRequest,
    PageResponse, RemoteError,
};
pub use service::{Dispatcher, QueryClient, QueryServer, QueryService, Transport};
pub use storage::{MemoryStore, Storage};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of vstorage
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
