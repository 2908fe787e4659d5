//! Service Module
//!
//! The `agoric.vstorage.Query` service: its typed interface, the
//! storage-backed implementation, the method dispatcher and the client.
//!
//! ## Call Flow
//! ```text
//!  QueryClient ──encode──▶ Transport ──(method, bytes)──▶ Dispatcher
//!                                                           │ decode
//!                                                           ▼
//!  QueryClient ◀─decode── Transport ◀──(status, bytes)── QueryService
//!                                                           │
//!                                                           ▼
//!                                                        Storage
//! ```

mod client;
mod dispatcher;
mod server;

use crate::protocol::{
    ChildrenRequest, ChildrenResponse, DataRequest, DataResponse, RemoteError,
};

pub use client::{QueryClient, Transport};
pub use dispatcher::Dispatcher;
pub use server::QueryServer;

/// Fully-qualified service name
pub const SERVICE_NAME: &str = "agoric.vstorage.Query";

/// Method name of `Data`
pub const DATA_METHOD: &str = "/agoric.vstorage.Query/Data";

/// Method name of `Children`
pub const CHILDREN_METHOD: &str = "/agoric.vstorage.Query/Children";

/// Server side of the query service
pub trait QueryService: Send + Sync {
    /// Return an arbitrary vstorage datum
    fn data(&self, request: DataRequest) -> Result<DataResponse, RemoteError>;

    /// Return the children of a given vstorage path
    fn children(&self, request: ChildrenRequest) -> Result<ChildrenResponse, RemoteError>;
}
