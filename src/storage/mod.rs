//! Storage Module
//!
//! The path-addressed store behind the query service.
//!
//! ## Responsibilities
//! - Look up the value stored at a path
//! - List the immediate children of a path, one page at a time
//! - Interpret pagination cursors (the service only passes them through)
//!
//! ## Path Model
//! ```text
//!   (root)
//!    └── published
//!         ├── agoricNames      value: "..."
//!         └── wallet
//!              ├── agoric1abc  value: "..."
//!              └── agoric1def  value: "..."
//! ```
//! Paths are `/`-separated segments; `/published/wallet` and
//! `published/wallet/` name the same node.

mod memory;
mod paging;
mod path;
mod snapshot;

use std::sync::Arc;

use crate::error::Result;
use crate::protocol::{PageRequest, PageResponse};

pub use memory::MemoryStore;
pub use paging::paginate;
pub use path::{normalize_path, path_segments};
pub use snapshot::{load_snapshot, save_snapshot, SNAPSHOT_MAGIC, SNAPSHOT_VERSION};

/// Read capability the query service consumes
///
/// Implementations must be safe to call from many threads at once.
pub trait Storage: Send + Sync {
    /// Value stored at `path`, or `None` when the path does not exist
    fn get_value(&self, path: &str) -> Result<Option<String>>;

    /// Ordered immediate children of `path` for the requested page, along
    /// with the cursor for the next one
    fn list_children(
        &self,
        path: &str,
        page: Option<&PageRequest>,
    ) -> Result<(Vec<String>, Option<PageResponse>)>;
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn get_value(&self, path: &str) -> Result<Option<String>> {
        (**self).get_value(path)
    }

    fn list_children(
        &self,
        path: &str,
        page: Option<&PageRequest>,
    ) -> Result<(Vec<String>, Option<PageResponse>)> {
        (**self).list_children(path, page)
    }
}
