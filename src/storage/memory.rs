//! In-memory store
//!
//! BTreeMap of canonical paths guarded by a RwLock.

use std::collections::BTreeMap;
use std::ops::Bound;

use parking_lot::RwLock;

use crate::config::Config;
use crate::error::Result;
use crate::protocol::{PageRequest, PageResponse};

use super::paging::paginate;
use super::path::{normalize_path, path_segments};
use super::Storage;

/// Path-addressed store held entirely in memory
///
/// ## Concurrency:
/// - `nodes`: RwLock (many concurrent readers, exclusive writer)
/// - All methods use `&self`
///
/// Every ancestor of a stored path is itself present (with an empty value
/// unless one was set), so the immediate children of a node are exactly the
/// keys one segment below it.
pub struct MemoryStore {
    /// Canonical path → value
    nodes: RwLock<BTreeMap<String, String>>,

    /// Page size for listings without a limit
    default_page_limit: u64,

    /// Cap on requested page sizes
    max_page_limit: u64,
}

impl MemoryStore {
    /// Create an empty store with default page limits
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Create an empty store using the page limits from `config`
    pub fn with_config(config: &Config) -> Self {
        Self {
            nodes: RwLock::new(BTreeMap::new()),
            default_page_limit: config.default_page_limit,
            max_page_limit: config.max_page_limit,
        }
    }

    /// Build a store from `(path, value)` pairs with default page limits
    pub fn from_entries<I, P, V>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, V)>,
        P: AsRef<str>,
        V: Into<String>,
    {
        Self::from_entries_with_config(&Config::default(), entries)
    }

    /// Build a store from `(path, value)` pairs using the page limits from
    /// `config`
    pub fn from_entries_with_config<I, P, V>(config: &Config, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, V)>,
        P: AsRef<str>,
        V: Into<String>,
    {
        let store = Self::with_config(config);
        for (path, value) in entries {
            store.set(path.as_ref(), value)?;
        }
        Ok(store)
    }

    /// Store `value` at `path`, creating any missing ancestors
    pub fn set(&self, path: &str, value: impl Into<String>) -> Result<()> {
        let segments = path_segments(path)?;
        if segments.is_empty() {
            // The root always exists and carries no value.
            return Ok(());
        }

        let mut nodes = self.nodes.write();
        for depth in 1..segments.len() {
            nodes.entry(segments[..depth].join("/")).or_default();
        }
        nodes.insert(segments.join("/"), value.into());
        Ok(())
    }

    /// Number of stored paths (including implicit ancestors)
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// Copy of every `(path, value)` pair in path order
    pub fn entries(&self) -> Vec<(String, String)> {
        self.nodes
            .read()
            .iter()
            .map(|(path, value)| (path.clone(), value.clone()))
            .collect()
    }

    /// All immediate children of the canonical path `parent`, ascending
    fn children_of(&self, parent: &str) -> Vec<String> {
        let prefix = if parent.is_empty() {
            String::new()
        } else {
            format!("{}/", parent)
        };

        let nodes = self.nodes.read();
        let children = nodes
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .map(|(path, _)| path)
            .take_while(|path| path.starts_with(prefix.as_str()))
            .map(|path| &path[prefix.len()..])
            .filter(|rest| !rest.contains('/'))
            .map(str::to_owned)
            .collect();
        children
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStore {
    fn get_value(&self, path: &str) -> Result<Option<String>> {
        let path = normalize_path(path)?;
        if path.is_empty() {
            return Ok(Some(String::new()));
        }
        Ok(self.nodes.read().get(&path).cloned())
    }

    fn list_children(
        &self,
        path: &str,
        page: Option<&PageRequest>,
    ) -> Result<(Vec<String>, Option<PageResponse>)> {
        let path = normalize_path(path)?;
        let children = self.children_of(&path);
        tracing::trace!("Listing {} children of {:?}", children.len(), path);

        let (children, page) =
            paginate(children, page, self.default_page_limit, self.max_page_limit)?;
        Ok((children, Some(page)))
    }
}
