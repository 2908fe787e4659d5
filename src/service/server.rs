//! Query server
//!
//! Answers `Data` and `Children` from a `Storage` implementation.

use crate::config::{Config, NotFoundPolicy};
use crate::protocol::{
    ChildrenRequest, ChildrenResponse, DataRequest, DataResponse, RemoteError,
};
use crate::storage::Storage;

use super::QueryService;

/// `QueryService` backed by a storage collaborator
pub struct QueryServer<S> {
    /// Where values and child listings come from
    storage: S,

    /// How a missing path is reported by `data`
    not_found_policy: NotFoundPolicy,
}

impl<S: Storage> QueryServer<S> {
    /// Create a server that reports missing paths as `NotFound`
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            not_found_policy: NotFoundPolicy::Error,
        }
    }

    /// Create a server using the policies in `config`
    pub fn with_config(storage: S, config: &Config) -> Self {
        Self {
            storage,
            not_found_policy: config.not_found_policy,
        }
    }

    pub fn not_found_policy(mut self, policy: NotFoundPolicy) -> Self {
        self.not_found_policy = policy;
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: Storage> QueryService for QueryServer<S> {
    fn data(&self, request: DataRequest) -> Result<DataResponse, RemoteError> {
        tracing::trace!("Data {:?}", request.path);

        match self.storage.get_value(&request.path)? {
            Some(value) => Ok(DataResponse { value }),
            None => match self.not_found_policy {
                NotFoundPolicy::Error => Err(RemoteError::not_found(format!(
                    "path {:?} not found",
                    request.path
                ))),
                NotFoundPolicy::EmptyValue => Ok(DataResponse::default()),
            },
        }
    }

    fn children(&self, request: ChildrenRequest) -> Result<ChildrenResponse, RemoteError> {
        tracing::trace!(
            "Children {:?} (pagination: {:?})",
            request.path,
            request.pagination
        );

        let (children, pagination) = self
            .storage
            .list_children(&request.path, request.pagination.as_ref())?;
        Ok(ChildrenResponse {
            children,
            pagination,
        })
    }
}
