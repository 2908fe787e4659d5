//! Query client
//!
//! Typed calls over any `Transport`.

use std::sync::Arc;

use crate::error::{Result, VstorageError};
use crate::protocol::{
    ChildrenRequest, ChildrenResponse, DataRequest, DataResponse, Message,
};

use super::{Dispatcher, CHILDREN_METHOD, DATA_METHOD};

/// Carries one encoded request to a dispatcher and brings back the encoded
/// response
///
/// A failed call on the remote side comes back as `VstorageError::Remote`.
pub trait Transport {
    fn invoke(&self, method: &str, payload: &[u8]) -> Result<Vec<u8>>;
}

/// In-process transport: calls the dispatcher directly
impl Transport for Dispatcher {
    fn invoke(&self, method: &str, payload: &[u8]) -> Result<Vec<u8>> {
        self.dispatch(method, payload)
            .map_err(|e| VstorageError::Remote(e.into_remote()))
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn invoke(&self, method: &str, payload: &[u8]) -> Result<Vec<u8>> {
        (**self).invoke(method, payload)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn invoke(&self, method: &str, payload: &[u8]) -> Result<Vec<u8>> {
        (**self).invoke(method, payload)
    }
}

/// Client for the `agoric.vstorage.Query` service
pub struct QueryClient<T> {
    transport: T,
}

impl<T: Transport> QueryClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Return an arbitrary vstorage datum
    pub fn data(&self, request: &DataRequest) -> Result<DataResponse> {
        self.call(DATA_METHOD, request)
    }

    /// Return the children of a given vstorage path
    pub fn children(&self, request: &ChildrenRequest) -> Result<ChildrenResponse> {
        self.call(CHILDREN_METHOD, request)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    fn call<Req: Message, Resp: Message>(&self, method: &str, request: &Req) -> Result<Resp> {
        let payload = self.transport.invoke(method, &request.encode_to_vec())?;
        Ok(Resp::decode(&payload)?)
    }
}
