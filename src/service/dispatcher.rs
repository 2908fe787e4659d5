//! Method dispatcher
//!
//! Routes `(method, bytes)` calls to typed handlers.
//!
//! ## Per-call steps
//! 1. Look up the handler by fully-qualified method name
//! 2. Decode the request (a failure here never reaches the handler)
//! 3. Run the handler
//! 4. Encode the response

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::DispatchError;
use crate::protocol::{ChildrenRequest, DataRequest, Message, RemoteError};

use super::{QueryService, CHILDREN_METHOD, DATA_METHOD};

type Handler = Box<dyn Fn(&[u8]) -> Result<Vec<u8>, DispatchError> + Send + Sync>;

/// Method-name → handler table
///
/// Holds no per-call state; one instance can serve any number of calls
/// concurrently behind an `Arc`.
pub struct Dispatcher {
    handlers: HashMap<&'static str, Handler>,
}

impl Dispatcher {
    /// Create a dispatcher with no methods registered
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Create a dispatcher serving both query methods from `service`
    pub fn for_service<Q>(service: Arc<Q>) -> Self
    where
        Q: QueryService + ?Sized + 'static,
    {
        let mut dispatcher = Self::new();
        dispatcher.register_query_service(service);
        dispatcher
    }

    /// Register `Data` and `Children`
    pub fn register_query_service<Q>(&mut self, service: Arc<Q>)
    where
        Q: QueryService + ?Sized + 'static,
    {
        let data_service = Arc::clone(&service);
        self.register(DATA_METHOD, move |request: DataRequest| {
            data_service.data(request)
        });
        self.register(CHILDREN_METHOD, move |request: ChildrenRequest| {
            service.children(request)
        });
    }

    /// Register a typed handler under `method`, replacing any previous one
    pub fn register<Req, Resp, F>(&mut self, method: &'static str, handler: F)
    where
        Req: Message,
        Resp: Message,
        F: Fn(Req) -> Result<Resp, RemoteError> + Send + Sync + 'static,
    {
        self.handlers.insert(
            method,
            Box::new(move |payload: &[u8]| {
                let request = Req::decode(payload).map_err(|source| DispatchError::Decode {
                    method: method.to_string(),
                    source,
                })?;
                let response = handler(request)?;
                Ok(response.encode_to_vec())
            }),
        );
    }

    /// Run the handler for `method` on an encoded request
    pub fn dispatch(&self, method: &str, payload: &[u8]) -> Result<Vec<u8>, DispatchError> {
        let handler = self
            .handlers
            .get(method)
            .ok_or_else(|| DispatchError::Unimplemented(method.to_string()))?;

        let result = handler(payload);
        if let Err(e) = &result {
            tracing::debug!("Call to {} failed: {}", method, e);
        }
        result
    }

    pub fn is_registered(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Registered method names, in no particular order
    pub fn methods(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
