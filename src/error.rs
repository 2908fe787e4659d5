//! Error types for vstorage
//!
//! `VstorageError` is the crate-wide error. Message decoding and method
//! dispatch have their own narrower enums so callers can match on the exact
//! failure without string inspection.

use thiserror::Error;

use crate::protocol::{Code, RemoteError};

/// Result type alias using VstorageError
pub type Result<T> = std::result::Result<T, VstorageError>;

/// Unified error type for vstorage operations
#[derive(Debug, Error)]
pub enum VstorageError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("corrupt message: {0}")]
    Decode(#[from] DecodeError),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Network error: {0}")]
    Network(String),

    /// Error status returned by the remote side of a call
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl VstorageError {
    /// Status code this error maps to when it crosses the wire
    pub fn code(&self) -> Code {
        match self {
            VstorageError::Decode(_)
            | VstorageError::InvalidPath(_)
            | VstorageError::InvalidPagination(_) => Code::InvalidArgument,
            VstorageError::NotFound(_) => Code::NotFound,
            VstorageError::Remote(remote) => remote.code,
            _ => Code::Internal,
        }
    }
}

impl From<bincode::Error> for VstorageError {
    fn from(e: bincode::Error) -> Self {
        VstorageError::Serialization(e.to_string())
    }
}

impl From<VstorageError> for RemoteError {
    fn from(e: VstorageError) -> Self {
        match e {
            VstorageError::Remote(remote) => remote,
            other => RemoteError::new(other.code(), other.to_string()),
        }
    }
}

/// Framing failures while decoding a message body
///
/// Every variant is fatal for the message being decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("integer overflow: varint exceeds 64 bits")]
    VarintOverflow,

    #[error("unexpected end of buffer: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("invalid length: {0}")]
    InvalidLength(u64),

    #[error("illegal wire type {0}")]
    UnknownWireType(u8),

    #[error("unexpected end of group")]
    UnexpectedEndGroup,

    #[error("illegal tag {0}")]
    IllegalTag(u64),

    #[error("{message}: wrong wire type {wire_type} for field {field}")]
    WrongWireType {
        message: &'static str,
        field: &'static str,
        wire_type: u8,
    },

    #[error("{message}: invalid UTF-8 in field {field}")]
    InvalidUtf8 {
        message: &'static str,
        field: &'static str,
    },
}

/// Failures produced by the method dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("unimplemented method {0}")]
    Unimplemented(String),

    #[error("corrupt message for {method}: {source}")]
    Decode {
        method: String,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl DispatchError {
    /// Stable status code for this failure
    pub fn code(&self) -> Code {
        match self {
            DispatchError::Unimplemented(_) => Code::Unimplemented,
            DispatchError::Decode { .. } => Code::InvalidArgument,
            DispatchError::Remote(remote) => remote.code,
        }
    }

    /// Collapse into the status carried back to the caller
    pub fn into_remote(self) -> RemoteError {
        match self {
            DispatchError::Remote(remote) => remote,
            other => RemoteError::new(other.code(), other.to_string()),
        }
    }
}
