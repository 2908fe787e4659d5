//! Status definitions
//!
//! Status codes and the structured error a failed call returns to its caller.

use std::fmt;

use thiserror::Error;

/// Reply status codes
///
/// Numbering follows the gRPC status codes so the values stay meaningful to
/// other clients of the same service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Code {
    Ok = 0,
    InvalidArgument = 3,
    NotFound = 5,
    Unimplemented = 12,
    Internal = 13,
}

impl Code {
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Code::Ok),
            3 => Some(Code::InvalidArgument),
            5 => Some(Code::NotFound),
            12 => Some(Code::Unimplemented),
            13 => Some(Code::Internal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Code::Ok => "OK",
            Code::InvalidArgument => "INVALID_ARGUMENT",
            Code::NotFound => "NOT_FOUND",
            Code::Unimplemented => "UNIMPLEMENTED",
            Code::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error status of a remote call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct RemoteError {
    /// Status code
    pub code: Code,

    /// Human-readable description
    pub message: String,
}

impl RemoteError {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a NOT_FOUND error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Code::NotFound, message)
    }

    /// Create an INVALID_ARGUMENT error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(Code::InvalidArgument, message)
    }

    /// Create an UNIMPLEMENTED error naming the method
    pub fn unimplemented(method: &str) -> Self {
        Self::new(Code::Unimplemented, format!("unimplemented method {}", method))
    }

    /// Create an INTERNAL error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Code::Internal, message)
    }
}
