//! Connection framing
//!
//! Wraps encoded messages for transport over a byte stream.
//!
//! ## Wire Format
//!
//! ### Request Frame
//! ```text
//! ┌─────────────┬──────────┬──────────┬─────────────────────┐
//! │MethodLen(2) │  Method  │ Len (4)  │      Payload        │
//! └─────────────┴──────────┴──────────┴─────────────────────┘
//! ```
//!
//! ### Reply Frame
//! ```text
//! ┌──────────┬──────────┬───────────────────────────────────┐
//! │Status(1) │ Len (4)  │             Payload               │
//! └──────────┴──────────┴───────────────────────────────────┘
//! ```
//!
//! All integers are big-endian. On `Status::Ok` the reply payload is the
//! encoded response message; otherwise it is the UTF-8 error message.

use std::io::{Read, Write};

use bytes::{BufMut, BytesMut};

use crate::error::{Result, VstorageError};

use super::{Code, RemoteError};

/// Reply header size: 1 byte status + 4 bytes length
pub const REPLY_HEADER_SIZE: usize = 5;

/// Size of the method length prefix
const METHOD_LEN_SIZE: usize = 2;

/// Size of a payload length prefix
const PAYLOAD_LEN_SIZE: usize = 4;

/// Default maximum payload size (16 MB)
pub const MAX_FRAME_SIZE: u32 = 16 * 1024 * 1024;

/// A method call as it travels over a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFrame {
    /// Fully-qualified method name, e.g. `/agoric.vstorage.Query/Data`
    pub method: String,

    /// Encoded request message
    pub payload: Vec<u8>,
}

impl RequestFrame {
    pub fn new(method: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            method: method.into(),
            payload,
        }
    }
}

/// The outcome of a call as it travels back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyFrame {
    /// Status code
    pub code: Code,

    /// Encoded response on success, error message otherwise
    pub payload: Vec<u8>,
}

impl ReplyFrame {
    /// Create an OK reply carrying an encoded response
    pub fn ok(payload: Vec<u8>) -> Self {
        Self {
            code: Code::Ok,
            payload,
        }
    }

    /// Create an error reply
    pub fn error(error: &RemoteError) -> Self {
        Self {
            code: error.code,
            payload: error.message.as_bytes().to_vec(),
        }
    }

    /// Split into the encoded response or the remote error
    pub fn into_result(self) -> std::result::Result<Vec<u8>, RemoteError> {
        match self.code {
            Code::Ok => Ok(self.payload),
            code => Err(RemoteError::new(
                code,
                String::from_utf8_lossy(&self.payload).into_owned(),
            )),
        }
    }
}

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request frame to bytes, rejecting payloads above `max_payload`
pub fn encode_request(frame: &RequestFrame, max_payload: u32) -> Result<BytesMut> {
    let method_len = u16::try_from(frame.method.len()).map_err(|_| {
        VstorageError::Protocol(format!(
            "Method name too long: {} bytes (max {})",
            frame.method.len(),
            u16::MAX
        ))
    })?;
    let payload_len = payload_len(frame.payload.len(), max_payload)?;

    let mut buf = BytesMut::with_capacity(
        METHOD_LEN_SIZE + frame.method.len() + PAYLOAD_LEN_SIZE + frame.payload.len(),
    );
    buf.put_u16(method_len);
    buf.put_slice(frame.method.as_bytes());
    buf.put_u32(payload_len);
    buf.put_slice(&frame.payload);

    Ok(buf)
}

/// Decode a request frame from bytes
pub fn decode_request(bytes: &[u8], max_payload: u32) -> Result<RequestFrame> {
    if bytes.len() < METHOD_LEN_SIZE {
        return Err(incomplete("request header", METHOD_LEN_SIZE, bytes.len()));
    }
    let method_len = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;

    let method_end = METHOD_LEN_SIZE + method_len;
    let header_end = method_end + PAYLOAD_LEN_SIZE;
    if bytes.len() < header_end {
        return Err(incomplete("request header", header_end, bytes.len()));
    }
    let method = parse_method(&bytes[METHOD_LEN_SIZE..method_end])?;

    let len_bytes = &bytes[method_end..header_end];
    let len = u32::from_be_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]);
    check_payload_len(len, max_payload)?;

    let total_len = header_end + len as usize;
    if bytes.len() < total_len {
        return Err(incomplete("request payload", total_len, bytes.len()));
    }

    Ok(RequestFrame {
        method,
        payload: bytes[header_end..total_len].to_vec(),
    })
}

// =============================================================================
// Reply Encoding/Decoding
// =============================================================================

/// Encode a reply frame to bytes, rejecting payloads above `max_payload`
pub fn encode_reply(frame: &ReplyFrame, max_payload: u32) -> Result<BytesMut> {
    let payload_len = payload_len(frame.payload.len(), max_payload)?;

    let mut buf = BytesMut::with_capacity(REPLY_HEADER_SIZE + frame.payload.len());
    buf.put_u8(frame.code as u8);
    buf.put_u32(payload_len);
    buf.put_slice(&frame.payload);

    Ok(buf)
}

/// Decode a reply frame from bytes
pub fn decode_reply(bytes: &[u8], max_payload: u32) -> Result<ReplyFrame> {
    if bytes.len() < REPLY_HEADER_SIZE {
        return Err(incomplete("reply header", REPLY_HEADER_SIZE, bytes.len()));
    }

    let code = parse_code(bytes[0])?;
    let len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
    check_payload_len(len, max_payload)?;

    let total_len = REPLY_HEADER_SIZE + len as usize;
    if bytes.len() < total_len {
        return Err(incomplete("reply payload", total_len, bytes.len()));
    }

    Ok(ReplyFrame {
        code,
        payload: bytes[REPLY_HEADER_SIZE..total_len].to_vec(),
    })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete request frame from a stream
///
/// Blocks until a complete frame is received or an error occurs
pub fn read_request<R: Read>(reader: &mut R, max_payload: u32) -> Result<RequestFrame> {
    let mut method_len = [0u8; METHOD_LEN_SIZE];
    reader.read_exact(&mut method_len)?;
    let method_len = u16::from_be_bytes(method_len) as usize;

    let mut method = vec![0u8; method_len];
    reader.read_exact(&mut method)?;
    let method = parse_method(&method)?;

    let payload = read_payload(reader, max_payload)?;

    Ok(RequestFrame { method, payload })
}

/// Write a request frame to a stream
pub fn write_request<W: Write>(
    writer: &mut W,
    frame: &RequestFrame,
    max_payload: u32,
) -> Result<()> {
    let bytes = encode_request(frame, max_payload)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete reply frame from a stream
pub fn read_reply<R: Read>(reader: &mut R, max_payload: u32) -> Result<ReplyFrame> {
    let mut status = [0u8; 1];
    reader.read_exact(&mut status)?;
    let code = parse_code(status[0])?;

    let payload = read_payload(reader, max_payload)?;

    Ok(ReplyFrame { code, payload })
}

/// Write a reply frame to a stream
pub fn write_reply<W: Write>(writer: &mut W, frame: &ReplyFrame, max_payload: u32) -> Result<()> {
    let bytes = encode_reply(frame, max_payload)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn read_payload<R: Read>(reader: &mut R, max_payload: u32) -> Result<Vec<u8>> {
    let mut len = [0u8; PAYLOAD_LEN_SIZE];
    reader.read_exact(&mut len)?;
    let len = u32::from_be_bytes(len);
    check_payload_len(len, max_payload)?;

    let mut payload = vec![0u8; len as usize];
    if len > 0 {
        reader.read_exact(&mut payload)?;
    }
    Ok(payload)
}

fn payload_len(len: usize, max_payload: u32) -> Result<u32> {
    let len = u32::try_from(len).unwrap_or(u32::MAX);
    check_payload_len(len, max_payload)?;
    Ok(len)
}

fn check_payload_len(len: u32, max_payload: u32) -> Result<()> {
    if len > max_payload {
        return Err(VstorageError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            len, max_payload
        )));
    }
    Ok(())
}

fn parse_method(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| VstorageError::Protocol("Method name is not valid UTF-8".to_string()))
}

fn parse_code(byte: u8) -> Result<Code> {
    Code::from_u8(byte)
        .ok_or_else(|| VstorageError::Protocol(format!("Unknown reply status: 0x{:02x}", byte)))
}

fn incomplete(what: &str, expected: usize, got: usize) -> VstorageError {
    VstorageError::Protocol(format!(
        "Incomplete {}: expected {} bytes, got {}",
        what, expected, got
    ))
}
