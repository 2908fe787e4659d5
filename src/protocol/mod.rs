//! Protocol Module
//!
//! Message encoding for the query service and the framing that carries it
//! over a connection.
//!
//! ## Message Encoding
//!
//! Every message is a sequence of fields. Each field starts with a varint
//! tag followed by a payload framed according to the tag's wire type:
//!
//! ```text
//! ┌──────────────────────────────┬───────────────┬──────────────┐
//! │ Tag = (field << 3) | wire    │ Len (varint)  │    Bytes     │  wire 2
//! └──────────────────────────────┴───────────────┴──────────────┘
//! ┌──────────────────────────────┬──────────────────────────────┐
//! │ Tag = (field << 3) | wire    │        Value (varint)        │  wire 0
//! └──────────────────────────────┴──────────────────────────────┘
//! ```
//!
//! ### Wire Types
//! - 0: varint
//! - 1: fixed 64-bit (skipped only)
//! - 2: length-delimited (strings, bytes, nested messages)
//! - 3/4: start/end group (skipped only)
//! - 5: fixed 32-bit (skipped only)
//!
//! ### Messages
//! - DataRequest:      1 = path (string)
//! - DataResponse:     1 = value (string)
//! - ChildrenRequest:  1 = path (string), 2 = pagination (PageRequest)
//! - ChildrenResponse: 1 = children (repeated string), 2 = pagination (PageResponse)
//!
//! ## Connection Framing
//!
//! ### Request Frame
//! ```text
//! ┌─────────────┬──────────┬──────────┬─────────────────────┐
//! │MethodLen(2) │  Method  │ Len (4)  │  Encoded request    │
//! └─────────────┴──────────┴──────────┴─────────────────────┘
//! ```
//!
//! ### Reply Frame
//! ```text
//! ┌──────────┬──────────┬───────────────────────────────────┐
//! │Status(1) │ Len (4)  │ Encoded response / error message  │
//! └──────────┴──────────┴───────────────────────────────────┘
//! ```

pub mod wire;
mod codec;
mod messages;
mod status;
mod frame;

pub use codec::Message;
pub use messages::{
    ChildrenRequest, ChildrenResponse, DataRequest, DataResponse, PageRequest, PageResponse,
};
pub use status::{Code, RemoteError};
pub use frame::{
    decode_reply, decode_request, encode_reply, encode_request, read_reply, read_request,
    write_reply, write_request, ReplyFrame, RequestFrame, MAX_FRAME_SIZE, REPLY_HEADER_SIZE,
};
pub use wire::WireType;
