//! Protocol codec
//!
//! The `Message` trait ties a typed struct to its field-level encoding.
//! Implementors describe their fields once (`encoded_len`, `encode_raw`,
//! `merge_field`); buffer sizing, the decode loop and unknown-field skipping
//! are shared here.

use bytes::{BufMut, Bytes};

use crate::error::DecodeError;

use super::wire::{self, Reader, WireType};

/// A message with a fixed set of numbered fields
pub trait Message: Default + Sized {
    /// Fully-qualified message name, used in decode errors
    const NAME: &'static str;

    /// Exact number of bytes `encode_raw` writes
    fn encoded_len(&self) -> usize;

    /// Append all fields in ascending field-number order
    fn encode_raw(&self, buf: &mut impl BufMut);

    /// Decode one field whose tag has already been read
    ///
    /// Unknown field numbers must be passed to `Reader::skip_field`.
    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        reader: &mut Reader<'_>,
    ) -> Result<(), DecodeError>;

    /// Encode into a buffer allocated once at the exact size
    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_raw(&mut buf);
        buf
    }

    fn encode_to_bytes(&self) -> Bytes {
        Bytes::from(self.encode_to_vec())
    }

    /// Decode a complete buffer into a fresh message
    fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        message.merge(buf)?;
        Ok(message)
    }

    /// Merge the fields in `buf` into `self`
    ///
    /// Scalars are overwritten, repeated fields appended and nested messages
    /// merged recursively.
    fn merge(&mut self, buf: &[u8]) -> Result<(), DecodeError> {
        let mut reader = Reader::new(buf);
        while reader.has_remaining() {
            let (field, wire_type) = reader.read_key()?;
            self.merge_field(field, wire_type, &mut reader)?;
        }
        Ok(())
    }
}

/// Append a nested message as a length-delimited field
pub fn encode_message<M: Message>(field: u32, message: &M, buf: &mut impl BufMut) {
    wire::encode_key(field, WireType::LengthDelimited, buf);
    wire::encode_varint(message.encoded_len() as u64, buf);
    message.encode_raw(buf);
}

/// Encoded size of a nested message field
pub fn message_len<M: Message>(field: u32, message: &M) -> usize {
    wire::bytes_len(field, message.encoded_len())
}

/// Merge a length-delimited nested message into an optional slot
pub fn merge_message<M: Message>(
    slot: &mut Option<M>,
    reader: &mut Reader<'_>,
) -> Result<(), DecodeError> {
    let payload = reader.read_length_delimited()?;
    slot.get_or_insert_with(M::default).merge(payload)
}
