//! Wire primitives
//!
//! Varints, field tags and the field-level encoders every message is built
//! from, plus the bounds-checked `Reader` used on the decode side.

use bytes::BufMut;

use crate::error::DecodeError;

/// Longest possible varint encoding of a `u64`
pub const MAX_VARINT_LEN: usize = 10;

/// How a field's payload is framed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    StartGroup = 3,
    EndGroup = 4,
    Fixed32 = 5,
}

impl TryFrom<u64> for WireType {
    type Error = DecodeError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthDelimited),
            3 => Ok(WireType::StartGroup),
            4 => Ok(WireType::EndGroup),
            5 => Ok(WireType::Fixed32),
            other => Err(DecodeError::UnknownWireType(other as u8)),
        }
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Append `value` as a little-endian base-128 varint
pub fn encode_varint(mut value: u64, buf: &mut impl BufMut) {
    while value >= 0x80 {
        buf.put_u8((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Number of bytes `encode_varint` writes for `value`
pub fn varint_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

/// Append the tag for `field` with the given wire type
pub fn encode_key(field: u32, wire_type: WireType, buf: &mut impl BufMut) {
    encode_varint((u64::from(field) << 3) | wire_type as u64, buf);
}

/// Encoded size of a tag for `field`
pub fn key_len(field: u32) -> usize {
    varint_len(u64::from(field) << 3)
}

/// Append a length-delimited byte field
pub fn encode_bytes(field: u32, value: &[u8], buf: &mut impl BufMut) {
    encode_key(field, WireType::LengthDelimited, buf);
    encode_varint(value.len() as u64, buf);
    buf.put_slice(value);
}

/// Encoded size of a length-delimited field carrying `len` bytes
pub fn bytes_len(field: u32, len: usize) -> usize {
    key_len(field) + varint_len(len as u64) + len
}

/// Append a string field; empty strings still emit a tag and zero length
pub fn encode_string(field: u32, value: &str, buf: &mut impl BufMut) {
    encode_bytes(field, value.as_bytes(), buf);
}

/// Encoded size of a string field
pub fn string_len(field: u32, value: &str) -> usize {
    bytes_len(field, value.len())
}

/// Append a `uint64` field
pub fn encode_uint64(field: u32, value: u64, buf: &mut impl BufMut) {
    encode_key(field, WireType::Varint, buf);
    encode_varint(value, buf);
}

/// Encoded size of a `uint64` field
pub fn uint64_len(field: u32, value: u64) -> usize {
    key_len(field) + varint_len(value)
}

/// Append a `bool` field
pub fn encode_bool(field: u32, value: bool, buf: &mut impl BufMut) {
    encode_uint64(field, u64::from(value), buf);
}

/// Encoded size of a `bool` field
pub fn bool_len(field: u32) -> usize {
    key_len(field) + 1
}

// =============================================================================
// Decoding
// =============================================================================

/// Cursor over a complete message buffer
///
/// Every read is bounds-checked; running out of input is reported as
/// `DecodeError::Truncated` instead of reading past the end.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn has_remaining(&self) -> bool {
        self.pos < self.buf.len()
    }

    /// Read a varint, failing once the shift reaches 64 bits
    pub fn read_varint(&mut self) -> Result<u64, DecodeError> {
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            if shift >= 64 {
                return Err(DecodeError::VarintOverflow);
            }
            let byte = *self.buf.get(self.pos).ok_or(DecodeError::Truncated {
                needed: 1,
                available: 0,
            })?;
            self.pos += 1;
            value |= u64::from(byte & 0x7F) << shift;
            if byte < 0x80 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    /// Read a field tag and split it into field number and wire type
    ///
    /// A stray end-group marker and field number zero are rejected here.
    pub fn read_key(&mut self) -> Result<(u32, WireType), DecodeError> {
        let key = self.read_varint()?;
        let wire_type = WireType::try_from(key & 0x7)?;
        if wire_type == WireType::EndGroup {
            return Err(DecodeError::UnexpectedEndGroup);
        }
        let field = key >> 3;
        if field == 0 || field > i32::MAX as u64 {
            return Err(DecodeError::IllegalTag(key));
        }
        Ok((field as u32, wire_type))
    }

    /// Read a length prefix and borrow exactly that many bytes
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = self.read_varint()?;
        if len > i64::MAX as u64 {
            return Err(DecodeError::InvalidLength(len));
        }
        let len = usize::try_from(len).map_err(|_| DecodeError::InvalidLength(len))?;
        self.take(len)
    }

    /// Read a length-delimited UTF-8 string
    pub fn read_string(
        &mut self,
        message: &'static str,
        field: &'static str,
    ) -> Result<String, DecodeError> {
        let bytes = self.read_length_delimited()?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| DecodeError::InvalidUtf8 { message, field })
    }

    /// Read a length-delimited byte string
    pub fn read_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        Ok(self.read_length_delimited()?.to_vec())
    }

    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        Ok(self.read_varint()? != 0)
    }

    /// Skip the payload of a field this message does not know
    pub fn skip_field(&mut self, wire_type: WireType) -> Result<(), DecodeError> {
        match wire_type {
            WireType::StartGroup => self.skip_group(),
            WireType::EndGroup => Err(DecodeError::UnexpectedEndGroup),
            other => self.skip_value(other),
        }
    }

    fn skip_value(&mut self, wire_type: WireType) -> Result<(), DecodeError> {
        match wire_type {
            WireType::Varint => self.read_varint().map(drop),
            WireType::Fixed64 => self.take(8).map(drop),
            WireType::LengthDelimited => self.read_length_delimited().map(drop),
            WireType::Fixed32 => self.take(4).map(drop),
            WireType::StartGroup | WireType::EndGroup => Ok(()),
        }
    }

    /// Skip to the end-group marker matching an already consumed start-group
    fn skip_group(&mut self) -> Result<(), DecodeError> {
        let mut depth = 1usize;
        while depth > 0 {
            let key = self.read_varint()?;
            match WireType::try_from(key & 0x7)? {
                WireType::StartGroup => depth += 1,
                WireType::EndGroup => depth -= 1,
                other => self.skip_value(other)?,
            }
        }
        Ok(())
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let available = self.remaining();
        if len > available {
            return Err(DecodeError::Truncated {
                needed: len,
                available,
            });
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.buf[start..self.pos])
    }
}

/// Reject a known field that arrived with an unexpected wire type
pub fn check_wire_type(
    expected: WireType,
    actual: WireType,
    message: &'static str,
    field: &'static str,
) -> Result<(), DecodeError> {
    if expected == actual {
        Ok(())
    } else {
        Err(DecodeError::WrongWireType {
            message,
            field,
            wire_type: actual as u8,
        })
    }
}
