//! Message definitions
//!
//! The request/response pairs of the query service and the pagination
//! messages they embed. Field numbers are part of the wire contract.

use bytes::BufMut;

use crate::error::DecodeError;

use super::codec::{encode_message, merge_message, message_len, Message};
use super::wire::{self, check_wire_type, Reader, WireType};

// =============================================================================
// Data
// =============================================================================

/// Request for the value stored at a path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataRequest {
    /// Field 1
    pub path: String,
}

impl DataRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Message for DataRequest {
    const NAME: &'static str = "agoric.vstorage.QueryDataRequest";

    fn encoded_len(&self) -> usize {
        wire::string_len(1, &self.path)
    }

    fn encode_raw(&self, buf: &mut impl BufMut) {
        wire::encode_string(1, &self.path, buf);
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        reader: &mut Reader<'_>,
    ) -> Result<(), DecodeError> {
        match field {
            1 => {
                check_wire_type(WireType::LengthDelimited, wire_type, Self::NAME, "path")?;
                self.path = reader.read_string(Self::NAME, "path")?;
                Ok(())
            }
            _ => reader.skip_field(wire_type),
        }
    }
}

/// Value stored at the requested path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataResponse {
    /// Field 1
    pub value: String,
}

impl DataResponse {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl Message for DataResponse {
    const NAME: &'static str = "agoric.vstorage.QueryDataResponse";

    fn encoded_len(&self) -> usize {
        wire::string_len(1, &self.value)
    }

    fn encode_raw(&self, buf: &mut impl BufMut) {
        wire::encode_string(1, &self.value, buf);
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        reader: &mut Reader<'_>,
    ) -> Result<(), DecodeError> {
        match field {
            1 => {
                check_wire_type(WireType::LengthDelimited, wire_type, Self::NAME, "value")?;
                self.value = reader.read_string(Self::NAME, "value")?;
                Ok(())
            }
            _ => reader.skip_field(wire_type),
        }
    }
}

// =============================================================================
// Children
// =============================================================================

/// Request for the immediate children of a path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildrenRequest {
    /// Field 1
    pub path: String,
    /// Field 2, omitted from the encoding when `None`
    pub pagination: Option<PageRequest>,
}

impl ChildrenRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            pagination: None,
        }
    }

    pub fn with_pagination(mut self, pagination: PageRequest) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

impl Message for ChildrenRequest {
    const NAME: &'static str = "agoric.vstorage.QueryChildrenRequest";

    fn encoded_len(&self) -> usize {
        wire::string_len(1, &self.path)
            + self.pagination.as_ref().map_or(0, |page| message_len(2, page))
    }

    fn encode_raw(&self, buf: &mut impl BufMut) {
        wire::encode_string(1, &self.path, buf);
        if let Some(page) = &self.pagination {
            encode_message(2, page, buf);
        }
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        reader: &mut Reader<'_>,
    ) -> Result<(), DecodeError> {
        match field {
            1 => {
                check_wire_type(WireType::LengthDelimited, wire_type, Self::NAME, "path")?;
                self.path = reader.read_string(Self::NAME, "path")?;
                Ok(())
            }
            2 => {
                check_wire_type(WireType::LengthDelimited, wire_type, Self::NAME, "pagination")?;
                merge_message(&mut self.pagination, reader)
            }
            _ => reader.skip_field(wire_type),
        }
    }
}

/// One page of child names plus the cursor for the next page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildrenResponse {
    /// Field 1, repeated; order is preserved as produced
    pub children: Vec<String>,
    /// Field 2, omitted from the encoding when `None`
    pub pagination: Option<PageResponse>,
}

impl ChildrenResponse {
    /// Cursor for the following page, if the listing is not exhausted
    pub fn next_key(&self) -> Option<&[u8]> {
        self.pagination
            .as_ref()
            .map(|page| page.next_key.as_slice())
            .filter(|key| !key.is_empty())
    }
}

impl Message for ChildrenResponse {
    const NAME: &'static str = "agoric.vstorage.QueryChildrenResponse";

    fn encoded_len(&self) -> usize {
        self.children
            .iter()
            .map(|child| wire::string_len(1, child))
            .sum::<usize>()
            + self.pagination.as_ref().map_or(0, |page| message_len(2, page))
    }

    fn encode_raw(&self, buf: &mut impl BufMut) {
        for child in &self.children {
            wire::encode_string(1, child, buf);
        }
        if let Some(page) = &self.pagination {
            encode_message(2, page, buf);
        }
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        reader: &mut Reader<'_>,
    ) -> Result<(), DecodeError> {
        match field {
            1 => {
                check_wire_type(WireType::LengthDelimited, wire_type, Self::NAME, "children")?;
                let child = reader.read_string(Self::NAME, "children")?;
                self.children.push(child);
                Ok(())
            }
            2 => {
                check_wire_type(WireType::LengthDelimited, wire_type, Self::NAME, "pagination")?;
                merge_message(&mut self.pagination, reader)
            }
            _ => reader.skip_field(wire_type),
        }
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Page selector for listing queries
///
/// Scalars use implicit presence: zero, empty and `false` are not encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Field 1: resume listing at this key
    pub key: Vec<u8>,
    /// Field 2: number of entries to skip when `key` is empty
    pub offset: u64,
    /// Field 3: maximum number of entries to return
    pub limit: u64,
    /// Field 4: ask for the total entry count
    pub count_total: bool,
    /// Field 5: list in descending order
    pub reverse: bool,
}

impl PageRequest {
    pub fn with_limit(limit: u64) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Continue from a cursor returned in a previous `PageResponse`
    pub fn after(key: impl Into<Vec<u8>>, limit: u64) -> Self {
        Self {
            key: key.into(),
            limit,
            ..Self::default()
        }
    }
}

impl Message for PageRequest {
    const NAME: &'static str = "cosmos.base.query.v1beta1.PageRequest";

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if !self.key.is_empty() {
            len += wire::bytes_len(1, self.key.len());
        }
        if self.offset != 0 {
            len += wire::uint64_len(2, self.offset);
        }
        if self.limit != 0 {
            len += wire::uint64_len(3, self.limit);
        }
        if self.count_total {
            len += wire::bool_len(4);
        }
        if self.reverse {
            len += wire::bool_len(5);
        }
        len
    }

    fn encode_raw(&self, buf: &mut impl BufMut) {
        if !self.key.is_empty() {
            wire::encode_bytes(1, &self.key, buf);
        }
        if self.offset != 0 {
            wire::encode_uint64(2, self.offset, buf);
        }
        if self.limit != 0 {
            wire::encode_uint64(3, self.limit, buf);
        }
        if self.count_total {
            wire::encode_bool(4, true, buf);
        }
        if self.reverse {
            wire::encode_bool(5, true, buf);
        }
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        reader: &mut Reader<'_>,
    ) -> Result<(), DecodeError> {
        match field {
            1 => {
                check_wire_type(WireType::LengthDelimited, wire_type, Self::NAME, "key")?;
                self.key = reader.read_bytes()?;
            }
            2 => {
                check_wire_type(WireType::Varint, wire_type, Self::NAME, "offset")?;
                self.offset = reader.read_varint()?;
            }
            3 => {
                check_wire_type(WireType::Varint, wire_type, Self::NAME, "limit")?;
                self.limit = reader.read_varint()?;
            }
            4 => {
                check_wire_type(WireType::Varint, wire_type, Self::NAME, "count_total")?;
                self.count_total = reader.read_bool()?;
            }
            5 => {
                check_wire_type(WireType::Varint, wire_type, Self::NAME, "reverse")?;
                self.reverse = reader.read_bool()?;
            }
            _ => reader.skip_field(wire_type)?,
        }
        Ok(())
    }
}

/// Cursor and totals returned alongside a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResponse {
    /// Field 1: key of the first entry of the next page, empty when exhausted
    pub next_key: Vec<u8>,
    /// Field 2: total entry count, when it was requested
    pub total: u64,
}

impl Message for PageResponse {
    const NAME: &'static str = "cosmos.base.query.v1beta1.PageResponse";

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if !self.next_key.is_empty() {
            len += wire::bytes_len(1, self.next_key.len());
        }
        if self.total != 0 {
            len += wire::uint64_len(2, self.total);
        }
        len
    }

    fn encode_raw(&self, buf: &mut impl BufMut) {
        if !self.next_key.is_empty() {
            wire::encode_bytes(1, &self.next_key, buf);
        }
        if self.total != 0 {
            wire::encode_uint64(2, self.total, buf);
        }
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        reader: &mut Reader<'_>,
    ) -> Result<(), DecodeError> {
        match field {
            1 => {
                check_wire_type(WireType::LengthDelimited, wire_type, Self::NAME, "next_key")?;
                self.next_key = reader.read_bytes()?;
            }
            2 => {
                check_wire_type(WireType::Varint, wire_type, Self::NAME, "total")?;
                self.total = reader.read_varint()?;
            }
            _ => reader.skip_field(wire_type)?,
        }
        Ok(())
    }
}
