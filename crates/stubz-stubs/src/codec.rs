//! Binary stub streams.
//!
//! Integers are LEB128 varints. Names go through a per-stream table:
//!
//! | tag     | meaning                                      |
//! |---------|----------------------------------------------|
//! | `0`     | null                                         |
//! | `1`     | new name: varint byte length, then UTF-8     |
//! | `n >= 2`| back-reference to the name with id `n - 2`   |
//!
//! Ids are assigned in first-seen order, so a reader rebuilds the same table
//! while decoding and re-encoding a decoded stream reproduces it byte for byte.

use crate::error::DecodeError;
use rustc_hash::FxHashMap;
use std::sync::Arc;

const NAME_NULL: u32 = 0;
const NAME_NEW: u32 = 1;
const NAME_REF_BASE: u32 = 2;

#[derive(Default)]
pub struct StubOutputStream {
    buf: Vec<u8>,
    names: FxHashMap<Arc<str>, u32>,
}

impl StubOutputStream {
    pub fn new() -> StubOutputStream {
        StubOutputStream::default()
    }

    pub fn with_capacity(capacity: usize) -> StubOutputStream {
        StubOutputStream {
            buf: Vec::with_capacity(capacity),
            names: FxHashMap::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u32_le(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_varint(&mut self, mut value: u32) {
        while value >= 0x80 {
            self.buf.push((value as u8 & 0x7f) | 0x80);
            value >>= 7;
        }
        self.buf.push(value as u8);
    }

    /// Write an optional name, once per distinct string per stream.
    pub fn write_name(&mut self, name: Option<&str>) {
        let Some(name) = name else {
            self.write_varint(NAME_NULL);
            return;
        };
        if let Some(&id) = self.names.get(name) {
            self.write_varint(NAME_REF_BASE + id);
            return;
        }
        let id = self.names.len() as u32;
        self.names.insert(Arc::from(name), id);
        self.write_varint(NAME_NEW);
        self.write_varint(name.len() as u32);
        self.buf.extend_from_slice(name.as_bytes());
    }
}

pub struct StubInputStream<'a> {
    bytes: &'a [u8],
    pos: usize,
    names: Vec<Arc<str>>,
}

impl<'a> StubInputStream<'a> {
    pub fn new(bytes: &'a [u8]) -> StubInputStream<'a> {
        StubInputStream {
            bytes,
            pos: 0,
            names: Vec::new(),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let byte = *self.bytes.get(self.pos).ok_or(DecodeError::UnexpectedEof)?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.pos.checked_add(len).ok_or(DecodeError::UnexpectedEof)?;
        let slice = self.bytes.get(self.pos..end).ok_or(DecodeError::UnexpectedEof)?;
        self.pos = end;
        Ok(slice)
    }

    pub fn read_u32_le(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_varint(&mut self) -> Result<u32, DecodeError> {
        let mut value: u32 = 0;
        let mut shift = 0u32;
        loop {
            let byte = self.read_u8()?;
            let low = (byte & 0x7f) as u32;
            if shift == 28 && low > 0x0f {
                return Err(DecodeError::VarIntOverflow);
            }
            value |= low << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift > 28 {
                return Err(DecodeError::VarIntOverflow);
            }
        }
    }

    pub fn read_name(&mut self) -> Result<Option<Arc<str>>, DecodeError> {
        match self.read_varint()? {
            NAME_NULL => Ok(None),
            NAME_NEW => {
                let len = self.read_varint()? as usize;
                let bytes = self.read_bytes(len)?;
                let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)?;
                let name: Arc<str> = Arc::from(text);
                self.names.push(name.clone());
                Ok(Some(name))
            }
            tag => {
                let id = tag - NAME_REF_BASE;
                self.names
                    .get(id as usize)
                    .cloned()
                    .map(Some)
                    .ok_or(DecodeError::BadNameRef(id))
            }
        }
    }

    /// Read a name that the format never leaves null.
    pub fn read_required_name(&mut self) -> Result<Arc<str>, DecodeError> {
        self.read_name()?.ok_or(DecodeError::MissingName)
    }
}

#[cfg(test)]
#[path = "tests/codec_unit_tests.rs"]
mod codec_unit_tests;
