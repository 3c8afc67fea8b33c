//! Append/read byte buffer used to build and walk chain wire formats.
//!
//! [`SerialBuffer`] owns a growable byte array with an independent write
//! length and read cursor. Writers append raw bytes, varuint32-framed
//! fields, and UTF-8 strings; readers advance a cursor and fail with
//! [`SerialBufferError::BufferUnderrun`] rather than reading past the
//! valid length. One buffer has one owner for its whole lifetime.
//!
//! The varuint32 wire format is the unsigned LEB128 scheme: little-endian
//! 7-bit groups with the `0x80` continuation bit set on every group but
//! the last.

use thiserror::Error;

/// Starting capacity for a freshly created write buffer.
const INITIAL_CAPACITY: usize = 1024;

/// Errors produced while reading from a [`SerialBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SerialBufferError {
    /// A read would pass the end of the valid data.
    #[error("read past end of buffer: requested {requested} bytes, {available} available")]
    BufferUnderrun {
        /// Bytes the caller asked for.
        requested: usize,
        /// Bytes left before the end of the valid data.
        available: usize,
    },

    /// A varuint32 encoding carries more than 32 bits of payload.
    #[error("varuint32 does not fit in 32 bits")]
    VaruintOverflow,
}

/// A growable binary buffer with a write length and a read cursor.
#[derive(Debug, Clone, Default)]
pub struct SerialBuffer {
    data: Vec<u8>,
    read_pos: usize,
}

impl SerialBuffer {
    /// Create an empty buffer for serializing.
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(INITIAL_CAPACITY),
            read_pos: 0,
        }
    }

    /// Create a buffer over existing bytes for deserializing.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data, read_pos: 0 }
    }

    /// Number of valid bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether any valid bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Grow capacity until at least `size` free bytes exist past the valid
    /// length. Growth is geometric (×1.5, rounded up) so repeated appends
    /// stay amortized O(1).
    pub fn reserve(&mut self, size: usize) {
        if self.data.len() + size <= self.data.capacity() {
            return;
        }
        let mut capacity = self.data.capacity().max(1);
        while self.data.len() + size > capacity {
            capacity = capacity.saturating_mul(3).div_ceil(2);
        }
        self.data.reserve_exact(capacity - self.data.len());
    }

    /// Append a single byte.
    pub fn push_byte(&mut self, byte: u8) {
        self.reserve(1);
        self.data.push(byte);
    }

    /// Append raw bytes.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len());
        self.data.extend_from_slice(bytes);
    }

    /// Append a varuint32.
    pub fn push_varuint32(&mut self, mut value: u32) {
        loop {
            if value >> 7 != 0 {
                self.push_byte(0x80 | (value & 0x7f) as u8);
                value >>= 7;
            } else {
                self.push_byte(value as u8);
                break;
            }
        }
    }

    /// Append binary data framed by a varuint32 length.
    pub fn push_length_prefixed(&mut self, bytes: &[u8]) {
        self.push_varuint32(bytes.len() as u32);
        self.push_bytes(bytes);
    }

    /// Append a string as length-prefixed UTF-8.
    pub fn push_string(&mut self, value: &str) {
        self.push_length_prefixed(value.as_bytes());
    }

    /// Read a single byte, advancing the cursor.
    pub fn read_byte(&mut self) -> Result<u8, SerialBufferError> {
        let byte = *self
            .data
            .get(self.read_pos)
            .ok_or(SerialBufferError::BufferUnderrun {
                requested: 1,
                available: 0,
            })?;
        self.read_pos += 1;
        Ok(byte)
    }

    /// Read `length` bytes, advancing the cursor.
    pub fn read_bytes(&mut self, length: usize) -> Result<&[u8], SerialBufferError> {
        let available = self.data.len() - self.read_pos;
        if length > available {
            return Err(SerialBufferError::BufferUnderrun {
                requested: length,
                available,
            });
        }
        let bytes = &self.data[self.read_pos..self.read_pos + length];
        self.read_pos += length;
        Ok(bytes)
    }

    /// Read a varuint32, advancing the cursor.
    pub fn read_varuint32(&mut self) -> Result<u32, SerialBufferError> {
        let mut value = 0u64;
        let mut shift = 0;
        loop {
            let byte = self.read_byte()?;
            value |= u64::from(byte & 0x7f) << shift;
            shift += 7;
            if byte & 0x80 == 0 {
                break;
            }
            if shift >= 35 {
                return Err(SerialBufferError::VaruintOverflow);
            }
        }
        u32::try_from(value).map_err(|_| SerialBufferError::VaruintOverflow)
    }

    /// The valid-length view of the buffer, with no capacity slack.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The bytes between the read cursor and the end of the valid data.
    pub fn remaining(&self) -> &[u8] {
        &self.data[self.read_pos..]
    }

    /// Consume the buffer, returning the valid bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
