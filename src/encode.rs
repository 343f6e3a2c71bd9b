//! Encoding front door.

use std::io;

use crate::codec::{codec_of, Encodable};
use crate::error::EncodeError;
use crate::wire::Writer;

/// Encodes a value into a fresh byte vector.
pub fn encode<T: Encodable>(value: &T) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    encode_into(value, &mut out)?;
    Ok(out)
}

/// Encodes a value into the provided sink.
pub fn encode_into<T: Encodable>(value: &T, out: &mut dyn io::Write) -> Result<(), EncodeError> {
    Encoder::new(out).encode(value)
}

/// A binary encoder bound to an output sink.
///
/// Encoders are cheap to construct and may be reused for many values on the
/// same sink; a single encoder must not be shared between threads. Bytes
/// are emitted in exactly the order the codec tree walks the value.
pub struct Encoder<'a> {
    writer: Writer<'a>,
    strict: bool,
}

impl<'a> Encoder<'a> {
    /// Creates an encoder writing to `out`.
    pub fn new(out: &'a mut dyn io::Write) -> Self {
        Self {
            writer: Writer::new(out),
            strict: false,
        }
    }

    /// Like [`Encoder::new`], but encoding a struct with no encodable
    /// fields fails with [`EncodeError::NoEncodableFields`] instead of
    /// writing nothing.
    pub fn strict(out: &'a mut dyn io::Write) -> Self {
        Self {
            writer: Writer::new(out),
            strict: true,
        }
    }

    /// Whether zero-field aggregates are rejected.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Encodes one value.
    pub fn encode<T: Encodable>(&mut self, value: &T) -> Result<(), EncodeError> {
        let codec = codec_of::<T>()?;
        codec.encode_to(self, value)?;
        match self.writer.take_error() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    // -------------------------------------------------------------------------
    // Wire primitives, for codec implementations
    // -------------------------------------------------------------------------

    /// Writes raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.writer.write_bytes(bytes);
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.writer.write_byte(byte);
    }

    /// Writes a boolean as one byte.
    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.writer.write_bool(value);
    }

    /// Writes an unsigned varint.
    #[inline]
    pub fn write_uvarint(&mut self, value: u64) {
        self.writer.write_uvarint(value);
    }

    /// Writes a signed (zigzag) varint.
    #[inline]
    pub fn write_varint(&mut self, value: i64) {
        self.writer.write_varint(value);
    }

    /// Writes a little-endian u16.
    #[inline]
    pub fn write_u16(&mut self, value: u16) {
        self.writer.write_u16(value);
    }

    /// Writes a little-endian u32.
    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.writer.write_u32(value);
    }

    /// Writes a little-endian u64.
    #[inline]
    pub fn write_u64(&mut self, value: u64) {
        self.writer.write_u64(value);
    }

    /// Writes a little-endian IEEE-754 f32.
    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        self.writer.write_f32(value);
    }

    /// Writes a little-endian IEEE-754 f64.
    #[inline]
    pub fn write_f64(&mut self, value: f64) {
        self.writer.write_f64(value);
    }
}
