//! Decoding front door.

use std::borrow::Cow;
use std::io;

use bytes::Bytes;

use crate::codec::{codec_of, Encodable};
use crate::error::DecodeError;
use crate::wire::{SharedReader, SliceReader, Source, StreamReader};

/// Decodes a value from a byte slice into a caller-provided destination.
pub fn decode<T: Encodable>(input: &[u8], into: &mut T) -> Result<(), DecodeError> {
    Decoder::from_slice(input).decode(into)
}

/// Decodes a value from a shared buffer, enabling zero-copy payloads: types
/// like [`nocopy::Bytes`](crate::nocopy::Bytes) decode as views sharing the
/// input allocation.
pub fn decode_shared<T: Encodable>(input: Bytes, into: &mut T) -> Result<(), DecodeError> {
    Decoder::from_shared(input).decode(into)
}

/// A binary decoder bound to a byte source.
///
/// The source kind is fixed by the constructor: slices and shared buffers
/// get random-access readers (zero-copy sub-slices), arbitrary streams get
/// a buffered forward-only reader. A single decoder must not be shared
/// between threads.
pub struct Decoder<'a> {
    source: Box<dyn Source + 'a>,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder over a borrowed byte slice.
    pub fn from_slice(input: &'a [u8]) -> Self {
        Self {
            source: Box::new(SliceReader::new(input)),
        }
    }

    /// Creates a decoder over a shared buffer.
    pub fn from_shared(input: Bytes) -> Decoder<'static> {
        Decoder {
            source: Box::new(SharedReader::new(input)),
        }
    }

    /// Creates a decoder over a forward-only byte stream.
    pub fn from_reader<R: io::Read + 'a>(input: R) -> Self {
        Self {
            source: Box::new(StreamReader::new(io::BufReader::new(input))),
        }
    }

    /// Decodes one value into the destination.
    ///
    /// On error the destination may have been partially overwritten and
    /// must not be read.
    pub fn decode<T: Encodable>(&mut self, into: &mut T) -> Result<(), DecodeError> {
        let codec = codec_of::<T>()?;
        codec.decode_to(self, into)
    }

    // -------------------------------------------------------------------------
    // Wire primitives, for codec implementations
    // -------------------------------------------------------------------------

    /// Reads a single byte.
    #[inline]
    pub fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        self.source.read_byte(context)
    }

    /// Reads exactly `n` bytes, borrowing from the input when possible.
    #[inline]
    pub fn read_slice(
        &mut self,
        n: usize,
        context: &'static str,
    ) -> Result<Cow<'_, [u8]>, DecodeError> {
        self.source.read_slice(n, context)
    }

    /// Reads `n` bytes as a zero-copy shared buffer, when the source
    /// supports it.
    #[inline]
    pub fn try_shared(&mut self, n: usize) -> Option<Bytes> {
        self.source.try_shared(n)
    }

    /// Reads an unsigned varint.
    #[inline]
    pub fn read_uvarint(&mut self, context: &'static str) -> Result<u64, DecodeError> {
        self.source.read_uvarint(context)
    }

    /// Reads a signed (zigzag) varint.
    #[inline]
    pub fn read_varint(&mut self, context: &'static str) -> Result<i64, DecodeError> {
        self.source.read_varint(context)
    }

    /// Reads a little-endian u16.
    pub fn read_u16(&mut self, context: &'static str) -> Result<u16, DecodeError> {
        let mut buf = [0u8; 2];
        self.source.read_exact(&mut buf, context)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Reads a little-endian u32.
    pub fn read_u32(&mut self, context: &'static str) -> Result<u32, DecodeError> {
        let mut buf = [0u8; 4];
        self.source.read_exact(&mut buf, context)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Reads a little-endian u64.
    pub fn read_u64(&mut self, context: &'static str) -> Result<u64, DecodeError> {
        let mut buf = [0u8; 8];
        self.source.read_exact(&mut buf, context)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Reads a little-endian IEEE-754 f32.
    pub fn read_f32(&mut self, context: &'static str) -> Result<f32, DecodeError> {
        Ok(f32::from_bits(self.read_u32(context)?))
    }

    /// Reads a little-endian IEEE-754 f64.
    pub fn read_f64(&mut self, context: &'static str) -> Result<f64, DecodeError> {
        Ok(f64::from_bits(self.read_u64(context)?))
    }

    /// Number of bytes left, when the source is buffer-backed.
    #[inline]
    pub fn remaining(&self) -> Option<usize> {
        self.source.remaining()
    }
}
