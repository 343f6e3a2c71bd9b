//! Byte-source abstractions for decoding.
//!
//! Two families of readers satisfy [`Source`]: random-access readers over a
//! fully materialized buffer ([`SliceReader`], [`SharedReader`]) and the
//! forward-only [`StreamReader`]. Buffer-backed readers hand out sub-slices
//! without copying; the stream reader copies into a scratch buffer or a
//! bounded allocation.

use std::borrow::Cow;
use std::io::{self, Read};

use bytes::Bytes;

use super::zigzag_decode;
use crate::error::DecodeError;
use crate::limits::{MAX_VARINT_BYTES, STREAM_CHUNK};

/// Byte source a decoder reads from.
///
/// All read operations carry a `context` label naming what is being read,
/// which ends up in error messages verbatim.
pub trait Source {
    /// Reads a single byte.
    fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError>;

    /// Reads exactly `buf.len()` bytes, looping over short reads.
    fn read_exact(&mut self, buf: &mut [u8], context: &'static str) -> Result<(), DecodeError>;

    /// Reads exactly `n` bytes. Buffer-backed sources return a borrow into
    /// the backing buffer; stream sources return an owned copy.
    fn read_slice(&mut self, n: usize, context: &'static str)
        -> Result<Cow<'_, [u8]>, DecodeError>;

    /// Reads `n` bytes as a shared sub-buffer without copying, when the
    /// source supports it. Returns `None` (consuming nothing) otherwise.
    fn try_shared(&mut self, n: usize) -> Option<Bytes> {
        let _ = n;
        None
    }

    /// Reads an unsigned varint (LEB128).
    fn read_uvarint(&mut self, context: &'static str) -> Result<u64, DecodeError> {
        let mut result: u64 = 0;
        let mut shift = 0u32;

        for _ in 0..MAX_VARINT_BYTES {
            let byte = self.read_byte(context)?;
            let value = (byte & 0x7F) as u64;
            if shift == 63 && value > 1 {
                return Err(DecodeError::VarintOverflow);
            }
            result |= value << shift;

            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }

        Err(DecodeError::VarintTooLong)
    }

    /// Reads a signed varint (zigzag encoded).
    fn read_varint(&mut self, context: &'static str) -> Result<i64, DecodeError> {
        Ok(zigzag_decode(self.read_uvarint(context)?))
    }

    /// Number of bytes left, when the source is buffer-backed.
    fn remaining(&self) -> Option<usize> {
        None
    }
}

// =============================================================================
// SLICE READER
// =============================================================================

/// Reader over a borrowed byte slice.
///
/// Sub-slice reads borrow the backing buffer without copying. Position is
/// tracked as a cursor; reads past the end fail with `UnexpectedEof`.
#[derive(Debug, Clone)]
pub struct SliceReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceReader<'a> {
    /// Creates a new reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the current position in the data.
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    fn take(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], DecodeError> {
        if self.pos + n > self.data.len() {
            return Err(DecodeError::UnexpectedEof { context });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }
}

impl Source for SliceReader<'_> {
    #[inline]
    fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        if self.pos >= self.data.len() {
            return Err(DecodeError::UnexpectedEof { context });
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    fn read_exact(&mut self, buf: &mut [u8], context: &'static str) -> Result<(), DecodeError> {
        let bytes = self.take(buf.len(), context)?;
        buf.copy_from_slice(bytes);
        Ok(())
    }

    #[inline]
    fn read_slice(
        &mut self,
        n: usize,
        context: &'static str,
    ) -> Result<Cow<'_, [u8]>, DecodeError> {
        Ok(Cow::Borrowed(self.take(n, context)?))
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.data.len() - self.pos)
    }
}

// =============================================================================
// SHARED READER
// =============================================================================

/// Reader over a shared, reference-counted buffer.
///
/// Behaves like [`SliceReader`] but additionally supports zero-copy
/// sub-buffers: [`Source::try_shared`] returns a `Bytes` handle sharing the
/// input allocation, so decoded views stay valid independently of the
/// reader.
#[derive(Debug, Clone)]
pub struct SharedReader {
    data: Bytes,
    pos: usize,
}

impl SharedReader {
    /// Creates a new reader over a shared buffer.
    pub fn new(data: Bytes) -> Self {
        Self { data, pos: 0 }
    }
}

impl Source for SharedReader {
    #[inline]
    fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        if self.pos >= self.data.len() {
            return Err(DecodeError::UnexpectedEof { context });
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    fn read_exact(&mut self, buf: &mut [u8], context: &'static str) -> Result<(), DecodeError> {
        if self.pos + buf.len() > self.data.len() {
            return Err(DecodeError::UnexpectedEof { context });
        }
        buf.copy_from_slice(&self.data[self.pos..self.pos + buf.len()]);
        self.pos += buf.len();
        Ok(())
    }

    fn read_slice(
        &mut self,
        n: usize,
        context: &'static str,
    ) -> Result<Cow<'_, [u8]>, DecodeError> {
        if self.pos + n > self.data.len() {
            return Err(DecodeError::UnexpectedEof { context });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(Cow::Borrowed(bytes))
    }

    fn try_shared(&mut self, n: usize) -> Option<Bytes> {
        if self.pos + n > self.data.len() {
            return None;
        }
        let shared = self.data.slice(self.pos..self.pos + n);
        self.pos += n;
        Some(shared)
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.data.len() - self.pos)
    }
}

// =============================================================================
// STREAM READER
// =============================================================================

/// Reader over a forward-only byte stream.
///
/// Sub-slice reads copy: into a small scratch buffer when the request fits,
/// otherwise into an allocation grown in bounded steps so a hostile length
/// prefix cannot trigger a huge up-front allocation.
pub struct StreamReader<R> {
    inner: R,
    scratch: [u8; MAX_VARINT_BYTES],
}

impl<R: Read> StreamReader<R> {
    /// Creates a new stream reader. Callers that read many small values
    /// should hand in a buffered stream.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            scratch: [0u8; MAX_VARINT_BYTES],
        }
    }

    fn fill(&mut self, buf: &mut [u8], context: &'static str) -> Result<(), DecodeError> {
        self.inner.read_exact(buf).map_err(|err| {
            if err.kind() == io::ErrorKind::UnexpectedEof {
                DecodeError::UnexpectedEof { context }
            } else {
                DecodeError::Io(err)
            }
        })
    }
}

impl<R: Read> Source for StreamReader<R> {
    fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        let mut buf = [0u8; 1];
        self.fill(&mut buf, context)?;
        Ok(buf[0])
    }

    fn read_exact(&mut self, buf: &mut [u8], context: &'static str) -> Result<(), DecodeError> {
        self.fill(buf, context)
    }

    fn read_slice(
        &mut self,
        n: usize,
        context: &'static str,
    ) -> Result<Cow<'_, [u8]>, DecodeError> {
        if n <= self.scratch.len() {
            let mut scratch = self.scratch;
            self.fill(&mut scratch[..n], context)?;
            self.scratch = scratch;
            return Ok(Cow::Borrowed(&self.scratch[..n]));
        }

        let mut buf = Vec::new();
        let mut read = 0;
        while read < n {
            let step = (n - read).min(STREAM_CHUNK);
            let start = buf.len();
            buf.resize(start + step, 0);
            self.fill(&mut buf[start..], context)?;
            read += step;
        }
        Ok(Cow::Owned(buf))
    }
}
