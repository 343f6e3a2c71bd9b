//! Error types for encoding, decoding and codec construction.

use thiserror::Error;

/// Error raised while constructing a codec for a type.
///
/// Construction errors surface before any byte is written or read; a type
/// that builds once never fails construction again because the built codec
/// is cached for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("unsupported type {name}")]
    UnsupportedType { name: &'static str },
}

/// Error during binary encoding.
///
/// A failed encode may have written any prefix of the output; callers must
/// not interpret partial output.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("struct {name} has no encodable fields")]
    NoEncodableFields { name: &'static str },

    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error(transparent)]
    Unsupported(#[from] BuildError),

    #[error("i/o error while writing")]
    Io(#[from] std::io::Error),

    #[error("user codec failed to encode")]
    UserCodec(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Error during binary decoding.
///
/// A failed decode may have partially mutated the destination; callers must
/// not read it.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unexpected end of input while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("varint exceeds maximum length (10 bytes)")]
    VarintTooLong,

    #[error("varint overflow (value exceeds u64)")]
    VarintOverflow,

    #[error("{context} value {value} exceeds the width of the destination")]
    Overflow { context: &'static str, value: u64 },

    #[error("malformed encoding: {context}")]
    MalformedEncoding { context: &'static str },

    #[error("invalid UTF-8 in {context}")]
    InvalidUtf8 { context: &'static str },

    #[error(transparent)]
    Unsupported(#[from] BuildError),

    #[error("i/o error while reading")]
    Io(#[from] std::io::Error),

    #[error("user codec failed to decode")]
    UserCodec(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl DecodeError {
    /// Converts a declared length into a usable `usize`, guarding 32-bit
    /// hosts against lengths that only fit in 64 bits.
    pub(crate) fn cast_len(value: u64, context: &'static str) -> Result<usize, DecodeError> {
        usize::try_from(value).map_err(|_| DecodeError::Overflow { context, value })
    }
}
