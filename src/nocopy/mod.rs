//! Zero-copy payload types.
//!
//! [`Bytes`] and [`Str`] decode without copying when the decoder reads from
//! a shared buffer ([`decode_shared`](crate::decode_shared)): the decoded
//! view holds a reference-counted slice of the input allocation and stays
//! valid for as long as it is kept. Decoding from any other source falls
//! back to copying.
//!
//! [`Raw`] trades portability for speed: the wire carries the contiguous
//! little-endian image of the element array behind a fixed 8-byte length,
//! skipping per-element varint work entirely. The stream is only
//! meaningful to peers using the same element width.
//!
//! [`Dictionary`] and [`ByteMap`] are compact small-metadata bags with a
//! fixed 2-byte entry count.

mod codecs;

pub use codecs::FixedWidth;

use std::collections::HashMap;
use std::ops::Deref;

use crate::codec::custom::WithCodec;
use crate::codec::{Builder, Codec};
use crate::error::BuildError;
use crate::schema::{Descriptor, Schema, Shape};

macro_rules! nocopy_schema {
    ($($ty:ty),*) => {
        $(
            impl Schema for $ty {
                fn descriptor() -> Descriptor {
                    Descriptor::new(stringify!($ty), Shape::Custom)
                }
            }

            impl crate::Encodable for $ty {
                fn codec(
                    _: &mut Builder,
                ) -> Result<std::sync::Arc<dyn Codec<Self>>, BuildError> {
                    Ok(<$ty as WithCodec>::binary_codec())
                }
            }
        )*
    };
}

// =============================================================================
// BYTES AND STRINGS
// =============================================================================

/// Byte payload decoded as a view of the input buffer when possible.
///
/// Wire form matches `Vec<u8>`: uvarint length, then the raw bytes. The
/// two are interchangeable on the wire; this type only changes how the
/// decoder materializes the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bytes(pub(crate) bytes::Bytes);

impl Bytes {
    /// Creates an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the payload as a slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Returns the underlying shared buffer.
    pub fn into_inner(self) -> bytes::Bytes {
        self.0
    }
}

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(data: Vec<u8>) -> Self {
        Self(bytes::Bytes::from(data))
    }
}

impl From<bytes::Bytes> for Bytes {
    fn from(data: bytes::Bytes) -> Self {
        Self(data)
    }
}

impl From<&[u8]> for Bytes {
    fn from(data: &[u8]) -> Self {
        Self(bytes::Bytes::copy_from_slice(data))
    }
}

impl WithCodec for Bytes {
    fn binary_codec() -> std::sync::Arc<dyn Codec<Self>> {
        std::sync::Arc::new(codecs::BytesCodec)
    }
}

/// String payload decoded as a view of the input buffer when possible.
///
/// Wire form matches `String`. UTF-8 is validated once on decode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Str(pub(crate) bytes::Bytes);

impl Str {
    /// Creates an empty string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the payload as a string slice.
    pub fn as_str(&self) -> &str {
        // UTF-8 validated on every construction path
        std::str::from_utf8(&self.0).expect("payload holds valid UTF-8")
    }
}

impl Deref for Str {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for Str {
    fn from(text: &str) -> Self {
        Self(bytes::Bytes::copy_from_slice(text.as_bytes()))
    }
}

impl From<String> for Str {
    fn from(text: String) -> Self {
        Self(bytes::Bytes::from(text.into_bytes()))
    }
}

impl std::fmt::Display for Str {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WithCodec for Str {
    fn binary_codec() -> std::sync::Arc<dyn Codec<Self>> {
        std::sync::Arc::new(codecs::StrCodec)
    }
}

// =============================================================================
// RAW FIXED-WIDTH SEQUENCES
// =============================================================================

/// Fixed-width primitive sequence carried as its little-endian byte image.
///
/// Wire form: 8-byte little-endian byte count, then the contiguous
/// little-endian image of the elements. There is no per-element framing;
/// big-endian peers cannot consume the stream without a byte-order aware
/// decoder on their side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Raw<T>(pub Vec<T>);

impl<T> Raw<T> {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Consumes the wrapper, returning the inner vector.
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T> Deref for Raw<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.0
    }
}

impl<T> From<Vec<T>> for Raw<T> {
    fn from(values: Vec<T>) -> Self {
        Self(values)
    }
}

impl<T: FixedWidth> Schema for Raw<T> {
    fn descriptor() -> Descriptor {
        Descriptor::new(std::any::type_name::<Self>(), Shape::Custom)
    }
}

impl<T: FixedWidth> WithCodec for Raw<T> {
    fn binary_codec() -> std::sync::Arc<dyn Codec<Self>> {
        std::sync::Arc::new(codecs::RawCodec::<T>::new())
    }
}

impl<T: FixedWidth> crate::Encodable for Raw<T> {
    fn codec(_: &mut Builder) -> Result<std::sync::Arc<dyn Codec<Self>>, BuildError> {
        Ok(Self::binary_codec())
    }
}

// =============================================================================
// DICTIONARIES
// =============================================================================

/// Small string-to-string metadata bag.
///
/// Wire form: 2-byte little-endian entry count, then a uvarint-prefixed key
/// and uvarint-prefixed value per entry. Encoding more than 65535 entries
/// fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary(pub HashMap<String, String>);

impl Dictionary {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Deref for Dictionary {
    type Target = HashMap<String, String>;

    fn deref(&self) -> &HashMap<String, String> {
        &self.0
    }
}

impl From<HashMap<String, String>> for Dictionary {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

impl WithCodec for Dictionary {
    fn binary_codec() -> std::sync::Arc<dyn Codec<Self>> {
        std::sync::Arc::new(codecs::DictionaryCodec)
    }
}

/// Small string-to-bytes metadata bag; same layout as [`Dictionary`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteMap(pub HashMap<String, Vec<u8>>);

impl ByteMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Deref for ByteMap {
    type Target = HashMap<String, Vec<u8>>;

    fn deref(&self) -> &HashMap<String, Vec<u8>> {
        &self.0
    }
}

impl From<HashMap<String, Vec<u8>>> for ByteMap {
    fn from(map: HashMap<String, Vec<u8>>) -> Self {
        Self(map)
    }
}

impl WithCodec for ByteMap {
    fn binary_codec() -> std::sync::Arc<dyn Codec<Self>> {
        std::sync::Arc::new(codecs::ByteMapCodec)
    }
}

nocopy_schema!(Bytes, Str, Dictionary, ByteMap);
