//! Type-directed binary serialization with a compact, non-self-describing
//! wire format.
//!
//! Values are encoded by walking a per-type codec tree derived from the
//! type's structure: varints for integers, length prefixes for sequences
//! and strings, presence bytes for optionals, nothing else. The stream
//! carries no tags, no field names and no version byte; both sides must
//! share the same type definitions.
//!
//! # Quick Start
//!
//! ```rust
//! typewire::schema! {
//!     #[derive(Debug, Default, PartialEq)]
//!     pub struct Message {
//!         pub name: String,
//!         pub payload: Vec<u8>,
//!         pub ssid: Vec<u32>,
//!     }
//! }
//!
//! let msg = Message {
//!     name: "Roman".into(),
//!     payload: b"hi".to_vec(),
//!     ssid: vec![1, 2, 3],
//! };
//!
//! // Encode to binary
//! let bytes = typewire::encode(&msg).unwrap();
//!
//! // Decode back
//! let mut out = Message::default();
//! typewire::decode(&bytes, &mut out).unwrap();
//! assert_eq!(msg, out);
//! ```
//!
//! # Modules
//!
//! - [`schema`]: structural type descriptors
//! - [`codec`]: codec graph construction, built-in and override codecs
//! - [`wire`]: wire primitives and the reader/writer abstractions
//! - [`sorted`]: delta-compressed sorted sequences and time series
//! - [`nocopy`]: zero-copy payload types
//! - [`error`]: error types
//! - [`limits`]: security limits for decoding
//!
//! # Security
//!
//! The decoder is designed to safely handle untrusted input:
//! - Declared lengths never drive unbounded allocations
//! - Varints are limited to 10 bytes and checked against the destination
//!   width
//! - Truncated or malformed input is rejected with descriptive errors
//!
//! # Wire Format
//!
//! ```text
//! bool            ::= u8            ; 0=false, nonzero=true (encoder emits 1)
//! uvarint         ::= 1..10 bytes   ; 7-bit little-endian base-128
//! varint          ::= uvarint       ; zig-zag over signed 64-bit
//! u16/u32/u64     ::= 2/4/8 bytes   ; little-endian
//! f32/f64         ::= u32/u64       ; IEEE-754 bits, little-endian
//! complex         ::= f f           ; real then imaginary
//! string / bytes  ::= uvarint n | n bytes
//! array<T, N>     ::= T x N         ; length lives in the type
//! seq<T>          ::= uvarint n | T x n
//! map<K, V>       ::= uvarint n | (K V) x n
//! opt<T>          ::= u8 present | if present: T
//! marshaled<T>    ::= uvarint n | n bytes
//! delta-seq       ::= uvarint bytes | packed varint deltas
//! raw-seq         ::= u64 bytes | little-endian element image
//! timeseries      ::= uvarint n | uvarint bytes | n t-deltas ++ n v-deltas
//! ```

pub mod codec;
pub mod error;
pub mod limits;
pub mod nocopy;
pub mod schema;
pub mod sorted;
pub mod wire;

mod decode;
mod encode;

pub use codec::custom::{Marshal, WithCodec};
pub use codec::{codec_of, Builder, Codec, Encodable};
pub use decode::{decode, decode_shared, Decoder};
pub use encode::{encode, encode_into, Encoder};
pub use error::{BuildError, DecodeError, EncodeError};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
