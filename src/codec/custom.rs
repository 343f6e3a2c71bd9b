//! User-override codecs.
//!
//! A type can replace its structural codec in two ways, in order of
//! preference:
//!
//! 1. [`WithCodec`]: the type supplies a complete codec of its own, used
//!    unchanged for both directions.
//! 2. [`Marshal`]: the type converts itself to and from an opaque byte
//!    blob; the wire form is the uvarint-length-prefixed blob.
//!
//! The [`custom_codec!`](crate::custom_codec) and
//! [`marshaled!`](crate::marshaled) macros wire either override into the
//! codec graph. Exactly one override can exist per type; it always takes
//! precedence over the structural codec because it *is* the type's
//! [`Encodable`](crate::Encodable) implementation.

use std::marker::PhantomData;
use std::sync::Arc;

use super::Codec;
use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::error::{DecodeError, EncodeError};

/// Errors produced by user-supplied codecs, propagated verbatim.
pub type UserError = Box<dyn std::error::Error + Send + Sync>;

/// Opaque-blob override: the type owns its byte representation.
pub trait Marshal {
    /// Produces the opaque byte representation of `self`.
    fn marshal(&self) -> Result<Vec<u8>, UserError>;

    /// Reconstructs `self` from bytes produced by [`Marshal::marshal`].
    fn unmarshal(&mut self, data: &[u8]) -> Result<(), UserError>;
}

/// Codec override: the type supplies its own wire format.
pub trait WithCodec: Sized {
    /// Returns the codec used for this type.
    fn binary_codec() -> Arc<dyn Codec<Self>>;
}

/// Adapter that encodes a [`Marshal`] type as a length-prefixed blob.
pub struct MarshalCodec<T>(PhantomData<fn() -> T>);

impl<T> MarshalCodec<T> {
    /// Creates the adapter.
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for MarshalCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Marshal + 'static> Codec<T> for MarshalCodec<T> {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &T) -> Result<(), EncodeError> {
        let blob = value.marshal().map_err(EncodeError::UserCodec)?;
        enc.write_uvarint(blob.len() as u64);
        enc.write_bytes(&blob);
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut T) -> Result<(), DecodeError> {
        let len =
            DecodeError::cast_len(dec.read_uvarint("marshaled blob length")?, "marshaled blob length")?;
        let data = dec.read_slice(len, "marshaled blob")?;
        into.unmarshal(&data).map_err(DecodeError::UserCodec)
    }
}

/// Implements [`Schema`](crate::schema::Schema) and
/// [`Encodable`](crate::Encodable) for a type through its
/// [`WithCodec`](crate::codec::custom::WithCodec) implementation.
#[macro_export]
macro_rules! custom_codec {
    ($ty:ty) => {
        impl $crate::schema::Schema for $ty {
            fn descriptor() -> $crate::schema::Descriptor {
                $crate::schema::Descriptor::new(stringify!($ty), $crate::schema::Shape::Custom)
            }
        }

        impl $crate::Encodable for $ty {
            fn codec(
                _: &mut $crate::codec::Builder,
            ) -> ::std::result::Result<
                ::std::sync::Arc<dyn $crate::codec::Codec<Self>>,
                $crate::BuildError,
            > {
                ::std::result::Result::Ok(
                    <$ty as $crate::codec::custom::WithCodec>::binary_codec(),
                )
            }
        }
    };
}

/// Implements [`Schema`](crate::schema::Schema) and
/// [`Encodable`](crate::Encodable) for a type through its
/// [`Marshal`](crate::codec::custom::Marshal) implementation: the wire form
/// becomes a uvarint-length-prefixed opaque blob.
#[macro_export]
macro_rules! marshaled {
    ($ty:ty) => {
        impl $crate::schema::Schema for $ty {
            fn descriptor() -> $crate::schema::Descriptor {
                $crate::schema::Descriptor::new(stringify!($ty), $crate::schema::Shape::Custom)
            }
        }

        impl $crate::Encodable for $ty {
            fn codec(
                _: &mut $crate::codec::Builder,
            ) -> ::std::result::Result<
                ::std::sync::Arc<dyn $crate::codec::Codec<Self>>,
                $crate::BuildError,
            > {
                ::std::result::Result::Ok(::std::sync::Arc::new(
                    $crate::codec::custom::MarshalCodec::<$ty>::new(),
                ))
            }
        }
    };
}
