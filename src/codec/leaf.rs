//! Leaf codecs for scalars and strings.

use std::marker::PhantomData;
use std::sync::Arc;

use num_complex::Complex;

use super::{map, seq, Builder, Codec, Encodable};
use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::error::{BuildError, DecodeError, EncodeError};

/// Unsigned scalar representable as a u64 varint on the wire.
pub(crate) trait UintScalar: Copy + Default + 'static {
    fn into_u64(self) -> u64;
    fn from_u64(value: u64) -> Option<Self>;
}

/// Signed scalar representable as a zig-zag varint on the wire.
pub(crate) trait IntScalar: Copy + Default + 'static {
    fn into_i64(self) -> i64;
    fn from_i64(value: i64) -> Option<Self>;
}

macro_rules! uint_scalar {
    ($($ty:ty),*) => {
        $(
            impl UintScalar for $ty {
                #[inline]
                fn into_u64(self) -> u64 {
                    self as u64
                }

                #[inline]
                fn from_u64(value: u64) -> Option<Self> {
                    Self::try_from(value).ok()
                }
            }
        )*
    };
}

macro_rules! int_scalar {
    ($($ty:ty),*) => {
        $(
            impl IntScalar for $ty {
                #[inline]
                fn into_i64(self) -> i64 {
                    self as i64
                }

                #[inline]
                fn from_i64(value: i64) -> Option<Self> {
                    Self::try_from(value).ok()
                }
            }
        )*
    };
}

uint_scalar!(u8, u16, u32, u64, usize);
int_scalar!(i8, i16, i32, i64, isize);

// =============================================================================
// SCALAR CODECS
// =============================================================================

/// Codec for `bool`: one byte, any nonzero decodes as true.
pub struct BoolCodec;

impl Codec<bool> for BoolCodec {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &bool) -> Result<(), EncodeError> {
        enc.write_bool(*value);
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut bool) -> Result<(), DecodeError> {
        *into = dec.read_byte("bool")? != 0;
        Ok(())
    }
}

/// Codec for unsigned integers of any width, as uvarints.
pub struct UvarintCodec<T>(PhantomData<fn() -> T>);

impl<T> UvarintCodec<T> {
    pub(crate) const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: UintScalar> Codec<T> for UvarintCodec<T> {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &T) -> Result<(), EncodeError> {
        enc.write_uvarint(value.into_u64());
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut T) -> Result<(), DecodeError> {
        let raw = dec.read_uvarint("unsigned integer")?;
        *into = T::from_u64(raw).ok_or(DecodeError::Overflow {
            context: "unsigned integer",
            value: raw,
        })?;
        Ok(())
    }
}

/// Codec for signed integers of any width, as zig-zag varints.
pub struct VarintCodec<T>(PhantomData<fn() -> T>);

impl<T> VarintCodec<T> {
    pub(crate) const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: IntScalar> Codec<T> for VarintCodec<T> {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &T) -> Result<(), EncodeError> {
        enc.write_varint(value.into_i64());
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut T) -> Result<(), DecodeError> {
        let raw = dec.read_varint("signed integer")?;
        *into = T::from_i64(raw).ok_or(DecodeError::Overflow {
            context: "signed integer",
            value: raw as u64,
        })?;
        Ok(())
    }
}

/// Codec for `f32`: little-endian IEEE-754 bits.
pub struct Float32Codec;

impl Codec<f32> for Float32Codec {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &f32) -> Result<(), EncodeError> {
        enc.write_f32(*value);
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut f32) -> Result<(), DecodeError> {
        *into = dec.read_f32("f32")?;
        Ok(())
    }
}

/// Codec for `f64`: little-endian IEEE-754 bits.
pub struct Float64Codec;

impl Codec<f64> for Float64Codec {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &f64) -> Result<(), EncodeError> {
        enc.write_f64(*value);
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut f64) -> Result<(), DecodeError> {
        *into = dec.read_f64("f64")?;
        Ok(())
    }
}

/// Codec for `Complex<f32>`: real then imaginary part.
pub struct Complex64Codec;

impl Codec<Complex<f32>> for Complex64Codec {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &Complex<f32>) -> Result<(), EncodeError> {
        enc.write_f32(value.re);
        enc.write_f32(value.im);
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut Complex<f32>) -> Result<(), DecodeError> {
        into.re = dec.read_f32("complex real")?;
        into.im = dec.read_f32("complex imaginary")?;
        Ok(())
    }
}

/// Codec for `Complex<f64>`: real then imaginary part.
pub struct Complex128Codec;

impl Codec<Complex<f64>> for Complex128Codec {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &Complex<f64>) -> Result<(), EncodeError> {
        enc.write_f64(value.re);
        enc.write_f64(value.im);
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut Complex<f64>) -> Result<(), DecodeError> {
        into.re = dec.read_f64("complex real")?;
        into.im = dec.read_f64("complex imaginary")?;
        Ok(())
    }
}

/// Codec for `String`: uvarint byte length, then the raw bytes.
pub struct StringCodec;

impl Codec<String> for StringCodec {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &String) -> Result<(), EncodeError> {
        enc.write_uvarint(value.len() as u64);
        enc.write_bytes(value.as_bytes());
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut String) -> Result<(), DecodeError> {
        let len = DecodeError::cast_len(dec.read_uvarint("string length")?, "string length")?;
        let data = dec.read_slice(len, "string")?;
        let text =
            std::str::from_utf8(&data).map_err(|_| DecodeError::InvalidUtf8 { context: "string" })?;
        into.clear();
        into.push_str(text);
        Ok(())
    }
}

// =============================================================================
// ENCODABLE IMPLEMENTATIONS
// =============================================================================

impl Encodable for bool {
    fn codec(_: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError> {
        Ok(Arc::new(BoolCodec))
    }

    fn sequence_codec(_: &mut Builder) -> Result<Arc<dyn Codec<Vec<Self>>>, BuildError> {
        Ok(Arc::new(seq::BoolSliceCodec))
    }
}

impl Encodable for u8 {
    fn codec(_: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError> {
        Ok(Arc::new(UvarintCodec::<u8>::new()))
    }

    fn sequence_codec(_: &mut Builder) -> Result<Arc<dyn Codec<Vec<Self>>>, BuildError> {
        Ok(Arc::new(seq::ByteSliceCodec))
    }
}

macro_rules! uint_encodable {
    ($($ty:ty),*) => {
        $(
            impl Encodable for $ty {
                fn codec(_: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError> {
                    Ok(Arc::new(UvarintCodec::<$ty>::new()))
                }

                fn sequence_codec(
                    _: &mut Builder,
                ) -> Result<Arc<dyn Codec<Vec<Self>>>, BuildError> {
                    Ok(Arc::new(seq::PackedUintCodec::<$ty>::new()))
                }
            }
        )*
    };
}

macro_rules! uint_key_encodable {
    ($($ty:ty),*) => {
        $(
            impl Encodable for $ty {
                fn codec(_: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError> {
                    Ok(Arc::new(UvarintCodec::<$ty>::new()))
                }

                fn sequence_codec(
                    _: &mut Builder,
                ) -> Result<Arc<dyn Codec<Vec<Self>>>, BuildError> {
                    Ok(Arc::new(seq::PackedUintCodec::<$ty>::new()))
                }

                fn map_key_codec(_: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError> {
                    Ok(Arc::new(map::FixedKeyCodec::<$ty>::new()))
                }
            }
        )*
    };
}

macro_rules! int_encodable {
    ($($ty:ty),*) => {
        $(
            impl Encodable for $ty {
                fn codec(_: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError> {
                    Ok(Arc::new(VarintCodec::<$ty>::new()))
                }

                fn sequence_codec(
                    _: &mut Builder,
                ) -> Result<Arc<dyn Codec<Vec<Self>>>, BuildError> {
                    Ok(Arc::new(seq::PackedIntCodec::<$ty>::new()))
                }
            }
        )*
    };
}

macro_rules! int_key_encodable {
    ($($ty:ty),*) => {
        $(
            impl Encodable for $ty {
                fn codec(_: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError> {
                    Ok(Arc::new(VarintCodec::<$ty>::new()))
                }

                fn sequence_codec(
                    _: &mut Builder,
                ) -> Result<Arc<dyn Codec<Vec<Self>>>, BuildError> {
                    Ok(Arc::new(seq::PackedIntCodec::<$ty>::new()))
                }

                fn map_key_codec(_: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError> {
                    Ok(Arc::new(map::FixedKeyCodec::<$ty>::new()))
                }
            }
        )*
    };
}

uint_encodable!(usize);
uint_key_encodable!(u16, u32, u64);
int_encodable!(i8, isize);
int_key_encodable!(i16, i32, i64);

impl Encodable for f32 {
    fn codec(_: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError> {
        Ok(Arc::new(Float32Codec))
    }
}

impl Encodable for f64 {
    fn codec(_: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError> {
        Ok(Arc::new(Float64Codec))
    }
}

impl Encodable for Complex<f32> {
    fn codec(_: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError> {
        Ok(Arc::new(Complex64Codec))
    }
}

impl Encodable for Complex<f64> {
    fn codec(_: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError> {
        Ok(Arc::new(Complex128Codec))
    }
}

impl Encodable for String {
    fn codec(_: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError> {
        Ok(Arc::new(StringCodec))
    }

    fn map_key_codec(_: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError> {
        Ok(Arc::new(map::StringKeyCodec))
    }
}
