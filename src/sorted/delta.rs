//! Delta codec for sorted integer sequences.
//!
//! Wire form: uvarint count of packed bytes, then one varint per element
//! holding the difference from its predecessor (starting at zero). Signed
//! widths use zig-zag varints, unsigned widths plain uvarints.

use std::marker::PhantomData;

use super::Sorted;
use crate::codec::Codec;
use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::error::{DecodeError, EncodeError};
use crate::wire::{append_uvarint, append_varint, take_uvarint, take_varint};

/// Integer widths supported by the delta codec.
pub trait DeltaScalar: Copy + Ord + Default + 'static {
    #[doc(hidden)]
    fn append_delta(buf: &mut Vec<u8>, prev: Self, curr: Self);

    #[doc(hidden)]
    fn take_delta(
        buf: &[u8],
        prev: Self,
        context: &'static str,
    ) -> Result<(Self, usize), DecodeError>;
}

macro_rules! signed_delta {
    ($($ty:ty),*) => {
        $(
            impl DeltaScalar for $ty {
                fn append_delta(buf: &mut Vec<u8>, prev: Self, curr: Self) {
                    append_varint(buf, (curr as i64).wrapping_sub(prev as i64));
                }

                fn take_delta(
                    buf: &[u8],
                    prev: Self,
                    context: &'static str,
                ) -> Result<(Self, usize), DecodeError> {
                    let (diff, used) = take_varint(buf, context)?;
                    let value = (prev as i64).wrapping_add(diff);
                    let value = Self::try_from(value).map_err(|_| DecodeError::Overflow {
                        context,
                        value: value as u64,
                    })?;
                    Ok((value, used))
                }
            }
        )*
    };
}

macro_rules! unsigned_delta {
    ($($ty:ty),*) => {
        $(
            impl DeltaScalar for $ty {
                fn append_delta(buf: &mut Vec<u8>, prev: Self, curr: Self) {
                    append_uvarint(buf, (curr as u64).wrapping_sub(prev as u64));
                }

                fn take_delta(
                    buf: &[u8],
                    prev: Self,
                    context: &'static str,
                ) -> Result<(Self, usize), DecodeError> {
                    let (diff, used) = take_uvarint(buf, context)?;
                    let value = (prev as u64).wrapping_add(diff);
                    let value = Self::try_from(value).map_err(|_| DecodeError::Overflow {
                        context,
                        value,
                    })?;
                    Ok((value, used))
                }
            }
        )*
    };
}

signed_delta!(i16, i32, i64);
unsigned_delta!(u16, u32, u64);

/// Codec for [`Sorted<T>`].
pub(super) struct DeltaCodec<T>(PhantomData<fn() -> T>);

impl<T> DeltaCodec<T> {
    pub(super) const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: DeltaScalar> Codec<Sorted<T>> for DeltaCodec<T> {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &Sorted<T>) -> Result<(), EncodeError> {
        let mut values = value.0.clone();
        values.sort_unstable();

        let mut block = Vec::with_capacity(values.len() + 2);
        let mut prev = T::default();
        for &curr in &values {
            T::append_delta(&mut block, prev, curr);
            prev = curr;
        }

        enc.write_uvarint(block.len() as u64);
        enc.write_bytes(&block);
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut Sorted<T>) -> Result<(), DecodeError> {
        let len = DecodeError::cast_len(dec.read_uvarint("delta block length")?, "delta block length")?;
        let block = dec.read_slice(len, "delta block")?;

        into.0.clear();
        let mut prev = T::default();
        let mut offset = 0;
        while offset < block.len() {
            let (value, used) = T::take_delta(&block[offset..], prev, "delta block")?;
            prev = value;
            into.0.push(value);
            offset += used;
        }
        Ok(())
    }
}
