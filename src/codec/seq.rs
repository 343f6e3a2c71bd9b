//! Array, sequence, optional and box codecs.
//!
//! Variable sequences carry a uvarint element count; fixed arrays carry no
//! length at all (it lives in the descriptor). Homogeneous scalar
//! sequences take packed fast paths that avoid per-element dispatch.

use std::marker::PhantomData;
use std::sync::Arc;

use super::leaf::{IntScalar, UintScalar};
use super::{Builder, Codec, Encodable};
use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::error::{BuildError, DecodeError, EncodeError};
use crate::limits::seq_capacity;

// =============================================================================
// FIXED ARRAYS
// =============================================================================

/// Codec for `[T; N]`: elements back-to-back, no length prefix.
pub struct ArrayCodec<T, const N: usize> {
    elem: Arc<dyn Codec<T>>,
}

impl<T: 'static, const N: usize> Codec<[T; N]> for ArrayCodec<T, N> {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &[T; N]) -> Result<(), EncodeError> {
        for elem in value {
            self.elem.encode_to(enc, elem)?;
        }
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut [T; N]) -> Result<(), DecodeError> {
        for elem in into.iter_mut() {
            self.elem.decode_to(dec, elem)?;
        }
        Ok(())
    }
}

impl<T: Encodable, const N: usize> Encodable for [T; N] {
    fn codec(builder: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError> {
        Ok(Arc::new(ArrayCodec::<T, N> {
            elem: builder.resolve::<T>()?,
        }))
    }
}

// =============================================================================
// VARIABLE SEQUENCES
// =============================================================================

/// Generic codec for `Vec<T>`: uvarint count, then each element.
pub struct SliceCodec<T> {
    elem: Arc<dyn Codec<T>>,
}

impl<T> SliceCodec<T> {
    pub(crate) fn new(elem: Arc<dyn Codec<T>>) -> Self {
        Self { elem }
    }
}

impl<T: Default + 'static> Codec<Vec<T>> for SliceCodec<T> {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &Vec<T>) -> Result<(), EncodeError> {
        enc.write_uvarint(value.len() as u64);
        for elem in value {
            self.elem.encode_to(enc, elem)?;
        }
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut Vec<T>) -> Result<(), DecodeError> {
        let count =
            DecodeError::cast_len(dec.read_uvarint("sequence length")?, "sequence length")?;
        into.clear();
        into.reserve(seq_capacity(count, dec.remaining()));
        for _ in 0..count {
            let mut elem = T::default();
            self.elem.decode_to(dec, &mut elem)?;
            into.push(elem);
        }
        Ok(())
    }
}

/// Fast path for `Vec<u8>`: uvarint count, then the raw bytes in one write.
pub struct ByteSliceCodec;

impl Codec<Vec<u8>> for ByteSliceCodec {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &Vec<u8>) -> Result<(), EncodeError> {
        enc.write_uvarint(value.len() as u64);
        enc.write_bytes(value);
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut Vec<u8>) -> Result<(), DecodeError> {
        let count =
            DecodeError::cast_len(dec.read_uvarint("byte sequence length")?, "byte sequence length")?;
        let data = dec.read_slice(count, "byte sequence")?;
        into.clear();
        into.extend_from_slice(&data);
        Ok(())
    }
}

/// Fast path for `Vec<bool>`: uvarint count, then one byte per element.
pub struct BoolSliceCodec;

impl Codec<Vec<bool>> for BoolSliceCodec {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &Vec<bool>) -> Result<(), EncodeError> {
        enc.write_uvarint(value.len() as u64);
        for &flag in value {
            enc.write_bool(flag);
        }
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut Vec<bool>) -> Result<(), DecodeError> {
        let count =
            DecodeError::cast_len(dec.read_uvarint("bool sequence length")?, "bool sequence length")?;
        let data = dec.read_slice(count, "bool sequence")?;
        into.clear();
        into.reserve(count);
        for &byte in data.iter() {
            into.push(byte != 0);
        }
        Ok(())
    }
}

/// Fast path for sequences of unsigned integers: uvarint count, then one
/// uvarint per element.
pub struct PackedUintCodec<T>(PhantomData<fn() -> T>);

impl<T> PackedUintCodec<T> {
    pub(crate) const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: UintScalar> Codec<Vec<T>> for PackedUintCodec<T> {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &Vec<T>) -> Result<(), EncodeError> {
        enc.write_uvarint(value.len() as u64);
        for &elem in value {
            enc.write_uvarint(elem.into_u64());
        }
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut Vec<T>) -> Result<(), DecodeError> {
        let count =
            DecodeError::cast_len(dec.read_uvarint("uint sequence length")?, "uint sequence length")?;
        into.clear();
        into.reserve(seq_capacity(count, dec.remaining()));
        for _ in 0..count {
            let raw = dec.read_uvarint("uint sequence")?;
            into.push(T::from_u64(raw).ok_or(DecodeError::Overflow {
                context: "uint sequence",
                value: raw,
            })?);
        }
        Ok(())
    }
}

/// Fast path for sequences of signed integers: uvarint count, then one
/// zig-zag varint per element.
pub struct PackedIntCodec<T>(PhantomData<fn() -> T>);

impl<T> PackedIntCodec<T> {
    pub(crate) const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: IntScalar> Codec<Vec<T>> for PackedIntCodec<T> {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &Vec<T>) -> Result<(), EncodeError> {
        enc.write_uvarint(value.len() as u64);
        for &elem in value {
            enc.write_varint(elem.into_i64());
        }
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut Vec<T>) -> Result<(), DecodeError> {
        let count =
            DecodeError::cast_len(dec.read_uvarint("int sequence length")?, "int sequence length")?;
        into.clear();
        into.reserve(seq_capacity(count, dec.remaining()));
        for _ in 0..count {
            let raw = dec.read_varint("int sequence")?;
            into.push(T::from_i64(raw).ok_or(DecodeError::Overflow {
                context: "int sequence",
                value: raw as u64,
            })?);
        }
        Ok(())
    }
}

impl<T: Encodable + Default> Encodable for Vec<T> {
    fn codec(builder: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError> {
        T::sequence_codec(builder)
    }
}

// =============================================================================
// OPTIONALS AND BOXES
// =============================================================================

/// Codec for `Option<T>`: one presence byte, then the value when present.
///
/// An absent value leaves nothing else on the wire; decode writes the
/// default destination without consuming further bytes.
pub struct OptionCodec<T> {
    inner: Arc<dyn Codec<T>>,
}

impl<T: Default + 'static> Codec<Option<T>> for OptionCodec<T> {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &Option<T>) -> Result<(), EncodeError> {
        match value {
            Some(inner) => {
                enc.write_bool(true);
                self.inner.encode_to(enc, inner)
            }
            None => {
                enc.write_bool(false);
                Ok(())
            }
        }
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut Option<T>) -> Result<(), DecodeError> {
        if dec.read_byte("optional")? == 0 {
            *into = None;
            return Ok(());
        }
        self.inner.decode_to(dec, into.get_or_insert_with(T::default))
    }
}

impl<T: Encodable + Default> Encodable for Option<T> {
    fn codec(builder: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError> {
        Ok(Arc::new(OptionCodec {
            inner: builder.resolve::<T>()?,
        }))
    }
}

/// Codec for `Box<T>`: transparent indirection, identical wire form to `T`.
pub struct BoxCodec<T> {
    inner: Arc<dyn Codec<T>>,
}

impl<T: 'static> Codec<Box<T>> for BoxCodec<T> {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &Box<T>) -> Result<(), EncodeError> {
        self.inner.encode_to(enc, &**value)
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut Box<T>) -> Result<(), DecodeError> {
        self.inner.decode_to(dec, &mut **into)
    }
}

impl<T: Encodable> Encodable for Box<T> {
    fn codec(builder: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError> {
        Ok(Arc::new(BoxCodec {
            inner: builder.resolve::<T>()?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::{decode, encode, DecodeError};

    #[test]
    fn test_empty_sequence_is_one_zero_byte() {
        let v: Vec<u8> = Vec::new();
        assert_eq!(encode(&v).unwrap(), [0x00]);

        let mut out = vec![1u8, 2, 3];
        decode(&[0x00], &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_byte_sequence_wire() {
        let v = b"hi".to_vec();
        assert_eq!(encode(&v).unwrap(), [0x02, 0x68, 0x69]);
    }

    #[test]
    fn test_uint_sequence_wire() {
        let v: Vec<u32> = vec![1, 2, 3];
        assert_eq!(encode(&v).unwrap(), [0x03, 0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_int_sequence_wire() {
        let v: Vec<i32> = vec![1, -1];
        assert_eq!(encode(&v).unwrap(), [0x02, 0x02, 0x01]);
    }

    #[test]
    fn test_bool_sequence_roundtrip() {
        let v = vec![true, false, true, true, false, false];
        let b = encode(&v).unwrap();
        assert_eq!(b[0], 6);
        assert_eq!(b.len(), 7);

        let mut out = Vec::new();
        decode(&b, &mut out).unwrap();
        assert_eq!(v, out);
    }

    #[test]
    fn test_array_has_no_length_prefix() {
        let v: [u16; 3] = [1, 2, 3];
        assert_eq!(encode(&v).unwrap(), [0x01, 0x02, 0x03]);

        let mut out = [0u16; 3];
        decode(&[0x01, 0x02, 0x03], &mut out).unwrap();
        assert_eq!(out, v);
    }

    #[test]
    fn test_nested_sequences() {
        let v: Vec<Vec<u32>> = vec![vec![1], vec![], vec![2, 3]];
        let b = encode(&v).unwrap();

        let mut out: Vec<Vec<u32>> = Vec::new();
        decode(&b, &mut out).unwrap();
        assert_eq!(v, out);
    }

    #[test]
    fn test_string_sequence_roundtrip() {
        let v = vec!["Bobby".to_string(), "Robert".to_string()];
        let b = encode(&v).unwrap();
        assert_eq!(
            b,
            [0x02, 0x05, 0x42, 0x6F, 0x62, 0x62, 0x79, 0x06, 0x52, 0x6F, 0x62, 0x65, 0x72, 0x74]
        );

        let mut out: Vec<String> = Vec::new();
        decode(&b, &mut out).unwrap();
        assert_eq!(v, out);
    }

    #[test]
    fn test_count_exceeding_input_fails_cleanly() {
        // Claims 255 elements but provides none
        let mut out: Vec<u32> = Vec::new();
        let err = decode(&[0xFF, 0x01], &mut out).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_absent_optional() {
        let v: Option<u64> = None;
        assert_eq!(encode(&v).unwrap(), [0x00]);

        let mut out = Some(7u64);
        decode(&[0x00], &mut out).unwrap();
        assert_eq!(out, None);
    }

    #[test]
    fn test_present_optional() {
        let v = Some(300u64);
        assert_eq!(encode(&v).unwrap(), [0x01, 0xAC, 0x02]);

        let mut out: Option<u64> = None;
        decode(&[0x01, 0xAC, 0x02], &mut out).unwrap();
        assert_eq!(out, Some(300));
    }

    #[test]
    fn test_nested_optionals_layer_presence_bytes() {
        let v: Option<Option<u8>> = Some(Some(5));
        assert_eq!(encode(&v).unwrap(), [0x01, 0x01, 0x05]);

        let v: Option<Option<u8>> = Some(None);
        assert_eq!(encode(&v).unwrap(), [0x01, 0x00]);

        let mut out: Option<Option<u8>> = None;
        decode(&[0x01, 0x00], &mut out).unwrap();
        assert_eq!(out, Some(None));
    }

    #[test]
    fn test_box_is_transparent_on_the_wire() {
        let boxed: Box<i64> = Box::new(32);
        assert_eq!(encode(&boxed).unwrap(), [0x40]);
        assert_eq!(encode(&32i64).unwrap(), [0x40]);
    }

    #[test]
    fn test_sequence_of_optionals() {
        let v: Vec<Option<u8>> = vec![Some(1), None, Some(3)];
        let b = encode(&v).unwrap();
        assert_eq!(b, [0x03, 0x01, 0x01, 0x00, 0x01, 0x03]);

        let mut out: Vec<Option<u8>> = Vec::new();
        decode(&b, &mut out).unwrap();
        assert_eq!(v, out);
    }
}
