//! Codecs for the zero-copy payload types.

use std::marker::PhantomData;

use super::{ByteMap, Bytes, Dictionary, Raw, Str};
use crate::codec::Codec;
use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::error::{DecodeError, EncodeError};
use crate::limits::MAX_DICT_ENTRIES;

// =============================================================================
// BYTES / STR
// =============================================================================

pub(super) struct BytesCodec;

impl Codec<Bytes> for BytesCodec {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &Bytes) -> Result<(), EncodeError> {
        enc.write_uvarint(value.0.len() as u64);
        enc.write_bytes(&value.0);
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut Bytes) -> Result<(), DecodeError> {
        let len = DecodeError::cast_len(dec.read_uvarint("bytes length")?, "bytes length")?;
        if let Some(shared) = dec.try_shared(len) {
            into.0 = shared;
            return Ok(());
        }
        let data = dec.read_slice(len, "bytes")?;
        into.0 = bytes::Bytes::copy_from_slice(&data);
        Ok(())
    }
}

pub(super) struct StrCodec;

impl Codec<Str> for StrCodec {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &Str) -> Result<(), EncodeError> {
        enc.write_uvarint(value.0.len() as u64);
        enc.write_bytes(&value.0);
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut Str) -> Result<(), DecodeError> {
        let len = DecodeError::cast_len(dec.read_uvarint("string length")?, "string length")?;
        if let Some(shared) = dec.try_shared(len) {
            std::str::from_utf8(&shared)
                .map_err(|_| DecodeError::InvalidUtf8 { context: "string" })?;
            into.0 = shared;
            return Ok(());
        }
        let data = dec.read_slice(len, "string")?;
        std::str::from_utf8(&data).map_err(|_| DecodeError::InvalidUtf8 { context: "string" })?;
        into.0 = bytes::Bytes::copy_from_slice(&data);
        Ok(())
    }
}

// =============================================================================
// RAW FIXED-WIDTH SEQUENCES
// =============================================================================

/// Primitive with a fixed little-endian wire width.
pub trait FixedWidth: Copy + Default + 'static {
    /// Byte width of one element.
    const WIDTH: usize;

    #[doc(hidden)]
    fn put_le(self, out: &mut Vec<u8>);

    #[doc(hidden)]
    fn get_le(bytes: &[u8]) -> Self;
}

impl FixedWidth for bool {
    const WIDTH: usize = 1;

    fn put_le(self, out: &mut Vec<u8>) {
        out.push(self as u8);
    }

    fn get_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

macro_rules! fixed_width {
    ($($ty:ty => $width:expr),* $(,)?) => {
        $(
            impl FixedWidth for $ty {
                const WIDTH: usize = $width;

                fn put_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }

                fn get_le(bytes: &[u8]) -> Self {
                    // Callers slice in exact WIDTH chunks, try_into always succeeds
                    Self::from_le_bytes(bytes.try_into().unwrap())
                }
            }
        )*
    };
}

fixed_width! {
    u16 => 2,
    u32 => 4,
    u64 => 8,
    i16 => 2,
    i32 => 4,
    i64 => 8,
    f32 => 4,
    f64 => 8,
}

pub(super) struct RawCodec<T>(PhantomData<fn() -> T>);

impl<T> RawCodec<T> {
    pub(super) const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: FixedWidth> Codec<Raw<T>> for RawCodec<T> {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &Raw<T>) -> Result<(), EncodeError> {
        let mut image = Vec::with_capacity(value.0.len() * T::WIDTH);
        for &elem in &value.0 {
            elem.put_le(&mut image);
        }
        enc.write_u64(image.len() as u64);
        enc.write_bytes(&image);
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut Raw<T>) -> Result<(), DecodeError> {
        let bytes = DecodeError::cast_len(dec.read_u64("raw sequence length")?, "raw sequence length")?;
        if bytes % T::WIDTH != 0 {
            return Err(DecodeError::MalformedEncoding {
                context: "raw sequence length is not a multiple of the element width",
            });
        }
        let image = dec.read_slice(bytes, "raw sequence")?;
        into.0.clear();
        into.0.reserve(bytes / T::WIDTH);
        for chunk in image.chunks_exact(T::WIDTH) {
            into.0.push(T::get_le(chunk));
        }
        Ok(())
    }
}

// =============================================================================
// DICTIONARIES
// =============================================================================

fn write_prefixed(enc: &mut Encoder<'_>, data: &[u8]) {
    enc.write_uvarint(data.len() as u64);
    enc.write_bytes(data);
}

fn read_prefixed_string(
    dec: &mut Decoder<'_>,
    context: &'static str,
) -> Result<String, DecodeError> {
    let len = DecodeError::cast_len(dec.read_uvarint(context)?, context)?;
    let data = dec.read_slice(len, context)?;
    std::str::from_utf8(&data)
        .map(str::to_owned)
        .map_err(|_| DecodeError::InvalidUtf8 { context })
}

pub(super) struct DictionaryCodec;

impl Codec<Dictionary> for DictionaryCodec {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &Dictionary) -> Result<(), EncodeError> {
        if value.0.len() > MAX_DICT_ENTRIES {
            return Err(EncodeError::LengthExceedsLimit {
                field: "dictionary",
                len: value.0.len(),
                max: MAX_DICT_ENTRIES,
            });
        }
        enc.write_u16(value.0.len() as u16);
        for (key, val) in &value.0 {
            write_prefixed(enc, key.as_bytes());
            write_prefixed(enc, val.as_bytes());
        }
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut Dictionary) -> Result<(), DecodeError> {
        let count = dec.read_u16("dictionary length")? as usize;
        into.0.clear();
        for _ in 0..count {
            let key = read_prefixed_string(dec, "dictionary key")?;
            let val = read_prefixed_string(dec, "dictionary value")?;
            into.0.insert(key, val);
        }
        Ok(())
    }
}

pub(super) struct ByteMapCodec;

impl Codec<ByteMap> for ByteMapCodec {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &ByteMap) -> Result<(), EncodeError> {
        if value.0.len() > MAX_DICT_ENTRIES {
            return Err(EncodeError::LengthExceedsLimit {
                field: "byte map",
                len: value.0.len(),
                max: MAX_DICT_ENTRIES,
            });
        }
        enc.write_u16(value.0.len() as u16);
        for (key, val) in &value.0 {
            write_prefixed(enc, key.as_bytes());
            write_prefixed(enc, val);
        }
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut ByteMap) -> Result<(), DecodeError> {
        let count = dec.read_u16("byte map length")? as usize;
        into.0.clear();
        for _ in 0..count {
            let key = read_prefixed_string(dec, "byte map key")?;
            let len = DecodeError::cast_len(dec.read_uvarint("byte map value")?, "byte map value")?;
            let val = dec.read_slice(len, "byte map value")?.into_owned();
            into.0.insert(key, val);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::{ByteMap, Bytes, Dictionary, Raw, Str};
    use crate::{decode, decode_shared, encode};

    #[test]
    fn test_bytes_wire_matches_vec_u8() {
        let v = Bytes::from(b"ABCD".as_slice());
        assert_eq!(encode(&v).unwrap(), encode(&b"ABCD".to_vec()).unwrap());
    }

    #[test]
    fn test_bytes_decode_shared_aliases_input() {
        let payload = Bytes::from(b"ABCD".as_slice());
        let input = bytes::Bytes::from(encode(&payload).unwrap());

        let mut out = Bytes::new();
        decode_shared(input.clone(), &mut out).unwrap();
        assert_eq!(out.as_slice(), b"ABCD");
        // The decoded view points into the input allocation
        assert_eq!(out.as_slice().as_ptr(), input[1..].as_ptr());
    }

    #[test]
    fn test_bytes_decode_from_plain_slice_copies() {
        let payload = Bytes::from(b"ABCD".as_slice());
        let input = encode(&payload).unwrap();

        let mut out = Bytes::new();
        decode(&input, &mut out).unwrap();
        assert_eq!(out.as_slice(), b"ABCD");
        assert_ne!(out.as_slice().as_ptr(), input[1..].as_ptr());
    }

    #[test]
    fn test_str_roundtrip() {
        let v = Str::from("hello");
        let b = encode(&v).unwrap();
        assert_eq!(b, [0x05, 0x68, 0x65, 0x6C, 0x6C, 0x6F]);

        let mut out = Str::new();
        decode(&b, &mut out).unwrap();
        assert_eq!(out.as_str(), "hello");
    }

    #[test]
    fn test_str_rejects_invalid_utf8() {
        use crate::DecodeError;

        let mut out = Str::new();
        let err = decode(&[0x02, 0xFF, 0xFE], &mut out).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidUtf8 { .. }));

        let err = decode_shared(bytes::Bytes::from_static(&[0x02, 0xFF, 0xFE]), &mut out)
            .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidUtf8 { .. }));
    }

    #[test]
    fn test_raw_u32_wire() {
        let v: Raw<u32> = vec![1u32, 2].into();
        assert_eq!(
            encode(&v).unwrap(),
            [
                0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // byte count
                0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, // elements
            ]
        );
    }

    #[test]
    fn test_raw_roundtrip_all_widths() {
        fn roundtrip<T>(values: Vec<T>)
        where
            T: super::FixedWidth + PartialEq + std::fmt::Debug,
        {
            let v: Raw<T> = values.into();
            let b = encode(&v).unwrap();
            let mut out: Raw<T> = Raw::new();
            decode(&b, &mut out).unwrap();
            assert_eq!(out.0, v.0);
        }

        roundtrip(vec![true, false, true]);
        roundtrip(vec![1u16, 2, 3]);
        roundtrip(vec![1u32, 2, 3]);
        roundtrip(vec![1u64, 2, 3]);
        roundtrip(vec![-1i16, 2, -3]);
        roundtrip(vec![-1i32, 2, -3]);
        roundtrip(vec![-1i64, 2, -3]);
        roundtrip(vec![4.5f32, 5.01, 6.61]);
        roundtrip(vec![4.5f64, 5.01, 6.61]);
    }

    #[test]
    fn test_raw_rejects_ragged_length() {
        use crate::DecodeError;

        // Claims 5 bytes for u32 elements
        let mut input = vec![0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        input.extend_from_slice(&[0u8; 5]);

        let mut out: Raw<u32> = Raw::new();
        let err = decode(&input, &mut out).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedEncoding { .. }));
    }

    #[test]
    fn test_dictionary_wire() {
        let mut v = Dictionary::new();
        v.0.insert("key".to_string(), "value".to_string());

        let b = encode(&v).unwrap();
        assert_eq!(
            b,
            [0x01, 0x00, 0x03, 0x6B, 0x65, 0x79, 0x05, 0x76, 0x61, 0x6C, 0x75, 0x65]
        );

        let mut out = Dictionary::new();
        decode(&b, &mut out).unwrap();
        assert_eq!(v, out);
    }

    #[test]
    fn test_byte_map_roundtrip() {
        let mut v = ByteMap::new();
        v.0.insert("blob".to_string(), vec![1, 2, 3]);
        v.0.insert("empty".to_string(), vec![]);

        let b = encode(&v).unwrap();
        let mut out = ByteMap::new();
        decode(&b, &mut out).unwrap();
        assert_eq!(v, out);
    }
}
