//! Mapping codecs.
//!
//! Wire form: uvarint pair count, then each `(key, value)` back-to-back.
//! The encoder iterates the source exactly once and does not depend on
//! iteration order; the decoder inserts into a cleared destination.
//!
//! Keys of width 16/32/64 and short strings take a fixed-width fast path:
//! the integer is written as a little-endian 2/4/8-byte value, a string as
//! a 2-byte length followed by its raw bytes. Every other key shape
//! recurses into the generic codec.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{Builder, Codec, Encodable};
use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::error::{BuildError, DecodeError, EncodeError};
use crate::limits::{seq_capacity, MAX_KEY_LEN};

// =============================================================================
// FIXED-WIDTH KEYS
// =============================================================================

/// Integer key written in its fixed little-endian width instead of as a
/// varint.
pub(crate) trait FixedKey: Copy + Default + 'static {
    fn write_key(self, enc: &mut Encoder<'_>);
    fn read_key(dec: &mut Decoder<'_>) -> Result<Self, DecodeError>;
}

impl FixedKey for u16 {
    fn write_key(self, enc: &mut Encoder<'_>) {
        enc.write_u16(self);
    }

    fn read_key(dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        dec.read_u16("map key")
    }
}

impl FixedKey for u32 {
    fn write_key(self, enc: &mut Encoder<'_>) {
        enc.write_u32(self);
    }

    fn read_key(dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        dec.read_u32("map key")
    }
}

impl FixedKey for u64 {
    fn write_key(self, enc: &mut Encoder<'_>) {
        enc.write_u64(self);
    }

    fn read_key(dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        dec.read_u64("map key")
    }
}

impl FixedKey for i16 {
    fn write_key(self, enc: &mut Encoder<'_>) {
        enc.write_u16(self as u16);
    }

    fn read_key(dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        Ok(dec.read_u16("map key")? as i16)
    }
}

impl FixedKey for i32 {
    fn write_key(self, enc: &mut Encoder<'_>) {
        enc.write_u32(self as u32);
    }

    fn read_key(dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        Ok(dec.read_u32("map key")? as i32)
    }
}

impl FixedKey for i64 {
    fn write_key(self, enc: &mut Encoder<'_>) {
        enc.write_u64(self as u64);
    }

    fn read_key(dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        Ok(dec.read_u64("map key")? as i64)
    }
}

/// Codec for fixed-width integer map keys.
pub struct FixedKeyCodec<T>(PhantomData<fn() -> T>);

impl<T> FixedKeyCodec<T> {
    pub(crate) const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: FixedKey> Codec<T> for FixedKeyCodec<T> {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &T) -> Result<(), EncodeError> {
        value.write_key(enc);
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut T) -> Result<(), DecodeError> {
        *into = T::read_key(dec)?;
        Ok(())
    }
}

/// Codec for string map keys: 2-byte little-endian length, then raw bytes.
///
/// Keys longer than 65535 bytes fail the encode; silently truncating the
/// length would corrupt the stream.
pub struct StringKeyCodec;

impl Codec<String> for StringKeyCodec {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &String) -> Result<(), EncodeError> {
        if value.len() > MAX_KEY_LEN {
            return Err(EncodeError::LengthExceedsLimit {
                field: "map key",
                len: value.len(),
                max: MAX_KEY_LEN,
            });
        }
        enc.write_u16(value.len() as u16);
        enc.write_bytes(value.as_bytes());
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut String) -> Result<(), DecodeError> {
        let len = dec.read_u16("map key length")? as usize;
        let data = dec.read_slice(len, "map key")?;
        let text = std::str::from_utf8(&data)
            .map_err(|_| DecodeError::InvalidUtf8 { context: "map key" })?;
        into.clear();
        into.push_str(text);
        Ok(())
    }
}

// =============================================================================
// MAP CODECS
// =============================================================================

/// Codec for `HashMap<K, V>`.
pub struct HashMapCodec<K, V> {
    key: Arc<dyn Codec<K>>,
    value: Arc<dyn Codec<V>>,
}

impl<K, V> Codec<HashMap<K, V>> for HashMapCodec<K, V>
where
    K: Eq + Hash + Default + 'static,
    V: Default + 'static,
{
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &HashMap<K, V>) -> Result<(), EncodeError> {
        enc.write_uvarint(value.len() as u64);
        for (k, v) in value {
            self.key.encode_to(enc, k)?;
            self.value.encode_to(enc, v)?;
        }
        Ok(())
    }

    fn decode_to(
        &self,
        dec: &mut Decoder<'_>,
        into: &mut HashMap<K, V>,
    ) -> Result<(), DecodeError> {
        let count = DecodeError::cast_len(dec.read_uvarint("map length")?, "map length")?;
        into.clear();
        into.reserve(seq_capacity(count, dec.remaining()));
        for _ in 0..count {
            let mut k = K::default();
            self.key.decode_to(dec, &mut k)?;
            let mut v = V::default();
            self.value.decode_to(dec, &mut v)?;
            into.insert(k, v);
        }
        Ok(())
    }
}

impl<K, V> Encodable for HashMap<K, V>
where
    K: Encodable + Eq + Hash + Default,
    V: Encodable + Default,
{
    fn codec(builder: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError> {
        Ok(Arc::new(HashMapCodec {
            key: K::map_key_codec(builder)?,
            value: builder.resolve::<V>()?,
        }))
    }
}

/// Codec for `BTreeMap<K, V>`. Same wire form as [`HashMapCodec`].
pub struct BTreeMapCodec<K, V> {
    key: Arc<dyn Codec<K>>,
    value: Arc<dyn Codec<V>>,
}

impl<K, V> Codec<BTreeMap<K, V>> for BTreeMapCodec<K, V>
where
    K: Ord + Default + 'static,
    V: Default + 'static,
{
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &BTreeMap<K, V>) -> Result<(), EncodeError> {
        enc.write_uvarint(value.len() as u64);
        for (k, v) in value {
            self.key.encode_to(enc, k)?;
            self.value.encode_to(enc, v)?;
        }
        Ok(())
    }

    fn decode_to(
        &self,
        dec: &mut Decoder<'_>,
        into: &mut BTreeMap<K, V>,
    ) -> Result<(), DecodeError> {
        let count = DecodeError::cast_len(dec.read_uvarint("map length")?, "map length")?;
        into.clear();
        for _ in 0..count {
            let mut k = K::default();
            self.key.decode_to(dec, &mut k)?;
            let mut v = V::default();
            self.value.decode_to(dec, &mut v)?;
            into.insert(k, v);
        }
        Ok(())
    }
}

impl<K, V> Encodable for BTreeMap<K, V>
where
    K: Encodable + Ord + Default,
    V: Encodable + Default,
{
    fn codec(builder: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError> {
        Ok(Arc::new(BTreeMapCodec {
            key: K::map_key_codec(builder)?,
            value: builder.resolve::<V>()?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use crate::{decode, encode, EncodeError};

    #[test]
    fn test_string_key_fast_path_wire() {
        let mut v = HashMap::new();
        v.insert("key".to_string(), "value".to_string());

        let b = encode(&v).unwrap();
        assert_eq!(
            b,
            [0x01, 0x03, 0x00, 0x6B, 0x65, 0x79, 0x05, 0x76, 0x61, 0x6C, 0x75, 0x65]
        );

        let mut out: HashMap<String, String> = HashMap::new();
        decode(&b, &mut out).unwrap();
        assert_eq!(v, out);
    }

    #[test]
    fn test_u32_key_fast_path_wire() {
        let mut v = HashMap::new();
        v.insert(7u32, 1u8);

        let b = encode(&v).unwrap();
        assert_eq!(b, [0x01, 0x07, 0x00, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn test_i64_key_roundtrip() {
        let mut v = HashMap::new();
        v.insert(-5i64, "neg".to_string());
        v.insert(5i64, "pos".to_string());

        let b = encode(&v).unwrap();
        let mut out: HashMap<i64, String> = HashMap::new();
        decode(&b, &mut out).unwrap();
        assert_eq!(v, out);
    }

    #[test]
    fn test_generic_key_path() {
        // u8 keys have no fixed-width fast path and go through the varint codec
        let mut v = HashMap::new();
        v.insert(200u8, 1u8);

        let b = encode(&v).unwrap();
        assert_eq!(b, [0x01, 0xC8, 0x01, 0x01]);

        let mut out: HashMap<u8, u8> = HashMap::new();
        decode(&b, &mut out).unwrap();
        assert_eq!(v, out);
    }

    #[test]
    fn test_empty_map() {
        let v: HashMap<String, String> = HashMap::new();
        assert_eq!(encode(&v).unwrap(), [0x00]);
    }

    #[test]
    fn test_oversized_string_key_fails() {
        let mut v = HashMap::new();
        v.insert("k".repeat(70_000), 1u8);

        let err = encode(&v).unwrap_err();
        assert!(matches!(err, EncodeError::LengthExceedsLimit { .. }));
    }

    #[test]
    fn test_btree_map_roundtrip() {
        let mut v = BTreeMap::new();
        v.insert("a".to_string(), vec![1u32, 2]);
        v.insert("b".to_string(), vec![]);

        let b = encode(&v).unwrap();
        let mut out: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        decode(&b, &mut out).unwrap();
        assert_eq!(v, out);
    }

    #[test]
    fn test_multi_entry_roundtrip() {
        let mut v = HashMap::new();
        for i in 0..20u64 {
            v.insert(i, i * i);
        }

        let b = encode(&v).unwrap();
        let mut out: HashMap<u64, u64> = HashMap::new();
        decode(&b, &mut out).unwrap();
        assert_eq!(v, out);
    }
}
