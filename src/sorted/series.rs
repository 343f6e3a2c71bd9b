//! Byte-aligned compressed time series.
//!
//! Timestamps are delta-encoded; values are either XOR-delta-encoded
//! float bits ([`TimeSeries`]) or plain deltas ([`TimeCounters`]). Both
//! layouts pack everything into a single length-prefixed block:
//!
//! ```text
//! uvarint pair-count | uvarint block-bytes | block
//! block = count timestamp-deltas ++ count value-deltas
//! ```
//!
//! Consider running a general-purpose compressor over the output when
//! storing large series; the byte-aligned encoding leaves some entropy on
//! the table in exchange for cheap decoding.

use crate::codec::custom::WithCodec;
use crate::codec::Codec;
use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::error::{DecodeError, EncodeError};
use crate::limits::seq_capacity;
use crate::wire::{append_uvarint, take_uvarint};

/// Compressed time series of f64 samples.
///
/// Values are reduced to f32 before encoding: the wire carries the
/// bit-reversed IEEE-754 bits of the 32-bit value, XOR-ed against the
/// previous sample. The reduction is intentional and lossy for values that
/// need the wider exponent or mantissa.
///
/// Samples are kept as parallel columns and stay in lockstep through
/// [`TimeSeries::push`]. Encoding sorts by timestamp when the series was
/// appended out of order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    time: Vec<u64>,
    data: Vec<f64>,
}

impl TimeSeries {
    /// Creates an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sample.
    pub fn push(&mut self, time: u64, value: f64) {
        self.time.push(time);
        self.data.push(value);
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Timestamp column.
    pub fn times(&self) -> &[u64] {
        &self.time
    }

    /// Value column.
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Iterates `(timestamp, value)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, f64)> + '_ {
        self.time.iter().copied().zip(self.data.iter().copied())
    }
}

impl FromIterator<(u64, f64)> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = (u64, f64)>>(iter: I) -> Self {
        let mut series = Self::new();
        for (time, value) in iter {
            series.push(time, value);
        }
        series
    }
}

crate::custom_codec!(TimeSeries);

impl WithCodec for TimeSeries {
    fn binary_codec() -> std::sync::Arc<dyn Codec<Self>> {
        std::sync::Arc::new(TszCodec)
    }
}

/// Compressed time series of u64 counters.
///
/// Same layout as [`TimeSeries`] but the value column uses plain delta
/// encoding, which suits monotonic counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeCounters {
    time: Vec<u64>,
    data: Vec<u64>,
}

impl TimeCounters {
    /// Creates an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sample.
    pub fn push(&mut self, time: u64, value: u64) {
        self.time.push(time);
        self.data.push(value);
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Timestamp column.
    pub fn times(&self) -> &[u64] {
        &self.time
    }

    /// Value column.
    pub fn values(&self) -> &[u64] {
        &self.data
    }

    /// Iterates `(timestamp, value)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.time.iter().copied().zip(self.data.iter().copied())
    }
}

impl FromIterator<(u64, u64)> for TimeCounters {
    fn from_iter<I: IntoIterator<Item = (u64, u64)>>(iter: I) -> Self {
        let mut series = Self::new();
        for (time, value) in iter {
            series.push(time, value);
        }
        series
    }
}

crate::custom_codec!(TimeCounters);

impl WithCodec for TimeCounters {
    fn binary_codec() -> std::sync::Arc<dyn Codec<Self>> {
        std::sync::Arc::new(TczCodec)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Returns the permutation that sorts `time` ascending, or `None` when it
/// already is sorted.
fn sort_order(time: &[u64]) -> Option<Vec<usize>> {
    if time.windows(2).all(|pair| pair[0] <= pair[1]) {
        return None;
    }
    let mut order: Vec<usize> = (0..time.len()).collect();
    order.sort_by_key(|&i| time[i]);
    Some(order)
}

/// Appends the running deltas of `values` to the block.
fn append_deltas(block: &mut Vec<u8>, values: impl Iterator<Item = u64>) {
    let mut prev = 0u64;
    for value in values {
        append_uvarint(block, value.wrapping_sub(prev));
        prev = value;
    }
}

/// Reads `count` running-sum deltas from the block, returning the bytes
/// consumed.
fn read_deltas(
    block: &[u8],
    count: usize,
    out: &mut Vec<u64>,
    context: &'static str,
) -> Result<usize, DecodeError> {
    let mut prev = 0u64;
    let mut offset = 0;
    for _ in 0..count {
        let (diff, used) = take_uvarint(&block[offset..], context)?;
        prev = prev.wrapping_add(diff);
        out.push(prev);
        offset += used;
    }
    Ok(offset)
}

/// Bit-reversed f32 image of a sample, as carried on the wire.
#[inline]
fn value_bits(value: f64) -> u64 {
    ((value as f32).to_bits().reverse_bits()) as u64
}

// =============================================================================
// CODECS
// =============================================================================

struct TszCodec;

impl Codec<TimeSeries> for TszCodec {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &TimeSeries) -> Result<(), EncodeError> {
        let count = value.len();
        let order = sort_order(&value.time);
        let at = |i: usize| match &order {
            Some(order) => order[i],
            None => i,
        };

        let mut block = Vec::with_capacity(4 * count);
        append_deltas(&mut block, (0..count).map(|i| value.time[at(i)]));

        let mut prev = 0u64;
        for i in 0..count {
            let curr = value_bits(value.data[at(i)]);
            append_uvarint(&mut block, curr ^ prev);
            prev = curr;
        }

        enc.write_uvarint(count as u64);
        enc.write_uvarint(block.len() as u64);
        enc.write_bytes(&block);
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut TimeSeries) -> Result<(), DecodeError> {
        let count = DecodeError::cast_len(dec.read_uvarint("time series length")?, "time series length")?;
        let size = DecodeError::cast_len(dec.read_uvarint("time series block")?, "time series block")?;
        let block = dec.read_slice(size, "time series block")?;

        let mut time = Vec::with_capacity(seq_capacity(count, Some(size)));
        let mut offset = read_deltas(&block, count, &mut time, "time series block")?;

        let mut data = Vec::with_capacity(time.len());
        let mut prev = 0u64;
        for _ in 0..count {
            let (diff, used) = take_uvarint(&block[offset..], "time series block")?;
            prev ^= diff;
            data.push(f32::from_bits((prev as u32).reverse_bits()) as f64);
            offset += used;
        }

        *into = TimeSeries { time, data };
        Ok(())
    }
}

struct TczCodec;

impl Codec<TimeCounters> for TczCodec {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &TimeCounters) -> Result<(), EncodeError> {
        let count = value.len();
        let order = sort_order(&value.time);
        let at = |i: usize| match &order {
            Some(order) => order[i],
            None => i,
        };

        let mut block = Vec::with_capacity(4 * count);
        append_deltas(&mut block, (0..count).map(|i| value.time[at(i)]));
        append_deltas(&mut block, (0..count).map(|i| value.data[at(i)]));

        enc.write_uvarint(count as u64);
        enc.write_uvarint(block.len() as u64);
        enc.write_bytes(&block);
        Ok(())
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut TimeCounters) -> Result<(), DecodeError> {
        let count = DecodeError::cast_len(dec.read_uvarint("time counters length")?, "time counters length")?;
        let size = DecodeError::cast_len(dec.read_uvarint("time counters block")?, "time counters block")?;
        let block = dec.read_slice(size, "time counters block")?;

        let mut time = Vec::with_capacity(seq_capacity(count, Some(size)));
        let offset = read_deltas(&block, count, &mut time, "time counters block")?;

        let mut data = Vec::with_capacity(time.len());
        read_deltas(&block[offset..], count, &mut data, "time counters block")?;

        *into = TimeCounters { time, data };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode, encode};

    fn make_series(count: usize) -> TimeSeries {
        let mut series = TimeSeries::new();
        for i in (0..count).rev() {
            series.push(1_500_000_000 + i as u64, i as f64);
        }
        series
    }

    fn make_counters(count: usize) -> TimeCounters {
        let mut series = TimeCounters::new();
        for i in (0..count).rev() {
            series.push(1_500_000_000 + i as u64, i as u64);
        }
        series
    }

    #[test]
    fn test_series_roundtrip_sorts_by_timestamp() {
        let series = make_series(100);
        let b = encode(&series).unwrap();

        let mut out = TimeSeries::new();
        decode(&b, &mut out).unwrap();

        assert_eq!(out.len(), 100);
        assert!(out.times().windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(out.times()[0], 1_500_000_000);
        assert_eq!(out.values()[0], 0.0);
        assert_eq!(out.values()[99], 99.0);
    }

    #[test]
    fn test_series_compresses_clustered_samples() {
        let series = make_series(100);
        let b = encode(&series).unwrap();
        // 100 pairs of (u64, f64) would be 1600 bytes raw
        assert!(b.len() < 400, "got {} bytes", b.len());
    }

    #[test]
    fn test_series_f32_reduction_is_lossy() {
        let mut series = TimeSeries::new();
        series.push(1, 0.1);

        let b = encode(&series).unwrap();
        let mut out = TimeSeries::new();
        decode(&b, &mut out).unwrap();

        assert_eq!(out.values()[0], 0.1f32 as f64);
        assert_ne!(out.values()[0], 0.1f64);
    }

    #[test]
    fn test_counters_roundtrip() {
        let series = make_counters(100);
        let b = encode(&series).unwrap();

        let mut out = TimeCounters::new();
        decode(&b, &mut out).unwrap();

        assert_eq!(out.len(), 100);
        let expect: TimeCounters = (0..100).map(|i| (1_500_000_000 + i, i)).collect();
        assert_eq!(out, expect);
    }

    #[test]
    fn test_empty_series() {
        let series = TimeSeries::new();
        assert_eq!(encode(&series).unwrap(), [0x00, 0x00]);

        let mut out = TimeSeries::new();
        decode(&[0x00, 0x00], &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_truncated_block_fails() {
        use crate::DecodeError;

        let series = make_counters(10);
        let b = encode(&series).unwrap();

        let mut out = TimeCounters::new();
        let err = decode(&b[..b.len() - 1], &mut out).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_already_sorted_needs_no_permutation() {
        let sorted: TimeSeries = (0..10).map(|i| (i, i as f64)).collect();
        let shuffled: TimeSeries = (0..10).rev().map(|i| (i, i as f64)).collect();
        assert_eq!(encode(&sorted).unwrap(), encode(&shuffled).unwrap());
    }
}
