//! Security limits for decoding untrusted input.

/// Maximum number of bytes a varint may occupy (64 bits, 7 bits per byte).
pub const MAX_VARINT_BYTES: usize = 10;

/// Step size for incremental allocations when reading from a forward-only
/// stream. A declared length never translates into a single allocation
/// larger than this before the bytes have actually arrived.
pub const STREAM_CHUNK: usize = 64 * 1024;

/// Upper bound on speculative element preallocation when the input size is
/// unknown (stream sources).
pub const MAX_STREAM_PREALLOC: usize = 4096;

/// Maximum byte length of a string used as a fixed-width map key.
pub const MAX_KEY_LEN: usize = u16::MAX as usize;

/// Maximum number of entries in a dictionary payload.
pub const MAX_DICT_ENTRIES: usize = u16::MAX as usize;

/// Returns a safe preallocation size for a sequence that claims `count`
/// elements. Every element occupies at least one byte on the wire, so the
/// number of remaining input bytes bounds the usable capacity; for streams
/// the bound falls back to [`MAX_STREAM_PREALLOC`].
pub(crate) fn seq_capacity(count: usize, remaining: Option<usize>) -> usize {
    match remaining {
        Some(rem) => count.min(rem),
        None => count.min(MAX_STREAM_PREALLOC),
    }
}
