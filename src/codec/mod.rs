//! Codec graph construction and the process-wide codec cache.
//!
//! A codec tree has one node per structural position of a type. Trees are
//! built once per type, memoized by type identity and immutable after
//! publication. Concurrent builders may race on the same type: the first
//! published result wins and the others are discarded, which is harmless
//! because equal shapes build equal codecs.

pub mod custom;
pub mod leaf;
pub mod map;
pub mod seq;

mod aggregate;

use std::any::{Any, TypeId};
use std::collections::hash_map::Entry;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use rustc_hash::FxHashMap;

use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::error::{BuildError, DecodeError, EncodeError};
use crate::schema::{Schema, Shape};

/// A single-position codec: knows how to encode and decode one type.
///
/// Codecs are immutable once published and safe to share across threads;
/// the encoder/decoder handles they operate on are not.
pub trait Codec<T>: Send + Sync + 'static {
    /// Encodes a value into the encoder.
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &T) -> Result<(), EncodeError>;

    /// Decodes from the decoder into a destination value.
    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut T) -> Result<(), DecodeError>;
}

/// Types with a codec derivable from their structure.
///
/// Scalars, strings, arrays, `Vec`, `Option`, `Box` and maps are covered
/// out of the box; aggregates come from the [`schema!`](crate::schema!)
/// macro and user overrides from [`custom`].
pub trait Encodable: Schema + Sized + 'static {
    /// Builds the codec tree for this type, resolving children through the
    /// builder so shared and recursive positions are handled once.
    fn codec(builder: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError>;

    /// Codec used for `Vec<Self>`. Scalar element types override this with
    /// packed fast paths; everything else gets the generic
    /// count-then-elements layout.
    fn sequence_codec(builder: &mut Builder) -> Result<Arc<dyn Codec<Vec<Self>>>, BuildError>
    where
        Self: Default,
    {
        Ok(Arc::new(seq::SliceCodec::new(builder.resolve::<Self>()?)))
    }

    /// Codec used when `Self` is a map key. Fixed-width integer and string
    /// keys override this; everything else recurses into the generic codec.
    fn map_key_codec(builder: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError> {
        builder.resolve::<Self>()
    }
}

/// Returns the cached codec for `T`, building it on first use.
pub fn codec_of<T: Encodable>() -> Result<Arc<dyn Codec<T>>, BuildError> {
    match cache_get::<T>() {
        Some(codec) => Ok(codec),
        None => Builder::new().resolve::<T>(),
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Resolves codecs during one construction pass.
///
/// The builder tracks the types currently being built; a type that reaches
/// itself again (directly or through a field) receives a placeholder that
/// forwards to the finished codec, so recursive shapes terminate.
pub struct Builder {
    pending: FxHashMap<TypeId, Box<dyn Any>>,
    staged: Vec<Box<dyn FnOnce()>>,
}

impl Builder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            pending: FxHashMap::default(),
            staged: Vec::new(),
        }
    }

    /// Returns the codec for `T`, building and caching it if needed.
    pub fn resolve<T: Encodable>(&mut self) -> Result<Arc<dyn Codec<T>>, BuildError> {
        if let Some(codec) = cache_get::<T>() {
            return Ok(codec);
        }

        let id = TypeId::of::<T>();
        if let Some(entry) = self.pending.get(&id) {
            // An entry under this TypeId always holds the matching forwarder.
            let forward = entry
                .downcast_ref::<Arc<ForwardCodec<T>>>()
                .expect("pending entry holds the forwarder for its own type")
                .clone();
            return Ok(forward);
        }

        if matches!(T::descriptor().shape(), Shape::Opaque) {
            return Err(BuildError::UnsupportedType {
                name: T::descriptor().name(),
            });
        }

        let forward: Arc<ForwardCodec<T>> = Arc::new(ForwardCodec::new());
        self.pending.insert(id, Box::new(forward.clone()));
        let built = T::codec(self);
        self.pending.remove(&id);

        let codec = match built {
            Ok(codec) => codec,
            Err(err) => {
                self.staged.clear();
                return Err(err);
            }
        };
        forward.resolve(codec.clone());

        // Publication is deferred until the outermost type finishes: a
        // subtree may still hold forwarders into codecs that are not built
        // yet, and the cache must only ever expose fully linked trees.
        let staged = codec.clone();
        self.staged.push(Box::new(move || {
            cache_publish::<T>(staged);
        }));
        if self.pending.is_empty() {
            for publish in self.staged.drain(..) {
                publish();
            }
        }
        Ok(codec)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// RECURSION PLACEHOLDER
// =============================================================================

/// Placeholder published while a type's codec is under construction.
///
/// Recursive positions in the finished tree keep pointing at the forwarder,
/// which resolves to the final codec before the tree is published.
struct ForwardCodec<T> {
    slot: OnceLock<Arc<dyn Codec<T>>>,
}

impl<T: 'static> ForwardCodec<T> {
    fn new() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    fn resolve(&self, codec: Arc<dyn Codec<T>>) {
        let _ = self.slot.set(codec);
    }

    fn target(&self) -> &Arc<dyn Codec<T>> {
        // Set by resolve() before the owning tree becomes reachable.
        self.slot
            .get()
            .expect("recursive codec used before construction finished")
    }
}

impl<T: 'static> Codec<T> for ForwardCodec<T> {
    fn encode_to(&self, enc: &mut Encoder<'_>, value: &T) -> Result<(), EncodeError> {
        self.target().encode_to(enc, value)
    }

    fn decode_to(&self, dec: &mut Decoder<'_>, into: &mut T) -> Result<(), DecodeError> {
        self.target().decode_to(dec, into)
    }
}

// =============================================================================
// CACHE
// =============================================================================

type CacheMap = FxHashMap<TypeId, Box<dyn Any + Send + Sync>>;

static CACHE: OnceLock<RwLock<CacheMap>> = OnceLock::new();

fn cache() -> &'static RwLock<CacheMap> {
    CACHE.get_or_init(|| RwLock::new(FxHashMap::default()))
}

fn cache_get<T: Encodable>() -> Option<Arc<dyn Codec<T>>> {
    let guard = cache().read().unwrap_or_else(PoisonError::into_inner);
    guard
        .get(&TypeId::of::<T>())
        .and_then(|entry| entry.downcast_ref::<Arc<dyn Codec<T>>>())
        .cloned()
}

/// Publishes a freshly built codec. Insertion is idempotent: the first
/// build wins and later (racing) results are discarded in favor of the
/// published one.
fn cache_publish<T: Encodable>(codec: Arc<dyn Codec<T>>) -> Arc<dyn Codec<T>> {
    let mut guard = cache().write().unwrap_or_else(PoisonError::into_inner);
    match guard.entry(TypeId::of::<T>()) {
        Entry::Occupied(entry) => entry
            .get()
            .downcast_ref::<Arc<dyn Codec<T>>>()
            .cloned()
            .unwrap_or(codec),
        Entry::Vacant(slot) => {
            slot.insert(Box::new(codec.clone()));
            codec
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_of_is_cached() {
        crate::schema! {
            #[derive(Debug, Default)]
            struct CacheProbe {
                value: u64,
            }
        }

        let first = codec_of::<CacheProbe>().unwrap();
        let second = codec_of::<CacheProbe>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_opaque_shape_is_rejected() {
        use crate::schema::{Descriptor, Shape};

        struct Handle;

        impl Schema for Handle {
            fn descriptor() -> Descriptor {
                Descriptor::new("Handle", Shape::Opaque)
            }
        }

        impl Encodable for Handle {
            fn codec(_: &mut Builder) -> Result<Arc<dyn Codec<Self>>, BuildError> {
                unreachable!("opaque shapes are rejected before codec()")
            }
        }

        let err = match codec_of::<Handle>() {
            Ok(_) => panic!("expected codec_of::<Handle>() to fail"),
            Err(err) => err,
        };
        assert_eq!(err, BuildError::UnsupportedType { name: "Handle" });
    }

    #[test]
    fn test_concurrent_builders_converge() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| codec_of::<Vec<u32>>().is_ok()))
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
