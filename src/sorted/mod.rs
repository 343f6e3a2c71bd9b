//! Delta-compressed sorted sequences and time-series payloads.
//!
//! The types here carry their own codecs (the [`WithCodec`] override tier):
//! wrapping a value in [`Sorted`] or collecting it into a [`TimeSeries`]
//! switches the wire representation from absolute values to packed deltas,
//! which is dramatically smaller for clustered or monotonic data.

mod delta;
mod series;

pub use delta::DeltaScalar;
pub use series::{TimeCounters, TimeSeries};

use std::ops::{Deref, DerefMut};

use crate::codec::custom::WithCodec;

/// Integer sequence stored sorted and delta-compressed on the wire.
///
/// Encoding sorts a copy of the values ascending and writes successive
/// differences as varints behind a byte-length prefix; decoding restores
/// absolute values by running sum. The round-tripped sequence is therefore
/// always sorted, regardless of the input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sorted<T>(pub Vec<T>);

/// Sorted timestamp sequence, delta-compressed on the wire.
pub type Timestamps = Sorted<u64>;

impl<T> Sorted<T> {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Consumes the wrapper, returning the inner vector.
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T> Deref for Sorted<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.0
    }
}

impl<T> DerefMut for Sorted<T> {
    fn deref_mut(&mut self) -> &mut Vec<T> {
        &mut self.0
    }
}

impl<T> From<Vec<T>> for Sorted<T> {
    fn from(values: Vec<T>) -> Self {
        Self(values)
    }
}

impl<T> FromIterator<T> for Sorted<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T: DeltaScalar> crate::schema::Schema for Sorted<T> {
    fn descriptor() -> crate::schema::Descriptor {
        crate::schema::Descriptor::new(
            std::any::type_name::<Self>(),
            crate::schema::Shape::Custom,
        )
    }
}

impl<T: DeltaScalar> WithCodec for Sorted<T> {
    fn binary_codec() -> std::sync::Arc<dyn crate::codec::Codec<Self>> {
        std::sync::Arc::new(delta::DeltaCodec::<T>::new())
    }
}

impl<T: DeltaScalar> crate::Encodable for Sorted<T> {
    fn codec(
        _: &mut crate::codec::Builder,
    ) -> Result<std::sync::Arc<dyn crate::codec::Codec<Self>>, crate::BuildError> {
        Ok(Self::binary_codec())
    }
}
