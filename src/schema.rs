//! Structural type descriptors.
//!
//! A [`Descriptor`] is the library's abstract view of a type's shape,
//! independent of the concrete Rust type behind it. Descriptors are plain
//! data: the codec builder consults them for validation and diagnostics,
//! and user-facing tooling can inspect them without touching values.
//! Child descriptors are reached through lazy `fn() -> Descriptor` thunks so
//! self-referential shapes stay constructible.

use std::any::type_name;
use std::collections::{BTreeMap, HashMap};

use num_complex::Complex;

/// Scalar kinds understood by the wire format.
///
/// Complex kinds are named by their total wire width: `Complex64` is a pair
/// of f32, `Complex128` a pair of f64.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Complex64,
    Complex128,
}

/// Lazy reference to a child descriptor.
pub type DescriptorFn = fn() -> Descriptor;

/// A named field of an aggregate shape, in declaration order.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// Field name as declared.
    pub name: &'static str,
    /// Descriptor of the field's type.
    pub descriptor: DescriptorFn,
}

/// The recognized structural shapes.
#[derive(Debug, Clone)]
pub enum Shape {
    /// A scalar value.
    Scalar(Scalar),
    /// A UTF-8 string, treated as an opaque byte sequence on the wire.
    Str,
    /// A fixed-length array; the length lives in the descriptor, not on the
    /// wire.
    Array { len: usize, elem: DescriptorFn },
    /// A variable-length sequence.
    Sequence { elem: DescriptorFn },
    /// A mapping with unique keys and order-free wire representation.
    Map {
        key: DescriptorFn,
        value: DescriptorFn,
    },
    /// A value that may be absent.
    Optional { inner: DescriptorFn },
    /// An ordered list of named fields, encoded back-to-back with no tags
    /// or framing.
    Aggregate { fields: &'static [Field] },
    /// A type carrying its own codec; its wire form is opaque to the
    /// builder.
    Custom,
    /// A host type that cannot be encoded. Building a codec for an opaque
    /// shape fails with `UnsupportedType`.
    Opaque,
}

/// Abstract description of a type's shape.
#[derive(Debug, Clone)]
pub struct Descriptor {
    name: &'static str,
    shape: Shape,
}

impl Descriptor {
    /// Creates a descriptor from a name and a shape.
    pub fn new(name: &'static str, shape: Shape) -> Self {
        Self { name, shape }
    }

    /// Creates an aggregate descriptor over a static field list.
    pub fn aggregate(name: &'static str, fields: &'static [Field]) -> Self {
        Self {
            name,
            shape: Shape::Aggregate { fields },
        }
    }

    /// Type name this descriptor was derived from.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Structural shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }
}

/// Types that can describe their own shape.
pub trait Schema {
    /// Returns the structural descriptor for this type.
    fn descriptor() -> Descriptor;
}

// =============================================================================
// STD IMPLEMENTATIONS
// =============================================================================

macro_rules! scalar_schema {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Schema for $ty {
                fn descriptor() -> Descriptor {
                    Descriptor::new(type_name::<$ty>(), Shape::Scalar(Scalar::$kind))
                }
            }
        )*
    };
}

scalar_schema! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    Complex<f32> => Complex64,
    Complex<f64> => Complex128,
}

impl Schema for String {
    fn descriptor() -> Descriptor {
        Descriptor::new("String", Shape::Str)
    }
}

impl<T: Schema> Schema for Vec<T> {
    fn descriptor() -> Descriptor {
        Descriptor::new(
            type_name::<Self>(),
            Shape::Sequence {
                elem: T::descriptor,
            },
        )
    }
}

impl<T: Schema, const N: usize> Schema for [T; N] {
    fn descriptor() -> Descriptor {
        Descriptor::new(
            type_name::<Self>(),
            Shape::Array {
                len: N,
                elem: T::descriptor,
            },
        )
    }
}

impl<T: Schema> Schema for Option<T> {
    fn descriptor() -> Descriptor {
        Descriptor::new(
            type_name::<Self>(),
            Shape::Optional {
                inner: T::descriptor,
            },
        )
    }
}

// Boxes are plain indirection and take their pointee's shape; optionality
// on the wire belongs to `Option` alone.
impl<T: Schema> Schema for Box<T> {
    fn descriptor() -> Descriptor {
        T::descriptor()
    }
}

impl<K: Schema, V: Schema> Schema for HashMap<K, V> {
    fn descriptor() -> Descriptor {
        Descriptor::new(
            type_name::<Self>(),
            Shape::Map {
                key: K::descriptor,
                value: V::descriptor,
            },
        )
    }
}

impl<K: Schema, V: Schema> Schema for BTreeMap<K, V> {
    fn descriptor() -> Descriptor {
        Descriptor::new(
            type_name::<Self>(),
            Shape::Map {
                key: K::descriptor,
                value: V::descriptor,
            },
        )
    }
}
