//! Aggregate (struct) codec derivation.
//!
//! The [`schema!`](crate::schema!) macro defines a struct together with its
//! descriptor and codec. Fields are encoded in declaration order with no
//! tags, separators or framing; the decoder walks the same order. Fields
//! listed in the optional `skip { .. }` section exist on the struct but
//! never touch the wire.

/// Defines a struct and derives its [`Schema`](crate::schema::Schema) and
/// [`Encodable`](crate::Encodable) implementations.
///
/// ```rust
/// typewire::schema! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct Message {
///         pub name: String,
///         pub ssid: Vec<u32>,
///     }
/// }
///
/// let msg = Message { name: "Roman".into(), ssid: vec![1, 2, 3] };
/// let bytes = typewire::encode(&msg).unwrap();
/// let mut out = Message::default();
/// typewire::decode(&bytes, &mut out).unwrap();
/// assert_eq!(msg, out);
/// ```
///
/// Fields that should stay off the wire go in a trailing `skip` section;
/// decoding leaves them untouched:
///
/// ```rust
/// typewire::schema! {
///     #[derive(Debug, Default)]
///     pub struct Cached {
///         pub entries: Vec<u64>,
///     } skip {
///         pub generation: u64,
///     }
/// }
/// ```
#[macro_export]
macro_rules! schema {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $fty:ty ),* $(,)?
        }
    ) => {
        $crate::schema! {
            $(#[$meta])*
            $vis struct $name {
                $( $(#[$fmeta])* $fvis $field : $fty, )*
            } skip { }
        }
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $fty:ty ),* $(,)?
        } skip {
            $( $(#[$smeta:meta])* $svis:vis $sfield:ident : $sty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field : $fty, )*
            $( $(#[$smeta])* $svis $sfield : $sty, )*
        }

        impl $crate::schema::Schema for $name {
            fn descriptor() -> $crate::schema::Descriptor {
                const FIELDS: &[$crate::schema::Field] = &[
                    $(
                        $crate::schema::Field {
                            name: stringify!($field),
                            descriptor: <$fty as $crate::schema::Schema>::descriptor,
                        },
                    )*
                ];
                $crate::schema::Descriptor::aggregate(stringify!($name), FIELDS)
            }
        }

        const _: () = {
            struct Fields {
                $( $field: ::std::sync::Arc<dyn $crate::codec::Codec<$fty>>, )*
            }

            impl $crate::codec::Codec<$name> for Fields {
                #[allow(unused_variables)]
                fn encode_to(
                    &self,
                    enc: &mut $crate::Encoder<'_>,
                    value: &$name,
                ) -> ::std::result::Result<(), $crate::EncodeError> {
                    if enc.is_strict() && <[&str]>::len(&[$(stringify!($field)),*]) == 0 {
                        return ::std::result::Result::Err(
                            $crate::EncodeError::NoEncodableFields {
                                name: stringify!($name),
                            },
                        );
                    }
                    $( self.$field.encode_to(enc, &value.$field)?; )*
                    ::std::result::Result::Ok(())
                }

                #[allow(unused_variables)]
                fn decode_to(
                    &self,
                    dec: &mut $crate::Decoder<'_>,
                    into: &mut $name,
                ) -> ::std::result::Result<(), $crate::DecodeError> {
                    $( self.$field.decode_to(dec, &mut into.$field)?; )*
                    ::std::result::Result::Ok(())
                }
            }

            impl $crate::Encodable for $name {
                #[allow(unused_variables)]
                fn codec(
                    builder: &mut $crate::codec::Builder,
                ) -> ::std::result::Result<
                    ::std::sync::Arc<dyn $crate::codec::Codec<Self>>,
                    $crate::BuildError,
                > {
                    ::std::result::Result::Ok(::std::sync::Arc::new(Fields {
                        $( $field: builder.resolve::<$fty>()?, )*
                    }))
                }
            }
        };
    };
}

#[cfg(test)]
mod tests {
    use crate::schema::{Schema, Shape};
    use crate::{decode, encode};

    crate::schema! {
        #[derive(Debug, Default, PartialEq)]
        struct Plain {
            a: String,
            b: String,
            c: i16,
        }
    }

    crate::schema! {
        #[derive(Debug, Default, PartialEq)]
        struct WithSkip {
            name: String,
        } skip {
            hits: u32,
        }
    }

    crate::schema! {
        #[derive(Debug, Default, PartialEq)]
        struct Node {
            label: u64,
            next: Option<Box<Node>>,
        }
    }

    #[test]
    fn test_fields_in_declared_order() {
        let v = Plain {
            a: "A".into(),
            b: "B".into(),
            c: 1,
        };
        assert_eq!(encode(&v).unwrap(), [0x01, 0x41, 0x01, 0x42, 0x02]);

        let mut out = Plain::default();
        decode(&[0x01, 0x41, 0x01, 0x42, 0x02], &mut out).unwrap();
        assert_eq!(out, v);
    }

    #[test]
    fn test_descriptor_lists_wire_fields_only() {
        let desc = WithSkip::descriptor();
        let Shape::Aggregate { fields } = desc.shape() else {
            panic!("expected aggregate, got {:?}", desc.shape());
        };
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "name");
    }

    #[test]
    fn test_skipped_field_stays_off_the_wire() {
        let v = WithSkip {
            name: "x".into(),
            hits: 42,
        };
        assert_eq!(encode(&v).unwrap(), [0x01, 0x78]);

        let mut out = WithSkip {
            name: String::new(),
            hits: 7,
        };
        decode(&[0x01, 0x78], &mut out).unwrap();
        assert_eq!(out.name, "x");
        assert_eq!(out.hits, 7);
    }

    #[test]
    fn test_recursive_struct_roundtrip() {
        let v = Node {
            label: 1,
            next: Some(Box::new(Node {
                label: 2,
                next: Some(Box::new(Node {
                    label: 3,
                    next: None,
                })),
            })),
        };

        let b = encode(&v).unwrap();
        assert_eq!(b, [0x01, 0x01, 0x02, 0x01, 0x03, 0x00]);

        let mut out = Node::default();
        decode(&b, &mut out).unwrap();
        assert_eq!(out, v);
    }

    #[test]
    fn test_nested_aggregates_concatenate() {
        crate::schema! {
            #[derive(Debug, Default, PartialEq)]
            struct Inner {
                id: u64,
                name: String,
            }
        }

        crate::schema! {
            #[derive(Debug, Default, PartialEq)]
            struct Outer {
                first: Inner,
                second: Inner,
            }
        }

        let v = Outer {
            first: Inner {
                id: 1,
                name: "1".into(),
            },
            second: Inner {
                id: 3,
                name: "3".into(),
            },
        };

        let b = encode(&v).unwrap();
        assert_eq!(b, [0x01, 0x01, 0x31, 0x03, 0x01, 0x33]);

        let mut out = Outer::default();
        decode(&b, &mut out).unwrap();
        assert_eq!(out, v);
    }
}
