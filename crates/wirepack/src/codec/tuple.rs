// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tuples are value objects whose members are the positions `0..N`.

use super::object::{MemberInfo, MemberSelection, ObjectDescriptor, ObjectKind};
use super::Wire;
use crate::buffer::{ReadCursor, WriteBuffer};
use crate::error::Result;
use crate::registry::{BuildContext, Processor, Shape};

macro_rules! impl_tuple_wire {
    ($(($($name:ident : $idx:tt),+);)*) => {
        $(
            impl<$($name: Wire),+> Wire for ($($name,)+) {
                #[inline]
                fn shape() -> Shape {
                    Shape::Object { reference: false }
                }

                fn build_processor(ctx: &mut BuildContext<'_>) -> Result<Processor<Self>> {
                    let codecs = ($(
                        ctx.element::<$name>().map_err(|e| e.in_member(stringify!($idx)))?,
                    )+);
                    let enc = codecs.clone();
                    let descriptor = ObjectDescriptor {
                        type_name: std::any::type_name::<Self>(),
                        kind: ObjectKind::Value,
                        selection: MemberSelection::ALL,
                        members: vec![$(
                            MemberInfo {
                                name: stringify!($idx),
                                type_name: std::any::type_name::<$name>(),
                                shape: $name::shape(),
                                index: $idx,
                            },
                        )+],
                    };
                    Ok(Processor::new(
                        Self::shape(),
                        Box::new(move |value: &Self, buf: &mut WriteBuffer| -> Result<()> {
                            $(enc.$idx.encode(&value.$idx, buf)?;)+
                            Ok(())
                        }),
                        Box::new(move |cursor: &mut ReadCursor<'_>| -> Result<Self> {
                            Ok(($(codecs.$idx.decode(cursor)?,)+))
                        }),
                    )
                    .with_object(descriptor))
                }
            }
        )*
    };
}

impl_tuple_wire! {
    (A: 0);
    (A: 0, B: 1);
    (A: 0, B: 1, C: 2);
    (A: 0, B: 1, C: 2, D: 3);
    (A: 0, B: 1, C: 2, D: 3, E: 4);
    (A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
}

#[cfg(test)]
mod tests {
    use crate::{from_bytes, to_bytes, ProcessorRegistry};

    #[test]
    fn test_tuple_is_members_in_order() {
        let value = (7u8, String::from("hi"), Some(true));
        let bytes = to_bytes(&value).unwrap();
        assert_eq!(bytes, vec![7, 2, 0, 0, 0, b'h', b'i', 1]);
        assert_eq!(
            from_bytes::<(u8, String, Option<bool>)>(&bytes).unwrap(),
            value
        );
    }

    #[test]
    fn test_tuple_descriptor() {
        let registry = ProcessorRegistry::new();
        let processor = registry.processor::<(u16, Vec<u8>)>().unwrap();
        let names: Vec<_> = processor.members().iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["0", "1"]);
        assert!(!processor.object().unwrap().is_reference());
    }
}
