// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `Option<T>`.
//!
//! The absent form depends on the inner shape:
//!
//! | Inner shape                          | `None`          | `Some(v)`                 |
//! |--------------------------------------|-----------------|---------------------------|
//! | bool                                 | `i8` `-1`       | `v` as `0`/`1`            |
//! | fixed-layout scalar, value object    | `u8` `0`        | `u8` `1`, then `v`        |
//! | reference object                     | `u8` `0`        | `v` (its own flag is `1`) |
//! | text, array, collection, map, bits   | `i32` `-1`      | `v`                       |
//!
//! Nesting `Option<Option<T>>` has no wire form and fails at build time.

use super::Wire;
use crate::buffer::{ReadCursor, WriteBuffer};
use crate::error::{CodecError, Result};
use crate::registry::{BuildContext, ElementCodec, Processor, Shape};

const ABSENT_BOOL: i8 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    /// One signed byte carries both presence and value.
    CompactBool,
    /// Separate presence byte before the value.
    Flag,
    /// The inner object's own presence flag doubles as ours.
    ObjectFlag,
    /// The inner `-1` length/count marker doubles as ours.
    LengthSentinel,
}

impl Presence {
    fn for_shape(shape: Shape) -> Option<Self> {
        match shape {
            Shape::Bool => Some(Presence::CompactBool),
            Shape::Fixed { .. } | Shape::Object { reference: false } => Some(Presence::Flag),
            Shape::Object { reference: true } => Some(Presence::ObjectFlag),
            s if s.uses_length_sentinel() => Some(Presence::LengthSentinel),
            _ => None,
        }
    }
}

fn encode_option<T>(
    presence: Presence,
    inner: &ElementCodec<T>,
    value: &Option<T>,
    buf: &mut WriteBuffer,
) -> Result<()> {
    match (presence, value) {
        (Presence::CompactBool, None) => buf.write(ABSENT_BOOL),
        (Presence::Flag, None) | (Presence::ObjectFlag, None) => buf.write(0u8),
        (Presence::LengthSentinel, None) => buf.write_absent(),
        (Presence::Flag, Some(v)) => {
            buf.write(1u8)?;
            inner.encode(v, buf)
        }
        (_, Some(v)) => inner.encode(v, buf),
    }
}

fn decode_option<T>(
    presence: Presence,
    inner: &ElementCodec<T>,
    cursor: &mut ReadCursor<'_>,
) -> Result<Option<T>> {
    let absent = match presence {
        Presence::CompactBool => cursor.peek_u8()? as i8 == ABSENT_BOOL,
        Presence::ObjectFlag => cursor.peek_u8()? == 0,
        Presence::LengthSentinel => cursor.at_absent_length()?,
        Presence::Flag => !cursor.read::<bool>()?,
    };
    if absent {
        match presence {
            Presence::CompactBool | Presence::ObjectFlag => cursor.advance(1)?,
            Presence::LengthSentinel => cursor.advance(4)?,
            Presence::Flag => {}
        }
        return Ok(None);
    }
    inner.decode(cursor).map(Some)
}

impl<T: Wire> Wire for Option<T> {
    #[inline]
    fn shape() -> Shape {
        Shape::Nullable
    }

    fn build_processor(ctx: &mut BuildContext<'_>) -> Result<Processor<Self>> {
        let inner = ctx.element::<T>()?;
        let inner_shape = T::shape();
        let presence = Presence::for_shape(inner_shape).ok_or_else(|| {
            CodecError::unsupported(
                std::any::type_name::<Self>(),
                "nullable wrapper over a nullable value has no wire form",
            )
        })?;
        log::trace!(
            "[nullable] {} uses {:?} over {}",
            std::any::type_name::<Self>(),
            presence,
            inner_shape
        );

        let enc = inner.clone();
        Ok(Processor::new(
            Shape::Nullable,
            Box::new(move |value: &Self, buf: &mut WriteBuffer| {
                encode_option(presence, &enc, value, buf)
            }),
            Box::new(move |cursor: &mut ReadCursor<'_>| decode_option(presence, &inner, cursor)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::{from_bytes, to_bytes, CodecError, Wire};

    #[test]
    fn test_nullable_bool_is_one_byte() {
        assert_eq!(to_bytes(&Some(true)).unwrap(), vec![0x01]);
        assert_eq!(to_bytes(&Some(false)).unwrap(), vec![0x00]);
        assert_eq!(to_bytes(&None::<bool>).unwrap(), vec![0xFF]);

        assert_eq!(from_bytes::<Option<bool>>(&[0xFF]).unwrap(), None);
        assert_eq!(from_bytes::<Option<bool>>(&[0x00]).unwrap(), Some(false));
        assert_eq!(from_bytes::<Option<bool>>(&[0x01]).unwrap(), Some(true));
    }

    #[test]
    fn test_nullable_scalar_uses_presence_byte() {
        assert_eq!(to_bytes(&None::<i32>).unwrap(), vec![0]);
        assert_eq!(to_bytes(&Some(7_i32)).unwrap(), vec![1, 7, 0, 0, 0]);
        assert_eq!(from_bytes::<Option<i32>>(&[1, 7, 0, 0, 0]).unwrap(), Some(7));
        assert_eq!(from_bytes::<Option<i32>>(&[0]).unwrap(), None);
    }

    #[test]
    fn test_absent_string_is_length_sentinel() {
        let bytes = to_bytes(&None::<String>).unwrap();
        assert_eq!(bytes, (-1_i32).to_le_bytes().to_vec());
        assert_eq!(from_bytes::<Option<String>>(&bytes).unwrap(), None);

        let present = to_bytes(&Some(String::from("x"))).unwrap();
        assert_eq!(present, vec![1, 0, 0, 0, b'x']);
        assert_eq!(
            from_bytes::<Option<String>>(&present).unwrap().as_deref(),
            Some("x")
        );
    }

    #[test]
    fn test_absent_vec_differs_from_empty_vec() {
        let absent = to_bytes(&None::<Vec<i32>>).unwrap();
        let empty = to_bytes(&Some(Vec::<i32>::new())).unwrap();
        assert_ne!(absent, empty);
        assert_eq!(from_bytes::<Option<Vec<i32>>>(&absent).unwrap(), None);
        assert_eq!(
            from_bytes::<Option<Vec<i32>>>(&empty).unwrap(),
            Some(Vec::new())
        );
    }

    #[test]
    fn test_nested_nullable_is_unsupported() {
        let err = crate::ProcessorRegistry::new()
            .processor::<Option<Option<u8>>>()
            .unwrap_err();
        match err {
            CodecError::UnsupportedType { type_name, .. } => {
                assert!(type_name.contains("Option<core::option::Option<u8>>"));
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(<Option<u8> as Wire>::shape(), crate::Shape::Nullable);
    }

    #[test]
    fn test_truncated_nullable_is_underrun() {
        assert!(from_bytes::<Option<u16>>(&[1, 0]).unwrap_err().is_underrun());
        assert!(from_bytes::<Option<bool>>(&[]).unwrap_err().is_underrun());
    }
}
