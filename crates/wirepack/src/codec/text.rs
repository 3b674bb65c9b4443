// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! UTF-8 text: 4-byte signed byte length, then the bytes.
//!
//! The absent form (`-1`) only exists for `Option<String>` and friends; the
//! nullable codec writes it, and a non-optional target rejects it with
//! `UnexpectedAbsent`.

use super::Wire;
use crate::buffer::{ReadCursor, WriteBuffer};
use crate::error::{CodecError, Result};
use crate::registry::{BuildContext, Processor, Shape};
use std::sync::Arc;

/// Length prefix plus UTF-8 bytes.
#[inline]
pub(crate) fn encode_str(value: &str, buf: &mut WriteBuffer) -> Result<()> {
    let bytes = value.as_bytes();
    buf.ensure_capacity(4 + bytes.len())?;
    buf.write_length(bytes.len())?;
    buf.write_bytes(bytes)
}

/// Borrow the next string from the cursor.
#[inline]
pub(crate) fn decode_str<'a>(
    cursor: &mut ReadCursor<'a>,
    type_name: &'static str,
) -> Result<&'a str> {
    let len = cursor.read_present_length(type_name)?;
    if len == 0 {
        return Ok("");
    }
    let offset = cursor.offset();
    let bytes = cursor.read_bytes(len)?;
    std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8 { offset })
}

macro_rules! impl_text_wire {
    ($($ty:ty => $from:expr),* $(,)?) => {
        $(
            impl Wire for $ty {
                #[inline]
                fn shape() -> Shape {
                    Shape::Text
                }

                fn build_processor(_ctx: &mut BuildContext<'_>) -> Result<Processor<Self>> {
                    let type_name = std::any::type_name::<Self>();
                    Ok(Processor::new(
                        Shape::Text,
                        Box::new(|value: &Self, buf: &mut WriteBuffer| encode_str(value, buf)),
                        Box::new(move |cursor: &mut ReadCursor<'_>| {
                            decode_str(cursor, type_name).map($from)
                        }),
                    ))
                }
            }
        )*
    };
}

impl_text_wire! {
    String => String::from,
    Box<str> => Box::<str>::from,
    Arc<str> => Arc::<str>::from,
}
