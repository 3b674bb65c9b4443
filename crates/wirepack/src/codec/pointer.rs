// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Smart pointers encode exactly as their pointee.
//!
//! `Box<T>` is how self-referential graphs are spelled
//! (`next: Option<Box<Node>>`); shared pointers are not deduplicated, each
//! occurrence is written in full.

use super::Wire;
use crate::buffer::{ReadCursor, WriteBuffer};
use crate::error::Result;
use crate::registry::{BuildContext, Processor, Shape};
use std::rc::Rc;
use std::sync::Arc;

macro_rules! impl_pointer_wire {
    ($($ptr:ident),* $(,)?) => {
        $(
            impl<T: Wire> Wire for $ptr<T> {
                #[inline]
                fn shape() -> Shape {
                    T::shape()
                }

                fn build_processor(ctx: &mut BuildContext<'_>) -> Result<Processor<Self>> {
                    let inner = ctx.resolve::<T>()?;
                    let enc = inner.clone();
                    Ok(Processor::new(
                        T::shape(),
                        Box::new(move |value: &Self, buf: &mut WriteBuffer| {
                            enc.encode(&**value, buf)
                        }),
                        Box::new(move |cursor: &mut ReadCursor<'_>| {
                            inner.decode(cursor).map($ptr::new)
                        }),
                    ))
                }
            }
        )*
    };
}

impl_pointer_wire!(Box, Rc, Arc);
