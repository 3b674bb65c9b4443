// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-layout scalars: raw bytes, no prefix.

use super::Wire;
use crate::error::Result;
use crate::layout::FixedLayout;
use crate::registry::{BuildContext, Processor, Shape};
use std::time::{Duration, SystemTime};

macro_rules! impl_fixed_wire {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Wire for $ty {
                #[inline]
                fn shape() -> Shape {
                    Shape::Fixed {
                        size: <$ty as FixedLayout>::SIZE,
                    }
                }

                fn build_processor(_ctx: &mut BuildContext<'_>) -> Result<Processor<Self>> {
                    Ok(Processor::fixed())
                }
            }
        )*
    };
}

impl_fixed_wire!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, char, Duration,
    SystemTime,
);

impl Wire for bool {
    #[inline]
    fn shape() -> Shape {
        Shape::Bool
    }

    fn build_processor(_ctx: &mut BuildContext<'_>) -> Result<Processor<Self>> {
        Ok(Processor::fixed())
    }
}
