// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-layout ("unmanaged") values.
//!
//! A fixed-layout type has a statically known byte size and no embedded
//! references, so it is written as a raw little-endian byte block with no
//! length prefix. Runs of fixed-layout elements are copied as one block by the
//! collection codecs.

use crate::error::{CodecError, Result};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A value with a fixed little-endian byte representation.
///
/// `write_to` receives exactly `SIZE` bytes; `read_from` receives exactly
/// `SIZE` bytes. `read_from` may reject bit patterns that are not valid
/// values (`char` surrogates, unknown enum discriminants).
pub trait FixedLayout: Sized + 'static {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Write `self` into `dst` (`dst.len() == SIZE`).
    fn write_to(&self, dst: &mut [u8]);

    /// Read a value from `src` (`src.len() == SIZE`).
    fn read_from(src: &[u8]) -> Result<Self>;
}

/// Generate `FixedLayout` for numeric types via `to_le_bytes`/`from_le_bytes`.
macro_rules! impl_fixed_le {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FixedLayout for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn write_to(&self, dst: &mut [u8]) {
                    dst.copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn read_from(src: &[u8]) -> Result<Self> {
                    let mut bytes = [0u8; std::mem::size_of::<$ty>()];
                    bytes.copy_from_slice(src);
                    Ok(<$ty>::from_le_bytes(bytes))
                }
            }
        )*
    };
}

impl_fixed_le!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128, f32, f64);

// Pointer-sized integers are pinned to 64 bits so encodings are portable.
impl FixedLayout for usize {
    const SIZE: usize = 8;

    #[inline]
    fn write_to(&self, dst: &mut [u8]) {
        (*self as u64).write_to(dst);
    }

    fn read_from(src: &[u8]) -> Result<Self> {
        let raw = u64::read_from(src)?;
        usize::try_from(raw)
            .map_err(|_| CodecError::invalid_value("usize", format!("{raw} overflows usize")))
    }
}

impl FixedLayout for isize {
    const SIZE: usize = 8;

    #[inline]
    fn write_to(&self, dst: &mut [u8]) {
        (*self as i64).write_to(dst);
    }

    fn read_from(src: &[u8]) -> Result<Self> {
        let raw = i64::read_from(src)?;
        isize::try_from(raw)
            .map_err(|_| CodecError::invalid_value("isize", format!("{raw} overflows isize")))
    }
}

impl FixedLayout for bool {
    const SIZE: usize = 1;

    #[inline]
    fn write_to(&self, dst: &mut [u8]) {
        dst[0] = u8::from(*self);
    }

    #[inline]
    fn read_from(src: &[u8]) -> Result<Self> {
        Ok(src[0] != 0)
    }
}

impl FixedLayout for char {
    const SIZE: usize = 4;

    #[inline]
    fn write_to(&self, dst: &mut [u8]) {
        u32::from(*self).write_to(dst);
    }

    fn read_from(src: &[u8]) -> Result<Self> {
        let raw = u32::read_from(src)?;
        char::from_u32(raw).ok_or_else(|| {
            CodecError::invalid_value("char", format!("{raw:#x} is not a Unicode scalar value"))
        })
    }
}

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// `Duration`: u64 seconds + u32 sub-second nanoseconds.
impl FixedLayout for Duration {
    const SIZE: usize = 12;

    fn write_to(&self, dst: &mut [u8]) {
        self.as_secs().write_to(&mut dst[..8]);
        self.subsec_nanos().write_to(&mut dst[8..12]);
    }

    fn read_from(src: &[u8]) -> Result<Self> {
        let secs = u64::read_from(&src[..8])?;
        let nanos = u32::read_from(&src[8..12])?;
        if nanos >= NANOS_PER_SEC {
            return Err(CodecError::invalid_value(
                "Duration",
                format!("sub-second nanos {nanos} out of range"),
            ));
        }
        Ok(Duration::new(secs, nanos))
    }
}

/// `SystemTime`: i64 seconds relative to the Unix epoch + u32 nanoseconds
/// (always forward from the seconds value, so pre-epoch times floor the
/// seconds).
impl FixedLayout for SystemTime {
    const SIZE: usize = 12;

    fn write_to(&self, dst: &mut [u8]) {
        let (secs, nanos) = match self.duration_since(UNIX_EPOCH) {
            Ok(after) => (
                i64::try_from(after.as_secs()).unwrap_or(i64::MAX),
                after.subsec_nanos(),
            ),
            Err(e) => {
                let before = e.duration();
                let secs = i64::try_from(before.as_secs()).unwrap_or(i64::MAX);
                match before.subsec_nanos() {
                    0 => (-secs, 0),
                    n => (-secs - 1, NANOS_PER_SEC - n),
                }
            }
        };
        secs.write_to(&mut dst[..8]);
        nanos.write_to(&mut dst[8..12]);
    }

    fn read_from(src: &[u8]) -> Result<Self> {
        let secs = i64::read_from(&src[..8])?;
        let nanos = u32::read_from(&src[8..12])?;
        if nanos >= NANOS_PER_SEC {
            return Err(CodecError::invalid_value(
                "SystemTime",
                format!("sub-second nanos {nanos} out of range"),
            ));
        }
        let out_of_range = || CodecError::invalid_value("SystemTime", "timestamp out of range");
        let base = if secs >= 0 {
            UNIX_EPOCH.checked_add(Duration::from_secs(secs.unsigned_abs()))
        } else {
            UNIX_EPOCH.checked_sub(Duration::from_secs(secs.unsigned_abs()))
        }
        .ok_or_else(out_of_range)?;
        base.checked_add(Duration::from_nanos(u64::from(nanos)))
            .ok_or_else(out_of_range)
    }
}
