// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Top-level entry points over the global registry.
//!
//! Each call resolves the root type's processor (building it on first use),
//! runs it against a fresh buffer or cursor and returns. Trailing bytes after
//! a decoded root value are ignored.

use crate::buffer::{ReadCursor, WriteBuffer};
use crate::codec::Wire;
use crate::error::Result;
use crate::registry::{Processor, ProcessorRegistry};
use std::io::{Read, Write};
use std::sync::Arc;

/// Processor for `T` from the global registry.
pub fn processor<T: Wire>() -> Result<Arc<Processor<T>>> {
    ProcessorRegistry::global().processor::<T>()
}

/// Encode `value` and write the bytes to `sink`.
pub fn serialize<T: Wire, W: Write>(value: &T, mut sink: W) -> Result<()> {
    let processor = processor::<T>()?;
    let mut buf = WriteBuffer::new();
    processor.encode(value, &mut buf)?;
    sink.write_all(buf.as_written_slice())?;
    sink.flush()?;
    Ok(())
}

/// Read everything from `source` and decode one `T`.
pub fn deserialize<T: Wire, R: Read>(mut source: R) -> Result<T> {
    let processor = processor::<T>()?;
    let mut bytes = Vec::new();
    source.read_to_end(&mut bytes)?;
    processor.decode(&mut ReadCursor::new(&bytes))
}

/// Encode `value` into a new byte vector.
pub fn to_bytes<T: Wire>(value: &T) -> Result<Vec<u8>> {
    let processor = processor::<T>()?;
    let mut buf = WriteBuffer::new();
    processor.encode(value, &mut buf)?;
    Ok(buf.to_vec())
}

/// Decode one `T` from the start of `bytes`.
pub fn from_bytes<T: Wire>(bytes: &[u8]) -> Result<T> {
    let processor = processor::<T>()?;
    processor.decode(&mut ReadCursor::new(bytes))
}

/// Append the encoding of `value` to an existing buffer.
pub fn encode_into<T: Wire>(value: &T, buf: &mut WriteBuffer) -> Result<()> {
    processor::<T>()?.encode(value, buf)
}

/// Decode one `T` at the cursor's position, advancing past it.
pub fn decode_from<T: Wire>(cursor: &mut ReadCursor<'_>) -> Result<T> {
    processor::<T>()?.decode(cursor)
}
