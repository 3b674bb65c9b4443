// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Growable write buffer with pooled backing storage.

use super::pool::BufferPool;
use crate::config::{self, CodecConfig};
use crate::error::{CodecError, Result};
use crate::layout::FixedLayout;
use std::sync::Arc;

/// Length/count sentinel for an absent string, array, collection or map.
pub const ABSENT_LENGTH: i32 = -1;

/// Owned, growable byte store plus a write position.
///
/// Every write calls [`ensure_capacity`](Self::ensure_capacity) first, so the
/// slice indexing below never goes out of bounds. Growth rents a larger block
/// from the pool, copies the written prefix and returns the old block; the
/// final block goes back to the pool when the buffer is dropped.
pub struct WriteBuffer {
    storage: Vec<u8>,
    position: usize,
    max_capacity: usize,
    pool: Option<Arc<BufferPool>>,
}

impl WriteBuffer {
    /// Buffer configured from the process-wide [`CodecConfig`].
    pub fn new() -> Self {
        Self::with_config(&config::global())
    }

    /// Buffer starting with `initial_capacity` bytes, other limits from the
    /// process-wide config.
    pub fn with_capacity(initial_capacity: usize) -> Self {
        let cfg = config::global();
        let pool = cfg.pool_enabled.then(super::pool::global);
        Self::with_pool(initial_capacity, cfg.max_capacity, pool)
    }

    pub fn with_config(cfg: &CodecConfig) -> Self {
        let pool = cfg.pool_enabled.then(super::pool::global);
        Self::with_pool(cfg.initial_capacity, cfg.max_capacity, pool)
    }

    /// Buffer backed by an explicit pool (`None` allocates plainly).
    pub fn with_pool(
        initial_capacity: usize,
        max_capacity: usize,
        pool: Option<Arc<BufferPool>>,
    ) -> Self {
        let initial_capacity = initial_capacity.min(max_capacity);
        let mut buffer = Self {
            storage: Vec::new(),
            position: 0,
            max_capacity,
            pool,
        };
        if initial_capacity > 0 {
            buffer.storage = buffer.allocate(initial_capacity);
        }
        buffer
    }

    /// Bytes written so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Current storage size.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// Make room for `additional` more bytes after the write position.
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` if the buffer would have to grow beyond its
    /// maximum capacity.
    #[inline]
    pub fn ensure_capacity(&mut self, additional: usize) -> Result<()> {
        let required =
            self.position
                .checked_add(additional)
                .ok_or(CodecError::CapacityExceeded {
                    requested: usize::MAX,
                    max: self.max_capacity,
                })?;
        if required > self.storage.len() {
            self.grow(required)?;
        }
        Ok(())
    }

    #[cold]
    fn grow(&mut self, required: usize) -> Result<()> {
        if required > self.max_capacity {
            return Err(CodecError::CapacityExceeded {
                requested: required,
                max: self.max_capacity,
            });
        }
        let doubled = self.storage.len().saturating_mul(2);
        let target = required
            .checked_next_power_of_two()
            .unwrap_or(required)
            .max(doubled)
            .min(self.max_capacity);
        log::trace!(
            "[buffer] grow {} -> {} bytes (required {})",
            self.storage.len(),
            target,
            required
        );
        let mut next = self.allocate(target);
        next[..self.position].copy_from_slice(&self.storage[..self.position]);
        let previous = std::mem::replace(&mut self.storage, next);
        self.release(previous);
        Ok(())
    }

    fn allocate(&self, len: usize) -> Vec<u8> {
        match &self.pool {
            Some(pool) if BufferPool::class_len(len) <= self.max_capacity => pool.rent(len),
            _ => vec![0u8; len],
        }
    }

    fn release(&self, storage: Vec<u8>) {
        if let Some(pool) = &self.pool {
            if !storage.is_empty() {
                pool.give_back(storage);
            }
        }
    }

    /// Reserve `len` bytes at the write position and advance past them.
    ///
    /// Used by the collection codecs to write a whole fixed-layout run in one
    /// block.
    #[inline]
    pub fn reserve(&mut self, len: usize) -> Result<&mut [u8]> {
        self.ensure_capacity(len)?;
        let start = self.position;
        self.position += len;
        Ok(&mut self.storage[start..start + len])
    }

    /// Write a fixed-layout value as its raw little-endian bytes.
    #[inline]
    pub fn write<T: FixedLayout>(&mut self, value: T) -> Result<()> {
        self.write_ref(&value)
    }

    #[inline]
    pub fn write_ref<T: FixedLayout>(&mut self, value: &T) -> Result<()> {
        let dst = self.reserve(T::SIZE)?;
        value.write_to(dst);
        Ok(())
    }

    /// Write a contiguous run of fixed-layout values as one block.
    pub fn write_slice<T: FixedLayout>(&mut self, values: &[T]) -> Result<()> {
        let total = values
            .len()
            .checked_mul(T::SIZE)
            .ok_or(CodecError::CapacityExceeded {
                requested: usize::MAX,
                max: self.max_capacity,
            })?;
        let dst = self.reserve(total)?;
        if T::SIZE > 0 {
            for (value, chunk) in values.iter().zip(dst.chunks_exact_mut(T::SIZE)) {
                value.write_to(chunk);
            }
        }
        Ok(())
    }

    #[inline]
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.reserve(data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// Write a present length/count as a 4-byte signed integer.
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` if `len` does not fit the signed 32-bit prefix.
    #[inline]
    pub fn write_length(&mut self, len: usize) -> Result<()> {
        let len = i32::try_from(len).map_err(|_| CodecError::CapacityExceeded {
            requested: len,
            max: i32::MAX as usize,
        })?;
        self.write(len)
    }

    /// Write the `-1` absent marker.
    #[inline]
    pub fn write_absent(&mut self) -> Result<()> {
        self.write(ABSENT_LENGTH)
    }

    /// The bytes written so far.
    #[inline]
    pub fn as_written_slice(&self) -> &[u8] {
        &self.storage[..self.position]
    }

    /// Copy of the written bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_written_slice().to_vec()
    }

    /// Rewind to position 0, keeping the storage.
    pub fn clear(&mut self) {
        self.position = 0;
    }
}

impl Default for WriteBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WriteBuffer {
    fn drop(&mut self) {
        let storage = std::mem::take(&mut self.storage);
        self.release(storage);
    }
}

impl std::fmt::Debug for WriteBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteBuffer")
            .field("position", &self.position)
            .field("capacity", &self.storage.len())
            .field("max_capacity", &self.max_capacity)
            .field("pooled", &self.pool.is_some())
            .finish()
    }
}
