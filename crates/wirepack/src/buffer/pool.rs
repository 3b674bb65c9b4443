// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared pool of write buffer storage.
//!
//! Storage is grouped in power-of-two size classes from 256 B to 16 MiB. Each
//! class is a bounded lock-free queue, so `rent`/`give_back` are safe from any
//! thread. Requests above the largest class are served by a plain allocation
//! and never retained.

use crate::config::{
    POOL_CLASS_COUNT, POOL_MAX_CLASS_SHIFT, POOL_MIN_CLASS_SHIFT, POOL_RETAINED_PER_CLASS,
};
use crossbeam::queue::ArrayQueue;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Pool counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Rents served from a retained buffer.
    pub reused: u64,
    /// Rents that had to allocate.
    pub allocated: u64,
    /// Buffers accepted back into a class.
    pub returned: u64,
    /// Buffers dropped on return (odd size or class full).
    pub discarded: u64,
}

#[derive(Debug, Default)]
struct Counters {
    reused: AtomicU64,
    allocated: AtomicU64,
    returned: AtomicU64,
    discarded: AtomicU64,
}

/// Size-class pool of byte storage.
pub struct BufferPool {
    classes: Vec<ArrayQueue<Vec<u8>>>,
    counters: Counters,
}

impl BufferPool {
    pub fn new() -> Self {
        Self::with_retention(POOL_RETAINED_PER_CLASS)
    }

    /// Pool keeping at most `per_class` idle buffers in each size class.
    pub fn with_retention(per_class: usize) -> Self {
        let per_class = per_class.max(1);
        let classes = (0..POOL_CLASS_COUNT)
            .map(|_| ArrayQueue::new(per_class))
            .collect();
        Self {
            classes,
            counters: Counters::default(),
        }
    }

    /// Length of the storage `rent(min_len)` hands out.
    ///
    /// The smallest class that fits, or `min_len` itself above the largest
    /// class.
    pub fn class_len(min_len: usize) -> usize {
        match Self::class_index(min_len) {
            Some(idx) => 1usize << (idx as u32 + POOL_MIN_CLASS_SHIFT),
            None => min_len,
        }
    }

    fn class_index(len: usize) -> Option<usize> {
        if len > (1usize << POOL_MAX_CLASS_SHIFT) {
            return None;
        }
        let shift = len
            .next_power_of_two()
            .trailing_zeros()
            .max(POOL_MIN_CLASS_SHIFT);
        Some((shift - POOL_MIN_CLASS_SHIFT) as usize)
    }

    /// Rent zero-or-stale-filled storage of `class_len(min_len)` bytes.
    ///
    /// The contents are unspecified; callers only expose what they write.
    pub fn rent(&self, min_len: usize) -> Vec<u8> {
        let len = Self::class_len(min_len);
        if let Some(idx) = Self::class_index(min_len) {
            if let Some(buf) = self.classes[idx].pop() {
                self.counters.reused.fetch_add(1, Ordering::Relaxed);
                return buf;
            }
        }
        self.counters.allocated.fetch_add(1, Ordering::Relaxed);
        vec![0u8; len]
    }

    /// Return storage obtained from [`rent`](Self::rent).
    ///
    /// Storage whose length is not exactly a size class is dropped.
    pub fn give_back(&self, buf: Vec<u8>) {
        let len = buf.len();
        let idx = match Self::class_index(len) {
            Some(idx) if Self::class_len(len) == len => idx,
            _ => {
                self.counters.discarded.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };
        if self.classes[idx].push(buf).is_err() {
            self.counters.discarded.fetch_add(1, Ordering::Relaxed);
            log::debug!("[pool] size class {} B full, dropping buffer", len);
        } else {
            self.counters.returned.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Idle buffers currently retained across all classes.
    pub fn idle(&self) -> usize {
        self.classes.iter().map(ArrayQueue::len).sum()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            reused: self.counters.reused.load(Ordering::Relaxed),
            allocated: self.counters.allocated.load(Ordering::Relaxed),
            returned: self.counters.returned.load(Ordering::Relaxed),
            discarded: self.counters.discarded.load(Ordering::Relaxed),
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool")
            .field("idle", &self.idle())
            .field("stats", &self.stats())
            .finish()
    }
}

static GLOBAL_POOL: OnceLock<Arc<BufferPool>> = OnceLock::new();

/// Process-wide pool (created on first use).
pub fn global() -> Arc<BufferPool> {
    GLOBAL_POOL
        .get_or_init(|| Arc::new(BufferPool::new()))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_class_len_rounds_to_power_of_two() {
        assert_eq!(BufferPool::class_len(0), 256);
        assert_eq!(BufferPool::class_len(1), 256);
        assert_eq!(BufferPool::class_len(256), 256);
        assert_eq!(BufferPool::class_len(257), 512);
        assert_eq!(BufferPool::class_len(1 << 24), 1 << 24);
        assert_eq!(BufferPool::class_len((1 << 24) + 1), (1 << 24) + 1);
    }

    #[test]
    fn test_rent_reuses_returned_storage() {
        let pool = BufferPool::new();
        let buf = pool.rent(300);
        assert_eq!(buf.len(), 512);
        pool.give_back(buf);
        assert_eq!(pool.idle(), 1);

        let again = pool.rent(400);
        assert_eq!(again.len(), 512);
        let stats = pool.stats();
        assert_eq!(stats.allocated, 1);
        assert_eq!(stats.reused, 1);
        assert_eq!(stats.returned, 1);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_give_back_discards_odd_sizes() {
        let pool = BufferPool::new();
        pool.give_back(vec![0u8; 300]);
        pool.give_back(vec![0u8; 64]);
        pool.give_back(vec![0u8; (1 << 24) + 1]);
        assert_eq!(pool.idle(), 0);
        assert_eq!(pool.stats().discarded, 3);
    }

    #[test]
    fn test_full_class_drops_extra_buffers() {
        let pool = BufferPool::with_retention(2);
        for _ in 0..3 {
            pool.give_back(vec![0u8; 256]);
        }
        assert_eq!(pool.idle(), 2);
        assert_eq!(pool.stats().discarded, 1);
    }

    #[test]
    fn test_concurrent_rent_and_return() {
        let pool = Arc::new(BufferPool::with_retention(8));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for i in 0..200 {
                        let buf = pool.rent(256 << (i % 3));
                        assert!(buf.len() >= 256);
                        pool.give_back(buf);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let stats = pool.stats();
        assert_eq!(stats.reused + stats.allocated, 800);
        assert_eq!(stats.returned + stats.discarded, 800);
        assert!(pool.idle() <= 8 * 3);
    }
}
