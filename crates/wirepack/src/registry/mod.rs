// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide processor cache.
//!
//! Lookups of already-built processors go through the concurrent map only and
//! never take a lock. First-time requests serialize on a build lock, re-check
//! the map, build the root type and everything reachable from it inside a
//! [`BuildContext`], and publish the result with insert-if-absent. A failed
//! build publishes nothing.

mod context;
pub mod processor;


pub use context::BuildContext;
pub use processor::{ElementCodec, FixedOps, Processor, ProcessorRef, Shape};

use crate::codec::Wire;
use crate::error::{CodecError, Result};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

/// Registry hit/miss statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    /// Requests served from the cache.
    pub hits: u64,
    /// Requests that had to build.
    pub misses: u64,
    /// Processors published (roots and nested types).
    pub builds: u64,
    /// Root builds that failed.
    pub failed_builds: u64,
    /// Duration of the most recent root build.
    pub last_build_ns: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
    failed_builds: AtomicU64,
    last_build_ns: AtomicU64,
}

/// Cache of processors keyed by type.
pub struct ProcessorRegistry {
    processors: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    build_lock: Mutex<()>,
    counters: Counters,
}

static GLOBAL_REGISTRY: OnceLock<ProcessorRegistry> = OnceLock::new();

impl ProcessorRegistry {
    /// Empty registry, independent of the global one.
    pub fn new() -> Self {
        Self {
            processors: DashMap::new(),
            build_lock: Mutex::new(()),
            counters: Counters::default(),
        }
    }

    /// The process-wide registry used by the top-level entry points.
    pub fn global() -> &'static ProcessorRegistry {
        GLOBAL_REGISTRY.get_or_init(ProcessorRegistry::new)
    }

    /// Processor for `T`, built on first use.
    ///
    /// # Errors
    ///
    /// `UnsupportedType` if `T` or anything reachable from it has no codec
    /// strategy. The error is returned to every caller that requests `T`
    /// until the type changes; nothing is cached.
    pub fn processor<T: Wire>(&self) -> Result<Arc<Processor<T>>> {
        if let Some(hit) = self.lookup::<T>() {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }

        let _guard = self.build_lock.lock();
        if let Some(hit) = self.lookup::<T>() {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }
        self.counters.misses.fetch_add(1, Ordering::Relaxed);

        let start = Instant::now();
        let mut ctx = BuildContext::new(self);
        let built = match ctx.build::<T>() {
            Ok(built) => built,
            Err(err) => {
                self.counters.failed_builds.fetch_add(1, Ordering::Relaxed);
                log::warn!(
                    "[registry] cannot build processor for {}: {}",
                    std::any::type_name::<T>(),
                    err
                );
                return Err(err);
            }
        };
        debug_assert_eq!(
            built.type_name(),
            std::any::type_name::<T>(),
            "processor must be built for the requested type"
        );

        let staged = ctx.staged();
        let inserted = ctx.commit();
        self.counters
            .builds
            .fetch_add(inserted as u64, Ordering::Relaxed);
        self.counters.last_build_ns.store(
            u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX),
            Ordering::Relaxed,
        );
        log::debug!(
            "[registry] committed {}/{} processors for root {} in {:?}",
            inserted,
            staged,
            std::any::type_name::<T>(),
            start.elapsed()
        );

        // Committed under the build lock, so the entry is ours.
        self.lookup::<T>().ok_or_else(|| {
            CodecError::unsupported(
                std::any::type_name::<T>(),
                "processor missing from the registry after commit",
            )
        })
    }

    /// Lock-free cache probe.
    pub(crate) fn lookup<T: Wire>(&self) -> Option<Arc<Processor<T>>> {
        let entry = self.processors.get(&TypeId::of::<T>())?;
        Arc::clone(entry.value()).downcast::<Processor<T>>().ok()
    }

    pub(crate) fn insert_erased(&self, id: TypeId, processor: Arc<dyn Any + Send + Sync>) -> bool {
        match self.processors.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(processor);
                true
            }
        }
    }

    /// True if a processor for `T` has been published.
    pub fn contains<T: Wire>(&self) -> bool {
        self.processors.contains_key(&TypeId::of::<T>())
    }

    /// Number of published processors.
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            builds: self.counters.builds.load(Ordering::Relaxed),
            failed_builds: self.counters.failed_builds.load(Ordering::Relaxed),
            last_build_ns: self.counters.last_build_ns.load(Ordering::Relaxed),
        }
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("processors", &self.processors.len())
            .field("stats", &self.stats())
            .finish()
    }
}
