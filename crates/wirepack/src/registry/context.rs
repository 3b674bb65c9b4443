// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Build context threaded through one root processor build.

use super::processor::{DeferredSlot, ElementCodec, Processor, ProcessorRef};
use super::ProcessorRegistry;
use crate::codec::Wire;
use crate::error::Result;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

type Erased = Arc<dyn Any + Send + Sync>;

/// Resolves nested processors while a root type is being built.
///
/// Everything built here is staged privately and only becomes visible in the
/// registry through [`commit`](Self::commit), which the registry calls once
/// the root build has succeeded.
pub struct BuildContext<'r> {
    registry: &'r ProcessorRegistry,
    staged: HashMap<TypeId, Erased>,
    in_progress: HashMap<TypeId, Erased>,
    depth: usize,
}

impl<'r> BuildContext<'r> {
    pub(crate) fn new(registry: &'r ProcessorRegistry) -> Self {
        Self {
            registry,
            staged: HashMap::new(),
            in_progress: HashMap::new(),
            depth: 0,
        }
    }

    /// Processor handle for `T`, building it if nothing has it yet.
    ///
    /// A type requested while its own build is still running gets a deferred
    /// handle; this is what makes `struct Node { next: Option<Box<Node>> }`
    /// buildable.
    pub fn resolve<T: Wire>(&mut self) -> Result<ProcessorRef<T>> {
        let id = TypeId::of::<T>();

        if let Some(cached) = self.registry.lookup::<T>() {
            return Ok(ProcessorRef::Ready(cached));
        }
        if let Some(staged) = self.staged.get(&id) {
            if let Ok(processor) = Arc::clone(staged).downcast::<Processor<T>>() {
                return Ok(ProcessorRef::Ready(processor));
            }
        }
        if let Some(pending) = self.in_progress.get(&id) {
            if let Ok(slot) = Arc::clone(pending).downcast::<DeferredSlot<T>>() {
                log::trace!(
                    "[registry] deferring recursive reference to {}",
                    std::any::type_name::<T>()
                );
                return Ok(ProcessorRef::Deferred {
                    shape: T::shape(),
                    slot,
                });
            }
        }

        self.build::<T>().map(ProcessorRef::Ready)
    }

    /// Element strategy for `T`: raw bytes when fixed-layout, dispatch
    /// otherwise.
    pub fn element<T: Wire>(&mut self) -> Result<ElementCodec<T>> {
        self.resolve::<T>().map(ElementCodec::from_ref)
    }

    /// Build `T` unconditionally and stage the result.
    pub(crate) fn build<T: Wire>(&mut self) -> Result<Arc<Processor<T>>> {
        let id = TypeId::of::<T>();
        let slot: Arc<DeferredSlot<T>> = Arc::new(DeferredSlot::new());
        self.in_progress.insert(id, slot.clone());

        self.depth += 1;
        let built = T::build_processor(self);
        self.depth -= 1;
        self.in_progress.remove(&id);

        let processor = Arc::new(built?);
        // Fresh slot, nothing else can have filled it.
        let _ = slot.set(Arc::clone(&processor));
        log::debug!(
            "[registry] built processor for {} ({}, {} members, depth {})",
            processor.type_name(),
            processor.shape(),
            processor.members().len(),
            self.depth
        );
        self.staged.insert(id, processor.clone());
        Ok(processor)
    }

    /// Number of processors staged so far.
    pub fn staged(&self) -> usize {
        self.staged.len()
    }

    /// Publish every staged processor (insert-if-absent); returns how many
    /// were new.
    pub(crate) fn commit(self) -> usize {
        let mut inserted = 0;
        for (id, processor) in self.staged {
            if self.registry.insert_erased(id, processor) {
                inserted += 1;
            }
        }
        inserted
    }
}

impl std::fmt::Debug for BuildContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("staged", &self.staged.len())
            .field("in_progress", &self.in_progress.len())
            .field("depth", &self.depth)
            .finish()
    }
}
