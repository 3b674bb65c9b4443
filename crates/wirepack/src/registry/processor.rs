// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Processors: the encode/decode routine pair built once per type.

use crate::buffer::{ReadCursor, WriteBuffer};
use crate::codec::object::{MemberInfo, ObjectDescriptor};
use crate::codec::Wire;
use crate::error::{CodecError, Result};
use crate::layout::FixedLayout;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Static classification of a type into one codec strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Fixed-layout scalar or flat struct written as raw bytes.
    Fixed { size: usize },
    /// `bool`: fixed-layout, but nullable wrappers compact it to one byte.
    Bool,
    /// UTF-8 text with a length prefix.
    Text,
    /// `Option<T>` over another shape.
    Nullable,
    /// Length-prefixed vector that cannot be resized (`Box<[T]>`, `[T; N]`).
    Array,
    /// Row-major array with `rank` extents after the count.
    MultiArray { rank: usize },
    /// Bit length followed by the backing words.
    BitVector,
    /// Length-prefixed resizable sequence or set.
    Collection,
    /// Pair count followed by key/value pairs.
    Map,
    /// Member-wise object; `reference` objects carry a presence flag.
    Object { reference: bool },
}

impl Shape {
    /// Raw-byte types eligible for block copies.
    pub fn is_fixed_layout(self) -> bool {
        matches!(self, Shape::Fixed { .. } | Shape::Bool)
    }

    /// Shapes whose absent form is the `-1` length/count marker.
    pub fn uses_length_sentinel(self) -> bool {
        matches!(
            self,
            Shape::Text
                | Shape::Array
                | Shape::MultiArray { .. }
                | Shape::BitVector
                | Shape::Collection
                | Shape::Map
        )
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Fixed { size } => write!(f, "fixed({size} B)"),
            Shape::Bool => write!(f, "bool"),
            Shape::Text => write!(f, "text"),
            Shape::Nullable => write!(f, "nullable"),
            Shape::Array => write!(f, "array"),
            Shape::MultiArray { rank } => write!(f, "array(rank {rank})"),
            Shape::BitVector => write!(f, "bit-vector"),
            Shape::Collection => write!(f, "collection"),
            Shape::Map => write!(f, "map"),
            Shape::Object { reference: true } => write!(f, "object(reference)"),
            Shape::Object { reference: false } => write!(f, "object(value)"),
        }
    }
}

/// Encode routine of a processor.
pub type EncodeFn<T> = Box<dyn Fn(&T, &mut WriteBuffer) -> Result<()> + Send + Sync>;
/// Decode routine of a processor.
pub type DecodeFn<T> = Box<dyn for<'a> Fn(&mut ReadCursor<'a>) -> Result<T> + Send + Sync>;

/// Raw-byte routines of a fixed-layout type, monomorphized per type.
///
/// Collection codecs use these to copy whole element runs as one block.
pub struct FixedOps<T> {
    pub size: usize,
    pub write: fn(&T, &mut [u8]),
    pub read: fn(&[u8]) -> Result<T>,
    pub write_slice: fn(&[T], &mut [u8]),
    pub read_vec: fn(&mut ReadCursor<'_>, usize) -> Result<Vec<T>>,
}

impl<T: FixedLayout> FixedOps<T> {
    pub fn of() -> Self {
        Self {
            size: T::SIZE,
            write: T::write_to,
            read: T::read_from,
            write_slice: write_block::<T>,
            read_vec: read_block::<T>,
        }
    }
}

impl<T> FixedOps<T> {
    /// Reserve `size` bytes and write one value.
    #[inline]
    pub fn encode(&self, value: &T, buf: &mut WriteBuffer) -> Result<()> {
        let dst = buf.reserve(self.size)?;
        (self.write)(value, dst);
        Ok(())
    }

    #[inline]
    pub fn decode(&self, cursor: &mut ReadCursor<'_>) -> Result<T> {
        let bytes = cursor.read_bytes(self.size)?;
        (self.read)(bytes)
    }
}

fn write_block<T: FixedLayout>(values: &[T], dst: &mut [u8]) {
    if T::SIZE == 0 {
        return;
    }
    for (value, chunk) in values.iter().zip(dst.chunks_exact_mut(T::SIZE)) {
        value.write_to(chunk);
    }
}

fn read_block<T: FixedLayout>(cursor: &mut ReadCursor<'_>, count: usize) -> Result<Vec<T>> {
    cursor.read_vec(count)
}

impl<T> Clone for FixedOps<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FixedOps<T> {}

impl<T> fmt::Debug for FixedOps<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedOps").field("size", &self.size).finish()
    }
}

/// The encode/decode routine pair for one closed type.
///
/// Immutable once built; shared through the registry for the lifetime of the
/// process.
pub struct Processor<T> {
    type_name: &'static str,
    shape: Shape,
    fixed: Option<FixedOps<T>>,
    object: Option<Arc<ObjectDescriptor>>,
    encode: EncodeFn<T>,
    decode: DecodeFn<T>,
}

impl<T: 'static> Processor<T> {
    pub fn new(shape: Shape, encode: EncodeFn<T>, decode: DecodeFn<T>) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            shape,
            fixed: None,
            object: None,
            encode,
            decode,
        }
    }

    /// Raw-byte processor of a fixed-layout type.
    pub fn fixed() -> Self
    where
        T: FixedLayout + Wire,
    {
        let ops = FixedOps::<T>::of();
        let mut processor = Self::new(
            T::shape(),
            Box::new(move |value: &T, buf: &mut WriteBuffer| ops.encode(value, buf)),
            Box::new(move |cursor: &mut ReadCursor<'_>| ops.decode(cursor)),
        );
        processor.fixed = Some(ops);
        processor
    }

    pub(crate) fn with_object(mut self, descriptor: ObjectDescriptor) -> Self {
        self.object = Some(Arc::new(descriptor));
        self
    }
}

impl<T> Processor<T> {
    #[inline]
    pub fn encode(&self, value: &T, buf: &mut WriteBuffer) -> Result<()> {
        (self.encode)(value, buf)
    }

    #[inline]
    pub fn decode(&self, cursor: &mut ReadCursor<'_>) -> Result<T> {
        (self.decode)(cursor)
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Raw-byte routines, for fixed-layout types only.
    pub fn fixed_ops(&self) -> Option<FixedOps<T>> {
        self.fixed
    }

    /// Member table, for member-wise objects only.
    pub fn object(&self) -> Option<&ObjectDescriptor> {
        self.object.as_deref()
    }

    /// Selected members in wire order (empty for non-objects).
    pub fn members(&self) -> &[MemberInfo] {
        self.object
            .as_deref()
            .map(|o| o.members.as_slice())
            .unwrap_or(&[])
    }
}

impl<T> fmt::Debug for Processor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor")
            .field("type_name", &self.type_name)
            .field("shape", &self.shape)
            .field("fixed", &self.fixed.is_some())
            .field("members", &self.members().len())
            .finish()
    }
}

/// Slot filled once a recursive type's build completes.
pub(crate) type DeferredSlot<T> = OnceLock<Arc<Processor<T>>>;

/// Handle to a nested type's processor.
///
/// `Deferred` is handed out when a type is requested while its own build is
/// still in progress (self-referential graphs); the slot is filled before the
/// build is committed, so a committed processor never sees it empty.
pub enum ProcessorRef<T> {
    Ready(Arc<Processor<T>>),
    Deferred {
        shape: Shape,
        slot: Arc<DeferredSlot<T>>,
    },
}

impl<T> ProcessorRef<T> {
    pub fn shape(&self) -> Shape {
        match self {
            ProcessorRef::Ready(p) => p.shape(),
            ProcessorRef::Deferred { shape, .. } => *shape,
        }
    }

    /// Raw-byte routines; never available through a deferred handle.
    pub fn fixed_ops(&self) -> Option<FixedOps<T>> {
        match self {
            ProcessorRef::Ready(p) => p.fixed_ops(),
            ProcessorRef::Deferred { .. } => None,
        }
    }

    #[inline]
    pub fn get(&self) -> Result<&Processor<T>> {
        match self {
            ProcessorRef::Ready(p) => Ok(p),
            ProcessorRef::Deferred { slot, .. } => {
                slot.get().map(|p| &**p).ok_or_else(|| {
                    CodecError::unsupported(
                        std::any::type_name::<T>(),
                        "recursive processor used before its build completed",
                    )
                })
            }
        }
    }

    #[inline]
    pub fn encode(&self, value: &T, buf: &mut WriteBuffer) -> Result<()> {
        self.get()?.encode(value, buf)
    }

    #[inline]
    pub fn decode(&self, cursor: &mut ReadCursor<'_>) -> Result<T> {
        self.get()?.decode(cursor)
    }
}

impl<T> Clone for ProcessorRef<T> {
    fn clone(&self) -> Self {
        match self {
            ProcessorRef::Ready(p) => ProcessorRef::Ready(Arc::clone(p)),
            ProcessorRef::Deferred { shape, slot } => ProcessorRef::Deferred {
                shape: *shape,
                slot: Arc::clone(slot),
            },
        }
    }
}

/// How a container encodes one element, key or value.
///
/// Decided once at build time: fixed-layout elements are copied as raw bytes
/// without going through a processor, everything else dispatches to the
/// element type's processor.
pub enum ElementCodec<T> {
    Fixed(FixedOps<T>),
    Dispatch(ProcessorRef<T>),
}

impl<T> ElementCodec<T> {
    pub fn from_ref(processor: ProcessorRef<T>) -> Self {
        match processor.fixed_ops() {
            Some(ops) => ElementCodec::Fixed(ops),
            None => ElementCodec::Dispatch(processor),
        }
    }

    pub fn fixed_ops(&self) -> Option<FixedOps<T>> {
        match self {
            ElementCodec::Fixed(ops) => Some(*ops),
            ElementCodec::Dispatch(_) => None,
        }
    }

    #[inline]
    pub fn encode(&self, value: &T, buf: &mut WriteBuffer) -> Result<()> {
        match self {
            ElementCodec::Fixed(ops) => ops.encode(value, buf),
            ElementCodec::Dispatch(p) => p.encode(value, buf),
        }
    }

    #[inline]
    pub fn decode(&self, cursor: &mut ReadCursor<'_>) -> Result<T> {
        match self {
            ElementCodec::Fixed(ops) => ops.decode(cursor),
            ElementCodec::Dispatch(p) => p.decode(cursor),
        }
    }
}

impl<T> Clone for ElementCodec<T> {
    fn clone(&self) -> Self {
        match self {
            ElementCodec::Fixed(ops) => ElementCodec::Fixed(*ops),
            ElementCodec::Dispatch(p) => ElementCodec::Dispatch(p.clone()),
        }
    }
}
