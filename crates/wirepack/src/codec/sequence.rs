// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Length-prefixed homogeneous sequences.
//!
//! Wire form: 4-byte signed element count, then the elements in iteration
//! order. Fixed-layout elements are written and read as one contiguous block;
//! everything else dispatches per element. The absent (`-1`) form belongs to
//! `Option<_>`.

use super::Wire;
use crate::buffer::{ReadCursor, WriteBuffer};
use crate::error::{CodecError, Result};
use crate::registry::{BuildContext, ElementCodec, FixedOps, Processor, Shape};
use std::collections::{BTreeSet, HashSet, LinkedList, VecDeque};
use std::hash::{BuildHasher, Hash};

/// Container side of the sequence codec.
pub trait SequenceContainer: Sized + 'static {
    type Item: Wire;
    type Iter<'a>: Iterator<Item = &'a Self::Item>
    where
        Self: 'a;

    /// `Collection` for resizable containers, `Array` for fixed-size ones.
    const SHAPE: Shape;

    fn item_count(&self) -> usize;

    fn iter_items(&self) -> Self::Iter<'_>;

    /// Contiguous storage, when the container has one.
    fn as_contiguous(&self) -> Option<&[Self::Item]> {
        None
    }

    /// Exact count a decoded sequence must have.
    fn required_count() -> Option<usize> {
        None
    }

    /// Rebuild from decoded items in wire order.
    fn from_items(items: Vec<Self::Item>) -> Result<Self>;
}

/// Write `count` fixed-layout items as one block.
pub(crate) fn write_fixed_run<'v, T: 'v>(
    ops: &FixedOps<T>,
    count: usize,
    items: impl Iterator<Item = &'v T>,
    buf: &mut WriteBuffer,
) -> Result<()> {
    let total = count
        .checked_mul(ops.size)
        .ok_or(CodecError::CapacityExceeded {
            requested: usize::MAX,
            max: buf.max_capacity(),
        })?;
    let dst = buf.reserve(total)?;
    if ops.size > 0 {
        for (item, chunk) in items.zip(dst.chunks_exact_mut(ops.size)) {
            (ops.write)(item, chunk);
        }
    }
    Ok(())
}

/// Write `count` items (no prefix) with the element strategy.
pub(crate) fn encode_items<'v, T: 'v>(
    element: &ElementCodec<T>,
    count: usize,
    contiguous: Option<&'v [T]>,
    items: impl Iterator<Item = &'v T>,
    buf: &mut WriteBuffer,
) -> Result<()> {
    match element {
        ElementCodec::Fixed(ops) => match contiguous {
            Some(slice) => {
                let total = slice.len() * ops.size;
                let dst = buf.reserve(total)?;
                (ops.write_slice)(slice, dst);
                Ok(())
            }
            None => write_fixed_run(ops, count, items, buf),
        },
        ElementCodec::Dispatch(processor) => {
            let processor = processor.get()?;
            for item in items {
                processor.encode(item, buf)?;
            }
            Ok(())
        }
    }
}

/// Read `count` items (prefix already consumed) with the element strategy.
pub(crate) fn decode_items<T>(
    element: &ElementCodec<T>,
    count: usize,
    cursor: &mut ReadCursor<'_>,
) -> Result<Vec<T>> {
    cursor.check_count(count)?;
    match element {
        ElementCodec::Fixed(ops) => (ops.read_vec)(cursor, count),
        ElementCodec::Dispatch(processor) => {
            let processor = processor.get()?;
            // A hostile count cannot make us allocate beyond the input size.
            let mut items = Vec::with_capacity(count.min(cursor.remaining()));
            for _ in 0..count {
                items.push(processor.decode(cursor)?);
            }
            Ok(items)
        }
    }
}

pub(crate) fn build_sequence<C: SequenceContainer>(
    ctx: &mut BuildContext<'_>,
) -> Result<Processor<C>> {
    let type_name = std::any::type_name::<C>();
    let element = ctx.element::<C::Item>()?;
    let enc = element.clone();
    Ok(Processor::new(
        C::SHAPE,
        Box::new(move |value: &C, buf: &mut WriteBuffer| {
            let count = value.item_count();
            buf.write_length(count)?;
            encode_items(&enc, count, value.as_contiguous(), value.iter_items(), buf)
        }),
        Box::new(move |cursor: &mut ReadCursor<'_>| {
            let count = cursor.read_present_length(type_name)?;
            if let Some(expected) = C::required_count() {
                if count != expected {
                    return Err(CodecError::invalid_value(
                        type_name,
                        format!("decoded {count} elements, expected {expected}"),
                    ));
                }
            }
            C::from_items(decode_items(&element, count, cursor)?)
        }),
    ))
}

fn duplicate<C>() -> CodecError {
    CodecError::invalid_value(std::any::type_name::<C>(), "duplicate element in set")
}

impl<T: Wire> SequenceContainer for Vec<T> {
    type Item = T;
    type Iter<'a> = std::slice::Iter<'a, T>;
    const SHAPE: Shape = Shape::Collection;

    fn item_count(&self) -> usize {
        self.len()
    }

    fn iter_items(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn as_contiguous(&self) -> Option<&[T]> {
        Some(self.as_slice())
    }

    fn from_items(items: Vec<T>) -> Result<Self> {
        Ok(items)
    }
}

impl<T: Wire> SequenceContainer for VecDeque<T> {
    type Item = T;
    type Iter<'a> = std::collections::vec_deque::Iter<'a, T>;
    const SHAPE: Shape = Shape::Collection;

    fn item_count(&self) -> usize {
        self.len()
    }

    fn iter_items(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn as_contiguous(&self) -> Option<&[T]> {
        match self.as_slices() {
            (front, []) => Some(front),
            _ => None,
        }
    }

    fn from_items(items: Vec<T>) -> Result<Self> {
        Ok(VecDeque::from(items))
    }
}

impl<T: Wire> SequenceContainer for LinkedList<T> {
    type Item = T;
    type Iter<'a> = std::collections::linked_list::Iter<'a, T>;
    const SHAPE: Shape = Shape::Collection;

    fn item_count(&self) -> usize {
        self.len()
    }

    fn iter_items(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn from_items(items: Vec<T>) -> Result<Self> {
        Ok(items.into_iter().collect())
    }
}

impl<T: Wire + Eq + Hash, S: BuildHasher + Default + 'static> SequenceContainer for HashSet<T, S> {
    type Item = T;
    type Iter<'a> = std::collections::hash_set::Iter<'a, T>;
    const SHAPE: Shape = Shape::Collection;

    fn item_count(&self) -> usize {
        self.len()
    }

    fn iter_items(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn from_items(items: Vec<T>) -> Result<Self> {
        let mut set = HashSet::with_capacity_and_hasher(items.len(), S::default());
        for item in items {
            if !set.insert(item) {
                return Err(duplicate::<Self>());
            }
        }
        Ok(set)
    }
}

impl<T: Wire + Ord> SequenceContainer for BTreeSet<T> {
    type Item = T;
    type Iter<'a> = std::collections::btree_set::Iter<'a, T>;
    const SHAPE: Shape = Shape::Collection;

    fn item_count(&self) -> usize {
        self.len()
    }

    fn iter_items(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn from_items(items: Vec<T>) -> Result<Self> {
        let mut set = BTreeSet::new();
        for item in items {
            if !set.insert(item) {
                return Err(duplicate::<Self>());
            }
        }
        Ok(set)
    }
}

impl<T: Wire> SequenceContainer for Box<[T]> {
    type Item = T;
    type Iter<'a> = std::slice::Iter<'a, T>;
    const SHAPE: Shape = Shape::Array;

    fn item_count(&self) -> usize {
        self.len()
    }

    fn iter_items(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn as_contiguous(&self) -> Option<&[T]> {
        Some(&self[..])
    }

    fn from_items(items: Vec<T>) -> Result<Self> {
        Ok(items.into_boxed_slice())
    }
}

impl<T: Wire, const N: usize> SequenceContainer for [T; N] {
    type Item = T;
    type Iter<'a> = std::slice::Iter<'a, T>;
    const SHAPE: Shape = Shape::Array;

    fn item_count(&self) -> usize {
        N
    }

    fn iter_items(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn as_contiguous(&self) -> Option<&[T]> {
        Some(&self[..])
    }

    fn required_count() -> Option<usize> {
        Some(N)
    }

    fn from_items(items: Vec<T>) -> Result<Self> {
        <[T; N]>::try_from(items).map_err(|items| {
            CodecError::invalid_value(
                std::any::type_name::<Self>(),
                format!("decoded {} elements, expected {}", items.len(), N),
            )
        })
    }
}

macro_rules! impl_sequence_wire {
    ($(impl[$($gen:tt)*] for $ty:ty;)*) => {
        $(
            impl<$($gen)*> Wire for $ty {
                #[inline]
                fn shape() -> Shape {
                    <Self as SequenceContainer>::SHAPE
                }

                fn build_processor(ctx: &mut BuildContext<'_>) -> Result<Processor<Self>> {
                    build_sequence::<Self>(ctx)
                }
            }
        )*
    };
}

impl_sequence_wire! {
    impl[T: Wire] for Vec<T>;
    impl[T: Wire] for VecDeque<T>;
    impl[T: Wire] for LinkedList<T>;
    impl[T: Wire + Eq + Hash, S: BuildHasher + Default + 'static] for HashSet<T, S>;
    impl[T: Wire + Ord] for BTreeSet<T>;
    impl[T: Wire] for Box<[T]>;
    impl[T: Wire, const N: usize] for [T; N];
}
