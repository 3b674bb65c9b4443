// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Rectangular multi-dimensional arrays.
//!
//! Wire form: total element count, one 4-byte extent per dimension, then the
//! elements in row-major order. Jagged arrays are plain nested `Vec`s.

use super::sequence::{decode_items, encode_items};
use super::Wire;
use crate::buffer::{ReadCursor, WriteBuffer};
use crate::error::{CodecError, Result};
use crate::registry::{BuildContext, Processor, Shape};
use std::ops::{Index, IndexMut};

/// Row-major array with `RANK` dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NdArray<T, const RANK: usize> {
    extents: [usize; RANK],
    elements: Vec<T>,
}

impl<T, const RANK: usize> NdArray<T, RANK> {
    /// Wrap row-major `elements` with the given extents.
    ///
    /// # Errors
    ///
    /// `InvalidValue` if the product of `extents` differs from
    /// `elements.len()`.
    pub fn new(extents: [usize; RANK], elements: Vec<T>) -> Result<Self> {
        match element_count(&extents) {
            Some(total) if total == elements.len() => Ok(Self { extents, elements }),
            _ => Err(CodecError::invalid_value(
                std::any::type_name::<Self>(),
                format!(
                    "extents {:?} do not describe {} elements",
                    extents,
                    elements.len()
                ),
            )),
        }
    }

    /// Array of the given extents with every element set to `value`.
    pub fn filled(extents: [usize; RANK], value: T) -> Result<Self>
    where
        T: Clone,
    {
        let total = element_count(&extents).ok_or_else(|| {
            CodecError::invalid_value(std::any::type_name::<Self>(), "element count overflows")
        })?;
        Self::new(extents, vec![value; total])
    }

    pub fn extents(&self) -> [usize; RANK] {
        self.extents
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn flat_index(&self, index: [usize; RANK]) -> Option<usize> {
        let mut flat = 0usize;
        for (i, extent) in index.iter().zip(self.extents.iter()) {
            if i >= extent {
                return None;
            }
            flat = flat * extent + i;
        }
        Some(flat)
    }

    pub fn get(&self, index: [usize; RANK]) -> Option<&T> {
        self.flat_index(index).and_then(|i| self.elements.get(i))
    }

    pub fn get_mut(&mut self, index: [usize; RANK]) -> Option<&mut T> {
        self.flat_index(index).and_then(|i| self.elements.get_mut(i))
    }

    /// Elements in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    pub fn into_vec(self) -> Vec<T> {
        self.elements
    }
}

fn element_count(extents: &[usize]) -> Option<usize> {
    extents.iter().try_fold(1usize, |acc, e| acc.checked_mul(*e))
}

impl<T, const RANK: usize> Default for NdArray<T, RANK> {
    fn default() -> Self {
        Self {
            extents: [0; RANK],
            elements: Vec::new(),
        }
    }
}

impl<T, const RANK: usize> Index<[usize; RANK]> for NdArray<T, RANK> {
    type Output = T;

    fn index(&self, index: [usize; RANK]) -> &T {
        match self.get(index) {
            Some(v) => v,
            None => panic!("index {:?} out of bounds {:?}", index, self.extents),
        }
    }
}

impl<T, const RANK: usize> IndexMut<[usize; RANK]> for NdArray<T, RANK> {
    fn index_mut(&mut self, index: [usize; RANK]) -> &mut T {
        let extents = self.extents;
        match self.get_mut(index) {
            Some(v) => v,
            None => panic!("index {:?} out of bounds {:?}", index, extents),
        }
    }
}

fn read_extents<const RANK: usize>(cursor: &mut ReadCursor<'_>) -> Result<[usize; RANK]> {
    let mut extents = [0usize; RANK];
    for extent in extents.iter_mut() {
        let offset = cursor.offset();
        let raw = cursor.read::<i32>()?;
        *extent = usize::try_from(raw).map_err(|_| CodecError::MalformedLength {
            offset,
            length: i64::from(raw),
        })?;
    }
    Ok(extents)
}

impl<T: Wire, const RANK: usize> Wire for NdArray<T, RANK> {
    #[inline]
    fn shape() -> Shape {
        Shape::MultiArray { rank: RANK }
    }

    fn build_processor(ctx: &mut BuildContext<'_>) -> Result<Processor<Self>> {
        let type_name = std::any::type_name::<Self>();
        if RANK == 0 {
            return Err(CodecError::unsupported(
                type_name,
                "multi-dimensional array needs at least one dimension",
            ));
        }
        let element = ctx.element::<T>()?;
        let enc = element.clone();
        Ok(Processor::new(
            Self::shape(),
            Box::new(move |value: &Self, buf: &mut WriteBuffer| {
                buf.write_length(value.len())?;
                for extent in value.extents {
                    buf.write_length(extent)?;
                }
                encode_items(
                    &enc,
                    value.len(),
                    Some(value.as_slice()),
                    value.elements.iter(),
                    buf,
                )
            }),
            Box::new(move |cursor: &mut ReadCursor<'_>| {
                let count = cursor.read_present_length(type_name)?;
                let extents = read_extents::<RANK>(cursor)?;
                if element_count(&extents) != Some(count) {
                    return Err(CodecError::invalid_value(
                        type_name,
                        format!("extents {:?} do not describe {} elements", extents, count),
                    ));
                }
                let elements = decode_items(&element, count, cursor)?;
                Ok(NdArray { extents, elements })
            }),
        ))
    }
}
