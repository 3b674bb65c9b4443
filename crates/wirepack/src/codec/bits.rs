// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Packed bit-vector.
//!
//! Wire form: logical bit length (4-byte signed), then `ceil(len / 32)`
//! little-endian `u32` words. Bit `i` lives in word `i / 32`, bit `i % 32`.
//! The word count is implied by the bit length and is not written again.

use super::Wire;
use crate::buffer::{ReadCursor, WriteBuffer};
use crate::error::Result;
use crate::registry::{BuildContext, Processor, Shape};

const WORD_BITS: usize = 32;

/// Growable vector of bits backed by `u32` words.
///
/// Bits past `len` in the last word are always zero, so equality compares the
/// logical contents only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BitVector {
    len: usize,
    words: Vec<u32>,
}

fn words_for(len: usize) -> usize {
    len.div_ceil(WORD_BITS)
}

impl BitVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// `len` bits, all cleared.
    pub fn zeros(len: usize) -> Self {
        Self {
            len,
            words: vec![0; words_for(len)],
        }
    }

    /// Rebuild from raw words, clearing any bits past `len`.
    ///
    /// Missing words are treated as zero and extra words are dropped.
    pub fn from_words(len: usize, mut words: Vec<u32>) -> Self {
        words.resize(words_for(len), 0);
        let mut bits = Self { len, words };
        bits.clear_tail();
        bits
    }

    fn clear_tail(&mut self) {
        let used = self.len % WORD_BITS;
        if used != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u32 << used) - 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        (index < self.len).then(|| self.words[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0)
    }

    /// Set bit `index`; returns `false` if it is out of range.
    pub fn set(&mut self, index: usize, value: bool) -> bool {
        if index >= self.len {
            return false;
        }
        let mask = 1u32 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
        true
    }

    pub fn push(&mut self, value: bool) {
        if self.len % WORD_BITS == 0 {
            self.words.push(0);
        }
        self.len += 1;
        self.set(self.len - 1, value);
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.words[i / WORD_BITS] & (1 << (i % WORD_BITS)) != 0)
    }
}

impl FromIterator<bool> for BitVector {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut bits = BitVector::new();
        for bit in iter {
            bits.push(bit);
        }
        bits
    }
}

impl Wire for BitVector {
    #[inline]
    fn shape() -> Shape {
        Shape::BitVector
    }

    fn build_processor(_ctx: &mut BuildContext<'_>) -> Result<Processor<Self>> {
        Ok(Processor::new(
            Shape::BitVector,
            Box::new(|value: &Self, buf: &mut WriteBuffer| {
                buf.write_length(value.len)?;
                buf.write_slice(&value.words)
            }),
            Box::new(|cursor: &mut ReadCursor<'_>| -> Result<Self> {
                let len = cursor.read_present_length(std::any::type_name::<Self>())?;
                let words = cursor.read_vec::<u32>(words_for(len))?;
                Ok(BitVector::from_words(len, words))
            }),
        ))
    }
}
