// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounds-checked read cursor over a borrowed byte span.

use super::writer::ABSENT_LENGTH;
use crate::config::MAX_UNBACKED_ELEMENTS;
use crate::error::{CodecError, Result};
use crate::layout::FixedLayout;

/// Borrowed byte span plus a monotonically advancing read position.
///
/// Every read is bounds-checked; running off the end yields
/// `CodecError::BufferUnderrun` and leaves the position unchanged.
#[derive(Debug, Clone)]
pub struct ReadCursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> ReadCursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    fn underrun(&self, needed: usize) -> CodecError {
        CodecError::BufferUnderrun {
            offset: self.offset,
            needed,
            available: self.remaining(),
        }
    }

    /// Borrow the next `len` bytes and advance past them.
    #[inline]
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(self.underrun(len));
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    /// Copy the next `dst.len()` bytes into `dst`.
    pub fn read_into(&mut self, dst: &mut [u8]) -> Result<()> {
        dst.copy_from_slice(self.read_bytes(dst.len())?);
        Ok(())
    }

    /// Read a fixed-layout value.
    #[inline]
    pub fn read<T: FixedLayout>(&mut self) -> Result<T> {
        let start = self.offset;
        let bytes = self.read_bytes(T::SIZE)?;
        T::read_from(bytes).inspect_err(|_| self.offset = start)
    }

    /// Reject an element count the remaining input cannot back.
    ///
    /// Every element but a zero-sized one takes at least a byte, so a count
    /// above [`remaining`](Self::remaining) is only accepted up to
    /// [`MAX_UNBACKED_ELEMENTS`].
    ///
    /// # Errors
    ///
    /// `MalformedLength` when the count exceeds both limits.
    #[inline]
    pub fn check_count(&self, count: usize) -> Result<()> {
        if count > self.remaining() && count > MAX_UNBACKED_ELEMENTS {
            return Err(CodecError::MalformedLength {
                offset: self.offset,
                length: count as i64,
            });
        }
        Ok(())
    }

    /// Read `count` fixed-layout values stored as one contiguous block.
    pub fn read_vec<T: FixedLayout>(&mut self, count: usize) -> Result<Vec<T>> {
        self.check_count(count)?;
        let total = count.checked_mul(T::SIZE).ok_or(CodecError::MalformedLength {
            offset: self.offset,
            length: count as i64,
        })?;
        let block = self.read_bytes(total)?;
        if T::SIZE == 0 {
            return (0..count).map(|_| T::read_from(&[])).collect();
        }
        block.chunks_exact(T::SIZE).map(T::read_from).collect()
    }

    /// Look at the next byte without consuming it.
    #[inline]
    pub fn peek_u8(&self) -> Result<u8> {
        self.buffer
            .get(self.offset)
            .copied()
            .ok_or_else(|| self.underrun(1))
    }

    /// Look at the next 4-byte signed integer without consuming it.
    #[inline]
    pub fn peek_i32(&self) -> Result<i32> {
        let mut probe = self.clone();
        probe.read::<i32>()
    }

    /// Skip `len` bytes.
    pub fn advance(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// Read a length/count prefix.
    ///
    /// Returns `None` for the `-1` absent marker.
    ///
    /// # Errors
    ///
    /// `MalformedLength` for any other negative value.
    #[inline]
    pub fn read_length(&mut self) -> Result<Option<usize>> {
        let offset = self.offset;
        match self.read::<i32>()? {
            ABSENT_LENGTH => Ok(None),
            len if len < 0 => Err(CodecError::MalformedLength {
                offset,
                length: i64::from(len),
            }),
            len => Ok(Some(len as usize)),
        }
    }

    /// Read a length/count prefix that must be present.
    ///
    /// # Errors
    ///
    /// `UnexpectedAbsent` naming `type_name` for the `-1` marker.
    #[inline]
    pub fn read_present_length(&mut self, type_name: &'static str) -> Result<usize> {
        self.read_length()?
            .ok_or(CodecError::UnexpectedAbsent { type_name })
    }

    /// True if the next 4 bytes are the `-1` absent marker.
    #[inline]
    pub fn at_absent_length(&self) -> Result<bool> {
        Ok(self.peek_i32()? == ABSENT_LENGTH)
    }
}
