//! Back-to-front output cursor.
//!
//! Both decoding modes fill the output from its last byte toward its first.
//! Every write checks the cursor before moving it, so the cursor can only
//! decrease and never passes index 0.

use retropack_core::error::{RetropackError, Result};

/// Output buffer filled from the end.
#[derive(Debug)]
pub struct BackwardOutput<'a> {
    buf: &'a mut [u8],
    /// Index one past the next byte to write; starts at `buf.len()`.
    offset: usize,
}

impl<'a> BackwardOutput<'a> {
    /// Wrap `buf`, positioning the cursor at its end.
    pub fn new(buf: &'a mut [u8]) -> Self {
        let offset = buf.len();
        Self { buf, offset }
    }

    /// Bytes still to be written.
    pub fn remaining(&self) -> usize {
        self.offset
    }

    /// Whether every byte has been written.
    pub fn is_full(&self) -> bool {
        self.offset == 0
    }

    /// Write one byte at the cursor.
    #[inline]
    pub fn push(&mut self, byte: u8) -> Result<()> {
        if self.offset == 0 {
            return Err(RetropackError::invalid_length(1, 0));
        }
        self.offset -= 1;
        self.buf[self.offset] = byte;
        Ok(())
    }

    /// Fail unless `count` more bytes fit.
    pub fn reserve(&self, count: usize) -> Result<()> {
        if count > self.offset {
            return Err(RetropackError::invalid_length(count, self.offset));
        }
        Ok(())
    }

    /// Copy `count` bytes starting `distance` bytes behind the cursor.
    ///
    /// The source must lie entirely within already written output. Source
    /// and destination move down together one byte at a time, so a
    /// distance shorter than `count` repeats the most recent bytes.
    pub fn copy_match(&mut self, count: usize, distance: usize) -> Result<()> {
        self.reserve(count)?;
        let raw_size = self.buf.len();
        if distance == 0
            || self
                .offset
                .checked_add(distance)
                .is_none_or(|end| end > raw_size)
        {
            return Err(RetropackError::invalid_distance(
                distance,
                self.offset,
                raw_size,
            ));
        }

        let mut source = self.offset + distance;
        for _ in 0..count {
            self.offset -= 1;
            source -= 1;
            self.buf[self.offset] = self.buf[source];
        }
        Ok(())
    }

    /// Finish decoding; fails unless the buffer is completely written.
    pub fn finish(self) -> Result<()> {
        if self.offset != 0 {
            return Err(RetropackError::incomplete(self.offset));
        }
        Ok(())
    }
}
