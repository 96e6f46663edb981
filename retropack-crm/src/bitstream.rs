//! Backward bit reader.
//!
//! Crunch-Mania packs its bitstream from the end of the buffer toward the
//! header. Each byte supplies 8 bits, consumed least significant bit first,
//! and single bits and multi-bit fields share the same order so they can be
//! freely interleaved.
//!
//! The last 6 bytes of the payload prime the reader: a big-endian 32-bit
//! word and a big-endian 16-bit shift. The low `16 - shift` bits of the
//! word are padding left by the packer; the remaining `16 + shift` bits are
//! the first bits of the stream.

use retropack_core::error::{RetropackError, Result};

use crate::header::FOOTER_SIZE;

/// Widest field a single [`BackwardBitReader::read_bits`] call accepts.
pub const MAX_READ_BITS: u32 = 24;

/// LSB-first bit reader moving from the end of a buffer toward its start.
#[derive(Debug, Clone)]
pub struct BackwardBitReader<'a> {
    /// Input data.
    data: &'a [u8],
    /// Next byte is read from `offset - 1`.
    offset: usize,
    /// Lowest byte offset that may be read.
    floor: usize,
    /// Bit buffer (LSB-first).
    buffer: u32,
    /// Number of valid bits in buffer.
    bits_in_buffer: u32,
}

impl<'a> BackwardBitReader<'a> {
    /// Create a reader over `data[floor..end]`, primed from the footer that
    /// ends at `end`.
    pub fn new(data: &'a [u8], floor: usize, end: usize) -> Result<Self> {
        let footer_start = end
            .checked_sub(FOOTER_SIZE)
            .filter(|&start| start >= floor && end <= data.len())
            .ok_or_else(|| RetropackError::truncated(end))?;

        let footer = &data[footer_start..end];
        let word = u32::from_be_bytes([footer[0], footer[1], footer[2], footer[3]]);
        let shift = u32::from(u16::from_be_bytes([footer[4], footer[5]]));
        if shift > 16 {
            return Err(RetropackError::corrupted(
                footer_start + 4,
                format!("priming shift {shift} exceeds 16"),
            ));
        }

        Ok(Self {
            data,
            offset: footer_start,
            floor,
            buffer: word >> (16 - shift),
            bits_in_buffer: shift + 16,
        })
    }

    /// Byte offset of the next byte to be pulled, plus one.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of bits still buffered.
    pub fn buffered_bits(&self) -> u32 {
        self.bits_in_buffer
    }

    /// Pull one more byte into the buffer.
    #[inline]
    fn refill(&mut self) -> Result<()> {
        if self.offset <= self.floor {
            return Err(RetropackError::truncated(self.offset));
        }
        self.offset -= 1;
        self.buffer |= u32::from(self.data[self.offset]) << self.bits_in_buffer;
        self.bits_in_buffer += 8;
        Ok(())
    }

    /// Read a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Read `count` bits (0 to [`MAX_READ_BITS`]); the first bit read ends
    /// up in the least significant position.
    #[inline]
    pub fn read_bits(&mut self, count: u32) -> Result<u32> {
        if count > MAX_READ_BITS {
            return Err(RetropackError::corrupted(
                self.offset,
                format!("bit field of {count} bits exceeds {MAX_READ_BITS}"),
            ));
        }
        if count == 0 {
            return Ok(0);
        }
        while self.bits_in_buffer < count {
            self.refill()?;
        }

        let result = self.buffer & ((1u32 << count) - 1);
        self.buffer >>= count;
        self.bits_in_buffer -= count;
        Ok(result)
    }
}
