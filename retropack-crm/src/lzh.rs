//! LZH-mode decoding.
//!
//! The stream is a sequence of blocks. Each block carries its own length
//! and distance tables, an item count, and the items; a trailing bit tells
//! whether another block follows.
//!
//! Length symbols are 9 bits wide: with bit 8 set the low byte is a
//! literal, otherwise the value plus 3 is a match length. Distance symbols
//! are 4 bits wide and give the bit width of the distance that follows.

use log::{debug, trace};
use retropack_core::error::{RetropackError, Result};
use retropack_core::huffman::{DynamicHuffmanDecoder, HuffmanCode, HuffmanDecoder};

use crate::bitstream::BackwardBitReader;
use crate::output::BackwardOutput;

/// Width of a length table symbol.
pub const LENGTH_SYMBOL_BITS: u32 = 9;

/// Width of a distance table symbol.
pub const DISTANCE_SYMBOL_BITS: u32 = 4;

/// Length symbols with this bit set are literals.
const LITERAL_FLAG: u16 = 0x100;

/// Shortest match.
const MIN_MATCH: usize = 3;

/// Read one block table.
///
/// Layout: a 4-bit maximum depth, then per depth `1..=max` the number of
/// codes of that depth (`min(depth, symbol_bits)` bits wide), then one
/// `symbol_bits` wide symbol per code. Codes are handed out in order of
/// increasing depth.
pub fn read_table(
    reader: &mut BackwardBitReader<'_>,
    symbol_bits: u32,
) -> Result<DynamicHuffmanDecoder<u16>> {
    let max_depth = reader.read_bits(4)?;
    if max_depth == 0 {
        return Err(RetropackError::invalid_table("zero maximum code depth"));
    }

    let counts = (1..=max_depth)
        .map(|depth| reader.read_bits(depth.min(symbol_bits)))
        .collect::<Result<Vec<_>>>()?;
    trace!("table: max depth {max_depth}, codes per depth {counts:?}");

    let mut decoder = DynamicHuffmanDecoder::new();
    let mut code = 0u32;
    for (depth, &count) in (1..=max_depth).zip(&counts) {
        let shift = max_depth - depth;
        for _ in 0..count {
            let value = reader.read_bits(symbol_bits)? as u16;
            decoder.insert(HuffmanCode::new(depth, code >> shift, value))?;
            code += 1 << shift;
        }
    }
    Ok(decoder)
}

/// Decode an LZH-mode stream into `out`.
///
/// Decoding stops after a block whose continuation bit is clear, or as soon
/// as a block leaves `out` full.
pub fn decode_lzh(reader: &mut BackwardBitReader<'_>, out: &mut BackwardOutput<'_>) -> Result<()> {
    let mut block = 0usize;
    loop {
        let lengths = read_table(reader, LENGTH_SYMBOL_BITS)?;
        let distances = read_table(reader, DISTANCE_SYMBOL_BITS)?;
        let items = reader.read_bits(16)? + 1;
        debug!(
            "block {block}: {items} items, {} bytes left",
            out.remaining()
        );

        for _ in 0..items {
            let symbol = lengths.decode(|| reader.read_bit())?;
            if symbol & LITERAL_FLAG != 0 {
                out.push(symbol as u8)?;
                continue;
            }

            let count = usize::from(symbol) + MIN_MATCH;
            let width = u32::from(distances.decode(|| reader.read_bit())?);
            let distance = if width == 0 {
                reader.read_bits(1)? + 1
            } else {
                (reader.read_bits(width)? | (1 << width)) + 1
            };
            out.copy_match(count, distance as usize)?;
        }

        block += 1;
        if out.is_full() || !reader.read_bit()? {
            return Ok(());
        }
    }
}
