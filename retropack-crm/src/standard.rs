//! Standard-mode decoding.
//!
//! Each step starts with a flag bit: 1 is a raw literal byte, 0 is a match.
//! Match lengths and distances are coded as a small fixed Huffman index
//! selecting `(extra bits, base)`, followed by the extra bits.
//!
//! Length value 23 is reserved as an escape for a run of raw literals;
//! length values above it stand for one less.

use log::debug;
use retropack_core::error::Result;
use retropack_core::huffman::{DenseHuffmanDecoder, HuffmanCode, HuffmanDecoder};

use crate::bitstream::BackwardBitReader;
use crate::output::BackwardOutput;

/// Length index codes: `0`, `10`, `110`, `111`.
const LENGTH_CODES: [HuffmanCode<u8>; 4] = [
    HuffmanCode::new(1, 0b0, 0),
    HuffmanCode::new(2, 0b10, 1),
    HuffmanCode::new(3, 0b110, 2),
    HuffmanCode::new(3, 0b111, 3),
];

/// `(extra bits, base)` per length index.
const LENGTH_FIELDS: [(u32, u32); 4] = [(1, 2), (2, 4), (4, 8), (8, 24)];

/// Distance index codes: `0`, `10`, `11`.
const DISTANCE_CODES: [HuffmanCode<u8>; 3] = [
    HuffmanCode::new(1, 0b0, 0),
    HuffmanCode::new(2, 0b10, 1),
    HuffmanCode::new(2, 0b11, 2),
];

/// `(extra bits, base)` per distance index.
const DISTANCE_FIELDS: [(u32, u32); 3] = [(9, 32), (5, 0), (14, 544)];

/// Length value announcing a literal run.
pub const LITERAL_RUN_ESCAPE: u32 = 23;

/// Added to the literal run length field.
pub const LITERAL_RUN_BASE: u32 = 15;

/// Decode a standard-mode stream until `out` is full.
pub fn decode_standard(reader: &mut BackwardBitReader<'_>, out: &mut BackwardOutput<'_>) -> Result<()> {
    let lengths = DenseHuffmanDecoder::with_codes(3, &LENGTH_CODES)?;
    let distances = DenseHuffmanDecoder::with_codes(2, &DISTANCE_CODES)?;

    while !out.is_full() {
        if reader.read_bit()? {
            out.push(reader.read_bits(8)? as u8)?;
            continue;
        }

        let (bits, base) = LENGTH_FIELDS[usize::from(lengths.decode(|| reader.read_bit())?)];
        let mut count = reader.read_bits(bits)? + base;

        if count == LITERAL_RUN_ESCAPE {
            let width = if reader.read_bit()? { 5 } else { 14 };
            let run = (reader.read_bits(width)? + LITERAL_RUN_BASE) as usize;
            out.reserve(run)?;
            for _ in 0..run {
                out.push(reader.read_bits(8)? as u8)?;
            }
            continue;
        }
        if count > LITERAL_RUN_ESCAPE {
            count -= 1;
        }

        let (bits, base) = DISTANCE_FIELDS[usize::from(distances.decode(|| reader.read_bit())?)];
        let distance = reader.read_bits(bits)? + base;
        out.copy_match(count as usize, distance as usize)?;
    }

    debug!("standard-mode stream ended at byte offset {}", reader.offset());
    Ok(())
}
