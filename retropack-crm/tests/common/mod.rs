//! Test-only Crunch-Mania stream builder.
//!
//! Bits are collected in the order the decoder reads them and laid out the
//! way the backward bit reader expects: the first bits in the priming
//! footer, the rest packed LSB-first into bytes stored toward the header.

#![allow(dead_code)]

use std::collections::BTreeMap;

pub const HEADER_SIZE: usize = 14;

// ============================================================================
// Bit sink
// ============================================================================

/// Bits in decoder read order.
#[derive(Debug, Default, Clone)]
pub struct BitSink {
    bits: Vec<bool>,
}

impl BitSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn bit(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// A raw field, as returned by `read_bits(count)`.
    pub fn bits(&mut self, value: u32, count: u32) {
        for i in 0..count {
            self.bits.push((value >> i) & 1 != 0);
        }
    }

    /// A Huffman code, most significant bit first.
    pub fn code(&mut self, pattern: u32, length: u32) {
        for i in (0..length).rev() {
            self.bits.push((pattern >> i) & 1 != 0);
        }
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.into_payload_with_shift(0)
    }

    /// Payload with a priming `shift` (0..=16); the padding bits below the
    /// primed ones are filled with garbage.
    pub fn into_payload_with_shift(self, shift: u16) -> Vec<u8> {
        let primed = 16 + usize::from(shift);
        let field = |bits: &[bool]| {
            bits.iter()
                .enumerate()
                .fold(0u32, |acc, (i, &bit)| acc | (u32::from(bit) << i))
        };

        let head = &self.bits[..primed.min(self.bits.len())];
        let garbage = if shift < 16 {
            0xA5A5u32 & ((1 << (16 - shift)) - 1)
        } else {
            0
        };
        let word = ((u64::from(field(head)) << (16 - shift)) as u32) | garbage;

        let tail = self.bits.get(primed..).unwrap_or(&[]);
        let mut body: Vec<u8> = tail.chunks(8).map(|chunk| field(chunk) as u8).collect();
        body.reverse();

        body.extend_from_slice(&word.to_be_bytes());
        body.extend_from_slice(&shift.to_be_bytes());
        body
    }
}

/// Header followed by `payload`.
pub fn crm_stream(magic: &[u8; 4], raw_size: u32, payload: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(HEADER_SIZE + payload.len());
    data.extend_from_slice(magic);
    data.extend_from_slice(&[0, 0]);
    data.extend_from_slice(&raw_size.to_be_bytes());
    data.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    data.extend_from_slice(payload);
    data
}

/// Inverse of the delta sample filter.
pub fn delta_encode(data: &[u8]) -> Vec<u8> {
    let mut prev = 0u8;
    data.iter()
        .map(|&byte| {
            let diff = byte.wrapping_sub(prev);
            prev = byte;
            diff
        })
        .collect()
}

// ============================================================================
// Back-to-front tokenizer
// ============================================================================

/// One decoding step, in decode order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Literal(u8),
    Match { count: usize, distance: usize },
}

/// Greedy parse of `data` from its end toward its start.
pub fn tokenize(data: &[u8], min_match: usize, max_match: usize, max_distance: usize) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pos = data.len();
    while pos > 0 {
        let mut best = (0, 0);
        for distance in 1..=max_distance.min(data.len() - pos) {
            let limit = max_match.min(pos);
            let count = (0..limit)
                .take_while(|&k| data[pos - 1 - k] == data[pos - 1 - k + distance])
                .count();
            if count > best.0 {
                best = (count, distance);
            }
        }

        if best.0 >= min_match {
            tokens.push(Token::Match {
                count: best.0,
                distance: best.1,
            });
            pos -= best.0;
        } else {
            pos -= 1;
            tokens.push(Token::Literal(data[pos]));
        }
    }
    tokens
}

// ============================================================================
// Standard mode
// ============================================================================

pub const STANDARD_MAX_MATCH: usize = 278;
pub const STANDARD_MAX_DISTANCE: usize = 16927;

/// A match step: flag bit, length, distance.
pub fn standard_match(sink: &mut BitSink, count: usize, distance: usize) {
    sink.bit(false);
    let value = (if count >= 23 { count + 1 } else { count }) as u32;
    standard_length(sink, value);

    let distance = distance as u32;
    match distance {
        0..=31 => {
            sink.code(0b10, 2);
            sink.bits(distance, 5);
        }
        32..=543 => {
            sink.code(0b0, 1);
            sink.bits(distance - 32, 9);
        }
        _ => {
            sink.code(0b11, 2);
            sink.bits(distance - 544, 14);
        }
    }
}

/// A length value (2..=279), 23 being the literal run escape.
pub fn standard_length(sink: &mut BitSink, value: u32) {
    match value {
        2..=3 => {
            sink.code(0b0, 1);
            sink.bits(value - 2, 1);
        }
        4..=7 => {
            sink.code(0b10, 2);
            sink.bits(value - 4, 2);
        }
        8..=23 => {
            sink.code(0b110, 3);
            sink.bits(value - 8, 4);
        }
        _ => {
            sink.code(0b111, 3);
            sink.bits(value - 24, 8);
        }
    }
}

pub fn standard_literal(sink: &mut BitSink, byte: u8) {
    sink.bit(true);
    sink.bits(u32::from(byte), 8);
}

/// A literal run of `bytes.len()` (15..=16398) bytes, given in decode order.
pub fn standard_run(sink: &mut BitSink, bytes: &[u8]) {
    let extra = bytes.len() as u32 - 15;
    sink.bit(false);
    standard_length(sink, 23);
    if extra < 32 {
        sink.bit(true);
        sink.bits(extra, 5);
    } else {
        sink.bit(false);
        sink.bits(extra, 14);
    }
    for &byte in bytes {
        sink.bits(u32::from(byte), 8);
    }
}

/// Standard-mode payload bits for `data`; runs of 15 or more literals use
/// the escape when `use_runs` is set.
pub fn standard_bits(data: &[u8], use_runs: bool) -> BitSink {
    let tokens = tokenize(data, 2, STANDARD_MAX_MATCH, STANDARD_MAX_DISTANCE);
    let mut sink = BitSink::new();
    let mut pending = Vec::new();
    let flush = |sink: &mut BitSink, pending: &mut Vec<u8>| {
        if use_runs && pending.len() >= 15 {
            for run in pending.chunks(16398) {
                if run.len() >= 15 {
                    standard_run(sink, run);
                } else {
                    run.iter().for_each(|&byte| standard_literal(sink, byte));
                }
            }
        } else {
            pending.iter().for_each(|&byte| standard_literal(sink, byte));
        }
        pending.clear();
    };

    for token in tokens {
        match token {
            Token::Literal(byte) => pending.push(byte),
            Token::Match { count, distance } => {
                flush(&mut sink, &mut pending);
                standard_match(&mut sink, count, distance);
            }
        }
    }
    flush(&mut sink, &mut pending);
    sink
}

/// Complete standard-mode stream.
pub fn standard_stream(data: &[u8], sampled: bool, use_runs: bool) -> Vec<u8> {
    let (magic, body) = if sampled {
        (b"Crm!", delta_encode(data))
    } else {
        (b"CrM!", data.to_vec())
    };
    let payload = standard_bits(&body, use_runs).into_payload();
    crm_stream(magic, data.len() as u32, &payload)
}

// ============================================================================
// LZH mode
// ============================================================================

pub const LZH_MAX_MATCH: usize = 258;
/// Search window of the test encoder; the format reaches 65536.
pub const LZH_WINDOW: usize = 4096;

/// Per-block code assignment, as the decoder rebuilds it.
#[derive(Debug)]
pub struct BlockTable {
    symbol_bits: u32,
    /// `(depth, symbol)` in transmission order.
    entries: Vec<(u32, u16)>,
    codes: BTreeMap<u16, (u32, u32)>,
}

impl BlockTable {
    /// Table over the distinct `symbols` (sorted), all of them at nearly
    /// the same depth.
    pub fn new(symbols: &[u16], symbol_bits: u32) -> Self {
        let n = symbols.len() as u32;
        let depth = (u32::BITS - n.leading_zeros()).max(1);
        let entries: Vec<(u32, u16)> = if depth <= symbol_bits {
            symbols.iter().map(|&s| (depth, s)).collect()
        } else {
            // n == 2^symbol_bits: the count field cannot hold n.
            symbols
                .iter()
                .enumerate()
                .map(|(i, &s)| {
                    let d = if i + 1 < symbols.len() { symbol_bits } else { symbol_bits + 1 };
                    (d, s)
                })
                .collect()
        };

        let max_depth = entries.iter().map(|&(d, _)| d).max().unwrap_or(1);
        let mut codes = BTreeMap::new();
        let mut code = 0u32;
        for &(d, symbol) in &entries {
            let shift = max_depth - d;
            codes.insert(symbol, (code >> shift, d));
            code += 1 << shift;
        }
        Self {
            symbol_bits,
            entries,
            codes,
        }
    }

    pub fn write(&self, sink: &mut BitSink) {
        let max_depth = self.entries.iter().map(|&(d, _)| d).max().unwrap_or(1);
        sink.bits(max_depth, 4);
        for depth in 1..=max_depth {
            let count = self.entries.iter().filter(|&&(d, _)| d == depth).count() as u32;
            sink.bits(count, depth.min(self.symbol_bits));
        }
        for &(_, symbol) in &self.entries {
            sink.bits(u32::from(symbol), self.symbol_bits);
        }
    }

    pub fn encode(&self, sink: &mut BitSink, symbol: u16) {
        let (pattern, length) = self.codes[&symbol];
        sink.code(pattern, length);
    }
}

/// `(width symbol, raw field, field width)` for an LZH distance.
fn lzh_distance(distance: usize) -> (u16, u32, u32) {
    if distance <= 2 {
        return (0, distance as u32 - 1, 1);
    }
    let value = distance as u32 - 1;
    let width = u32::BITS - 1 - value.leading_zeros();
    (width as u16, value - (1 << width), width)
}

fn lzh_symbol(token: &Token) -> u16 {
    match *token {
        Token::Literal(byte) => 0x100 | u16::from(byte),
        Token::Match { count, .. } => (count - 3) as u16,
    }
}

/// One LZH block holding `tokens`.
pub fn lzh_block(sink: &mut BitSink, tokens: &[Token]) {
    let mut lengths: Vec<u16> = tokens.iter().map(lzh_symbol).collect();
    lengths.sort_unstable();
    lengths.dedup();

    let mut distances: Vec<u16> = tokens
        .iter()
        .filter_map(|token| match *token {
            Token::Match { distance, .. } => Some(lzh_distance(distance).0),
            Token::Literal(_) => None,
        })
        .collect();
    distances.sort_unstable();
    distances.dedup();

    let length_table = BlockTable::new(&lengths, 9);
    length_table.write(sink);
    let distance_table = (!distances.is_empty()).then(|| BlockTable::new(&distances, 4));
    match &distance_table {
        Some(table) => table.write(sink),
        None => {
            // Max depth 1 with no codes.
            sink.bits(1, 4);
            sink.bits(0, 1);
        }
    }

    sink.bits(tokens.len() as u32 - 1, 16);
    for token in tokens {
        length_table.encode(sink, lzh_symbol(token));
        if let Token::Match { distance, .. } = *token {
            let (symbol, field, width) = lzh_distance(distance);
            if let Some(table) = &distance_table {
                table.encode(sink, symbol);
            }
            sink.bits(field, width);
        }
    }
}

/// LZH-mode payload bits for `data`, at most `block_items` items per block.
pub fn lzh_bits(data: &[u8], block_items: usize) -> BitSink {
    let tokens = tokenize(data, 3, LZH_MAX_MATCH, LZH_WINDOW);
    let mut sink = BitSink::new();
    let blocks: Vec<&[Token]> = tokens.chunks(block_items.clamp(1, 65536)).collect();
    for (i, block) in blocks.iter().enumerate() {
        lzh_block(&mut sink, block);
        if i + 1 < blocks.len() {
            sink.bit(true);
        }
    }
    sink
}

/// Complete LZH-mode stream.
pub fn lzh_stream(data: &[u8], sampled: bool, block_items: usize) -> Vec<u8> {
    let (magic, body) = if sampled {
        (b"Crm2", delta_encode(data))
    } else {
        (b"CrM2", data.to_vec())
    };
    let payload = lzh_bits(&body, block_items).into_payload();
    crm_stream(magic, data.len() as u32, &payload)
}

// ============================================================================
// Sample data
// ============================================================================

/// Text with plenty of repetition.
pub fn sample_text(len: usize) -> Vec<u8> {
    let phrase = b"The quick brown fox jumps over the lazy dog. Pack my box with five dozen liquor jugs. ";
    phrase.iter().copied().cycle().take(len).collect()
}

/// Deterministic pseudo-random bytes (xorshift).
pub fn noise(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

/// A slowly rising sawtooth, like an 8-bit sample.
pub fn sawtooth(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 3) % 251) as u8).collect()
}
