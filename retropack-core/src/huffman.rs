//! Bit-serial Huffman decoding.
//!
//! Codes are inserted one at a time as `(length, code, value)` triples where
//! `code` holds the `length` low bits of the pattern, most significant bit
//! first. Decoding pulls one bit at a time from a caller-supplied closure, so
//! the table never owns or buffers the bit source: Huffman symbols and raw
//! bit fields can be freely interleaved on one cursor.
//!
//! Two representations share the [`HuffmanDecoder`] interface:
//!
//! - [`DenseHuffmanDecoder`]: flat array for small, fixed maximum depths.
//! - [`DynamicHuffmanDecoder`]: growable node list for deep or
//!   stream-defined tables.
//!
//! # Example
//!
//! ```
//! use retropack_core::huffman::{DenseHuffmanDecoder, HuffmanCode, HuffmanDecoder};
//!
//! let decoder = DenseHuffmanDecoder::with_codes(2, &[
//!     HuffmanCode::new(1, 0b0, 0u8),
//!     HuffmanCode::new(2, 0b10, 1),
//!     HuffmanCode::new(2, 0b11, 2),
//! ]).unwrap();
//!
//! let mut bits = [true, true].into_iter();
//! let symbol = decoder.decode(|| Ok(bits.next().unwrap_or(false))).unwrap();
//! assert_eq!(symbol, 2);
//! ```

use crate::error::{RetropackError, Result};
use std::fmt::Debug;

/// Longest code accepted by any table.
pub const MAX_CODE_LENGTH: u32 = 32;

/// Deepest table the dense representation will allocate.
pub const MAX_DENSE_DEPTH: u32 = 16;

/// A symbol type that can be stored in a Huffman table.
///
/// `SENTINEL` marks unassigned slots and is never a legal payload symbol.
pub trait HuffmanSymbol: Copy + Eq + Debug {
    /// Reserved "no symbol" value.
    const SENTINEL: Self;

    /// Convert a symbol index into a value, if it fits and is not the sentinel.
    fn from_index(index: usize) -> Option<Self>;
}

macro_rules! impl_symbol {
    ($($ty:ty),*) => {
        $(
            impl HuffmanSymbol for $ty {
                const SENTINEL: Self = <$ty>::MAX;

                fn from_index(index: usize) -> Option<Self> {
                    <$ty>::try_from(index).ok().filter(|&v| v != Self::SENTINEL)
                }
            }
        )*
    };
}

impl_symbol!(u8, u16, u32);

/// One code of a Huffman table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HuffmanCode<T> {
    /// Code length in bits.
    pub length: u32,
    /// Bit pattern in the `length` low bits, MSB read first.
    pub code: u32,
    /// Decoded symbol.
    pub value: T,
}

impl<T> HuffmanCode<T> {
    /// Create a code.
    pub const fn new(length: u32, code: u32, value: T) -> Self {
        Self {
            length,
            code,
            value,
        }
    }

    /// The `bit`-th bit of the pattern, counting from the least significant.
    fn bit(&self, bit: u32) -> usize {
        ((self.code >> bit) & 1) as usize
    }
}

/// Common interface of the Huffman table representations.
pub trait HuffmanDecoder<T: HuffmanSymbol> {
    /// Insert one code into the table.
    ///
    /// Fails if the value is the sentinel, the length is zero or beyond the
    /// table's bound, or the code collides with a code already present.
    fn insert(&mut self, code: HuffmanCode<T>) -> Result<()>;

    /// Decode one symbol, pulling bits from `read_bit` until a leaf is
    /// reached.
    fn decode<F>(&self, read_bit: F) -> Result<T>
    where
        F: FnMut() -> Result<bool>;

    /// Remove all codes.
    fn reset(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot<T> {
    Empty,
    Branch,
    Leaf(T),
}

/// Array-backed Huffman table with a fixed maximum depth.
///
/// Node `i` has children at `2i + 2` and `2i + 3`; the two children of the
/// root live at indices 0 and 1. A table of depth `d` therefore needs
/// `2^(d+1) - 2` slots.
#[derive(Debug, Clone)]
pub struct DenseHuffmanDecoder<T> {
    slots: Vec<Slot<T>>,
    depth: u32,
}

impl<T: HuffmanSymbol> DenseHuffmanDecoder<T> {
    /// Create an empty table accepting codes of up to `depth` bits.
    pub fn new(depth: u32) -> Result<Self> {
        if depth == 0 || depth > MAX_DENSE_DEPTH {
            return Err(RetropackError::invalid_table(format!(
                "dense table depth {depth} out of range 1..={MAX_DENSE_DEPTH}"
            )));
        }
        Ok(Self {
            slots: vec![Slot::Empty; (2usize << depth) - 2],
            depth,
        })
    }

    /// Create a table and insert all `codes`.
    pub fn with_codes(depth: u32, codes: &[HuffmanCode<T>]) -> Result<Self> {
        let mut decoder = Self::new(depth)?;
        for &code in codes {
            decoder.insert(code)?;
        }
        Ok(decoder)
    }

    /// Maximum code length of this table.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Slot indices visited by `code`, root child first.
    fn path(code: &HuffmanCode<T>) -> impl Iterator<Item = usize> + '_ {
        let mut index = 0usize;
        (0..code.length).rev().map(move |bit| {
            index += code.bit(bit);
            let current = index;
            index = index * 2 + 2;
            current
        })
    }
}

impl<T: HuffmanSymbol> HuffmanDecoder<T> for DenseHuffmanDecoder<T> {
    fn insert(&mut self, code: HuffmanCode<T>) -> Result<()> {
        if code.value == T::SENTINEL {
            return Err(RetropackError::invalid_table("sentinel symbol inserted"));
        }
        if code.length == 0 || code.length > self.depth {
            return Err(RetropackError::invalid_table(format!(
                "code length {} outside table depth {}",
                code.length, self.depth
            )));
        }

        // Validate the whole path before touching the table.
        let last = code.length as usize - 1;
        for (level, index) in Self::path(&code).enumerate() {
            match self.slots[index] {
                Slot::Leaf(_) => {
                    return Err(RetropackError::invalid_table(format!(
                        "code {:#b}/{} is prefixed by an existing code",
                        code.code, code.length
                    )));
                }
                Slot::Branch if level == last => {
                    return Err(RetropackError::invalid_table(format!(
                        "code {:#b}/{} is a prefix of an existing code",
                        code.code, code.length
                    )));
                }
                _ => {}
            }
        }

        for (level, index) in Self::path(&code).enumerate() {
            self.slots[index] = if level == last {
                Slot::Leaf(code.value)
            } else {
                Slot::Branch
            };
        }
        Ok(())
    }

    fn decode<F>(&self, mut read_bit: F) -> Result<T>
    where
        F: FnMut() -> Result<bool>,
    {
        let mut index = 0usize;
        let mut bits = 0u32;
        loop {
            if read_bit()? {
                index += 1;
            }
            bits += 1;
            match self.slots.get(index) {
                Some(Slot::Leaf(value)) => return Ok(*value),
                Some(Slot::Branch) => index = index * 2 + 2,
                _ => return Err(RetropackError::invalid_code(bits)),
            }
        }
    }

    fn reset(&mut self) {
        self.slots.fill(Slot::Empty);
    }
}

#[derive(Debug, Clone, Copy)]
struct Node<T> {
    /// Child node indices; 0 means absent (the root is never a child).
    children: [usize; 2],
    value: Option<T>,
}

impl<T> Node<T> {
    const EMPTY: Self = Self {
        children: [0, 0],
        value: None,
    };
}

/// Node-list Huffman table without a fixed depth bound.
#[derive(Debug, Clone)]
pub struct DynamicHuffmanDecoder<T> {
    nodes: Vec<Node<T>>,
}

impl<T: HuffmanSymbol> DynamicHuffmanDecoder<T> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::EMPTY],
        }
    }

    /// Create a table and insert all `codes`.
    pub fn with_codes(codes: &[HuffmanCode<T>]) -> Result<Self> {
        let mut decoder = Self::new();
        for &code in codes {
            decoder.insert(code)?;
        }
        Ok(decoder)
    }

    /// Whether no code has been inserted.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }
}

impl<T: HuffmanSymbol> Default for DynamicHuffmanDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: HuffmanSymbol> HuffmanDecoder<T> for DynamicHuffmanDecoder<T> {
    fn insert(&mut self, code: HuffmanCode<T>) -> Result<()> {
        if code.value == T::SENTINEL {
            return Err(RetropackError::invalid_table("sentinel symbol inserted"));
        }
        if code.length == 0 || code.length > MAX_CODE_LENGTH {
            return Err(RetropackError::invalid_table(format!(
                "code length {} out of range 1..={MAX_CODE_LENGTH}",
                code.length
            )));
        }

        // Nodes are only created past the last existing node on the path,
        // so every conflict is found before the table changes.
        let mut index = 0usize;
        for bit in (0..code.length).rev() {
            if self.nodes[index].value.is_some() {
                return Err(RetropackError::invalid_table(format!(
                    "code {:#b}/{} is prefixed by an existing code",
                    code.code, code.length
                )));
            }
            let side = code.bit(bit);
            let next = self.nodes[index].children[side];
            index = if next == 0 {
                let created = self.nodes.len();
                self.nodes.push(Node::EMPTY);
                self.nodes[index].children[side] = created;
                created
            } else {
                next
            };
        }

        let node = &mut self.nodes[index];
        if node.value.is_some() || node.children != [0, 0] {
            return Err(RetropackError::invalid_table(format!(
                "code {:#b}/{} collides with an existing code",
                code.code, code.length
            )));
        }
        node.value = Some(code.value);
        Ok(())
    }

    fn decode<F>(&self, mut read_bit: F) -> Result<T>
    where
        F: FnMut() -> Result<bool>,
    {
        let mut index = 0usize;
        let mut bits = 0u32;
        loop {
            let side = usize::from(read_bit()?);
            bits += 1;
            index = self.nodes[index].children[side];
            if index == 0 {
                return Err(RetropackError::invalid_code(bits));
            }
            if let Some(value) = self.nodes[index].value {
                return Ok(value);
            }
        }
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::EMPTY);
    }
}

/// Fill `decoder` with the canonical code described by per-symbol bit
/// lengths, as used by Deflate and Bzip2.
///
/// Lengths of 0 mark unused symbols. Codes are assigned in order of
/// increasing length, and by ascending symbol index within one length.
pub fn create_orderly_huffman_table<T, D>(decoder: &mut D, bit_lengths: &[u8]) -> Result<()>
where
    T: HuffmanSymbol,
    D: HuffmanDecoder<T>,
{
    let used = bit_lengths.iter().copied().filter(|&len| len != 0);
    let (Some(min_depth), Some(max_depth)) = (used.clone().min(), used.max()) else {
        return Err(RetropackError::invalid_table("all code lengths are zero"));
    };
    let (min_depth, max_depth) = (u32::from(min_depth), u32::from(max_depth));
    if max_depth > MAX_CODE_LENGTH {
        return Err(RetropackError::invalid_table(format!(
            "code length {max_depth} exceeds {MAX_CODE_LENGTH}"
        )));
    }

    let mut code = 0u64;
    for depth in min_depth..=max_depth {
        let shift = max_depth - depth;
        for (index, _) in bit_lengths
            .iter()
            .enumerate()
            .filter(|&(_, &len)| u32::from(len) == depth)
        {
            let pattern = code >> shift;
            if pattern >> depth != 0 {
                return Err(RetropackError::invalid_table("oversubscribed code lengths"));
            }
            let value = T::from_index(index).ok_or_else(|| {
                RetropackError::invalid_table(format!("symbol index {index} does not fit"))
            })?;
            decoder.insert(HuffmanCode::new(depth, pattern as u32, value))?;
            code += 1 << shift;
        }
    }
    Ok(())
}
