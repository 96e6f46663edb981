//! # Retropack Core
//!
//! Core components shared by the Retropack decompressors.
//!
//! This crate provides the building blocks every codec crate relies on:
//!
//! - [`huffman`]: Bit-serial Huffman decoders and the canonical table builder
//! - [`delta`]: Delta sample filter for "sampled" stream variants
//! - [`traits`]: Decompressor interfaces for standalone and container use
//! - [`registry`]: Explicit magic-number dispatch tables
//! - [`config`]: Decode size limits
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Dispatch                                            │
//! │     Registry / XpkRegistry (magic → constructor)       │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     Crunch-Mania (CRM) and peer decompressors           │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Entropy (this crate)                                │
//! │     Huffman decoders, delta filter, limits, errors     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use retropack_core::delta::delta_decode;
//! use retropack_core::huffman::{DynamicHuffmanDecoder, HuffmanDecoder, create_orderly_huffman_table};
//!
//! // Build a canonical table from bit lengths
//! let mut decoder = DynamicHuffmanDecoder::<u16>::new();
//! create_orderly_huffman_table(&mut decoder, &[1, 2, 2]).unwrap();
//!
//! let mut bits = [true, false].into_iter();
//! let symbol = decoder.decode(|| Ok(bits.next().unwrap_or(false))).unwrap();
//! assert_eq!(symbol, 1);
//!
//! // Undo a difference transform
//! let mut samples = [10u8, 1, 1];
//! delta_decode(&mut samples, 0, 3).unwrap();
//! assert_eq!(samples, [10, 11, 12]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod delta;
pub mod error;
pub mod huffman;
pub mod registry;
pub mod traits;

// Re-exports for convenience
pub use config::DecodeLimits;
pub use error::{ErrorKind, Result, RetropackError};
pub use huffman::{
    DenseHuffmanDecoder, DynamicHuffmanDecoder, HuffmanCode, HuffmanDecoder, HuffmanSymbol,
    create_orderly_huffman_table,
};
pub use registry::{Registration, Registry, XpkRegistration, XpkRegistry};
pub use traits::{Decompressor, XpkDecompressor};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::DecodeLimits;
    pub use crate::error::{Result, RetropackError};
    pub use crate::huffman::{HuffmanCode, HuffmanDecoder};
    pub use crate::traits::{Decompressor, XpkDecompressor};
}
