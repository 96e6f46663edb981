//! # Retropack Crunch-Mania
//!
//! Pure Rust decompression of Crunch-Mania, an Amiga cruncher. Four stream
//! variants are recognized by their magic:
//!
//! - **CrM!**: standard mode (fixed Huffman tables, literal runs)
//! - **Crm!**: standard mode with the delta sample filter
//! - **CrM2**: LZH mode (per-block Huffman tables)
//! - **Crm2**: LZH mode with the delta sample filter
//!
//! The same streams also appear as chunks of XPK containers, tagged `CRM2`
//! or `CRMS`.
//!
//! Streams are decoded from their last byte toward the header, and the
//! output is produced back to front as well.
//!
//! ## Example
//!
//! ```rust
//! use retropack_crm::{CrmDecompressor, registry};
//!
//! // Not a Crunch-Mania stream.
//! assert!(CrmDecompressor::new(b"PP20 definitely not CrM").is_err());
//!
//! let registry = registry();
//! assert!(registry.find(u32::from_be_bytes(*b"CrM2")).is_some());
//! assert!(registry.create(b"XPKF", false, false).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod decode;
pub mod header;
pub mod lzh;
pub mod output;
pub mod standard;

// Re-exports
pub use bitstream::BackwardBitReader;
pub use decode::{CrmDecompressor, create, create_xpk, decompress_crm};
pub use header::{CrmHeader, CrmMode, HEADER_SIZE, Provenance, detect_header, detect_xpk_header};
pub use output::BackwardOutput;
pub use retropack_core::{Decompressor, Registry, XpkDecompressor, XpkRegistry};

/// Registry of the standalone stream variants.
pub fn registry() -> Registry {
    Registry::new([CrmDecompressor::REGISTRATION])
}

/// Registry of the XPK chunk variants.
pub fn xpk_registry() -> XpkRegistry {
    XpkRegistry::new([CrmDecompressor::XPK_REGISTRATION])
}
