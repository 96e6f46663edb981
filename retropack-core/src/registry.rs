//! Explicit codec registries.
//!
//! A registry is an ordinary value built from a list of [`Registration`]s and
//! handed to whatever dispatches packed data. Detection runs the entries in
//! list order and the first match wins.
//!
//! ```
//! use retropack_core::registry::Registry;
//!
//! let registry = Registry::default();
//! assert!(registry.entries().is_empty());
//! assert!(registry.create(b"????packed", false, false).is_err());
//! ```

use crate::error::{RetropackError, Result};
use crate::traits::{Decompressor, XpkDecompressor};
use log::debug;
use std::fmt;

/// Constructor of a standalone decompressor: `(packed, exact_size_known, verify)`.
pub type CreateFn = for<'a> fn(&'a [u8], bool, bool) -> Result<Box<dyn Decompressor + 'a>>;

/// Constructor of a container chunk decompressor: `(chunk_id, packed, verify)`.
pub type XpkCreateFn = for<'a> fn(u32, &'a [u8], bool) -> Result<Box<dyn XpkDecompressor + 'a>>;

/// A standalone format entry.
#[derive(Clone, Copy)]
pub struct Registration {
    /// Format name, for diagnostics.
    pub name: &'static str,
    /// Cheap check of the first big-endian word of a stream.
    pub detect: fn(u32) -> bool,
    /// Parse and validate a stream.
    pub create: CreateFn,
}

/// A container chunk format entry.
#[derive(Clone, Copy)]
pub struct XpkRegistration {
    /// Format name, for diagnostics.
    pub name: &'static str,
    /// Cheap check of a container chunk id.
    pub detect: fn(u32) -> bool,
    /// Parse and validate a chunk.
    pub create: XpkCreateFn,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration").field("name", &self.name).finish_non_exhaustive()
    }
}

impl fmt::Debug for XpkRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XpkRegistration").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Magic-number dispatch table for standalone streams.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<Registration>,
}

impl Registry {
    /// Build a registry from its entries.
    pub fn new(entries: impl IntoIterator<Item = Registration>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Registered entries, in detection order.
    pub fn entries(&self) -> &[Registration] {
        &self.entries
    }

    /// Find the entry recognizing `header`.
    pub fn find(&self, header: u32) -> Option<&Registration> {
        self.entries.iter().find(|entry| (entry.detect)(header))
    }

    /// Detect the format of `packed` and create its decompressor.
    pub fn create<'a>(
        &self,
        packed: &'a [u8],
        exact_size_known: bool,
        verify: bool,
    ) -> Result<Box<dyn Decompressor + 'a>> {
        let header = read_header_word(packed)?;
        match self.find(header) {
            Some(entry) => {
                debug!("detected {} stream", entry.name);
                (entry.create)(packed, exact_size_known, verify)
            }
            None => {
                debug!("no registered format for header {header:#010x}");
                Err(RetropackError::invalid_magic(header))
            }
        }
    }
}

/// Chunk-id dispatch table for container chunks.
#[derive(Debug, Clone, Default)]
pub struct XpkRegistry {
    entries: Vec<XpkRegistration>,
}

impl XpkRegistry {
    /// Build a registry from its entries.
    pub fn new(entries: impl IntoIterator<Item = XpkRegistration>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Registered entries, in detection order.
    pub fn entries(&self) -> &[XpkRegistration] {
        &self.entries
    }

    /// Find the entry recognizing `chunk_id`.
    pub fn find(&self, chunk_id: u32) -> Option<&XpkRegistration> {
        self.entries.iter().find(|entry| (entry.detect)(chunk_id))
    }

    /// Create the decompressor for a chunk tagged `chunk_id`.
    pub fn create<'a>(
        &self,
        chunk_id: u32,
        packed: &'a [u8],
        verify: bool,
    ) -> Result<Box<dyn XpkDecompressor + 'a>> {
        match self.find(chunk_id) {
            Some(entry) => (entry.create)(chunk_id, packed, verify),
            None => {
                debug!("no registered chunk format for id {chunk_id:#010x}");
                Err(RetropackError::invalid_magic(chunk_id))
            }
        }
    }
}

fn read_header_word(packed: &[u8]) -> Result<u32> {
    packed
        .first_chunk::<4>()
        .map(|bytes| u32::from_be_bytes(*bytes))
        .ok_or_else(|| RetropackError::invalid_header("stream shorter than its magic"))
}
