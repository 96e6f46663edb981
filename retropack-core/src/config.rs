//! Decode limits shared by all decompressors.

/// Upper bounds on the sizes a stream header may declare.
///
/// Headers declaring larger sizes are rejected before any output buffer is
/// allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum packed payload size in bytes.
    pub max_packed_size: usize,
    /// Maximum decompressed size in bytes.
    pub max_raw_size: usize,
}

impl DecodeLimits {
    /// Default limits: 16 MiB packed and 16 MiB raw.
    pub const DEFAULT: Self = Self {
        max_packed_size: 0x100_0000,
        max_raw_size: 0x100_0000,
    };

    /// Create custom decode limits.
    pub const fn new(max_packed_size: usize, max_raw_size: usize) -> Self {
        Self {
            max_packed_size,
            max_raw_size,
        }
    }
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}
