//! Crunch-Mania stream header.
//!
//! ```text
//! offset  size  field
//!      0     4  magic ("CrM!", "Crm!", "CrM2", "Crm2")
//!      4     2  (unused by the decoder)
//!      6     4  raw size, big-endian
//!     10     4  packed size, big-endian, excluding this header
//! ```
//!
//! The third magic byte selects the sampled (delta-filtered) variant and the
//! fourth selects LZH mode.

use log::debug;
use retropack_core::config::DecodeLimits;
use retropack_core::error::{RetropackError, Result};
use std::fmt;

/// Size of the stream header in bytes.
pub const HEADER_SIZE: usize = 14;

/// Size of the bit-priming footer at the end of the payload.
pub const FOOTER_SIZE: usize = 6;

/// Smallest buffer that can hold a header and a footer.
pub const MIN_STREAM_SIZE: usize = HEADER_SIZE + FOOTER_SIZE;

/// Standalone magic numbers.
pub mod magic {
    /// Standard mode.
    pub const STANDARD: u32 = u32::from_be_bytes(*b"CrM!");
    /// Standard mode, sampled.
    pub const STANDARD_SAMPLED: u32 = u32::from_be_bytes(*b"Crm!");
    /// LZH mode.
    pub const LZH: u32 = u32::from_be_bytes(*b"CrM2");
    /// LZH mode, sampled.
    pub const LZH_SAMPLED: u32 = u32::from_be_bytes(*b"Crm2");
    /// XPK chunk id of the LZH mode.
    pub const XPK_CRM2: u32 = u32::from_be_bytes(*b"CRM2");
    /// XPK chunk id of the sampled LZH mode.
    pub const XPK_CRMS: u32 = u32::from_be_bytes(*b"CRMS");
}

/// Check a standalone stream magic.
pub fn detect_header(header: u32) -> bool {
    matches!(
        header,
        magic::STANDARD | magic::STANDARD_SAMPLED | magic::LZH | magic::LZH_SAMPLED
    )
}

/// Check an XPK chunk id.
pub fn detect_xpk_header(chunk_id: u32) -> bool {
    matches!(chunk_id, magic::XPK_CRM2 | magic::XPK_CRMS)
}

/// Decoding algorithm of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrmMode {
    /// Fixed Huffman tables with an escape for literal runs.
    Standard,
    /// Per-block Huffman tables transmitted in the stream.
    Lzh,
}

impl CrmMode {
    /// Get the mode name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Lzh => "LZH",
        }
    }
}

impl fmt::Display for CrmMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How a stream reached the decoder.
///
/// The XPK chunk id does not take part in decoding; the embedded stream
/// carries its own magic. Only the display name differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provenance {
    /// A bare Crunch-Mania file.
    #[default]
    Standalone,
    /// An XPK chunk tagged `CRM2`.
    XpkCrm2,
    /// An XPK chunk tagged `CRMS`.
    XpkCrms,
}

impl Provenance {
    /// Provenance of an XPK chunk id.
    pub fn from_xpk_id(chunk_id: u32) -> Option<Self> {
        match chunk_id {
            magic::XPK_CRM2 => Some(Self::XpkCrm2),
            magic::XPK_CRMS => Some(Self::XpkCrms),
            _ => None,
        }
    }

    /// Container sub-format name.
    pub fn sub_name(&self) -> &'static str {
        match self {
            Self::Standalone | Self::XpkCrm2 => "XPK-CRM2: Crunch-Mania LZH-mode",
            Self::XpkCrms => "XPK-CRMS: Crunch-Mania LZH-mode, sampled",
        }
    }
}

/// Parsed and validated stream header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrmHeader {
    /// Stream magic.
    pub magic: u32,
    /// Decompressed size.
    pub raw_size: usize,
    /// Payload size following the header.
    pub packed_size: usize,
    /// Whether the delta sample filter applies.
    pub sampled: bool,
    /// Decoding algorithm.
    pub mode: CrmMode,
}

impl CrmHeader {
    /// Parse the header at the start of `data` and check it against `data`'s
    /// length and `limits`.
    pub fn parse(data: &[u8], limits: &DecodeLimits) -> Result<Self> {
        if data.len() < MIN_STREAM_SIZE {
            return Err(RetropackError::invalid_header(format!(
                "stream of {} bytes is shorter than {MIN_STREAM_SIZE}",
                data.len()
            )));
        }

        let magic = read_be32(data, 0)?;
        if !detect_header(magic) {
            return Err(RetropackError::invalid_magic(magic));
        }

        let raw_size = read_be32(data, 6)? as usize;
        let packed_size = read_be32(data, 10)? as usize;
        if raw_size == 0 || packed_size == 0 {
            return Err(RetropackError::invalid_header(format!(
                "zero size (raw {raw_size}, packed {packed_size})"
            )));
        }
        if raw_size > limits.max_raw_size {
            return Err(RetropackError::size_limit(
                "raw size",
                raw_size,
                limits.max_raw_size,
            ));
        }
        if packed_size > limits.max_packed_size {
            return Err(RetropackError::size_limit(
                "packed size",
                packed_size,
                limits.max_packed_size,
            ));
        }
        if packed_size
            .checked_add(HEADER_SIZE)
            .is_none_or(|end| end > data.len())
        {
            debug!(
                "packed size {packed_size} overruns {} byte buffer",
                data.len()
            );
            return Err(RetropackError::invalid_header(format!(
                "packed size {packed_size} exceeds the {} bytes after the header",
                data.len() - HEADER_SIZE
            )));
        }

        let [_, _, kind, mode] = magic.to_be_bytes();
        Ok(Self {
            magic,
            raw_size,
            packed_size,
            sampled: kind == b'm',
            mode: if mode == b'2' {
                CrmMode::Lzh
            } else {
                CrmMode::Standard
            },
        })
    }

    /// Offset one past the last payload byte.
    pub fn stream_end(&self) -> usize {
        self.packed_size + HEADER_SIZE
    }

    /// Display name of the stream variant.
    pub fn name(&self) -> &'static str {
        match (self.mode, self.sampled) {
            (CrmMode::Standard, false) => "CrM!: Crunch-Mania standard-mode",
            (CrmMode::Standard, true) => "Crm!: Crunch-Mania standard-mode, sampled",
            (CrmMode::Lzh, false) => "CrM2: Crunch-Mania LZH-mode",
            (CrmMode::Lzh, true) => "Crm2: Crunch-Mania LZH-mode, sampled",
        }
    }
}

fn read_be32(data: &[u8], offset: usize) -> Result<u32> {
    data.get(offset..)
        .and_then(|tail| tail.first_chunk::<4>())
        .map(|bytes| u32::from_be_bytes(*bytes))
        .ok_or_else(|| RetropackError::invalid_header(format!("no 32-bit field at {offset}")))
}
