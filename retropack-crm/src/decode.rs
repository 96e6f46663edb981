//! Crunch-Mania decompressor.
//!
//! [`CrmDecompressor`] validates the header up front and decodes on demand
//! into caller-supplied buffers, either as a standalone file
//! ([`Decompressor`]) or as an XPK chunk ([`XpkDecompressor`]).

use log::{debug, trace};
use retropack_core::config::DecodeLimits;
use retropack_core::delta::delta_decode;
use retropack_core::error::{RetropackError, Result};
use retropack_core::registry::{Registration, XpkRegistration};
use retropack_core::traits::{Decompressor, XpkDecompressor};

use crate::bitstream::BackwardBitReader;
use crate::header::{CrmHeader, CrmMode, HEADER_SIZE, Provenance, detect_header, detect_xpk_header};
use crate::lzh::decode_lzh;
use crate::output::BackwardOutput;
use crate::standard::decode_standard;

/// Crunch-Mania decompressor over a borrowed packed buffer.
#[derive(Debug, Clone)]
pub struct CrmDecompressor<'a> {
    /// Packed data, header included.
    packed: &'a [u8],
    /// Validated header.
    header: CrmHeader,
    /// Standalone file or XPK chunk.
    provenance: Provenance,
}

impl<'a> CrmDecompressor<'a> {
    /// Parse a standalone stream with the default limits.
    pub fn new(packed: &'a [u8]) -> Result<Self> {
        Self::with_limits(packed, DecodeLimits::DEFAULT)
    }

    /// Parse a standalone stream with custom limits.
    pub fn with_limits(packed: &'a [u8], limits: DecodeLimits) -> Result<Self> {
        let header = CrmHeader::parse(packed, &limits).inspect_err(|err| {
            debug!("rejecting Crunch-Mania stream: {err}");
        })?;
        Ok(Self {
            packed,
            header,
            provenance: Provenance::Standalone,
        })
    }

    /// Parse the stream embedded in an XPK chunk tagged `chunk_id`.
    pub fn new_xpk(chunk_id: u32, packed: &'a [u8]) -> Result<Self> {
        let provenance = Provenance::from_xpk_id(chunk_id)
            .ok_or_else(|| RetropackError::invalid_magic(chunk_id))?;
        Ok(Self {
            provenance,
            ..Self::new(packed)?
        })
    }

    /// Check a standalone stream magic.
    pub fn detect(header: u32) -> bool {
        detect_header(header)
    }

    /// Check an XPK chunk id.
    pub fn detect_xpk(chunk_id: u32) -> bool {
        detect_xpk_header(chunk_id)
    }

    /// The validated header.
    pub fn header(&self) -> &CrmHeader {
        &self.header
    }

    /// How the stream reached the decoder.
    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Decode into `raw`, which is exactly `raw_size` bytes long.
    fn decode(&self, raw: &mut [u8]) -> Result<()> {
        let header = &self.header;
        debug!(
            "decoding {}: {} -> {} bytes",
            header.name(),
            header.packed_size,
            header.raw_size
        );

        let mut reader = BackwardBitReader::new(self.packed, HEADER_SIZE, header.stream_end())?;
        let mut out = BackwardOutput::new(raw);
        match header.mode {
            CrmMode::Standard => decode_standard(&mut reader, &mut out)?,
            CrmMode::Lzh => decode_lzh(&mut reader, &mut out)?,
        }
        out.finish()?;

        if header.sampled {
            delta_decode(raw, 0, header.raw_size)?;
        }
        Ok(())
    }
}

impl CrmDecompressor<'_> {
    /// Registry entry for standalone streams.
    pub const REGISTRATION: Registration = Registration {
        name: "Crunch-Mania",
        detect: detect_header,
        create,
    };

    /// Registry entry for XPK chunks.
    pub const XPK_REGISTRATION: XpkRegistration = XpkRegistration {
        name: "XPK-CRM",
        detect: detect_xpk_header,
        create: create_xpk,
    };
}

/// Create a boxed standalone decompressor.
pub fn create(
    packed: &[u8],
    _exact_size_known: bool,
    _verify: bool,
) -> Result<Box<dyn Decompressor + '_>> {
    Ok(Box::new(CrmDecompressor::new(packed)?))
}

/// Create a boxed XPK chunk decompressor.
pub fn create_xpk(
    chunk_id: u32,
    packed: &[u8],
    _verify: bool,
) -> Result<Box<dyn XpkDecompressor + '_>> {
    Ok(Box::new(CrmDecompressor::new_xpk(chunk_id, packed)?))
}

impl Decompressor for CrmDecompressor<'_> {
    fn name(&self) -> &'static str {
        self.header.name()
    }

    fn packed_size(&self) -> usize {
        self.header.stream_end()
    }

    fn raw_size(&self) -> usize {
        self.header.raw_size
    }

    fn decompress_into(&self, raw: &mut [u8], verify: bool) -> Result<()> {
        let raw_size = self.header.raw_size;
        let available = raw.len();
        let raw = raw
            .get_mut(..raw_size)
            .ok_or_else(|| RetropackError::size_mismatch(raw_size, available))?;
        if verify {
            trace!("verification requested; Crunch-Mania streams carry no checksum");
        }
        self.decode(raw)
    }
}

impl XpkDecompressor for CrmDecompressor<'_> {
    fn sub_name(&self) -> &'static str {
        self.provenance.sub_name()
    }

    fn decompress_frame(&self, raw: &mut [u8], _previous: &[u8], verify: bool) -> Result<()> {
        if raw.len() != self.header.raw_size {
            return Err(RetropackError::size_mismatch(self.header.raw_size, raw.len()));
        }
        self.decompress_into(raw, verify)
    }
}

/// Decompress a standalone Crunch-Mania stream.
pub fn decompress_crm(packed: &[u8]) -> Result<Vec<u8>> {
    CrmDecompressor::new(packed)?.decompress(false)
}
