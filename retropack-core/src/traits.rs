//! Core traits shared by all decompressors.
//!
//! Decompressors work on fully buffered data: they borrow the packed stream
//! for their whole lifetime and write into a caller-allocated output buffer.
//! Decoding takes `&self`, so a parsed stream can be decoded more than once
//! and from several threads, as long as each call has its own output buffer.

use crate::error::Result;

/// A standalone packed-stream decompressor.
pub trait Decompressor {
    /// Human-readable name of the detected format variant.
    fn name(&self) -> &'static str;

    /// Size of the packed stream including its header.
    fn packed_size(&self) -> usize;

    /// Size of the decompressed data.
    fn raw_size(&self) -> usize;

    /// Decompress into `raw`, which must hold at least
    /// [`raw_size`](Self::raw_size) bytes.
    ///
    /// # Arguments
    ///
    /// * `raw` - Output buffer; only the first `raw_size()` bytes are written
    /// * `verify` - Request integrity checking where the format supports it
    fn decompress_into(&self, raw: &mut [u8], verify: bool) -> Result<()>;

    /// Decompress into a newly allocated buffer (convenience method).
    fn decompress(&self, verify: bool) -> Result<Vec<u8>> {
        let mut raw = vec![0u8; self.raw_size()];
        self.decompress_into(&mut raw, verify)?;
        Ok(raw)
    }
}

/// A decompressor invoked for one chunk of an XPK container.
pub trait XpkDecompressor {
    /// Human-readable name of the container sub-format.
    fn sub_name(&self) -> &'static str;

    /// Decompress one chunk into `raw`, whose length is the chunk's raw size
    /// as recorded by the container.
    ///
    /// # Arguments
    ///
    /// * `raw` - Output buffer of exactly the chunk's raw size
    /// * `previous` - Raw data of the preceding chunk, for delta-capable codecs
    /// * `verify` - Request integrity checking where the format supports it
    fn decompress_frame(&self, raw: &mut [u8], previous: &[u8], verify: bool) -> Result<()>;
}
