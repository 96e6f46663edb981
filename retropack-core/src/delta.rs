//! Delta sample filter.
//!
//! "Sampled" streams store byte-wise differences of the original data,
//! which compress better for 8-bit audio. The filter reconstructs the
//! absolute values as a running modulo-256 sum.

use crate::error::{RetropackError, Result};

/// Replace each byte of `data[offset..offset + size]` with the wrapping sum
/// of itself and all preceding bytes of that range.
pub fn delta_decode(data: &mut [u8], offset: usize, size: usize) -> Result<()> {
    let end = offset
        .checked_add(size)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| RetropackError::size_mismatch(offset.saturating_add(size), data.len()))?;

    let mut acc = 0u8;
    for byte in &mut data[offset..end] {
        acc = acc.wrapping_add(*byte);
        *byte = acc;
    }
    Ok(())
}
