//! Error types for Retropack operations.
//!
//! Every failure is one of two kinds:
//!
//! - **Format** errors are raised while a packed stream is being recognized
//!   and validated (unknown magic, inconsistent or oversized header fields).
//! - **Decompression** errors are raised while a recognized stream is being
//!   decoded (truncation, malformed Huffman tables, out-of-range matches).
//!
//! Both are terminal for the call that produced them.

use thiserror::Error;

/// Classification of a [`RetropackError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input is not a stream of the expected format, or its header is
    /// malformed.
    Format,
    /// The stream was recognized but could not be decoded.
    Decompression,
}

/// The main error type for Retropack operations.
#[derive(Debug, Error)]
pub enum RetropackError {
    /// Unrecognized magic number in the stream header.
    #[error("Invalid magic number: {found:02x?}")]
    InvalidMagic {
        /// The four magic bytes that were found.
        found: [u8; 4],
    },

    /// Header is too short or declares inconsistent dimensions.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// A declared size exceeds the configured decode limit.
    #[error("{what} of {size} bytes exceeds limit of {limit} bytes")]
    SizeLimit {
        /// Which size was rejected.
        what: &'static str,
        /// The declared size.
        size: usize,
        /// The configured maximum.
        limit: usize,
    },

    /// The bit cursor ran into the header boundary while more bits were needed.
    #[error("Truncated stream: bit reader exhausted at byte offset {offset}")]
    TruncatedStream {
        /// Byte offset of the cursor when the read failed.
        offset: usize,
    },

    /// A Huffman table could not be constructed.
    #[error("Invalid Huffman table: {message}")]
    InvalidHuffmanTable {
        /// Description of the table error.
        message: String,
    },

    /// A bit sequence did not resolve to any symbol of the table.
    #[error("Invalid Huffman code after {bits} bits")]
    InvalidHuffmanCode {
        /// Number of bits consumed before the traversal failed.
        bits: u32,
    },

    /// A match or literal run is longer than the space left in the output.
    #[error("Invalid length: {length} exceeds {available} available bytes")]
    InvalidLength {
        /// Requested number of bytes.
        length: usize,
        /// Bytes that could be produced or referenced.
        available: usize,
    },

    /// A back-reference points outside the already produced output.
    #[error("Invalid back-reference distance: {distance} at output offset {offset} of {raw_size}")]
    InvalidDistance {
        /// The decoded distance.
        distance: usize,
        /// The output cursor at the time of the copy.
        offset: usize,
        /// Size of the whole output buffer.
        raw_size: usize,
    },

    /// The output buffer does not have the size the decoder requires.
    #[error("Output size mismatch: expected {expected} bytes, got {actual}")]
    OutputSizeMismatch {
        /// Required size.
        expected: usize,
        /// Size of the supplied buffer.
        actual: usize,
    },

    /// The stream ended before the whole output was produced.
    #[error("Stream ended early: {remaining} output bytes were not produced")]
    IncompleteOutput {
        /// Number of output bytes left unwritten.
        remaining: usize,
    },

    /// Corrupted data in the packed stream.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset where corruption was detected.
        offset: usize,
        /// Description of the corruption.
        message: String,
    },
}

/// Result type alias for Retropack operations.
pub type Result<T> = std::result::Result<T, RetropackError>;

impl RetropackError {
    /// Create an invalid magic error.
    pub fn invalid_magic(found: u32) -> Self {
        Self::InvalidMagic {
            found: found.to_be_bytes(),
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create a size limit error.
    pub fn size_limit(what: &'static str, size: usize, limit: usize) -> Self {
        Self::SizeLimit { what, size, limit }
    }

    /// Create a truncated stream error.
    pub fn truncated(offset: usize) -> Self {
        Self::TruncatedStream { offset }
    }

    /// Create an invalid Huffman table error.
    pub fn invalid_table(message: impl Into<String>) -> Self {
        Self::InvalidHuffmanTable {
            message: message.into(),
        }
    }

    /// Create an invalid Huffman code error.
    pub fn invalid_code(bits: u32) -> Self {
        Self::InvalidHuffmanCode { bits }
    }

    /// Create an invalid length error.
    pub fn invalid_length(length: usize, available: usize) -> Self {
        Self::InvalidLength { length, available }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, offset: usize, raw_size: usize) -> Self {
        Self::InvalidDistance {
            distance,
            offset,
            raw_size,
        }
    }

    /// Create an output size mismatch error.
    pub fn size_mismatch(expected: usize, actual: usize) -> Self {
        Self::OutputSizeMismatch { expected, actual }
    }

    /// Create an incomplete output error.
    pub fn incomplete(remaining: usize) -> Self {
        Self::IncompleteOutput { remaining }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: usize, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMagic { .. } | Self::InvalidHeader { .. } | Self::SizeLimit { .. } => {
                ErrorKind::Format
            }
            _ => ErrorKind::Decompression,
        }
    }

    /// Whether this error was raised while validating a stream header.
    pub fn is_format_error(&self) -> bool {
        self.kind() == ErrorKind::Format
    }

    /// Whether this error was raised while decoding a recognized stream.
    pub fn is_decompression_error(&self) -> bool {
        self.kind() == ErrorKind::Decompression
    }
}
