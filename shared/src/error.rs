//! Error types shared by every container parser

use std::io;

/// Failure while pulling bytes through a [`crate::ByteCursor`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Fewer bytes were available than the format requires
    #[error("truncated {context}: needed {needed} byte(s) at offset {offset}")]
    Truncated {
        context: &'static str,
        needed: usize,
        offset: u64,
    },

    /// Underlying reader failed for a reason other than end of data
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CodecError {
    /// Returns true if this error means the data simply ran out
    pub fn is_truncated(&self) -> bool {
        matches!(self, CodecError::Truncated { .. })
    }
}

/// Failure while framing or decoding a self-describing block
#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// CRC-8 over the block tag and length did not match
    #[error(
        "block 0x{tag:02X} header checksum mismatch: expected 0x{expected:02X}, computed 0x{actual:02X}"
    )]
    HeaderChecksum { tag: u8, expected: u8, actual: u8 },

    /// Payload checksum did not match
    #[error(
        "block 0x{tag:02X} payload checksum mismatch: expected 0x{expected:08X}, computed 0x{actual:08X}"
    )]
    PayloadChecksum { tag: u8, expected: u32, actual: u32 },

    /// Payload is well framed but its contents do not fit the block type
    #[error("malformed {block} block: {reason}")]
    Malformed { block: &'static str, reason: String },

    /// Decoded blocks are a read-only model
    #[error("serializing {block} is not supported")]
    SerializationNotSupported { block: &'static str },
}

impl BlockError {
    /// Returns true if the block ran past the end of the available bytes
    pub fn is_truncated(&self) -> bool {
        matches!(self, BlockError::Codec(e) if e.is_truncated())
    }

    /// Returns true for header or payload checksum mismatches
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            BlockError::HeaderChecksum { .. } | BlockError::PayloadChecksum { .. }
        )
    }
}

/// Degenerate value handed to [`crate::MetadataDateTimeBuilder`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateTimeError {
    #[error("{field} value {value} is out of range")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("{0} does not name a representable instant")]
    Unrepresentable(String),
}

/// Failure reported by a [`crate::StorageAccess`] provider
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("resource not found: {location}")]
    NotFound { location: String },

    #[error("I/O error on {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    pub(crate) fn io(location: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound {
                location: location.to_string(),
            }
        } else {
            StorageError::Io {
                location: location.to_string(),
                source,
            }
        }
    }
}
