//! Error types for `.rom` parsing and ROM comparison

use intv_shared::{BlockError, CodecError, StorageError};

use crate::compare::RomComparison;

/// Failure while parsing an Intellicart-style `.rom` image
#[derive(Debug, thiserror::Error)]
pub enum IntellicartError {
    /// First three bytes are not a known signature and segment count
    #[error("not an Intellicart-style ROM: bad signature")]
    BadSignature,

    #[error("segment {index} ends (0x{end:02X}00) before it starts (0x{start:02X}00)")]
    InvalidSegment { index: usize, start: u8, end: u8 },

    #[error("segment {index} checksum mismatch: expected 0x{expected:04X}, computed 0x{actual:04X}")]
    SegmentChecksum { index: usize, expected: u16, actual: u16 },

    #[error("enable table checksum mismatch: expected 0x{expected:04X}, computed 0x{actual:04X}")]
    TableChecksum { expected: u16, actual: u16 },

    #[error(transparent)]
    Block(#[from] BlockError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<CodecError> for IntellicartError {
    fn from(e: CodecError) -> Self {
        IntellicartError::Block(BlockError::Codec(e))
    }
}

impl IntellicartError {
    pub fn is_truncated(&self) -> bool {
        matches!(self, IntellicartError::Block(e) if e.is_truncated())
    }

    pub fn is_integrity_failure(&self) -> bool {
        match self {
            IntellicartError::SegmentChecksum { .. } | IntellicartError::TableChecksum { .. } => true,
            IntellicartError::Block(e) => e.is_integrity_failure(),
            _ => false,
        }
    }
}

/// Misuse of [`crate::RomComparer`] or an I/O failure during a byte comparison
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error("{0} comparison is not available in this build")]
    CanonicalUnsupported(RomComparison),

    #[error("operand is not a ROM")]
    NotARom,

    #[error(transparent)]
    Storage(#[from] StorageError),
}
