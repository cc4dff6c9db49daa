//! LUIGI error types

use intv_shared::{BlockError, CodecError, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum LuigiError {
    /// Resource does not start with the `LTO` magic
    #[error("not a LUIGI file: missing LTO magic")]
    WrongFormat,

    #[error("unsupported LUIGI version {0}")]
    UnsupportedVersion(u8),

    /// Stored header CRC-8 disagrees with the header bytes
    #[error("LUIGI header checksum mismatch: expected 0x{expected:02X}, computed 0x{actual:02X}")]
    HeaderChecksum { expected: u8, actual: u8 },

    #[error(transparent)]
    Block(#[from] BlockError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<CodecError> for LuigiError {
    fn from(e: CodecError) -> Self {
        LuigiError::Block(BlockError::Codec(e))
    }
}

impl LuigiError {
    pub fn is_truncated(&self) -> bool {
        matches!(self, LuigiError::Block(e) if e.is_truncated())
    }

    pub fn is_integrity_failure(&self) -> bool {
        match self {
            LuigiError::HeaderChecksum { .. } => true,
            LuigiError::Block(e) => e.is_integrity_failure(),
            _ => false,
        }
    }
}
