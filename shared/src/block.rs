//! Self-describing block framing
//!
//! Two framings share one reader:
//!
//! ```text
//! Luigi:       [tag][len u16 LE][crc8(tag, len)] then, if len > 0: [crc32c(payload) u32 LE][payload]
//! Intellicart: [len u8][tag][payload][crc16(len, tag, payload) u16 BE]
//! ```
//!
//! [`read_block`] only frames and verifies. Format crates decode the
//! payload by tag, keeping unrecognized tags as raw bytes.

use std::io::Read;

use crate::codec::ByteCursor;
use crate::crc;
use crate::error::BlockError;

/// Block framing variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    Luigi,
    Intellicart,
}

/// One framed block with verified checksums
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    pub tag: u8,
    /// Declared payload length
    pub length: u16,
    /// Stored CRC-8 over tag and length (LUIGI only)
    pub header_crc: Option<u8>,
    /// Stored payload checksum: CRC-32C for LUIGI, CRC-16 for Intellicart
    pub payload_crc: Option<u32>,
    pub payload: Vec<u8>,
}

/// Read the next block.
///
/// Returns `Ok(None)` when the source ends cleanly before a new block.
/// Running out of bytes anywhere inside a block is a truncation error, and
/// is always reported ahead of a checksum mismatch.
pub fn read_block<R: Read>(cursor: &mut ByteCursor<R>, framing: Framing) -> Result<Option<RawBlock>, BlockError> {
    match framing {
        Framing::Luigi => read_luigi(cursor),
        Framing::Intellicart => read_intellicart(cursor),
    }
}

fn read_luigi<R: Read>(cursor: &mut ByteCursor<R>) -> Result<Option<RawBlock>, BlockError> {
    let Some(tag) = cursor.try_read_u8()? else {
        return Ok(None);
    };
    let length = cursor.read_u16_le("block length")?;
    let stored_header = cursor.read_u8("block header checksum")?;

    let [lo, hi] = length.to_le_bytes();
    let computed_header = crc::crc8(&[tag, lo, hi]);
    if stored_header != computed_header {
        return Err(BlockError::HeaderChecksum {
            tag,
            expected: stored_header,
            actual: computed_header,
        });
    }

    if length == 0 {
        return Ok(Some(RawBlock {
            tag,
            length,
            header_crc: Some(stored_header),
            payload_crc: None,
            payload: Vec::new(),
        }));
    }

    let stored_payload = cursor.read_u32_le("block payload checksum")?;
    let payload = cursor.read_bytes(usize::from(length), "block payload")?;
    let computed_payload = crc::crc32c(&payload);
    if stored_payload != computed_payload {
        return Err(BlockError::PayloadChecksum {
            tag,
            expected: stored_payload,
            actual: computed_payload,
        });
    }

    Ok(Some(RawBlock {
        tag,
        length,
        header_crc: Some(stored_header),
        payload_crc: Some(stored_payload),
        payload,
    }))
}

fn read_intellicart<R: Read>(cursor: &mut ByteCursor<R>) -> Result<Option<RawBlock>, BlockError> {
    let Some(length) = cursor.try_read_u8()? else {
        return Ok(None);
    };
    let tag = cursor.read_u8("metadata tag")?;
    let payload = cursor.read_bytes(usize::from(length), "metadata payload")?;
    let stored = cursor.read_u16_be("metadata checksum")?;

    let computed = crc::crc16(&[length, tag], crc::CRC16_INITIAL);
    let computed = crc::crc16(&payload, computed);
    if stored != computed {
        return Err(BlockError::PayloadChecksum {
            tag,
            expected: u32::from(stored),
            actual: u32::from(computed),
        });
    }

    Ok(Some(RawBlock {
        tag,
        length: u16::from(length),
        header_crc: None,
        payload_crc: Some(u32::from(stored)),
        payload,
    }))
}

/// Frame `payload` under `tag`.
///
/// Intellicart frames hold at most 255 payload bytes; longer payloads are
/// cut.
pub fn write_frame(framing: Framing, tag: u8, payload: &[u8]) -> Vec<u8> {
    match framing {
        Framing::Luigi => {
            let payload = &payload[..payload.len().min(usize::from(u16::MAX))];
            let [lo, hi] = (payload.len() as u16).to_le_bytes();
            let mut frame = vec![tag, lo, hi, crc::crc8(&[tag, lo, hi])];
            if !payload.is_empty() {
                frame.extend_from_slice(&crc::crc32c(payload).to_le_bytes());
                frame.extend_from_slice(payload);
            }
            frame
        }
        Framing::Intellicart => {
            let payload = &payload[..payload.len().min(usize::from(u8::MAX))];
            let mut frame = vec![payload.len() as u8, tag];
            frame.extend_from_slice(payload);
            let checksum = crc::crc16(&frame, crc::CRC16_INITIAL);
            frame.extend_from_slice(&checksum.to_be_bytes());
            frame
        }
    }
}

/// Typed payload of one block kind
pub trait BlockPayload: Sized {
    /// Tag enumeration of the owning format
    type Tag: Copy;

    /// Tag this payload is registered under
    const BLOCK_TYPE: Self::Tag;

    fn decode(payload: &[u8]) -> Result<Self, BlockError>;

    /// Decoded blocks are read-only
    fn serialize(&self) -> Result<Vec<u8>, BlockError> {
        Err(BlockError::SerializationNotSupported {
            block: std::any::type_name::<Self>(),
        })
    }
}

/// Tag a payload type decodes
pub fn block_type<T: BlockPayload>() -> T::Tag {
    T::BLOCK_TYPE
}
