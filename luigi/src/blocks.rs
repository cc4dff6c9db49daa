//! LUIGI block stream
//!
//! Every block after the header uses [`Framing::Luigi`]. Known tags decode
//! into typed payloads; anything else is kept verbatim as an
//! [`UnknownBlock`].

use std::io::Read;

use bitflags::bitflags;
use intv_shared::{BlockError, BlockPayload, ByteCursor, Framing, RawBlock, read_block};
use serde::{Deserialize, Serialize};

use crate::error::LuigiError;
use crate::header::DeviceId;
use crate::metadata::MetadataBlock;

/// Number of 256-word pages in the 16-bit address space
pub const PAGE_COUNT: usize = 32;

/// Mapping entry for a page with nothing behind it
pub const UNMAPPED_PAGE: u16 = 0xFFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LuigiBlockType {
    ScrambleKey,
    MemoryMapAndPermissions,
    DataHunk,
    Metadata,
    EndOfFile,
    Unknown,
}

impl LuigiBlockType {
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            0x00 => Self::ScrambleKey,
            0x01 => Self::MemoryMapAndPermissions,
            0x02 => Self::DataHunk,
            0x03 => Self::Metadata,
            0xFF => Self::EndOfFile,
            _ => Self::Unknown,
        }
    }

    /// Tag byte on disk; `None` for [`LuigiBlockType::Unknown`]
    pub fn tag(self) -> Option<u8> {
        match self {
            Self::ScrambleKey => Some(0x00),
            Self::MemoryMapAndPermissions => Some(0x01),
            Self::DataHunk => Some(0x02),
            Self::Metadata => Some(0x03),
            Self::EndOfFile => Some(0xFF),
            Self::Unknown => None,
        }
    }
}

// =============================================================================
// Payloads
// =============================================================================

/// Binds the content to one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrambleKeyBlock {
    pub target: DeviceId,
    pub key: Vec<u8>,
}

impl BlockPayload for ScrambleKeyBlock {
    type Tag = LuigiBlockType;
    const BLOCK_TYPE: LuigiBlockType = LuigiBlockType::ScrambleKey;

    fn decode(payload: &[u8]) -> Result<Self, BlockError> {
        let mut cursor = ByteCursor::from_slice(payload);
        let target = DeviceId(cursor.read_u64_le("scramble key target")?);
        Ok(Self {
            target,
            key: payload[8..].to_vec(),
        })
    }
}

bitflags! {
    /// Access allowed on one page
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct PagePermissions: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        /// 8-bit wide memory
        const NARROW = 1 << 2;
        const BANKSWITCHED = 1 << 3;
    }
}

/// Where each page of the address space comes from, and how it may be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryMapBlock {
    /// Source page per CPU page; `None` when unmapped
    pub pages: [Option<u16>; PAGE_COUNT],
    pub permissions: [PagePermissions; PAGE_COUNT],
}

impl MemoryMapBlock {
    pub const PAYLOAD_SIZE: usize = PAGE_COUNT * 3;

    pub fn mapped_pages(&self) -> impl Iterator<Item = (usize, u16, PagePermissions)> + '_ {
        self.pages
            .iter()
            .zip(self.permissions.iter())
            .enumerate()
            .filter_map(|(index, (page, permissions))| page.map(|p| (index, p, *permissions)))
    }
}

impl BlockPayload for MemoryMapBlock {
    type Tag = LuigiBlockType;
    const BLOCK_TYPE: LuigiBlockType = LuigiBlockType::MemoryMapAndPermissions;

    fn decode(payload: &[u8]) -> Result<Self, BlockError> {
        if payload.len() != Self::PAYLOAD_SIZE {
            return Err(BlockError::Malformed {
                block: "memory map",
                reason: format!("expected {} bytes, found {}", Self::PAYLOAD_SIZE, payload.len()),
            });
        }

        let mut cursor = ByteCursor::from_slice(payload);
        let mut pages = [None; PAGE_COUNT];
        for page in &mut pages {
            let value = cursor.read_u16_le("memory map page")?;
            *page = (value != UNMAPPED_PAGE).then_some(value);
        }
        let mut permissions = [PagePermissions::empty(); PAGE_COUNT];
        for permission in &mut permissions {
            *permission = PagePermissions::from_bits_retain(cursor.read_u8("page permissions")?);
        }
        Ok(Self { pages, permissions })
    }
}

/// Run of 16-bit words loaded at one address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataHunkBlock {
    pub address: u16,
    pub words: Vec<u16>,
}

impl BlockPayload for DataHunkBlock {
    type Tag = LuigiBlockType;
    const BLOCK_TYPE: LuigiBlockType = LuigiBlockType::DataHunk;

    fn decode(payload: &[u8]) -> Result<Self, BlockError> {
        if payload.len() % 2 != 0 {
            return Err(BlockError::Malformed {
                block: "data hunk",
                reason: format!("odd payload length {}", payload.len()),
            });
        }
        let mut cursor = ByteCursor::from_slice(payload);
        let address = cursor.read_u16_le("data hunk address")?;
        let words = payload[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Ok(Self { address, words })
    }
}

/// Block with a tag this crate does not know; payload kept verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBlock {
    pub payload: Vec<u8>,
}

impl BlockPayload for UnknownBlock {
    type Tag = LuigiBlockType;
    const BLOCK_TYPE: LuigiBlockType = LuigiBlockType::Unknown;

    fn decode(payload: &[u8]) -> Result<Self, BlockError> {
        Ok(Self {
            payload: payload.to_vec(),
        })
    }
}

// =============================================================================
// Block
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LuigiPayload {
    ScrambleKey(ScrambleKeyBlock),
    MemoryMap(MemoryMapBlock),
    DataHunk(DataHunkBlock),
    Metadata(MetadataBlock),
    EndOfFile,
    Unknown(UnknownBlock),
}

/// One block of the stream: framing plus decoded payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuigiBlock {
    pub raw: RawBlock,
    pub payload: LuigiPayload,
}

impl LuigiBlock {
    /// Read the next block, or `None` once the stream is cleanly exhausted
    pub fn inflate<R: Read>(cursor: &mut ByteCursor<R>) -> Result<Option<Self>, LuigiError> {
        let Some(raw) = read_block(cursor, Framing::Luigi)? else {
            return Ok(None);
        };
        let payload = decode_payload(&raw)?;
        Ok(Some(Self { raw, payload }))
    }

    pub fn block_type(&self) -> LuigiBlockType {
        LuigiBlockType::from_tag(self.raw.tag)
    }

    /// Re-encoding decoded blocks is not supported
    pub fn serialize(&self) -> Result<Vec<u8>, BlockError> {
        match &self.payload {
            LuigiPayload::ScrambleKey(block) => block.serialize(),
            LuigiPayload::MemoryMap(block) => block.serialize(),
            LuigiPayload::DataHunk(block) => block.serialize(),
            LuigiPayload::Metadata(block) => block.serialize(),
            LuigiPayload::EndOfFile => Err(BlockError::SerializationNotSupported { block: "end of file" }),
            LuigiPayload::Unknown(block) => block.serialize(),
        }
    }
}

fn decode_payload(raw: &RawBlock) -> Result<LuigiPayload, BlockError> {
    let payload = &raw.payload;
    Ok(match LuigiBlockType::from_tag(raw.tag) {
        LuigiBlockType::ScrambleKey => LuigiPayload::ScrambleKey(ScrambleKeyBlock::decode(payload)?),
        LuigiBlockType::MemoryMapAndPermissions => LuigiPayload::MemoryMap(MemoryMapBlock::decode(payload)?),
        LuigiBlockType::DataHunk => LuigiPayload::DataHunk(DataHunkBlock::decode(payload)?),
        LuigiBlockType::Metadata => LuigiPayload::Metadata(MetadataBlock::decode(payload)?),
        LuigiBlockType::EndOfFile => LuigiPayload::EndOfFile,
        LuigiBlockType::Unknown => LuigiPayload::Unknown(UnknownBlock::decode(payload)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use intv_shared::{block_type, write_frame};

    fn inflate_one(tag: u8, payload: &[u8]) -> Result<LuigiBlock, LuigiError> {
        let frame = write_frame(Framing::Luigi, tag, payload);
        let mut cursor = ByteCursor::from_slice(&frame);
        LuigiBlock::inflate(&mut cursor).map(|block| block.expect("one block"))
    }

    #[test]
    fn test_block_types() {
        assert_eq!(block_type::<ScrambleKeyBlock>(), LuigiBlockType::ScrambleKey);
        assert_eq!(block_type::<MemoryMapBlock>(), LuigiBlockType::MemoryMapAndPermissions);
        assert_eq!(block_type::<DataHunkBlock>(), LuigiBlockType::DataHunk);
        assert_eq!(block_type::<MetadataBlock>(), LuigiBlockType::Metadata);
        assert_eq!(block_type::<UnknownBlock>(), LuigiBlockType::Unknown);
        assert_eq!(LuigiBlockType::Unknown.tag(), None);
        assert_eq!(LuigiBlockType::from_tag(0xFF), LuigiBlockType::EndOfFile);
    }

    #[test]
    fn test_scramble_key() {
        let mut payload = 0xDEAD_BEEF_u64.to_le_bytes().to_vec();
        payload.extend_from_slice(&[1, 2, 3, 4]);
        let block = inflate_one(0x00, &payload).unwrap();
        match block.payload {
            LuigiPayload::ScrambleKey(key) => {
                assert_eq!(key.target, DeviceId(0xDEAD_BEEF));
                assert_eq!(key.key, vec![1, 2, 3, 4]);
            }
            other => panic!("unexpected payload {other:?}"),
        }

        let err = inflate_one(0x00, &[1, 2, 3]).unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn test_memory_map() {
        let mut payload = Vec::new();
        for page in 0..PAGE_COUNT as u16 {
            let value = if page == 5 { 0x0050 } else { UNMAPPED_PAGE };
            payload.extend_from_slice(&value.to_le_bytes());
        }
        payload.extend((0..PAGE_COUNT).map(|p| if p == 5 { 0b0101 } else { 0 }));

        let block = inflate_one(0x01, &payload).unwrap();
        let LuigiPayload::MemoryMap(map) = block.payload else {
            panic!("expected memory map");
        };
        let mapped: Vec<_> = map.mapped_pages().collect();
        assert_eq!(mapped, vec![(5, 0x0050, PagePermissions::READ | PagePermissions::NARROW)]);

        assert!(matches!(
            inflate_one(0x01, &payload[..95]),
            Err(LuigiError::Block(BlockError::Malformed { .. }))
        ));
    }

    #[test]
    fn test_data_hunk() {
        let block = inflate_one(0x02, &[0x00, 0x50, 0x34, 0x12, 0x78, 0x56]).unwrap();
        assert_eq!(
            block.payload,
            LuigiPayload::DataHunk(DataHunkBlock {
                address: 0x5000,
                words: vec![0x1234, 0x5678],
            })
        );
        assert!(inflate_one(0x02, &[0x00, 0x50, 0x34]).is_err());
    }

    #[test]
    fn test_unknown_block_keeps_raw_payload() {
        let block = inflate_one(0x42, b"future").unwrap();
        assert_eq!(block.block_type(), LuigiBlockType::Unknown);
        assert_eq!(block.raw.tag, 0x42);
        assert_eq!(
            block.payload,
            LuigiPayload::Unknown(UnknownBlock {
                payload: b"future".to_vec()
            })
        );
    }

    #[test]
    fn test_serialize_not_supported() {
        let block = inflate_one(0x02, &[0x00, 0x50]).unwrap();
        assert!(matches!(
            block.serialize(),
            Err(BlockError::SerializationNotSupported { .. })
        ));
        let eof = inflate_one(0xFF, &[]).unwrap();
        assert_eq!(eof.payload, LuigiPayload::EndOfFile);
        assert!(eof.serialize().is_err());
    }
}
