//! Whole-file LUIGI reader

use std::io::Read;

use intv_shared::{ByteCursor, ByteResource, ProgramFeatures, ProgramInformation, ProgramMetadata};
use tracing::debug;

use crate::blocks::{DataHunkBlock, LuigiBlock, LuigiPayload, MemoryMapBlock, ScrambleKeyBlock};
use crate::error::LuigiError;
use crate::header::{DeviceId, LuigiFileHeader};

/// Parsed LUIGI file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuigiFile {
    pub header: LuigiFileHeader,
    pub blocks: Vec<LuigiBlock>,
}

impl LuigiFile {
    /// Parse the header and every block up to the end-of-file block or the
    /// end of the data.
    pub fn inflate<R: Read>(reader: R) -> Result<Self, LuigiError> {
        let mut cursor = ByteCursor::new(reader);
        let header = LuigiFileHeader::inflate_from(&mut cursor)?;

        let mut blocks = Vec::new();
        while let Some(block) = LuigiBlock::inflate(&mut cursor)? {
            let end = block.payload == LuigiPayload::EndOfFile;
            blocks.push(block);
            if end {
                break;
            }
        }

        debug!(
            version = header.version(),
            blocks = blocks.len(),
            bytes = cursor.position(),
            "inflated LUIGI file"
        );
        Ok(Self { header, blocks })
    }

    pub fn from_resource(resource: &ByteResource) -> Result<Self, LuigiError> {
        Self::inflate(resource.open_read()?)
    }

    pub fn scramble_key(&self) -> Option<&ScrambleKeyBlock> {
        self.blocks.iter().find_map(|block| match &block.payload {
            LuigiPayload::ScrambleKey(key) => Some(key),
            _ => None,
        })
    }

    /// True when the content is bound to one specific device
    pub fn is_scrambled(&self) -> bool {
        self.scramble_key().is_some_and(|key| !key.target.is_any())
    }

    /// Device the content is bound to, [`DeviceId::ANY`] when unbound
    pub fn target_device(&self) -> DeviceId {
        self.scramble_key().map_or(DeviceId::ANY, |key| key.target)
    }

    pub fn memory_map(&self) -> Option<&MemoryMapBlock> {
        self.blocks.iter().find_map(|block| match &block.payload {
            LuigiPayload::MemoryMap(map) => Some(map),
            _ => None,
        })
    }

    pub fn data_hunks(&self) -> impl Iterator<Item = &DataHunkBlock> {
        self.blocks.iter().filter_map(|block| match &block.payload {
            LuigiPayload::DataHunk(hunk) => Some(hunk),
            _ => None,
        })
    }

    /// Header features overlaid with any metadata feature records
    pub fn information(&self) -> ProgramInformation {
        let mut information = ProgramInformation {
            metadata: ProgramMetadata::default(),
            features: self.header.features().to_program_features(),
        };
        for block in &self.blocks {
            if let LuigiPayload::Metadata(metadata) = &block.payload {
                metadata.apply_to(&mut information);
            }
        }
        information
    }

    pub fn metadata(&self) -> ProgramMetadata {
        self.information().metadata
    }

    pub fn features(&self) -> ProgramFeatures {
        self.information().features
    }
}
