//! Intellicart-style `.rom` images (Intellicart, CuttleCart 3, CC3 Advanced)
//!
//! ```text
//! [signature][segment count n][!n]
//! n x ([start page][end page][(end - start + 1) * 256 words, BE][crc16 BE])
//! [16-byte enable table][32-byte fine address table][crc16 BE]
//! metadata blocks to end of file
//! ```
//!
//! Segment checksums cover the two page bytes and the data. Metadata
//! problems never affect the image itself: [`IntellicartRom::parse`] reports
//! them, [`IntellicartRom::parse_image`] stops before them.

mod metadata;


use std::io::Read;

use intv_shared::crc::{self, CRC16_INITIAL};
use intv_shared::{BlockError, ByteCursor, ByteResource, Framing, ProgramInformation, read_block};
use tracing::{debug, warn};

use crate::error::IntellicartError;
use crate::format::RomFormat;

pub use metadata::{
    ControllerBinding, ControllerBindingsBlock, ControllerContext, Credit, CreditRole, CreditsBlock,
    IntellicartMetadata, IntellicartMetadataTag, PUBLISHER_BY_NAME, PUBLISHERS, PublisherBlock,
};

/// Words per 256-word page
const PAGE_WORDS: usize = 256;

pub const ENABLE_TABLE_SIZE: usize = 16;
pub const FINE_ADDRESS_TABLE_SIZE: usize = 32;

/// Contiguous run of pages loaded from the image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomSegment {
    pub start_page: u8,
    pub end_page: u8,
    pub words: Vec<u16>,
}

impl RomSegment {
    /// First CPU address of the segment
    pub fn start_address(&self) -> u16 {
        u16::from(self.start_page) << 8
    }

    /// Last CPU address of the segment
    pub fn end_address(&self) -> u16 {
        (u16::from(self.end_page) << 8) | 0xFF
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntellicartRom {
    pub format: RomFormat,
    pub segments: Vec<RomSegment>,
    pub enable_table: [u8; ENABLE_TABLE_SIZE],
    pub fine_address_table: [u8; FINE_ADDRESS_TABLE_SIZE],
    pub metadata: Vec<IntellicartMetadata>,
}

impl IntellicartRom {
    /// Parse the image and the metadata blocks after it
    ///
    /// Metadata stops at the first block that fails to read or decode; the
    /// blocks before it are kept.
    pub fn parse<R: Read>(reader: R) -> Result<Self, IntellicartError> {
        let mut cursor = ByteCursor::new(reader);
        let mut rom = Self::parse_image_from(&mut cursor)?;
        loop {
            match next_metadata(&mut cursor) {
                Ok(Some(metadata)) => rom.metadata.push(metadata),
                Ok(None) => break,
                Err(e) => {
                    warn!(kept = rom.metadata.len(), "Dropping Intellicart metadata: {e}");
                    break;
                }
            }
        }
        debug!(
            format = %rom.format,
            segments = rom.segments.len(),
            metadata = rom.metadata.len(),
            "parsed Intellicart image"
        );
        Ok(rom)
    }

    /// Parse the image only, ignoring anything after the tables
    pub fn parse_image<R: Read>(reader: R) -> Result<Self, IntellicartError> {
        Self::parse_image_from(&mut ByteCursor::new(reader))
    }

    pub fn from_resource(resource: &ByteResource) -> Result<Self, IntellicartError> {
        Self::parse(resource.open_read()?)
    }

    pub fn image_from_resource(resource: &ByteResource) -> Result<Self, IntellicartError> {
        Self::parse_image(resource.open_read()?)
    }

    fn parse_image_from<R: Read>(cursor: &mut ByteCursor<R>) -> Result<Self, IntellicartError> {
        let mut signature = [0u8; 3];
        cursor.read_into(&mut signature, "ROM signature")?;
        let format = RomFormat::from_prefix(&signature)
            .filter(|format| format.is_intellicart_family())
            .ok_or(IntellicartError::BadSignature)?;

        let segment_count = usize::from(signature[1]);
        let mut segments = Vec::with_capacity(segment_count);
        for index in 0..segment_count {
            segments.push(read_segment(cursor, index)?);
        }

        let mut tables = [0u8; ENABLE_TABLE_SIZE + FINE_ADDRESS_TABLE_SIZE];
        cursor.read_into(&mut tables, "enable tables")?;
        let stored = cursor.read_u16_be("enable table checksum")?;
        let computed = crc::crc16(&tables, CRC16_INITIAL);
        if stored != computed {
            return Err(IntellicartError::TableChecksum {
                expected: stored,
                actual: computed,
            });
        }

        let mut enable_table = [0u8; ENABLE_TABLE_SIZE];
        let mut fine_address_table = [0u8; FINE_ADDRESS_TABLE_SIZE];
        enable_table.copy_from_slice(&tables[..ENABLE_TABLE_SIZE]);
        fine_address_table.copy_from_slice(&tables[ENABLE_TABLE_SIZE..]);

        Ok(Self {
            format,
            segments,
            enable_table,
            fine_address_table,
            metadata: Vec::new(),
        })
    }

    /// Program information from the metadata blocks
    pub fn information(&self) -> ProgramInformation {
        let mut information = ProgramInformation::default();
        for block in &self.metadata {
            block.apply_to(&mut information);
        }
        information
    }

    pub fn controller_bindings(&self) -> impl Iterator<Item = &ControllerBinding> {
        self.metadata.iter().flat_map(|block| match block {
            IntellicartMetadata::ControllerBindings(bindings) => bindings.bindings.as_slice(),
            _ => &[][..],
        })
    }

    /// Encode the image (signature, segments and tables). Metadata blocks
    /// are not written.
    pub fn image_bytes(&self) -> Vec<u8> {
        let count = self.segments.len().min(usize::from(u8::MAX)) as u8;
        let signature = self.format.signature().unwrap_or(0xA8);
        let mut bytes = vec![signature, count, !count];

        for segment in self.segments.iter().take(usize::from(count)) {
            let start = bytes.len();
            bytes.push(segment.start_page);
            bytes.push(segment.end_page);
            for word in &segment.words {
                bytes.extend_from_slice(&word.to_be_bytes());
            }
            let checksum = crc::crc16(&bytes[start..], CRC16_INITIAL);
            bytes.extend_from_slice(&checksum.to_be_bytes());
        }

        let tables_start = bytes.len();
        bytes.extend_from_slice(&self.enable_table);
        bytes.extend_from_slice(&self.fine_address_table);
        let checksum = crc::crc16(&bytes[tables_start..], CRC16_INITIAL);
        bytes.extend_from_slice(&checksum.to_be_bytes());
        bytes
    }

    /// Total program words across all segments
    pub fn word_count(&self) -> usize {
        self.segments.iter().map(|segment| segment.words.len()).sum()
    }
}

fn next_metadata<R: Read>(cursor: &mut ByteCursor<R>) -> Result<Option<IntellicartMetadata>, BlockError> {
    read_block(cursor, Framing::Intellicart)?
        .map(|raw| IntellicartMetadata::decode(&raw))
        .transpose()
}

fn read_segment<R: Read>(cursor: &mut ByteCursor<R>, index: usize) -> Result<RomSegment, IntellicartError> {
    let start_page = cursor.read_u8("segment start")?;
    let end_page = cursor.read_u8("segment end")?;
    if end_page < start_page {
        return Err(IntellicartError::InvalidSegment {
            index,
            start: start_page,
            end: end_page,
        });
    }

    let word_count = (usize::from(end_page - start_page) + 1) * PAGE_WORDS;
    let data = cursor.read_bytes(word_count * 2, "segment data")?;
    let stored = cursor.read_u16_be("segment checksum")?;

    let computed = crc::crc16(&[start_page, end_page], CRC16_INITIAL);
    let computed = crc::crc16(&data, computed);
    if stored != computed {
        return Err(IntellicartError::SegmentChecksum {
            index,
            expected: stored,
            actual: computed,
        });
    }

    let words = data
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    Ok(RomSegment {
        start_page,
        end_page,
        words,
    })
}
