//! LUIGI file header
//!
//! ```text
//! version 0:  "LTO" 00
//! version 1:  "LTO" 01 [features: 16 bytes][device id: u64 LE][reserved: 3][crc8 of bytes 0..31]
//! ```

use std::fmt;
use std::io::{Read, Write};

use intv_shared::crc::{self, ByteRange};
use intv_shared::{ByteCursor, ByteResource};
use serde::{Deserialize, Serialize};

use crate::error::LuigiError;
use crate::features::LuigiFeatureFlags;

pub const MAGIC: [u8; 3] = *b"LTO";

/// Newest header version this crate reads
pub const CURRENT_VERSION: u8 = 1;

pub const HEADER_V0_SIZE: usize = 4;
pub const HEADER_V1_SIZE: usize = 32;

const FEATURES_OFFSET: u64 = 4;
const FEATURES_SIZE: u64 = 16;
const DEVICE_ID_OFFSET: u64 = 20;
const DEVICE_ID_SIZE: u64 = 8;
const CRC_OFFSET: u64 = 31;

/// Unique id of an LTO Flash device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DeviceId(pub u64);

impl DeviceId {
    /// Content runs on any device
    pub const ANY: DeviceId = DeviceId(0);

    pub fn is_any(self) -> bool {
        self == Self::ANY
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any() {
            f.write_str("any")
        } else {
            write!(f, "{:016X}", self.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuigiFileHeader {
    version: u8,
    features: LuigiFeatureFlags,
    device_id: DeviceId,
    reserved: [u8; 3],
    crc: u8,
}

impl Default for LuigiFileHeader {
    fn default() -> Self {
        Self::new(LuigiFeatureFlags::default())
    }
}

impl LuigiFileHeader {
    /// Fresh version 1 header for any device
    pub fn new(features: LuigiFeatureFlags) -> Self {
        let mut header = Self {
            version: CURRENT_VERSION,
            features,
            device_id: DeviceId::ANY,
            reserved: [0; 3],
            crc: 0,
        };
        header.crc = header.compute_crc();
        header
    }

    /// Cheap magic sniff. Unreadable resources are simply not LUIGI files.
    pub fn potential_luigi_file(resource: &ByteResource) -> bool {
        resource
            .read_prefix(MAGIC.len())
            .is_ok_and(|prefix| prefix == MAGIC)
    }

    /// Read and verify a header from the start of `reader`
    pub fn inflate<R: Read>(reader: R) -> Result<Self, LuigiError> {
        let mut cursor = ByteCursor::new(reader);
        Self::inflate_from(&mut cursor)
    }

    /// Read a header from `cursor`, leaving it positioned at the first block
    pub fn inflate_from<R: Read>(cursor: &mut ByteCursor<R>) -> Result<Self, LuigiError> {
        let mut magic = [0u8; 3];
        match cursor.read_into(&mut magic, "LUIGI magic") {
            Ok(()) if magic == MAGIC => {}
            Ok(()) => return Err(LuigiError::WrongFormat),
            Err(e) if e.is_truncated() => return Err(LuigiError::WrongFormat),
            Err(e) => return Err(e.into()),
        }

        let version = cursor.read_u8("LUIGI version")?;
        match version {
            0 => {
                return Ok(Self {
                    version,
                    features: LuigiFeatureFlags::default(),
                    device_id: DeviceId::ANY,
                    reserved: [0; 3],
                    crc: 0,
                });
            }
            CURRENT_VERSION => {}
            other => return Err(LuigiError::UnsupportedVersion(other)),
        }

        let low = cursor.read_u64_le("LUIGI feature flags")?;
        let high = cursor.read_u64_le("LUIGI feature flags")?;
        let device_id = DeviceId(cursor.read_u64_le("LUIGI device id")?);
        let mut reserved = [0u8; 3];
        cursor.read_into(&mut reserved, "LUIGI reserved bytes")?;
        let stored = cursor.read_u8("LUIGI header checksum")?;

        let header = Self {
            version,
            features: LuigiFeatureFlags::new(low, high),
            device_id,
            reserved,
            crc: stored,
        };
        let computed = header.compute_crc();
        if stored != computed {
            return Err(LuigiError::HeaderChecksum {
                expected: stored,
                actual: computed,
            });
        }
        Ok(header)
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn features(&self) -> LuigiFeatureFlags {
        self.features
    }

    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }

    pub fn crc(&self) -> u8 {
        self.crc
    }

    /// Size of the header on disk
    pub fn size(&self) -> usize {
        if self.version == 0 {
            HEADER_V0_SIZE
        } else {
            HEADER_V1_SIZE
        }
    }

    /// Whether storing `features` would change the header.
    ///
    /// Unforced, only a change in the described features counts; forced,
    /// any bit difference does.
    pub fn would_modify_features(&self, features: &LuigiFeatureFlags, force: bool) -> bool {
        if force {
            self.version == 0 || self.features != *features
        } else {
            !self.features.is_at_parity(features)
        }
    }

    /// Store `features` if that would modify the header, recomputing the
    /// checksum. A version 0 header is upgraded since it has nowhere to keep
    /// flags. Returns true when the header changed.
    pub fn update_features(&mut self, features: LuigiFeatureFlags, force: bool) -> bool {
        if !self.would_modify_features(&features, force) {
            return false;
        }
        if self.version == 0 {
            self.version = CURRENT_VERSION;
            self.device_id = DeviceId::ANY;
            self.reserved = [0; 3];
        }
        self.features = features;
        self.crc = self.compute_crc();
        true
    }

    /// Byte ranges that vary between equivalent copies of one program
    pub fn comparison_ignore_ranges(&self, exclude_feature_bits: bool) -> Vec<ByteRange> {
        if self.version == 0 {
            return Vec::new();
        }
        let mut ranges = Vec::with_capacity(3);
        if exclude_feature_bits {
            ranges.push(ByteRange::new(FEATURES_OFFSET, FEATURES_SIZE));
        }
        ranges.push(ByteRange::new(DEVICE_ID_OFFSET, DEVICE_ID_SIZE));
        ranges.push(ByteRange::new(CRC_OFFSET, 1));
        ranges
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.bytes_before_crc();
        if self.version != 0 {
            bytes.push(self.crc);
        }
        bytes
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writer.write_all(&self.to_bytes())
    }

    fn bytes_before_crc(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_V1_SIZE);
        bytes.extend_from_slice(&MAGIC);
        bytes.push(self.version);
        if self.version == 0 {
            return bytes;
        }
        bytes.extend_from_slice(&self.features.low.to_le_bytes());
        bytes.extend_from_slice(&self.features.high.to_le_bytes());
        bytes.extend_from_slice(&self.device_id.0.to_le_bytes());
        bytes.extend_from_slice(&self.reserved);
        bytes
    }

    fn compute_crc(&self) -> u8 {
        crc::crc8(&self.bytes_before_crc())
    }
}
