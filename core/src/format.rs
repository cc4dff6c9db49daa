//! Format detection
//!
//! Only the first few bytes (and, for `.bin`, the presence of a companion
//! `.cfg`) are looked at; structural validation belongs to
//! [`crate::Rom::validate`].

use std::fmt;

use intv_luigi::MAGIC as LUIGI_MAGIC;
use intv_shared::ByteResource;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Container formats, in comparison order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum RomFormat {
    #[default]
    None,
    /// Raw image with an optional `.cfg`
    Bin,
    Intellicart,
    CuttleCart3,
    CuttleCart3Advanced,
    Luigi,
}

/// Extensions that mark a raw image even without a `.cfg`
pub const BIN_EXTENSIONS: [&str; 3] = ["bin", "int", "itv"];

/// Bytes needed to tell every format apart
pub const SNIFF_LENGTH: usize = 3;

impl RomFormat {
    /// Formats share a hardware family when a byte comparison between
    /// them is meaningful
    pub fn is_compatible(self, other: RomFormat) -> bool {
        self == other || (self.is_intellicart_family() && other.is_intellicart_family())
    }

    pub fn is_intellicart_family(self) -> bool {
        matches!(
            self,
            RomFormat::Intellicart | RomFormat::CuttleCart3 | RomFormat::CuttleCart3Advanced
        )
    }

    /// Leading signature byte of an Intellicart-family image
    pub fn signature(self) -> Option<u8> {
        match self {
            RomFormat::Intellicart => Some(0xA8),
            RomFormat::CuttleCart3 => Some(0x41),
            RomFormat::CuttleCart3Advanced => Some(0x61),
            _ => None,
        }
    }

    pub fn from_signature(byte: u8) -> Option<RomFormat> {
        match byte {
            0xA8 => Some(RomFormat::Intellicart),
            0x41 => Some(RomFormat::CuttleCart3),
            0x61 => Some(RomFormat::CuttleCart3Advanced),
            _ => None,
        }
    }

    /// Classify by the leading bytes alone
    pub fn from_prefix(prefix: &[u8]) -> Option<RomFormat> {
        if prefix.starts_with(&LUIGI_MAGIC) {
            return Some(RomFormat::Luigi);
        }
        match *prefix {
            [signature, segments, complement, ..] if segments != 0 && complement == !segments => {
                RomFormat::from_signature(signature)
            }
            _ => None,
        }
    }
}

impl fmt::Display for RomFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RomFormat::None => "none",
            RomFormat::Bin => "bin",
            RomFormat::Intellicart => "intellicart",
            RomFormat::CuttleCart3 => "cuttlecart3",
            RomFormat::CuttleCart3Advanced => "cuttlecart3-advanced",
            RomFormat::Luigi => "luigi",
        };
        f.write_str(name)
    }
}

/// Classify `resource`. Unreadable resources are [`RomFormat::None`].
pub fn check_format(resource: &ByteResource) -> RomFormat {
    let prefix = match resource.read_prefix(SNIFF_LENGTH) {
        Ok(prefix) => prefix,
        Err(e) => {
            debug!(resource = %resource, error = %e, "cannot sniff format");
            return RomFormat::None;
        }
    };

    if let Some(format) = RomFormat::from_prefix(&prefix) {
        debug!(resource = %resource, %format, "format from signature");
        return format;
    }

    let bin_extension = resource
        .extension()
        .is_some_and(|ext| BIN_EXTENSIONS.iter().any(|bin| ext.eq_ignore_ascii_case(bin)));
    if bin_extension || resource.with_extension("cfg").exists() {
        return RomFormat::Bin;
    }
    RomFormat::None
}
