//! ROM equivalence under a selectable policy
//!
//! Absent ROMs sort before present ones. ROMs of incompatible formats
//! order by [`RomFormat`]; within a compatible pair the policy decides.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use intv_shared::ByteResource;
use intv_shared::crc::{ByteRange, is_ignored};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::CompareError;
use crate::format::RomFormat;
use crate::rom::Rom;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RomComparison {
    /// Byte-exact, skipping volatile header bytes
    #[default]
    Strict,
    /// `(crc, cfg_crc)` only; unreadable ROMs compare by location
    StrictCrcOnly,
    /// Checksum of program content only
    Canonical,
    /// Canonical checksum, then the `.cfg` checksum
    CanonicalStrict,
}

impl RomComparison {
    pub const ALL: [RomComparison; 4] = [
        RomComparison::Strict,
        RomComparison::StrictCrcOnly,
        RomComparison::Canonical,
        RomComparison::CanonicalStrict,
    ];

    pub fn is_canonical(self) -> bool {
        matches!(self, RomComparison::Canonical | RomComparison::CanonicalStrict)
    }

    pub fn name(self) -> &'static str {
        match self {
            RomComparison::Strict => "strict",
            RomComparison::StrictCrcOnly => "strict-crc-only",
            RomComparison::Canonical => "canonical",
            RomComparison::CanonicalStrict => "canonical-strict",
        }
    }
}

impl fmt::Display for RomComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RomComparison {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RomComparison::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown comparison mode: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomComparer {
    mode: RomComparison,
    exclude_feature_bits: bool,
}

impl Default for RomComparer {
    fn default() -> Self {
        Self::new(RomComparison::default())
    }
}

impl RomComparer {
    pub fn new(mode: RomComparison) -> Self {
        Self {
            mode,
            exclude_feature_bits: true,
        }
    }

    /// Whether LUIGI feature flags are left out of strict comparisons
    pub fn exclude_feature_bits(mut self, exclude: bool) -> Self {
        self.exclude_feature_bits = exclude;
        self
    }

    pub fn mode(&self) -> RomComparison {
        self.mode
    }

    pub fn compare(&self, a: Option<&Rom>, b: Option<&Rom>) -> Result<Ordering, CompareError> {
        #[cfg(not(feature = "canonical"))]
        if self.mode.is_canonical() {
            return Err(CompareError::CanonicalUnsupported(self.mode));
        }

        let (a, b) = match (a, b) {
            (None, None) => return Ok(Ordering::Equal),
            (None, Some(_)) => return Ok(Ordering::Less),
            (Some(_), None) => return Ok(Ordering::Greater),
            (Some(a), Some(b)) => (a, b),
        };
        if !a.format().is_compatible(b.format()) {
            return Ok(a.format().cmp(&b.format()));
        }

        let ordering = match self.mode {
            RomComparison::Strict => self.compare_bytes(a, b)?,
            RomComparison::StrictCrcOnly => compare_crcs(a, b),
            #[cfg(feature = "canonical")]
            RomComparison::Canonical => a.canonical_crc().cmp(&b.canonical_crc()),
            #[cfg(feature = "canonical")]
            RomComparison::CanonicalStrict => {
                (a.canonical_crc(), a.cfg_crc()).cmp(&(b.canonical_crc(), b.cfg_crc()))
            }
            #[cfg(not(feature = "canonical"))]
            RomComparison::Canonical | RomComparison::CanonicalStrict => {
                return Err(CompareError::CanonicalUnsupported(self.mode));
            }
        };
        trace!(a = %a.rom(), b = %b.rom(), mode = %self.mode, ?ordering, "compared ROMs");
        Ok(ordering)
    }

    pub fn equals(&self, a: Option<&Rom>, b: Option<&Rom>) -> Result<bool, CompareError> {
        Ok(self.compare(a, b)? == Ordering::Equal)
    }

    /// Compare loosely typed operands, each a [`Rom`] or an `Option<Rom>`
    pub fn compare_objects(&self, a: &dyn Any, b: &dyn Any) -> Result<Ordering, CompareError> {
        self.compare(as_rom(a)?, as_rom(b)?)
    }

    fn compare_bytes(&self, a: &Rom, b: &Rom) -> Result<Ordering, CompareError> {
        let mut a_ignore = a.comparison_ignore_ranges(self.exclude_feature_bits);
        let mut b_ignore = b.comparison_ignore_ranges(self.exclude_feature_bits);
        if a.format() != b.format() {
            // Intellicart family members differ only in the signature byte
            a_ignore.push(ByteRange::new(0, 1));
            b_ignore.push(ByteRange::new(0, 1));
        }

        let ordering = kept_bytes(a.rom(), &a_ignore)?.cmp(&kept_bytes(b.rom(), &b_ignore)?);
        if ordering != Ordering::Equal || a.format() != RomFormat::Bin {
            return Ok(ordering);
        }

        Ok(match (a.cfg(), b.cfg()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a_cfg), Some(b_cfg)) => a_cfg.read_all()?.cmp(&b_cfg.read_all()?),
        })
    }
}

fn compare_crcs(a: &Rom, b: &Rom) -> Ordering {
    if unreadable(a) || unreadable(b) {
        let location = |rom: &Rom| (rom.rom().location().to_string(), rom.cfg().map(|c| c.location().to_string()));
        return location(a).cmp(&location(b));
    }
    (a.crc(), a.cfg_crc()).cmp(&(b.crc(), b.cfg_crc()))
}

fn unreadable(rom: &Rom) -> bool {
    rom.crc() == 0 && rom.rom().read_prefix(1).is_err()
}

fn kept_bytes(resource: &ByteResource, ignore: &[ByteRange]) -> Result<Vec<u8>, CompareError> {
    let bytes = resource.read_all()?;
    if ignore.is_empty() {
        return Ok(bytes);
    }
    Ok(bytes
        .into_iter()
        .enumerate()
        .filter(|&(offset, _)| !is_ignored(ignore, offset as u64))
        .map(|(_, byte)| byte)
        .collect())
}

fn as_rom(operand: &dyn Any) -> Result<Option<&Rom>, CompareError> {
    if let Some(rom) = operand.downcast_ref::<Rom>() {
        return Ok(Some(rom));
    }
    match operand.downcast_ref::<Option<Rom>>() {
        Some(rom) => Ok(rom.as_ref()),
        None => Err(CompareError::NotARom),
    }
}
