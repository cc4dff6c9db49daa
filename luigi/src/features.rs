//! LUIGI header feature bits
//!
//! ```text
//! bits  0-1   Intellivoice           bits  8-9   TutorVision
//! bits  2-3   ECS                    bits 14-15  JLP accelerators
//! bits  4-5   Intellivision II       bits 22-31  JLP flash save sectors
//! bits  6-7   Keyboard Component     bit  32     LTO Flash mapper
//!                                    bit  63     flags explicitly set
//! ```
//!
//! Everything else in the low word and the whole high word is reserved and
//! carried through untouched.

use intv_shared::{FeatureCompatibility, ProgramFeatures};
use serde::{Deserialize, Serialize};

const INTELLIVOICE_SHIFT: u32 = 0;
const ECS_SHIFT: u32 = 2;
const INTELLIVISION_II_SHIFT: u32 = 4;
const KEYBOARD_COMPONENT_SHIFT: u32 = 6;
const TUTORVISION_SHIFT: u32 = 8;
const JLP_ACCELERATORS_SHIFT: u32 = 14;
const JLP_FLASH_SHIFT: u32 = 22;
const JLP_FLASH_MASK: u64 = 0x3FF;
const LTO_MAPPER_BIT: u64 = 1 << 32;
const EXPLICIT_BIT: u64 = 1 << 63;

/// Largest JLP sector count the header can hold
pub const MAX_JLP_FLASH_SECTORS: u16 = JLP_FLASH_MASK as u16;

const COMPATIBILITY_FIELDS: [u32; 6] = [
    INTELLIVOICE_SHIFT,
    ECS_SHIFT,
    INTELLIVISION_II_SHIFT,
    KEYBOARD_COMPONENT_SHIFT,
    TUTORVISION_SHIFT,
    JLP_ACCELERATORS_SHIFT,
];

/// The 128-bit feature field of a version 1 header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LuigiFeatureFlags {
    pub low: u64,
    pub high: u64,
}

impl LuigiFeatureFlags {
    pub const fn new(low: u64, high: u64) -> Self {
        Self { low, high }
    }

    /// Flags carrying `features`, marked explicitly set.
    ///
    /// JLP sector counts above [`MAX_JLP_FLASH_SECTORS`] saturate.
    pub fn from_program_features(features: &ProgramFeatures) -> Self {
        let mut low = EXPLICIT_BIT;
        let levels = [
            features.intellivoice,
            features.ecs,
            features.intellivision_ii,
            features.keyboard_component,
            features.tutorvision,
            features.jlp_accelerators,
        ];
        for (shift, level) in COMPATIBILITY_FIELDS.iter().zip(levels) {
            low |= u64::from(level.level()) << shift;
        }
        let sectors = u64::from(features.jlp_flash_sectors.min(MAX_JLP_FLASH_SECTORS));
        low |= sectors << JLP_FLASH_SHIFT;
        if features.lto_flash_mapper {
            low |= LTO_MAPPER_BIT;
        }
        Self { low, high: 0 }
    }

    /// True once a tool has written real values into the flags
    pub fn is_explicit(&self) -> bool {
        self.low & EXPLICIT_BIT != 0
    }

    /// Decode into the common feature model.
    ///
    /// Flags that were never explicitly set describe nothing, so they
    /// decode to the defaults.
    pub fn to_program_features(&self) -> ProgramFeatures {
        let mut features = ProgramFeatures::default();
        if !self.is_explicit() {
            return features;
        }

        let level = |shift: u32| FeatureCompatibility::from_bits(self.low >> shift);
        features.intellivoice = level(INTELLIVOICE_SHIFT);
        features.ecs = level(ECS_SHIFT);
        features.intellivision_ii = level(INTELLIVISION_II_SHIFT);
        features.keyboard_component = level(KEYBOARD_COMPONENT_SHIFT);
        features.tutorvision = level(TUTORVISION_SHIFT);
        features.jlp_accelerators = level(JLP_ACCELERATORS_SHIFT);
        features.jlp_flash_sectors = ((self.low >> JLP_FLASH_SHIFT) & JLP_FLASH_MASK) as u16;
        features.lto_flash_mapper = self.low & LTO_MAPPER_BIT != 0;
        features
    }

    /// Two flag sets are at parity when they describe the same features
    pub fn is_at_parity(&self, other: &Self) -> bool {
        self.to_program_features() == other.to_program_features()
    }

    pub fn to_le_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&self.low.to_le_bytes());
        bytes[8..].copy_from_slice(&self.high.to_le_bytes());
        bytes
    }
}
