//! Peripheral compatibility model
//!
//! LUIGI header flags, `.cfg` variables and `.rom` feature tags all
//! describe the same thing; each decoder fills in a [`ProgramFeatures`].

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// How a program relates to an optional peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum FeatureCompatibility {
    Incompatible = 0,
    #[default]
    Tolerates = 1,
    Enhances = 2,
    Requires = 3,
}

impl FeatureCompatibility {
    /// Decode a 0-3 level; `None` for anything larger
    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            0 => Some(Self::Incompatible),
            1 => Some(Self::Tolerates),
            2 => Some(Self::Enhances),
            3 => Some(Self::Requires),
            _ => None,
        }
    }

    /// Decode the low two bits of `bits`
    pub fn from_bits(bits: u64) -> Self {
        match bits & 0b11 {
            0 => Self::Incompatible,
            1 => Self::Tolerates,
            2 => Self::Enhances,
            _ => Self::Requires,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for FeatureCompatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Incompatible => "incompatible",
            Self::Tolerates => "tolerates",
            Self::Enhances => "enhances",
            Self::Requires => "requires",
        };
        f.write_str(name)
    }
}

/// Peripherals and video standards with a compatibility level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Peripheral {
    Ntsc,
    Pal,
    Intellivoice,
    Ecs,
    IntellivisionII,
    KeyboardComponent,
    TutorVision,
    JlpAccelerators,
    LtoFlash,
}

impl Peripheral {
    pub const ALL: [Peripheral; 9] = [
        Peripheral::Ntsc,
        Peripheral::Pal,
        Peripheral::Intellivoice,
        Peripheral::Ecs,
        Peripheral::IntellivisionII,
        Peripheral::KeyboardComponent,
        Peripheral::TutorVision,
        Peripheral::JlpAccelerators,
        Peripheral::LtoFlash,
    ];
}

bitflags! {
    /// Cartridge capabilities that are simply present or absent
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct GeneralFeatures: u8 {
        const ONBOARD_RAM = 1 << 0;
        const PAGE_FLIPPING = 1 << 1;
        const SAVE_DATA = 1 << 2;
    }
}

/// Compatibility of one program with every known peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramFeatures {
    pub ntsc: FeatureCompatibility,
    pub pal: FeatureCompatibility,
    pub intellivoice: FeatureCompatibility,
    pub ecs: FeatureCompatibility,
    pub intellivision_ii: FeatureCompatibility,
    pub keyboard_component: FeatureCompatibility,
    pub tutorvision: FeatureCompatibility,
    pub jlp_accelerators: FeatureCompatibility,
    pub lto_flash: FeatureCompatibility,
    /// Minimum JLP flash save sectors the program needs
    pub jlp_flash_sectors: u16,
    pub lto_flash_mapper: bool,
    pub general: GeneralFeatures,
}

impl ProgramFeatures {
    pub fn get(&self, peripheral: Peripheral) -> FeatureCompatibility {
        match peripheral {
            Peripheral::Ntsc => self.ntsc,
            Peripheral::Pal => self.pal,
            Peripheral::Intellivoice => self.intellivoice,
            Peripheral::Ecs => self.ecs,
            Peripheral::IntellivisionII => self.intellivision_ii,
            Peripheral::KeyboardComponent => self.keyboard_component,
            Peripheral::TutorVision => self.tutorvision,
            Peripheral::JlpAccelerators => self.jlp_accelerators,
            Peripheral::LtoFlash => self.lto_flash,
        }
    }

    pub fn set(&mut self, peripheral: Peripheral, compatibility: FeatureCompatibility) {
        let slot = match peripheral {
            Peripheral::Ntsc => &mut self.ntsc,
            Peripheral::Pal => &mut self.pal,
            Peripheral::Intellivoice => &mut self.intellivoice,
            Peripheral::Ecs => &mut self.ecs,
            Peripheral::IntellivisionII => &mut self.intellivision_ii,
            Peripheral::KeyboardComponent => &mut self.keyboard_component,
            Peripheral::TutorVision => &mut self.tutorvision,
            Peripheral::JlpAccelerators => &mut self.jlp_accelerators,
            Peripheral::LtoFlash => &mut self.lto_flash,
        };
        *slot = compatibility;
    }

    /// Apply a packed feature payload.
    ///
    /// Each byte is optional; fields covered by missing bytes keep their
    /// current values, so an empty payload changes nothing.
    pub fn apply_packed(&mut self, bytes: &[u8]) {
        let level = |byte: u8, shift: u32| FeatureCompatibility::from_bits(u64::from(byte >> shift));

        if let Some(&b) = bytes.first() {
            self.intellivoice = level(b, 0);
            self.ecs = level(b, 2);
            self.intellivision_ii = level(b, 4);
            self.keyboard_component = level(b, 6);
        }
        if let Some(&b) = bytes.get(1) {
            self.tutorvision = level(b, 0);
            self.jlp_accelerators = level(b, 2);
            self.lto_flash = level(b, 4);
        }
        if let Some(&b) = bytes.get(2) {
            self.ntsc = level(b, 0);
            self.pal = level(b, 2);
            self.lto_flash_mapper = b & 0x10 != 0;
            self.general.set(GeneralFeatures::ONBOARD_RAM, b & 0x20 != 0);
            self.general.set(GeneralFeatures::PAGE_FLIPPING, b & 0x40 != 0);
            self.general.set(GeneralFeatures::SAVE_DATA, b & 0x80 != 0);
        }
        match bytes.get(3..5) {
            Some(&[lo, hi]) => self.jlp_flash_sectors = u16::from_le_bytes([lo, hi]),
            _ => {
                if let Some(&lo) = bytes.get(3) {
                    self.jlp_flash_sectors = (self.jlp_flash_sectors & 0xFF00) | u16::from(lo);
                }
            }
        }
    }

    /// Encode as the full five-byte packed payload
    pub fn to_packed(&self) -> [u8; 5] {
        let [lo, hi] = self.jlp_flash_sectors.to_le_bytes();
        let mut byte2 = self.ntsc.level() | (self.pal.level() << 2);
        if self.lto_flash_mapper {
            byte2 |= 0x10;
        }
        if self.general.contains(GeneralFeatures::ONBOARD_RAM) {
            byte2 |= 0x20;
        }
        if self.general.contains(GeneralFeatures::PAGE_FLIPPING) {
            byte2 |= 0x40;
        }
        if self.general.contains(GeneralFeatures::SAVE_DATA) {
            byte2 |= 0x80;
        }

        [
            self.intellivoice.level()
                | (self.ecs.level() << 2)
                | (self.intellivision_ii.level() << 4)
                | (self.keyboard_component.level() << 6),
            self.tutorvision.level() | (self.jlp_accelerators.level() << 2) | (self.lto_flash.level() << 4),
            byte2,
            lo,
            hi,
        ]
    }
}
