//! `.cfg` `[vars]` section parser
//!
//! ```text
//! [mapping]
//! $0000 - $1FFF = $5000      ; not ours, skipped
//!
//! [vars]
//! name = "Astrosmash"
//! year = 1981
//! ecs_compat = 2
//! release_date = 1981-06
//! ```
//!
//! Only `[vars]` sections are read, and a file may have several. Keys are
//! case-sensitive; unknown keys are skipped.

mod value;

#[cfg(test)]
mod tests;

use intv_shared::{FeatureCompatibility, MetadataDateTime, Peripheral, ProgramInformation};
use serde::{Deserialize, Serialize};

pub use value::{parse_boolean, parse_date, parse_feature, parse_integer, parse_string, try_parse_integer};

/// Section whose entries are program variables
pub const VARS_SECTION: &str = "vars";

/// Every variable the parser understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CfgVarTag {
    Name,
    ShortName,
    Author,
    Publisher,
    License,
    Description,
    GameArt,
    Music,
    SoundEffects,
    Voices,
    Documentation,
    BoxArt,
    Concept,
    MoreInfo,
    Version,
    Year,
    ReleaseDate,
    BuildDate,
    JlpFlash,
    LtoMapper,
    Intellivoice,
    Ecs,
    IntellivisionII,
    KeyboardComponent,
    TutorVision,
    JlpAccelerators,
    LtoFlash,
    Ntsc,
    Pal,
}

/// Value grammar of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CfgValueKind {
    String,
    Integer,
    Boolean,
    Date,
    Feature,
}

/// `(key, tag, legacy)`; legacy feature keys default to incompatible
const KEYS: &[(&str, CfgVarTag, bool)] = &[
    ("name", CfgVarTag::Name, false),
    ("short_name", CfgVarTag::ShortName, false),
    ("author", CfgVarTag::Author, false),
    ("publisher", CfgVarTag::Publisher, false),
    ("license", CfgVarTag::License, false),
    ("desc", CfgVarTag::Description, false),
    ("description", CfgVarTag::Description, false),
    ("game_art", CfgVarTag::GameArt, false),
    ("music", CfgVarTag::Music, false),
    ("sfx", CfgVarTag::SoundEffects, false),
    ("voices", CfgVarTag::Voices, false),
    ("docs", CfgVarTag::Documentation, false),
    ("box_art", CfgVarTag::BoxArt, false),
    ("concept", CfgVarTag::Concept, false),
    ("more_info", CfgVarTag::MoreInfo, false),
    ("version", CfgVarTag::Version, false),
    ("versions", CfgVarTag::Version, false),
    ("year", CfgVarTag::Year, false),
    ("release_date", CfgVarTag::ReleaseDate, false),
    ("build_date", CfgVarTag::BuildDate, false),
    ("jlp_flash", CfgVarTag::JlpFlash, false),
    ("lto_mapper", CfgVarTag::LtoMapper, false),
    ("voice_compat", CfgVarTag::Intellivoice, false),
    ("voice", CfgVarTag::Intellivoice, true),
    ("ecs_compat", CfgVarTag::Ecs, false),
    ("ecs", CfgVarTag::Ecs, true),
    ("intv2_compat", CfgVarTag::IntellivisionII, false),
    ("intv2", CfgVarTag::IntellivisionII, true),
    ("kc_compat", CfgVarTag::KeyboardComponent, false),
    ("tv_compat", CfgVarTag::TutorVision, false),
    ("jlp_accel", CfgVarTag::JlpAccelerators, false),
    ("jlp", CfgVarTag::JlpAccelerators, true),
    ("lto_compat", CfgVarTag::LtoFlash, false),
    ("ntsc_compat", CfgVarTag::Ntsc, false),
    ("pal_compat", CfgVarTag::Pal, false),
];

impl CfgVarTag {
    /// Resolve a key, including legacy aliases
    pub fn from_key(key: &str) -> Option<CfgVarTag> {
        lookup(key).map(|(tag, _)| tag)
    }

    /// Canonical key for this tag
    pub fn key(self) -> &'static str {
        KEYS.iter()
            .find(|(_, tag, legacy)| *tag == self && !legacy)
            .map_or("", |(key, _, _)| *key)
    }

    pub fn kind(self) -> CfgValueKind {
        match self {
            CfgVarTag::Year | CfgVarTag::JlpFlash => CfgValueKind::Integer,
            CfgVarTag::LtoMapper => CfgValueKind::Boolean,
            CfgVarTag::ReleaseDate | CfgVarTag::BuildDate => CfgValueKind::Date,
            _ if self.peripheral().is_some() => CfgValueKind::Feature,
            _ => CfgValueKind::String,
        }
    }

    /// Peripheral a feature variable describes
    pub fn peripheral(self) -> Option<Peripheral> {
        match self {
            CfgVarTag::Intellivoice => Some(Peripheral::Intellivoice),
            CfgVarTag::Ecs => Some(Peripheral::Ecs),
            CfgVarTag::IntellivisionII => Some(Peripheral::IntellivisionII),
            CfgVarTag::KeyboardComponent => Some(Peripheral::KeyboardComponent),
            CfgVarTag::TutorVision => Some(Peripheral::TutorVision),
            CfgVarTag::JlpAccelerators => Some(Peripheral::JlpAccelerators),
            CfgVarTag::LtoFlash => Some(Peripheral::LtoFlash),
            CfgVarTag::Ntsc => Some(Peripheral::Ntsc),
            CfgVarTag::Pal => Some(Peripheral::Pal),
            _ => None,
        }
    }
}

fn lookup(key: &str) -> Option<(CfgVarTag, bool)> {
    KEYS.iter()
        .find(|(name, _, _)| *name == key)
        .map(|(_, tag, legacy)| (*tag, *legacy))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CfgValue {
    String(String),
    Integer(i32),
    Boolean(bool),
    Date(MetadataDateTime),
    Feature(FeatureCompatibility),
}

/// One decoded `key = value` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfgVariable {
    pub tag: CfgVarTag,
    pub value: CfgValue,
}

impl CfgVariable {
    /// Decode one line. `None` for comments, blank lines, lines without
    /// `=`, and unknown keys.
    pub fn parse_line(line: &str) -> Option<CfgVariable> {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            return None;
        }
        let (key, raw) = line.split_once('=')?;
        let (tag, legacy) = lookup(key.trim())?;

        let value = match tag.kind() {
            CfgValueKind::String => CfgValue::String(parse_string(raw)),
            CfgValueKind::Integer => CfgValue::Integer(parse_integer(raw)),
            CfgValueKind::Boolean => CfgValue::Boolean(parse_boolean(raw)),
            CfgValueKind::Date => CfgValue::Date(parse_date(raw)),
            CfgValueKind::Feature => {
                let default = if legacy {
                    FeatureCompatibility::Incompatible
                } else {
                    FeatureCompatibility::Tolerates
                };
                CfgValue::Feature(parse_feature(raw, default))
            }
        };
        Some(CfgVariable { tag, value })
    }

    /// Fold this variable into `information`
    pub fn apply_to(&self, information: &mut ProgramInformation) {
        let metadata = &mut information.metadata;
        let features = &mut information.features;

        match (&self.value, self.tag) {
            (CfgValue::String(text), tag) => {
                let list = match tag {
                    CfgVarTag::Name => &mut metadata.long_names,
                    CfgVarTag::ShortName => &mut metadata.short_names,
                    CfgVarTag::Author => &mut metadata.programmers,
                    CfgVarTag::Publisher => &mut metadata.publishers,
                    CfgVarTag::License => &mut metadata.licenses,
                    CfgVarTag::Description => &mut metadata.descriptions,
                    CfgVarTag::GameArt => &mut metadata.graphics,
                    CfgVarTag::Music => &mut metadata.music,
                    CfgVarTag::SoundEffects => &mut metadata.sound_effects,
                    CfgVarTag::Voices => &mut metadata.voices,
                    CfgVarTag::Documentation => &mut metadata.documentation,
                    CfgVarTag::BoxArt => &mut metadata.artwork,
                    CfgVarTag::Concept => &mut metadata.designers,
                    CfgVarTag::MoreInfo => &mut metadata.contact_information,
                    CfgVarTag::Version => &mut metadata.versions,
                    _ => return,
                };
                list.push(text.clone());
            }
            (CfgValue::Integer(year), CfgVarTag::Year) if *year > 0 => {
                let date = MetadataDateTime::parse(&year.to_string());
                if !date.is_min_value() {
                    metadata.release_dates.push(date);
                }
            }
            (CfgValue::Integer(sectors), CfgVarTag::JlpFlash) => {
                features.jlp_flash_sectors = (*sectors).clamp(0, i32::from(u16::MAX)) as u16;
            }
            (CfgValue::Boolean(enabled), CfgVarTag::LtoMapper) => features.lto_flash_mapper = *enabled,
            (CfgValue::Date(date), CfgVarTag::ReleaseDate) => metadata.release_dates.push(*date),
            (CfgValue::Date(date), CfgVarTag::BuildDate) => metadata.build_dates.push(*date),
            (CfgValue::Feature(level), tag) => {
                if let Some(peripheral) = tag.peripheral() {
                    features.set(peripheral, *level);
                }
            }
            _ => {}
        }
    }
}

/// Every variable in the `[vars]` sections of `text`, in file order
pub fn parse_vars(text: &str) -> Vec<CfgVariable> {
    let mut in_vars = false;
    let mut variables = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(section) = trimmed.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            in_vars = section.trim() == VARS_SECTION;
            continue;
        }
        if in_vars {
            variables.extend(CfgVariable::parse_line(trimmed));
        }
    }
    variables
}

/// Program information described by the `[vars]` sections of `text`
pub fn parse_information(text: &str) -> ProgramInformation {
    let mut information = ProgramInformation::default();
    for variable in parse_vars(text) {
        variable.apply_to(&mut information);
    }
    information
}
