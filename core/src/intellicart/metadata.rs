//! Metadata blocks trailing an Intellicart-style image
//!
//! Frames use [`intv_shared::Framing::Intellicart`]. Typed payloads cover
//! the tags with structure of their own; plain text tags decode directly.

use intv_shared::{BlockError, BlockPayload, MetadataDateTime, ProgramInformation, RawBlock};
use serde::{Deserialize, Serialize};

/// Publisher table indexed by the first payload byte
pub const PUBLISHERS: [&str; 10] = [
    "Mattel Electronics",
    "INTV Corporation",
    "Imagic",
    "Activision",
    "Atarisoft",
    "Coleco",
    "CBS Electronics",
    "Parker Brothers",
    "Sega",
    "Interphase",
];

/// Publisher index meaning "name follows"
pub const PUBLISHER_BY_NAME: u8 = 0xFF;

/// Bytes below this value in a credits payload are role bytes
const CREDIT_ROLE_LIMIT: u8 = 0x20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntellicartMetadataTag {
    Ignore,
    Title,
    Publisher,
    Credits,
    UrlContactInfo,
    ReleaseDate,
    Features,
    ControllerBindings,
    ShortTitle,
    License,
    Description,
    Version,
    BuildDate,
    Unknown,
}

impl IntellicartMetadataTag {
    pub fn from_byte(tag: u8) -> Self {
        match tag {
            0x00 => Self::Ignore,
            0x01 => Self::Title,
            0x02 => Self::Publisher,
            0x03 => Self::Credits,
            0x04 => Self::UrlContactInfo,
            0x05 => Self::ReleaseDate,
            0x06 => Self::Features,
            0x07 => Self::ControllerBindings,
            0x08 => Self::ShortTitle,
            0x09 => Self::License,
            0x0A => Self::Description,
            0x0B => Self::Version,
            0x0C => Self::BuildDate,
            _ => Self::Unknown,
        }
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

// =============================================================================
// Publisher
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherBlock {
    pub name: String,
}

impl BlockPayload for PublisherBlock {
    type Tag = IntellicartMetadataTag;
    const BLOCK_TYPE: IntellicartMetadataTag = IntellicartMetadataTag::Publisher;

    /// Unknown indices give an empty name
    fn decode(payload: &[u8]) -> Result<Self, BlockError> {
        let name = match payload.split_first() {
            Some((&PUBLISHER_BY_NAME, rest)) => lossy(rest),
            Some((&index, _)) => PUBLISHERS
                .get(usize::from(index))
                .map_or_else(String::new, |name| (*name).to_string()),
            None => String::new(),
        };
        Ok(Self { name })
    }
}

// =============================================================================
// Credits
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreditRole {
    Programming,
    Graphics,
    Music,
    SoundEffects,
    VoiceActing,
    Documentation,
    GameConceptDesign,
    BoxOrOtherArtwork,
}

impl CreditRole {
    pub fn from_byte(role: u8) -> Option<Self> {
        match role {
            0x01 => Some(Self::Programming),
            0x02 => Some(Self::Graphics),
            0x03 => Some(Self::Music),
            0x04 => Some(Self::SoundEffects),
            0x05 => Some(Self::VoiceActing),
            0x06 => Some(Self::Documentation),
            0x07 => Some(Self::GameConceptDesign),
            0x08 => Some(Self::BoxOrOtherArtwork),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credit {
    pub role: CreditRole,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreditsBlock {
    pub credits: Vec<Credit>,
}

impl BlockPayload for CreditsBlock {
    type Tag = IntellicartMetadataTag;
    const BLOCK_TYPE: IntellicartMetadataTag = IntellicartMetadataTag::Credits;

    /// `(role byte, text)` pairs. Text before the first role byte, or
    /// under an unknown role, is dropped.
    fn decode(payload: &[u8]) -> Result<Self, BlockError> {
        let mut credits = Vec::new();
        let mut index = 0;
        while index < payload.len() {
            let role = payload[index];
            index += 1;
            if role >= CREDIT_ROLE_LIMIT {
                continue;
            }
            let end = payload[index..]
                .iter()
                .position(|&b| b < CREDIT_ROLE_LIMIT)
                .map_or(payload.len(), |offset| index + offset);
            let text = &payload[index..end];
            index = end;

            if let Some(role) = CreditRole::from_byte(role).filter(|_| !text.is_empty()) {
                credits.push(Credit {
                    role,
                    name: lossy(text),
                });
            }
        }
        Ok(Self { credits })
    }
}

// =============================================================================
// Controller bindings
// =============================================================================

/// Input device a binding refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerContext {
    Controller(u8),
    AnyController,
    Unknown(u8),
    Keyboard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerBinding {
    pub binding: u8,
    pub description: String,
}

impl ControllerBinding {
    pub fn context(&self) -> ControllerContext {
        match self.binding >> 4 {
            n @ 0..=3 => ControllerContext::Controller(n),
            4 => ControllerContext::AnyController,
            n @ 5..=7 => ControllerContext::Unknown(n),
            _ => ControllerContext::Keyboard,
        }
    }

    /// Input within the context
    pub fn input(&self) -> u8 {
        self.binding & 0x0F
    }

    /// Key code for keyboard bindings
    pub fn key_code(&self) -> Option<u8> {
        (self.context() == ControllerContext::Keyboard).then_some(self.binding & 0x7F)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerBindingsBlock {
    pub bindings: Vec<ControllerBinding>,
}

impl BlockPayload for ControllerBindingsBlock {
    type Tag = IntellicartMetadataTag;
    const BLOCK_TYPE: IntellicartMetadataTag = IntellicartMetadataTag::ControllerBindings;

    /// `[binding][description...][0x00]`, repeated; the final terminator
    /// may be missing
    fn decode(payload: &[u8]) -> Result<Self, BlockError> {
        let mut bindings = Vec::new();
        let mut rest = payload;
        while let Some((&binding, tail)) = rest.split_first() {
            let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
            bindings.push(ControllerBinding {
                binding,
                description: lossy(&tail[..end]),
            });
            rest = tail.get(end + 1..).unwrap_or(&[]);
        }
        Ok(Self { bindings })
    }
}

// =============================================================================
// Decoded block
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntellicartMetadata {
    Ignore,
    Title(String),
    Publisher(PublisherBlock),
    Credits(CreditsBlock),
    UrlContactInfo(String),
    ReleaseDate(MetadataDateTime),
    /// Packed feature bytes
    Features(Vec<u8>),
    ControllerBindings(ControllerBindingsBlock),
    ShortTitle(String),
    License(String),
    Description(String),
    Version(String),
    BuildDate(MetadataDateTime),
    Unknown { tag: u8, payload: Vec<u8> },
}

impl IntellicartMetadata {
    pub fn decode(raw: &RawBlock) -> Result<Self, BlockError> {
        let payload = raw.payload.as_slice();
        Ok(match IntellicartMetadataTag::from_byte(raw.tag) {
            IntellicartMetadataTag::Ignore => Self::Ignore,
            IntellicartMetadataTag::Title => Self::Title(lossy(payload)),
            IntellicartMetadataTag::Publisher => Self::Publisher(PublisherBlock::decode(payload)?),
            IntellicartMetadataTag::Credits => Self::Credits(CreditsBlock::decode(payload)?),
            IntellicartMetadataTag::UrlContactInfo => Self::UrlContactInfo(lossy(payload)),
            IntellicartMetadataTag::ReleaseDate => Self::ReleaseDate(MetadataDateTime::from_binary(payload)),
            IntellicartMetadataTag::Features => Self::Features(payload.to_vec()),
            IntellicartMetadataTag::ControllerBindings => {
                Self::ControllerBindings(ControllerBindingsBlock::decode(payload)?)
            }
            IntellicartMetadataTag::ShortTitle => Self::ShortTitle(lossy(payload)),
            IntellicartMetadataTag::License => Self::License(lossy(payload)),
            IntellicartMetadataTag::Description => Self::Description(lossy(payload)),
            IntellicartMetadataTag::Version => Self::Version(lossy(payload)),
            IntellicartMetadataTag::BuildDate => Self::BuildDate(MetadataDateTime::from_binary(payload)),
            IntellicartMetadataTag::Unknown => Self::Unknown {
                tag: raw.tag,
                payload: raw.payload.clone(),
            },
        })
    }

    /// Fold into `information`
    pub fn apply_to(&self, information: &mut ProgramInformation) {
        let metadata = &mut information.metadata;
        match self {
            Self::Title(title) => metadata.long_names.push(title.clone()),
            Self::ShortTitle(title) => metadata.short_names.push(title.clone()),
            Self::Publisher(publisher) if !publisher.name.is_empty() => {
                metadata.publishers.push(publisher.name.clone());
            }
            Self::Credits(block) => {
                for credit in &block.credits {
                    let list = match credit.role {
                        CreditRole::Programming => &mut metadata.programmers,
                        CreditRole::Graphics => &mut metadata.graphics,
                        CreditRole::Music => &mut metadata.music,
                        CreditRole::SoundEffects => &mut metadata.sound_effects,
                        CreditRole::VoiceActing => &mut metadata.voices,
                        CreditRole::Documentation => &mut metadata.documentation,
                        CreditRole::GameConceptDesign => &mut metadata.designers,
                        CreditRole::BoxOrOtherArtwork => &mut metadata.artwork,
                    };
                    list.push(credit.name.clone());
                }
            }
            Self::UrlContactInfo(url) => metadata.contact_information.push(url.clone()),
            Self::ReleaseDate(date) => metadata.release_dates.push(*date),
            Self::BuildDate(date) => metadata.build_dates.push(*date),
            Self::License(license) => metadata.licenses.push(license.clone()),
            Self::Description(description) => metadata.descriptions.push(description.clone()),
            Self::Version(version) => metadata.versions.push(version.clone()),
            Self::Features(packed) => information.features.apply_packed(packed),
            _ => {}
        }
    }
}
