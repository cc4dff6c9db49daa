//! Metadata block sub-records
//!
//! A metadata block payload is a run of `[tag][length][payload]` records.
//! Text records are UTF-8; dates use the packed date form; features use the
//! packed feature form.

use intv_shared::{
    BlockError, BlockPayload, ByteCursor, MetadataDateTime, ProgramFeatures, ProgramInformation, ProgramMetadata,
};
use serde::{Deserialize, Serialize};

use crate::blocks::LuigiBlockType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LuigiMetadataTag {
    Name,
    ShortName,
    Authors,
    Publishers,
    ReleaseDate,
    License,
    Description,
    Miscellaneous,
    Graphics,
    Music,
    SoundEffects,
    VoiceActing,
    Documentation,
    GameConceptDesign,
    BoxOrOtherArtwork,
    UrlContactInfo,
    Version,
    BuildDate,
    Features,
    Unknown(u8),
}

impl LuigiMetadataTag {
    pub fn from_byte(tag: u8) -> Self {
        match tag {
            0x00 => Self::Name,
            0x01 => Self::ShortName,
            0x02 => Self::Authors,
            0x03 => Self::Publishers,
            0x04 => Self::ReleaseDate,
            0x05 => Self::License,
            0x06 => Self::Description,
            0x07 => Self::Miscellaneous,
            0x08 => Self::Graphics,
            0x09 => Self::Music,
            0x0A => Self::SoundEffects,
            0x0B => Self::VoiceActing,
            0x0C => Self::Documentation,
            0x0D => Self::GameConceptDesign,
            0x0E => Self::BoxOrOtherArtwork,
            0x0F => Self::UrlContactInfo,
            0x10 => Self::Version,
            0x11 => Self::BuildDate,
            0x12 => Self::Features,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuigiMetadataRecord {
    pub tag: u8,
    pub payload: Vec<u8>,
}

impl LuigiMetadataRecord {
    pub fn kind(&self) -> LuigiMetadataTag {
        LuigiMetadataTag::from_byte(self.tag)
    }

    /// Payload as text; invalid UTF-8 is replaced
    pub fn text(&self) -> String {
        let end = self.payload.iter().position(|&b| b == 0).unwrap_or(self.payload.len());
        String::from_utf8_lossy(&self.payload[..end]).into_owned()
    }
}

/// Decoded metadata block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataBlock {
    pub records: Vec<LuigiMetadataRecord>,
}

impl BlockPayload for MetadataBlock {
    type Tag = LuigiBlockType;
    const BLOCK_TYPE: LuigiBlockType = LuigiBlockType::Metadata;

    fn decode(payload: &[u8]) -> Result<Self, BlockError> {
        let mut cursor = ByteCursor::from_slice(payload);
        let mut records = Vec::new();
        while let Some(tag) = cursor.try_read_u8()? {
            let length = cursor.read_u8("metadata record length")?;
            let payload = cursor.read_bytes(usize::from(length), "metadata record")?;
            records.push(LuigiMetadataRecord { tag, payload });
        }
        Ok(Self { records })
    }
}

impl MetadataBlock {
    /// Fold every record into `information`
    pub fn apply_to(&self, information: &mut ProgramInformation) {
        let metadata = &mut information.metadata;
        for record in &self.records {
            match record.kind() {
                LuigiMetadataTag::ReleaseDate => {
                    metadata.release_dates.push(MetadataDateTime::from_binary(&record.payload));
                }
                LuigiMetadataTag::BuildDate => {
                    metadata.build_dates.push(MetadataDateTime::from_binary(&record.payload));
                }
                LuigiMetadataTag::Features => information.features.apply_packed(&record.payload),
                LuigiMetadataTag::Unknown(_) => {}
                kind => {
                    if let Some(list) = text_list(metadata, kind) {
                        list.push(record.text());
                    }
                }
            }
        }
    }

    pub fn to_program_information(&self) -> ProgramInformation {
        let mut information = ProgramInformation::default();
        self.apply_to(&mut information);
        information
    }

    pub fn features(&self) -> ProgramFeatures {
        self.to_program_information().features
    }
}

fn text_list(metadata: &mut ProgramMetadata, kind: LuigiMetadataTag) -> Option<&mut Vec<String>> {
    let list = match kind {
        LuigiMetadataTag::Name => &mut metadata.long_names,
        LuigiMetadataTag::ShortName => &mut metadata.short_names,
        LuigiMetadataTag::Authors => &mut metadata.programmers,
        LuigiMetadataTag::Publishers => &mut metadata.publishers,
        LuigiMetadataTag::License => &mut metadata.licenses,
        LuigiMetadataTag::Description => &mut metadata.descriptions,
        LuigiMetadataTag::Miscellaneous => &mut metadata.additional_information,
        LuigiMetadataTag::Graphics => &mut metadata.graphics,
        LuigiMetadataTag::Music => &mut metadata.music,
        LuigiMetadataTag::SoundEffects => &mut metadata.sound_effects,
        LuigiMetadataTag::VoiceActing => &mut metadata.voices,
        LuigiMetadataTag::Documentation => &mut metadata.documentation,
        LuigiMetadataTag::GameConceptDesign => &mut metadata.designers,
        LuigiMetadataTag::BoxOrOtherArtwork => &mut metadata.artwork,
        LuigiMetadataTag::UrlContactInfo => &mut metadata.contact_information,
        LuigiMetadataTag::Version => &mut metadata.versions,
        _ => return None,
    };
    Some(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use intv_shared::FeatureCompatibility;

    fn record(tag: u8, payload: &[u8]) -> Vec<u8> {
        let mut bytes = vec![tag, payload.len() as u8];
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn test_decode_and_apply() {
        let mut payload = Vec::new();
        payload.extend(record(0x00, b"Astrosmash"));
        payload.extend(record(0x02, b"John Sohl"));
        payload.extend(record(0x04, &[81, 1]));
        payload.extend(record(0x0D, b"Design"));
        payload.extend(record(0x12, &[0b0000_1100]));
        payload.extend(record(0x7F, b"?"));

        let block = MetadataBlock::decode(&payload).unwrap();
        assert_eq!(block.records.len(), 6);
        assert_eq!(block.records[5].kind(), LuigiMetadataTag::Unknown(0x7F));

        let info = block.to_program_information();
        assert_eq!(info.metadata.long_names, vec!["Astrosmash"]);
        assert_eq!(info.metadata.programmers, vec!["John Sohl"]);
        assert_eq!(info.metadata.designers, vec!["Design"]);
        assert_eq!(info.metadata.release_dates[0].year(), 1981);
        assert_eq!(info.features.ecs, FeatureCompatibility::Requires);
        assert_eq!(info.features.intellivoice, FeatureCompatibility::Incompatible);
    }

    #[test]
    fn test_truncated_record() {
        let mut payload = record(0x00, b"Astrosmash");
        payload.pop();
        let err = MetadataBlock::decode(&payload).unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let block = MetadataBlock::decode(&record(0x06, &[b'o', 0xFF, b'k'])).unwrap();
        let info = block.to_program_information();
        assert_eq!(info.metadata.descriptions.len(), 1);
        assert!(info.metadata.descriptions[0].starts_with('o'));
    }
}
