//! Descriptive program metadata
//!
//! Every field is a list: `.cfg` files may repeat keys, LUIGI metadata may
//! carry several author records, and [`ProgramMetadata::merge`] folds
//! sources together.

use serde::{Deserialize, Serialize};

use crate::datetime::MetadataDateTime;
use crate::features::ProgramFeatures;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramMetadata {
    pub long_names: Vec<String>,
    pub short_names: Vec<String>,
    pub descriptions: Vec<String>,
    pub publishers: Vec<String>,
    pub programmers: Vec<String>,
    pub designers: Vec<String>,
    pub graphics: Vec<String>,
    pub music: Vec<String>,
    pub sound_effects: Vec<String>,
    pub voices: Vec<String>,
    pub documentation: Vec<String>,
    pub artwork: Vec<String>,
    pub release_dates: Vec<MetadataDateTime>,
    pub licenses: Vec<String>,
    pub contact_information: Vec<String>,
    pub versions: Vec<String>,
    pub build_dates: Vec<MetadataDateTime>,
    pub additional_information: Vec<String>,
}

impl ProgramMetadata {
    /// Append every entry of `other`
    pub fn merge(&mut self, other: ProgramMetadata) {
        let ProgramMetadata {
            long_names,
            short_names,
            descriptions,
            publishers,
            programmers,
            designers,
            graphics,
            music,
            sound_effects,
            voices,
            documentation,
            artwork,
            release_dates,
            licenses,
            contact_information,
            versions,
            build_dates,
            additional_information,
        } = other;

        self.long_names.extend(long_names);
        self.short_names.extend(short_names);
        self.descriptions.extend(descriptions);
        self.publishers.extend(publishers);
        self.programmers.extend(programmers);
        self.designers.extend(designers);
        self.graphics.extend(graphics);
        self.music.extend(music);
        self.sound_effects.extend(sound_effects);
        self.voices.extend(voices);
        self.documentation.extend(documentation);
        self.artwork.extend(artwork);
        self.release_dates.extend(release_dates);
        self.licenses.extend(licenses);
        self.contact_information.extend(contact_information);
        self.versions.extend(versions);
        self.build_dates.extend(build_dates);
        self.additional_information.extend(additional_information);
    }

    /// First long name, falling back to the first short name
    pub fn title(&self) -> Option<&str> {
        self.long_names
            .first()
            .or_else(|| self.short_names.first())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Everything a container says about the program it holds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramInformation {
    pub metadata: ProgramMetadata,
    pub features: ProgramFeatures,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_appends() {
        let mut a = ProgramMetadata {
            long_names: vec!["Astrosmash".into()],
            programmers: vec!["John Sohl".into()],
            ..Default::default()
        };
        let b = ProgramMetadata {
            long_names: vec!["Astrosmash!".into()],
            release_dates: vec![MetadataDateTime::parse("1981")],
            ..Default::default()
        };
        a.merge(b);
        assert_eq!(a.long_names, vec!["Astrosmash", "Astrosmash!"]);
        assert_eq!(a.programmers.len(), 1);
        assert_eq!(a.release_dates[0].year(), 1981);
    }

    #[test]
    fn test_title_fallback() {
        let mut metadata = ProgramMetadata::default();
        assert!(metadata.is_empty());
        assert_eq!(metadata.title(), None);
        metadata.short_names.push("Astro".into());
        assert_eq!(metadata.title(), Some("Astro"));
        metadata.long_names.push("Astrosmash".into());
        assert_eq!(metadata.title(), Some("Astrosmash"));
    }
}
