//! User settings (<config dir>/intv/config.toml)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use intv_core::RomComparison;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub compare: CompareSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareSettings {
    #[serde(default)]
    pub mode: RomComparison,
    #[serde(default = "default_true")]
    pub exclude_feature_bits: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self {
            mode: RomComparison::default(),
            exclude_feature_bits: true,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: default_level() }
    }
}

pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("org", "intvcore", "intv").map(|dirs| dirs.config_dir().to_path_buf())
}

impl Settings {
    /// Settings from the user config file, or defaults when there is none.
    /// An unreadable file is reported so the caller can fall back to defaults.
    pub fn load() -> Result<Self> {
        match config_dir() {
            Some(dir) => Self::load_from(&dir.join("config.toml")),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.compare.exclude_feature_bits);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[compare]\nmode = \"strict-crc-only\"\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.compare.mode, RomComparison::StrictCrcOnly);
        assert!(settings.compare.exclude_feature_bits);
        assert_eq!(settings.logging, LoggingSettings::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[compare]\nmode = \"sloppy\"\n").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }
}
