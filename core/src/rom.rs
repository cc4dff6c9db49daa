//! Format-independent ROM handle
//!
//! [`Rom`] pairs a classified image with its optional `.cfg` and memoizes
//! the two checksums hosts key their databases on:
//!
//! | Format | `crc` | `cfg_crc` |
//! |--------|-------|-----------|
//! | Bin | CRC-32 of the image | CRC-32 of the `.cfg`, or 0 |
//! | Intellicart family | CRC-32 of the file | 0 |
//! | LUIGI | CRC-32 of the file without device id and header CRC | CRC-32 of the origin `.cfg`, or 0 |
//!
//! Unreadable resources checksum to 0.

use std::cell::OnceCell;

use intv_luigi::{LuigiFile, LuigiFileHeader};
use intv_shared::crc::{self, ByteRange, Crc32Options};
use intv_shared::{ByteResource, ProgramInformation, StorageError};
use tracing::{debug, warn};

use crate::cfg;
use crate::format::{RomFormat, check_format};
use crate::intellicart::IntellicartRom;

/// Lazily computed checksum, cleared when its inputs change
#[derive(Debug, Clone, Default)]
struct ChecksumCell(OnceCell<u32>);

impl ChecksumCell {
    fn get_or_compute(&self, compute: impl FnOnce() -> u32) -> u32 {
        *self.0.get_or_init(compute)
    }

    fn peek(&self) -> Option<u32> {
        self.0.get().copied()
    }

    fn invalidate(&mut self) {
        self.0.take();
    }
}

#[derive(Debug, Clone)]
pub struct Rom {
    rom: ByteResource,
    cfg: Option<ByteResource>,
    format: RomFormat,
    crc: ChecksumCell,
    cfg_crc: ChecksumCell,
}

impl Rom {
    /// Classify `rom` and wrap it.
    ///
    /// `None` when the format cannot be determined. A Bin image without an
    /// explicit `cfg` picks up `<stem>.cfg` when it exists. Intellicart
    /// images embed their metadata and never carry a `.cfg`.
    pub fn create(rom: ByteResource, cfg: Option<ByteResource>) -> Option<Rom> {
        let format = check_format(&rom);
        let cfg = match format {
            RomFormat::None => {
                debug!(rom = %rom, "unrecognized ROM format");
                return None;
            }
            RomFormat::Bin => cfg.or_else(|| {
                let companion = rom.with_extension("cfg");
                companion.exists().then_some(companion)
            }),
            RomFormat::Luigi => cfg,
            _ => None,
        };

        Some(Rom {
            rom,
            cfg,
            format,
            crc: ChecksumCell::default(),
            cfg_crc: ChecksumCell::default(),
        })
    }

    pub fn format(&self) -> RomFormat {
        self.format
    }

    pub fn rom(&self) -> &ByteResource {
        &self.rom
    }

    pub fn cfg(&self) -> Option<&ByteResource> {
        self.cfg.as_ref()
    }

    pub fn crc(&self) -> u32 {
        self.crc.get_or_compute(|| self.compute_crc())
    }

    pub fn cfg_crc(&self) -> u32 {
        self.cfg_crc.get_or_compute(|| self.compute_cfg_crc())
    }

    /// Recompute the ROM checksum; returns it and whether it changed
    pub fn refresh_crc(&mut self) -> (u32, bool) {
        let previous = self.crc.peek();
        self.crc.invalidate();
        let value = self.crc();
        (value, previous != Some(value))
    }

    /// Recompute the `.cfg` checksum; returns it and whether it changed
    pub fn refresh_cfg_crc(&mut self) -> (u32, bool) {
        let previous = self.cfg_crc.peek();
        self.cfg_crc.invalidate();
        let value = self.cfg_crc();
        (value, previous != Some(value))
    }

    /// Point a Bin image at a different `.cfg`. Other formats have no
    /// separate configuration, so this is a no-op for them. Returns true
    /// when the configuration changed.
    pub fn replace_cfg_path(&mut self, cfg: Option<ByteResource>) -> bool {
        if self.format != RomFormat::Bin || self.cfg == cfg {
            return false;
        }
        self.cfg = cfg;
        self.cfg_crc.invalidate();
        true
    }

    /// Structural re-check of the underlying bytes
    pub fn validate(&self) -> bool {
        let valid = match self.format {
            RomFormat::None => false,
            RomFormat::Bin => {
                let rom_ok = self.rom.size().is_ok_and(|size| size > 0);
                let cfg_ok = self.cfg.as_ref().is_none_or(|cfg| cfg.read_all().is_ok());
                rom_ok && cfg_ok
            }
            RomFormat::Intellicart | RomFormat::CuttleCart3 | RomFormat::CuttleCart3Advanced => {
                IntellicartRom::image_from_resource(&self.rom).is_ok()
            }
            RomFormat::Luigi => LuigiFile::from_resource(&self.rom).is_ok(),
        };
        debug!(rom = %self.rom, format = %self.format, valid, "validated ROM");
        valid
    }

    /// Descriptive metadata and features, or `None` when they cannot be
    /// extracted. Extraction problems never affect format or checksums.
    pub fn information(&self) -> Option<ProgramInformation> {
        let result: Result<ProgramInformation, String> = match self.format {
            RomFormat::None => return None,
            RomFormat::Bin => match &self.cfg {
                Some(cfg) => read_cfg_information(cfg).map_err(|e| e.to_string()),
                None => Ok(ProgramInformation::default()),
            },
            RomFormat::Intellicart | RomFormat::CuttleCart3 | RomFormat::CuttleCart3Advanced => {
                IntellicartRom::from_resource(&self.rom)
                    .map(|rom| rom.information())
                    .map_err(|e| e.to_string())
            }
            RomFormat::Luigi => LuigiFile::from_resource(&self.rom)
                .map_err(|e| e.to_string())
                .map(|file| {
                    let mut information = file.information();
                    if let Some(cfg) = &self.cfg {
                        match read_cfg_information(cfg) {
                            Ok(origin) => information.metadata.merge(origin.metadata),
                            Err(e) => debug!(cfg = %cfg, error = %e, "origin cfg unreadable"),
                        }
                    }
                    information
                }),
        };

        match result {
            Ok(information) => Some(information),
            Err(error) => {
                warn!(rom = %self.rom, %error, "cannot extract program information");
                None
            }
        }
    }

    /// Byte ranges a strict comparison skips
    pub fn comparison_ignore_ranges(&self, exclude_feature_bits: bool) -> Vec<ByteRange> {
        match self.luigi_header() {
            Some(header) => header.comparison_ignore_ranges(exclude_feature_bits),
            None => Vec::new(),
        }
    }

    /// Checksum of the program content only: LUIGI flags, device id and
    /// header CRC are skipped, as is the Intellicart signature byte
    #[cfg(feature = "canonical")]
    pub fn canonical_crc(&self) -> u32 {
        let ignore = match self.format {
            RomFormat::Luigi => self.comparison_ignore_ranges(true),
            format if format.is_intellicart_family() => vec![ByteRange::new(0, 1)],
            _ => Vec::new(),
        };
        checksum(&self.rom, &Crc32Options::default().ignoring(ignore))
    }

    fn luigi_header(&self) -> Option<LuigiFileHeader> {
        if self.format != RomFormat::Luigi {
            return None;
        }
        let reader = self.rom.open_read().ok()?;
        LuigiFileHeader::inflate(reader)
            .inspect_err(|e| debug!(rom = %self.rom, error = %e, "unreadable LUIGI header"))
            .ok()
    }

    fn compute_crc(&self) -> u32 {
        debug!(rom = %self.rom, format = %self.format, "computing ROM checksum");
        let options = match self.format {
            RomFormat::Luigi => Crc32Options::default().ignoring(self.comparison_ignore_ranges(false)),
            _ => Crc32Options::default(),
        };
        checksum(&self.rom, &options)
    }

    fn compute_cfg_crc(&self) -> u32 {
        match (&self.cfg, self.format) {
            (Some(cfg), RomFormat::Bin | RomFormat::Luigi) => checksum(cfg, &Crc32Options::default()),
            _ => 0,
        }
    }
}

fn checksum(resource: &ByteResource, options: &Crc32Options) -> u32 {
    let result = resource
        .open_read()
        .and_then(|reader| crc::crc32_stream(reader, options).map_err(|e| StorageError::Io {
            location: resource.location().to_string(),
            source: e,
        }));
    match result {
        Ok(value) => value,
        Err(e) => {
            debug!(resource = %resource, error = %e, "checksum of unreadable resource is 0");
            0
        }
    }
}

fn read_cfg_information(cfg: &ByteResource) -> Result<ProgramInformation, StorageError> {
    let bytes = cfg.read_all()?;
    Ok(cfg::parse_information(&String::from_utf8_lossy(&bytes)))
}
