//! Format detection and comparison across real files and in-memory storage

use std::cmp::Ordering;
use std::fs;
use std::sync::Arc;

use intv_core::luigi::{LuigiFeatureFlags, LuigiFileHeader};
use intv_core::shared::crc;
use intv_core::shared::{
    ByteResource, FeatureCompatibility, Framing, MemoryStorage, ProgramFeatures, write_frame,
};
use intv_core::{Rom, RomComparer, RomComparison, RomFormat, check_format};

fn luigi_bytes(device_id: u64, features: &ProgramFeatures) -> Vec<u8> {
    let header = LuigiFileHeader::new(LuigiFeatureFlags::from_program_features(features));
    let mut bytes = header.to_bytes();
    bytes[20..28].copy_from_slice(&device_id.to_le_bytes());
    bytes[31] = crc::crc8(&bytes[..31]);
    bytes.extend(write_frame(Framing::Luigi, 0x02, &[0x00, 0x50, 0x01, 0x00, 0x02, 0x00]));
    bytes.extend(write_frame(Framing::Luigi, 0xFF, &[]));
    bytes
}

fn memory_rom(storage: &Arc<MemoryStorage>, location: &str, bytes: Vec<u8>) -> Rom {
    storage.insert(location, bytes);
    Rom::create(storage.resource(location), None).expect("recognized ROM")
}

// =============================================================================
// Format detection
// =============================================================================

#[test]
fn test_detects_formats_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let luigi = dir.path().join("game.luigi");
    let rom = dir.path().join("game.rom");
    let bin = dir.path().join("game.bin");
    let text = dir.path().join("readme.txt");
    fs::write(&luigi, luigi_bytes(0, &ProgramFeatures::default())).unwrap();
    fs::write(&rom, [0x61, 0x01, 0xFE, 0x00]).unwrap();
    fs::write(&bin, [0u8; 64]).unwrap();
    fs::write(&text, b"not a rom").unwrap();

    assert_eq!(check_format(&ByteResource::file(&luigi)), RomFormat::Luigi);
    assert_eq!(check_format(&ByteResource::file(&rom)), RomFormat::CuttleCart3Advanced);
    assert_eq!(check_format(&ByteResource::file(&bin)), RomFormat::Bin);
    assert_eq!(check_format(&ByteResource::file(&text)), RomFormat::None);
    assert_eq!(check_format(&ByteResource::file(dir.path().join("missing.rom"))), RomFormat::None);
}

#[test]
fn test_unknown_extension_with_cfg_is_bin() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("game.dat");
    fs::write(&image, [1u8, 2, 3, 4]).unwrap();
    assert_eq!(check_format(&ByteResource::file(&image)), RomFormat::None);

    fs::write(dir.path().join("game.cfg"), b"[vars]\nname = Game\n").unwrap();
    assert_eq!(check_format(&ByteResource::file(&image)), RomFormat::Bin);
}

// =============================================================================
// Checksums
// =============================================================================

#[test]
fn test_bin_with_cfg_checksums() {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("astro.bin");
    let cfg = dir.path().join("astro.cfg");
    let cfg_text = b"[mapping]\n$0000 - $1FFF = $5000\n[vars]\nname = \"Astrosmash\"\nyear = 1981\n";
    fs::write(&bin, [0x12u8; 256]).unwrap();
    fs::write(&cfg, cfg_text).unwrap();

    let rom = Rom::create(ByteResource::file(&bin), None).unwrap();
    assert_eq!(rom.format(), RomFormat::Bin);
    assert_eq!(rom.crc(), crc::crc32(&[0x12; 256]));
    assert_eq!(rom.cfg_crc(), crc::crc32(cfg_text));
    assert!(rom.validate());

    let info = rom.information().unwrap();
    assert_eq!(info.metadata.title(), Some("Astrosmash"));
    assert_eq!(info.metadata.release_dates[0].year(), 1981);
}

#[test]
fn test_bin_without_cfg_has_zero_cfg_crc() {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("lonely.bin");
    fs::write(&bin, [0x34u8; 128]).unwrap();

    let rom = Rom::create(ByteResource::file(&bin), None).unwrap();
    assert!(rom.cfg().is_none());
    assert_eq!(rom.cfg_crc(), 0);
    assert_ne!(rom.crc(), 0);
}

#[test]
fn test_refresh_after_edit_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("edit.bin");
    let cfg = dir.path().join("edit.cfg");
    fs::write(&bin, [1u8, 2, 3]).unwrap();
    fs::write(&cfg, b"[vars]\n").unwrap();

    let mut rom = Rom::create(ByteResource::file(&bin), None).unwrap();
    let rom_crc = rom.crc();
    let before = rom.cfg_crc();
    fs::write(&cfg, b"[vars]\nname = Edited\n").unwrap();

    let (after, changed) = rom.refresh_cfg_crc();
    assert!(changed);
    assert_ne!(before, after);
    assert_eq!(rom.refresh_crc(), (rom_crc, false));
    assert_eq!(rom_crc, crc::crc32(&[1, 2, 3]));
}

// =============================================================================
// Comparison
// =============================================================================

#[test]
fn test_identical_files_are_strictly_equal() {
    let storage = Arc::new(MemoryStorage::new());
    let bytes = luigi_bytes(0, &ProgramFeatures::default());
    let a = memory_rom(&storage, "a.luigi", bytes.clone());
    let b = memory_rom(&storage, "b.luigi", bytes);

    for mode in RomComparison::ALL {
        let comparer = RomComparer::new(mode);
        assert_eq!(comparer.compare(Some(&a), Some(&b)).unwrap(), Ordering::Equal, "{mode}");
    }
}

#[test]
fn test_luigi_device_binding_is_ignored() {
    let storage = Arc::new(MemoryStorage::new());
    let any = luigi_bytes(0, &ProgramFeatures::default());
    let bound = luigi_bytes(0x0123_4567_89AB_CDEF, &ProgramFeatures::default());
    assert_ne!(any, bound);

    let a = memory_rom(&storage, "any.luigi", any);
    let b = memory_rom(&storage, "bound.luigi", bound);
    assert_eq!(a.crc(), b.crc());
    assert!(RomComparer::new(RomComparison::Strict).equals(Some(&a), Some(&b)).unwrap());
    assert!(RomComparer::new(RomComparison::StrictCrcOnly).equals(Some(&a), Some(&b)).unwrap());
}

#[test]
fn test_luigi_feature_bits_toggle() {
    let storage = Arc::new(MemoryStorage::new());
    let ecs = ProgramFeatures {
        ecs: FeatureCompatibility::Requires,
        ..Default::default()
    };
    let a = memory_rom(&storage, "plain.luigi", luigi_bytes(0, &ProgramFeatures::default()));
    let b = memory_rom(&storage, "ecs.luigi", luigi_bytes(0, &ecs));

    let excluding = RomComparer::new(RomComparison::Strict);
    let including = RomComparer::new(RomComparison::Strict).exclude_feature_bits(false);
    assert!(excluding.equals(Some(&a), Some(&b)).unwrap());
    assert!(!including.equals(Some(&a), Some(&b)).unwrap());
    assert!(RomComparer::new(RomComparison::Canonical).equals(Some(&a), Some(&b)).unwrap());
}

#[test]
fn test_crc_only_with_missing_roms_compares_paths() {
    let storage = Arc::new(MemoryStorage::new());
    let a = memory_rom(&storage, "a.bin", vec![1, 2, 3]);
    let b = memory_rom(&storage, "b.bin", vec![1, 2, 3]);
    storage.remove("a.bin");
    storage.remove("b.bin");

    let comparer = RomComparer::new(RomComparison::StrictCrcOnly);
    assert_eq!(comparer.compare(Some(&a), Some(&b)).unwrap(), Ordering::Less);
    assert_eq!(comparer.compare(Some(&b), Some(&a)).unwrap(), Ordering::Greater);
    assert_eq!(comparer.compare(Some(&a), Some(&a)).unwrap(), Ordering::Equal);
}

#[test]
fn test_strict_with_missing_rom_is_an_error() {
    let storage = Arc::new(MemoryStorage::new());
    let a = memory_rom(&storage, "a.bin", vec![1, 2, 3]);
    let b = memory_rom(&storage, "b.bin", vec![1, 2, 3]);
    storage.remove("b.bin");

    assert!(RomComparer::new(RomComparison::Strict).compare(Some(&a), Some(&b)).is_err());
}

#[test]
fn test_intellicart_family_members_compare_equal() {
    let storage = Arc::new(MemoryStorage::new());
    let mut image = vec![0xA8, 0x01, 0xFE];
    image.extend_from_slice(&[0x50, 0x50]);
    image.extend(std::iter::repeat_n(0u8, 512));
    let a = memory_rom(&storage, "a.rom", image.clone());
    image[0] = 0x41;
    let b = memory_rom(&storage, "b.rom", image);

    assert_eq!(a.format(), RomFormat::Intellicart);
    assert_eq!(b.format(), RomFormat::CuttleCart3);
    assert!(RomComparer::default().equals(Some(&a), Some(&b)).unwrap());
    assert!(!RomComparer::new(RomComparison::StrictCrcOnly).equals(Some(&a), Some(&b)).unwrap());
}
