//! Whole-file tests

use std::sync::Arc;

use intv_shared::{FeatureCompatibility, Framing, MemoryStorage, ProgramFeatures, write_frame};

use super::*;

fn metadata_payload() -> Vec<u8> {
    let mut payload = vec![0x00, 10];
    payload.extend_from_slice(b"Astrosmash");
    payload.extend_from_slice(&[0x12, 1, 0b0000_0011]);
    payload
}

fn build_file(target: DeviceId) -> Vec<u8> {
    let features = ProgramFeatures {
        ecs: FeatureCompatibility::Enhances,
        ..Default::default()
    };
    let mut bytes = LuigiFileHeader::new(LuigiFeatureFlags::from_program_features(&features)).to_bytes();

    let mut key = target.0.to_le_bytes().to_vec();
    key.extend_from_slice(&[0x5A; 4]);
    bytes.extend(write_frame(Framing::Luigi, 0x00, &key));
    bytes.extend(write_frame(Framing::Luigi, 0x02, &[0x00, 0x50, 0x01, 0x00, 0x02, 0x00]));
    bytes.extend(write_frame(Framing::Luigi, 0x03, &metadata_payload()));
    bytes.extend(write_frame(Framing::Luigi, 0xFF, &[]));
    bytes
}

#[test]
fn test_inflate_whole_file() {
    let bytes = build_file(DeviceId::ANY);
    let file = LuigiFile::inflate(bytes.as_slice()).unwrap();

    assert_eq!(file.header.version(), 1);
    assert_eq!(file.blocks.len(), 4);
    assert!(!file.is_scrambled());
    assert_eq!(file.target_device(), DeviceId::ANY);
    assert_eq!(file.data_hunks().count(), 1);
    assert!(file.memory_map().is_none());

    let info = file.information();
    assert_eq!(info.metadata.long_names, vec!["Astrosmash"]);
    // Metadata feature record overrides the header's Intellivoice level
    assert_eq!(info.features.intellivoice, FeatureCompatibility::Requires);
    assert_eq!(info.features.ecs, FeatureCompatibility::Incompatible);
}

#[test]
fn test_scrambled_file() {
    let bytes = build_file(DeviceId(0x1122_3344_5566_7788));
    let file = LuigiFile::inflate(bytes.as_slice()).unwrap();
    assert!(file.is_scrambled());
    assert_eq!(file.target_device(), DeviceId(0x1122_3344_5566_7788));
    assert_eq!(file.scramble_key().unwrap().key, vec![0x5A; 4]);
}

#[test]
fn test_stops_at_end_of_file_block() {
    let mut bytes = build_file(DeviceId::ANY);
    bytes.extend_from_slice(b"trailing garbage that is not a block");
    let file = LuigiFile::inflate(bytes.as_slice()).unwrap();
    assert_eq!(file.blocks.last().unwrap().payload, LuigiPayload::EndOfFile);
}

#[test]
fn test_clean_exhaustion_without_end_block() {
    let mut bytes = build_file(DeviceId::ANY);
    bytes.truncate(bytes.len() - 4);
    let file = LuigiFile::inflate(bytes.as_slice()).unwrap();
    assert_eq!(file.blocks.len(), 3);
}

#[test]
fn test_truncated_block_is_reported() {
    let mut bytes = build_file(DeviceId::ANY);
    bytes.truncate(bytes.len() - 6);
    let err = LuigiFile::inflate(bytes.as_slice()).unwrap_err();
    assert!(err.is_truncated());
}

#[test]
fn test_from_resource_and_sniff() {
    let storage = Arc::new(MemoryStorage::new());
    storage.insert("game.luigi", build_file(DeviceId::ANY));
    storage.insert("other.bin", vec![0x4C, 0x54]);

    let luigi = storage.resource("game.luigi");
    assert!(LuigiFileHeader::potential_luigi_file(&luigi));
    assert!(!LuigiFileHeader::potential_luigi_file(&storage.resource("other.bin")));
    assert!(!LuigiFileHeader::potential_luigi_file(&storage.resource("missing.luigi")));

    let file = LuigiFile::from_resource(&luigi).unwrap();
    assert_eq!(file.metadata().title(), Some("Astrosmash"));
    assert!(matches!(
        LuigiFile::from_resource(&storage.resource("missing.luigi")),
        Err(LuigiError::Storage(_))
    ));
}
