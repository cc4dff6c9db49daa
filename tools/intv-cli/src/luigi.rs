//! Luigi command - header fields and block list of a LUIGI file

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use intv_luigi::{LuigiFile, LuigiPayload};
use intv_shared::ByteResource;

/// Arguments for the luigi command
#[derive(Args)]
pub struct LuigiArgs {
    /// LUIGI file
    pub file: PathBuf,
}

pub fn execute(args: LuigiArgs) -> Result<()> {
    let file = LuigiFile::from_resource(&ByteResource::file(&args.file))
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let header = &file.header;
    let flags = header.features();
    println!("{}", args.file.display());
    println!("  version:   {}", header.version());
    println!("  header:    {} bytes, crc 0x{:02X}", header.size(), header.crc());
    println!("  features:  0x{:016X} 0x{:016X}", flags.high, flags.low);
    println!("  device:    {}", header.device_id());
    println!("  scrambled: {}", file.is_scrambled());

    println!("  blocks:");
    for block in &file.blocks {
        let detail = match &block.payload {
            LuigiPayload::DataHunk(hunk) => format!("${:04X}, {} words", hunk.address, hunk.words.len()),
            LuigiPayload::MemoryMap(map) => format!("{} mapped pages", map.mapped_pages().count()),
            LuigiPayload::ScrambleKey(key) => format!("target {}", key.target),
            LuigiPayload::Metadata(metadata) => format!("{} records", metadata.records.len()),
            _ => String::new(),
        };
        println!(
            "    {:?} (tag 0x{:02X}, {} bytes) {detail}",
            block.block_type(),
            block.raw.tag,
            block.raw.length
        );
    }

    let information = file.information();
    if let Some(title) = information.metadata.title() {
        println!("  title:     {title}");
    }
    Ok(())
}
