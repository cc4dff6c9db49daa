//! Info command - format, checksums, features and metadata of a ROM

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use intv_core::{Rom, RomFormat};
use intv_shared::{ByteResource, Peripheral, ProgramInformation};
use serde::Serialize;

/// Arguments for the info command
#[derive(Args)]
pub struct InfoArgs {
    /// ROM image (.bin, .int, .rom, .luigi, ...)
    pub rom: PathBuf,

    /// Configuration file (defaults to the .cfg next to a .bin)
    #[arg(long)]
    pub cfg: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct InfoReport {
    rom: String,
    cfg: Option<String>,
    format: RomFormat,
    crc: u32,
    cfg_crc: u32,
    valid: bool,
    information: Option<ProgramInformation>,
}

pub fn execute(args: InfoArgs) -> Result<()> {
    let Some(rom) = Rom::create(ByteResource::file(&args.rom), args.cfg.as_ref().map(ByteResource::file)) else {
        bail!("{} is not a recognized ROM", args.rom.display());
    };

    let report = InfoReport {
        rom: rom.rom().location().to_string(),
        cfg: rom.cfg().map(|cfg| cfg.location().to_string()),
        format: rom.format(),
        crc: rom.crc(),
        cfg_crc: rom.cfg_crc(),
        valid: rom.validate(),
        information: rom.information(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", report.rom);
    if let Some(cfg) = &report.cfg {
        println!("  cfg:     {cfg}");
    }
    println!("  format:  {}", report.format);
    println!("  crc:     0x{:08X}", report.crc);
    println!("  cfg crc: 0x{:08X}", report.cfg_crc);
    println!("  valid:   {}", report.valid);

    if let Some(information) = &report.information {
        print_information(information);
    }
    Ok(())
}

fn print_information(information: &ProgramInformation) {
    let metadata = &information.metadata;
    let lists: [(&str, &Vec<String>); 8] = [
        ("title", &metadata.long_names),
        ("short title", &metadata.short_names),
        ("publisher", &metadata.publishers),
        ("programmer", &metadata.programmers),
        ("designer", &metadata.designers),
        ("description", &metadata.descriptions),
        ("version", &metadata.versions),
        ("license", &metadata.licenses),
    ];
    for (label, values) in lists {
        for value in values {
            println!("  {label}: {value}");
        }
    }
    for date in &metadata.release_dates {
        println!("  released: {date}");
    }

    println!("  features:");
    let features = &information.features;
    for peripheral in Peripheral::ALL {
        println!("    {peripheral:?}: {}", features.get(peripheral));
    }
    if features.jlp_flash_sectors > 0 {
        println!("    JLP flash sectors: {}", features.jlp_flash_sectors);
    }
    if features.lto_flash_mapper {
        println!("    LTO Flash mapper");
    }
}
