//! Crc command - every checksum flavor of a file

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use intv_shared::crc::{self, CRC16_INITIAL, CRC24_INITIAL};

/// Arguments for the crc command
#[derive(Args)]
pub struct CrcArgs {
    /// File to checksum
    pub file: PathBuf,
}

pub fn execute(args: CrcArgs) -> Result<()> {
    let bytes = std::fs::read(&args.file).with_context(|| format!("Failed to read {}", args.file.display()))?;

    println!("{}", args.file.display());
    println!("  size:   {} bytes", bytes.len());
    println!("  crc8:   0x{:02X}", crc::crc8(&bytes));
    println!("  crc16:  0x{:04X}", crc::crc16(&bytes, CRC16_INITIAL));
    println!("  crc24:  0x{:06X}", crc::crc24(&bytes, CRC24_INITIAL));
    println!("  crc32:  0x{:08X}", crc::crc32(&bytes));
    println!("  crc32c: 0x{:08X}", crc::crc32c(&bytes));
    Ok(())
}
