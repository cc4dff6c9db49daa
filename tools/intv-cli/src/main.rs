//! intv - inspect and compare Intellivision ROM images
//!
//! # Commands
//!
//! - `intv info` - Format, checksums, features and metadata of a ROM
//! - `intv crc` - Every checksum flavor of an arbitrary file
//! - `intv compare` - Compare two ROMs under a comparison policy
//! - `intv luigi` - Dump a LUIGI header and its blocks
//!
//! # Settings (config.toml)
//!
//! ```toml
//! [compare]
//! mode = "strict"
//! exclude_feature_bits = true
//!
//! [logging]
//! level = "warn"
//! ```

mod checksum;
mod compare;
mod info;
mod luigi;
mod settings;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

/// intv - inspect and compare Intellivision ROM images
#[derive(Parser)]
#[command(name = "intv")]
#[command(about = "Inspect and compare Intellivision ROM images")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show format, checksums, features and metadata of a ROM
    Info(info::InfoArgs),

    /// Print CRC-8/16/24/32 checksums of a file
    Crc(checksum::CrcArgs),

    /// Compare two ROMs
    Compare(compare::CompareArgs),

    /// Dump the header and blocks of a LUIGI file
    Luigi(luigi::LuigiArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (settings, settings_error) = match Settings::load() {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.logging.level)),
        )
        .init();

    if let Some(e) = settings_error {
        warn!("Ignoring settings file: {e:#}");
    }

    match cli.command {
        Commands::Info(args) => info::execute(args),
        Commands::Crc(args) => checksum::execute(args),
        Commands::Compare(args) => {
            let equal = compare::execute(args, &settings)?;
            if !equal {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Luigi(args) => luigi::execute(args),
    }
}
