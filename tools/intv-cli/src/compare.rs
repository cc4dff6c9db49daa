//! Compare command - equivalence of two ROMs under a policy

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use intv_core::{Rom, RomComparer, RomComparison};
use intv_shared::ByteResource;
use tracing::debug;

use crate::settings::Settings;

/// Arguments for the compare command
#[derive(Args)]
pub struct CompareArgs {
    pub a: PathBuf,
    pub b: PathBuf,

    /// strict, strict-crc-only, canonical or canonical-strict
    /// (defaults to the configured mode)
    #[arg(long)]
    pub mode: Option<RomComparison>,

    /// Include LUIGI feature flags in strict comparisons
    #[arg(long)]
    pub keep_feature_bits: bool,
}

/// Execute the compare command
///
/// Returns true when the ROMs compare equal.
pub fn execute(args: CompareArgs, settings: &Settings) -> Result<bool> {
    let mode = args.mode.unwrap_or(settings.compare.mode);
    let exclude = settings.compare.exclude_feature_bits && !args.keep_feature_bits;
    let comparer = RomComparer::new(mode).exclude_feature_bits(exclude);
    debug!(%mode, exclude_feature_bits = exclude, "comparing ROMs");

    let a = Rom::create(ByteResource::file(&args.a), None);
    let b = Rom::create(ByteResource::file(&args.b), None);
    let equal = comparer
        .equals(a.as_ref(), b.as_ref())
        .with_context(|| format!("Failed to compare {} and {}", args.a.display(), args.b.display()))?;

    println!("{}", if equal { "equal" } else { "different" });
    Ok(equal)
}
