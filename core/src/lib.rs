//! Intellivision ROM core
//!
//! Format detection, metadata extraction and comparison on top of the
//! container primitives in `intv-shared` and `intv-luigi`.
//!
//! # Architecture
//!
//! - [`check_format`] - Classify a resource from its leading bytes
//! - [`Rom`] - Classified image with memoized checksums
//! - [`RomComparer`] - Ordering and equality under a [`RomComparison`] policy
//! - [`cfg`] - `[vars]` section parser for `.cfg` companions
//! - [`intellicart`] - `.rom` images and their metadata blocks

pub mod cfg;
pub mod compare;
pub mod error;
pub mod format;
pub mod intellicart;
pub mod rom;

pub use cfg::{CfgValue, CfgVarTag, CfgVariable, parse_information, parse_vars};
pub use compare::{RomComparer, RomComparison};
pub use error::{CompareError, IntellicartError};
pub use format::{RomFormat, check_format};
pub use intellicart::{IntellicartMetadata, IntellicartRom, RomSegment};
pub use rom::Rom;

// Re-export the container crates for hosts that only depend on this one
pub use intv_luigi as luigi;
pub use intv_shared as shared;
