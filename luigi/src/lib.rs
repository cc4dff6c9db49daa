//! LUIGI cartridge container
//!
//! A LUIGI file is a small versioned header followed by a stream of
//! checksummed blocks:
//!
//! - scramble key: binds the content to one LTO Flash device
//! - memory map and permissions: how the 32 pages of address space are used
//! - data hunks: the program image itself
//! - metadata: names, credits, dates and feature records
//! - end of file
//!
//! Headers can be rewritten (feature flags are editable); blocks are a
//! read-only model.

mod blocks;
mod error;
mod features;
mod file;
mod header;
mod metadata;

#[cfg(test)]
mod tests;

pub use blocks::{
    DataHunkBlock, LuigiBlock, LuigiBlockType, LuigiPayload, MemoryMapBlock, PAGE_COUNT, PagePermissions,
    ScrambleKeyBlock, UNMAPPED_PAGE, UnknownBlock,
};
pub use error::LuigiError;
pub use features::{LuigiFeatureFlags, MAX_JLP_FLASH_SECTORS};
pub use file::LuigiFile;
pub use header::{CURRENT_VERSION, DeviceId, HEADER_V0_SIZE, HEADER_V1_SIZE, LuigiFileHeader, MAGIC};
pub use metadata::{LuigiMetadataRecord, LuigiMetadataTag, MetadataBlock};
