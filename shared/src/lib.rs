//! Shared building blocks for Intellivision ROM containers.
//!
//! Everything the format-specific crates need lives here:
//!
//! - [`crc`] - CRC-8/16/24/32 checksums with ignore ranges and byte substitution
//! - [`codec`] - truncation-aware byte cursor over any [`std::io::Read`]
//! - [`escape`] - printable escaping of arbitrary strings
//! - [`datetime`] - variable-precision metadata dates
//! - [`features`] / [`metadata`] - the program description every format converges on
//! - [`storage`] - the byte resource abstraction supplied by the host
//! - [`block`] - self-describing block framing shared by LUIGI and `.rom` metadata

pub mod block;
pub mod codec;
pub mod crc;
pub mod datetime;
pub mod error;
pub mod escape;
pub mod features;
pub mod metadata;
pub mod storage;

pub use block::{BlockPayload, Framing, RawBlock, block_type, read_block, write_frame};
pub use codec::ByteCursor;
pub use crc::{ByteRange, Crc32Options, Crc32Polynomial};
pub use datetime::{MetadataDateTime, MetadataDateTimeBuilder, MetadataDateTimeFlags};
pub use error::{BlockError, CodecError, DateTimeError, StorageError};
pub use escape::{escape, unescape};
pub use features::{FeatureCompatibility, GeneralFeatures, Peripheral, ProgramFeatures};
pub use metadata::{ProgramInformation, ProgramMetadata};
pub use storage::{ByteResource, FileSystemStorage, MemoryStorage, ReadSeek, StorageAccess};
