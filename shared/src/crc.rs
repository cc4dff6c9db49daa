//! Checksum suite
//!
//! CRC-8, CRC-16, CRC-24 and CRC-32 over byte slices or streams. Every
//! variant accepts a set of [`ByteRange`]s whose bytes are skipped from the
//! rolling computation, so volatile fields can be left out without copying
//! or zeroing the source.
//!
//! | Function | Polynomial | Initial | Reflected |
//! |----------|------------|---------|-----------|
//! | [`crc8`] | `0x07` | `0x00` | no |
//! | [`crc16`] | `0x1021` | caller supplied | no |
//! | [`crc24`] | `0x864CFB` | caller supplied | no |
//! | [`crc32`] | `0x04C11DB7` | `0xFFFFFFFF` | yes |
//! | [`crc32c`] | `0x1EDC6F41` | `0xFFFFFFFF` | yes |

use std::io::{self, Read};

use crc::{
    CRC_8_SMBUS, CRC_16_IBM_3740, CRC_24_OPENPGP, CRC_32_ISCSI, CRC_32_ISO_HDLC, Crc,
};
use serde::{Deserialize, Serialize};

static CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);
static CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);
static CRC24: Crc<u32> = Crc::<u32>::new(&CRC_24_OPENPGP);
static CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);
static CRC32C: Crc<u32> = Crc::<u32>::new(&CRC_32_ISCSI);

/// Conventional CRC-16 seed for Intellicart-style data
pub const CRC16_INITIAL: u16 = 0xFFFF;

/// Conventional CRC-24 seed
pub const CRC24_INITIAL: u32 = 0x00B7_04CE;

/// CRC-32 seed shared by both polynomials
pub const CRC32_INITIAL: u32 = 0xFFFF_FFFF;

const STREAM_CHUNK: usize = 8 * 1024;

/// Contiguous run of byte offsets, used to leave bytes out of a checksum
/// or a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ByteRange {
    /// Offset of the first byte in the range
    pub offset: u64,
    /// Number of bytes in the range
    pub length: u64,
}

impl ByteRange {
    pub const fn new(offset: u64, length: u64) -> Self {
        Self { offset, length }
    }

    /// One past the last offset in the range
    pub const fn end(&self) -> u64 {
        self.offset.saturating_add(self.length)
    }

    pub const fn contains(&self, position: u64) -> bool {
        self.length > 0 && position >= self.offset && position < self.end()
    }
}

/// Returns true if `position` falls inside any of `ranges`
pub fn is_ignored(ranges: &[ByteRange], position: u64) -> bool {
    ranges.iter().any(|r| r.contains(position))
}

/// Feed `f` every run of `chunk` that is not covered by `ignore`.
///
/// `base` is the absolute offset of `chunk[0]`; `f` receives the absolute
/// offset of each run along with the run itself.
fn for_each_kept<F: FnMut(u64, &[u8])>(chunk: &[u8], base: u64, ignore: &[ByteRange], mut f: F) {
    if ignore.is_empty() {
        if !chunk.is_empty() {
            f(base, chunk);
        }
        return;
    }

    let len = chunk.len() as u64;
    let mut start = 0u64;
    while start < len {
        let position = base + start;

        // Jump past the furthest-reaching range covering this byte
        if let Some(end) = ignore
            .iter()
            .filter(|r| r.contains(position))
            .map(ByteRange::end)
            .max()
        {
            start = (end - base).min(len);
            continue;
        }

        let stop = ignore
            .iter()
            .filter(|r| r.length > 0 && r.offset > position)
            .map(|r| r.offset - base)
            .min()
            .unwrap_or(len)
            .min(len);

        f(position, &chunk[start as usize..stop as usize]);
        start = stop;
    }
}

// =============================================================================
// CRC-8
// =============================================================================

/// CRC-8 (polynomial `0x07`, zero seed) of `bytes`
pub fn crc8(bytes: &[u8]) -> u8 {
    CRC8.checksum(bytes)
}

/// CRC-8 of `bytes`, skipping every byte inside `ignore`
pub fn crc8_ignoring(bytes: &[u8], ignore: &[ByteRange]) -> u8 {
    let mut digest = CRC8.digest();
    for_each_kept(bytes, 0, ignore, |_, run| digest.update(run));
    digest.finalize()
}

// =============================================================================
// CRC-16
// =============================================================================

/// CRC-16 (polynomial `0x1021`) of `bytes` seeded with `initial`
pub fn crc16(bytes: &[u8], initial: u16) -> u16 {
    let mut digest = CRC16.digest_with_initial(initial);
    digest.update(bytes);
    digest.finalize()
}

/// CRC-16 of `bytes` seeded with `initial`, skipping every byte inside `ignore`
pub fn crc16_ignoring(bytes: &[u8], initial: u16, ignore: &[ByteRange]) -> u16 {
    let mut digest = CRC16.digest_with_initial(initial);
    for_each_kept(bytes, 0, ignore, |_, run| digest.update(run));
    digest.finalize()
}

// =============================================================================
// CRC-24
// =============================================================================

/// CRC-24 (polynomial `0x864CFB`) of `bytes` seeded with `initial`.
///
/// Only the low 24 bits of `initial` and of the result are meaningful.
pub fn crc24(bytes: &[u8], initial: u32) -> u32 {
    let mut digest = CRC24.digest_with_initial(initial & 0x00FF_FFFF);
    digest.update(bytes);
    digest.finalize()
}

/// CRC-24 of everything `reader` yields, skipping every byte inside `ignore`
pub fn crc24_stream<R: Read>(mut reader: R, initial: u32, ignore: &[ByteRange]) -> io::Result<u32> {
    let mut digest = CRC24.digest_with_initial(initial & 0x00FF_FFFF);
    let mut buffer = vec![0u8; STREAM_CHUNK];
    let mut base = 0u64;
    loop {
        let read = read_some(&mut reader, &mut buffer)?;
        if read == 0 {
            break;
        }
        for_each_kept(&buffer[..read], base, ignore, |_, run| digest.update(run));
        base += read as u64;
    }
    Ok(digest.finalize())
}

// =============================================================================
// CRC-32
// =============================================================================

/// Polynomial family for [`crc32_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Crc32Polynomial {
    /// IEEE 802.3 / zip polynomial
    #[default]
    Standard,
    /// Castagnoli polynomial, used for LUIGI block payloads
    Castagnoli,
}

/// Knobs for [`crc32_with`] and [`crc32_stream`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crc32Options {
    /// Only the first `length` bytes contribute (all bytes when `None`)
    pub length: Option<u64>,
    /// Bytes left out of the computation
    pub ignore_ranges: Vec<ByteRange>,
    /// Register seed
    pub initial: u32,
    pub polynomial: Crc32Polynomial,
    /// Value fed in place of byte 0, leaving the source untouched
    pub replace_first_byte: Option<u8>,
}

impl Default for Crc32Options {
    fn default() -> Self {
        Self {
            length: None,
            ignore_ranges: Vec::new(),
            initial: CRC32_INITIAL,
            polynomial: Crc32Polynomial::Standard,
            replace_first_byte: None,
        }
    }
}

impl Crc32Options {
    pub fn castagnoli() -> Self {
        Self {
            polynomial: Crc32Polynomial::Castagnoli,
            ..Self::default()
        }
    }

    pub fn ignoring(mut self, ranges: impl IntoIterator<Item = ByteRange>) -> Self {
        self.ignore_ranges.extend(ranges);
        self
    }

    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_first_byte(mut self, value: u8) -> Self {
        self.replace_first_byte = Some(value);
        self
    }

    fn engine(&self) -> &'static Crc<u32> {
        match self.polynomial {
            Crc32Polynomial::Standard => &CRC32,
            Crc32Polynomial::Castagnoli => &CRC32C,
        }
    }
}

/// Standard CRC-32 of `bytes`
pub fn crc32(bytes: &[u8]) -> u32 {
    CRC32.checksum(bytes)
}

/// Castagnoli CRC-32 of `bytes`
pub fn crc32c(bytes: &[u8]) -> u32 {
    CRC32C.checksum(bytes)
}

/// CRC-32 of `bytes` under `options`
pub fn crc32_with(bytes: &[u8], options: &Crc32Options) -> u32 {
    let bytes = match options.length {
        Some(length) => &bytes[..(length.min(bytes.len() as u64) as usize)],
        None => bytes,
    };
    let mut digest = options.engine().digest_with_initial(options.initial);
    for_each_kept(bytes, 0, &options.ignore_ranges, |offset, run| {
        match (offset, options.replace_first_byte) {
            (0, Some(first)) => {
                digest.update(&[first]);
                digest.update(&run[1..]);
            }
            _ => digest.update(run),
        }
    });
    digest.finalize()
}

/// CRC-32 of everything `reader` yields under `options`
pub fn crc32_stream<R: Read>(mut reader: R, options: &Crc32Options) -> io::Result<u32> {
    let mut digest = options.engine().digest_with_initial(options.initial);
    let mut buffer = vec![0u8; STREAM_CHUNK];
    let mut base = 0u64;
    let limit = options.length.unwrap_or(u64::MAX);
    while base < limit {
        let wanted = (limit - base).min(buffer.len() as u64) as usize;
        let read = read_some(&mut reader, &mut buffer[..wanted])?;
        if read == 0 {
            break;
        }
        for_each_kept(&buffer[..read], base, &options.ignore_ranges, |offset, run| {
            match (offset, options.replace_first_byte) {
                (0, Some(first)) => {
                    digest.update(&[first]);
                    digest.update(&run[1..]);
                }
                _ => digest.update(run),
            }
        });
        base += read as u64;
    }
    Ok(digest.finalize())
}

fn read_some<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buffer) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
