//! Truncation-aware byte cursor
//!
//! Wraps any [`Read`] and turns "ran out of bytes" into
//! [`CodecError::Truncated`], distinct from every other I/O failure. Each
//! read names what it was reading so truncation reports point at the field.

use std::io::{self, Read};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

use crate::error::CodecError;

/// Sequential reader over a byte source
#[derive(Debug)]
pub struct ByteCursor<R> {
    inner: R,
    position: u64,
}

impl<'a> ByteCursor<&'a [u8]> {
    /// Cursor over an in-memory buffer
    pub fn from_slice(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}

impl<R: Read> ByteCursor<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// Number of bytes consumed so far
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn truncated(&self, context: &'static str, needed: usize) -> CodecError {
        CodecError::Truncated {
            context,
            needed,
            offset: self.position,
        }
    }

    fn map_err(&self, e: io::Error, context: &'static str, needed: usize) -> CodecError {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            self.truncated(context, needed)
        } else {
            CodecError::Io(e)
        }
    }

    /// Read one byte, or `None` if the source is cleanly exhausted
    pub fn try_read_u8(&mut self) -> Result<Option<u8>, CodecError> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.position += 1;
                    return Ok(Some(byte[0]));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(CodecError::Io(e)),
            }
        }
    }

    pub fn read_u8(&mut self, context: &'static str) -> Result<u8, CodecError> {
        let value = self
            .inner
            .read_u8()
            .map_err(|e| self.map_err(e, context, 1))?;
        self.position += 1;
        Ok(value)
    }

    pub fn read_u16_le(&mut self, context: &'static str) -> Result<u16, CodecError> {
        let value = self
            .inner
            .read_u16::<LittleEndian>()
            .map_err(|e| self.map_err(e, context, 2))?;
        self.position += 2;
        Ok(value)
    }

    pub fn read_u16_be(&mut self, context: &'static str) -> Result<u16, CodecError> {
        let value = self
            .inner
            .read_u16::<BigEndian>()
            .map_err(|e| self.map_err(e, context, 2))?;
        self.position += 2;
        Ok(value)
    }

    pub fn read_u32_le(&mut self, context: &'static str) -> Result<u32, CodecError> {
        let value = self
            .inner
            .read_u32::<LittleEndian>()
            .map_err(|e| self.map_err(e, context, 4))?;
        self.position += 4;
        Ok(value)
    }

    pub fn read_u32_be(&mut self, context: &'static str) -> Result<u32, CodecError> {
        let value = self
            .inner
            .read_u32::<BigEndian>()
            .map_err(|e| self.map_err(e, context, 4))?;
        self.position += 4;
        Ok(value)
    }

    pub fn read_u64_le(&mut self, context: &'static str) -> Result<u64, CodecError> {
        let value = self
            .inner
            .read_u64::<LittleEndian>()
            .map_err(|e| self.map_err(e, context, 8))?;
        self.position += 8;
        Ok(value)
    }

    /// Read exactly `count` bytes
    pub fn read_bytes(&mut self, count: usize, context: &'static str) -> Result<Vec<u8>, CodecError> {
        let mut buffer = vec![0u8; count];
        self.read_into(&mut buffer, context)?;
        Ok(buffer)
    }

    /// Fill `buffer` completely
    pub fn read_into(&mut self, buffer: &mut [u8], context: &'static str) -> Result<(), CodecError> {
        self.inner
            .read_exact(buffer)
            .map_err(|e| self.map_err(e, context, buffer.len()))?;
        self.position += buffer.len() as u64;
        Ok(())
    }

    /// Read a fixed-width text field.
    ///
    /// The field ends at the first NUL; invalid UTF-8 is replaced rather than
    /// rejected.
    pub fn read_fixed_string(&mut self, width: usize, context: &'static str) -> Result<String, CodecError> {
        let bytes = self.read_bytes(width, context)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    /// Discard exactly `count` bytes
    pub fn skip(&mut self, count: u64, context: &'static str) -> Result<(), CodecError> {
        let copied = io::copy(&mut (&mut self.inner).take(count), &mut io::sink())?;
        self.position += copied;
        if copied < count {
            return Err(self.truncated(context, (count - copied) as usize));
        }
        Ok(())
    }
}
