//! Binary writer over a preallocated byte slice.
//!
//! The lump encoder sizes its output up front, so writing never grows a
//! buffer. [`BinaryWriter`] refuses any write that would run past the end
//! of the slice instead of panicking.

use crate::{Endian, Error, Result};

/// A cursor that writes multi-byte fields in a chosen byte order.
///
/// # Example
///
/// ```
/// use texlump_common::{BinaryWriter, Endian};
///
/// let mut out = [0u8; 6];
/// let mut writer = BinaryWriter::new(&mut out, Endian::Little);
///
/// writer.write_u32(1).unwrap();
/// writer.write_u16(256).unwrap();
/// assert_eq!(out, [1, 0, 0, 0, 0, 1]);
/// ```
#[derive(Debug)]
pub struct BinaryWriter<'a> {
    data: &'a mut [u8],
    position: usize,
    endian: Endian,
}

impl<'a> BinaryWriter<'a> {
    /// Create a writer positioned at the start of `data`.
    #[inline]
    pub fn new(data: &'a mut [u8], endian: Endian) -> Self {
        Self {
            data,
            position: 0,
            endian,
        }
    }

    /// Get the current position in the buffer.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get the number of bytes still writable.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// The byte order used for multi-byte fields.
    #[inline]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Move to an absolute position.
    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.data.len() {
            return Err(Error::OutOfBounds {
                position,
                len: self.data.len(),
            });
        }
        self.position = position;
        Ok(())
    }

    /// Write raw bytes and advance.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.remaining() < bytes.len() {
            return Err(Error::BufferOverflow {
                needed: bytes.len(),
                available: self.remaining(),
            });
        }
        self.data[self.position..self.position + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();
        Ok(())
    }

    /// Write `count` zero bytes.
    pub fn write_zeros(&mut self, count: usize) -> Result<()> {
        if self.remaining() < count {
            return Err(Error::BufferOverflow {
                needed: count,
                available: self.remaining(),
            });
        }
        self.data[self.position..self.position + count].fill(0);
        self.position += count;
        Ok(())
    }

    /// Write a u16.
    #[inline]
    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write_bytes(&self.endian.u16_bytes(value))
    }

    /// Write a u32.
    #[inline]
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_bytes(&self.endian.u32_bytes(value))
    }

    /// Write an i32.
    #[inline]
    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_bytes(&self.endian.i32_bytes(value))
    }

    /// Overwrite a u32 at an absolute position without moving the cursor.
    pub fn patch_u32(&mut self, position: usize, value: u32) -> Result<()> {
        let end = position.checked_add(4).ok_or(Error::OutOfBounds {
            position,
            len: self.data.len(),
        })?;
        if end > self.data.len() {
            return Err(Error::BufferOverflow {
                needed: 4,
                available: self.data.len().saturating_sub(position),
            });
        }
        self.data[position..end].copy_from_slice(&self.endian.u32_bytes(value));
        Ok(())
    }
}
