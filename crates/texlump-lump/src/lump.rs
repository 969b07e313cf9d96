//! Raw texture lump bytes.

use texlump_common::BinaryReader;
use texlump_miptex::{TextureName, NAME_FIELD_LEN};

use crate::{Error, Result};

/// Size of the texture count and of each offset table slot.
pub const SLOT_SIZE: usize = 4;

/// Owns the bytes of a whole texture lump.
///
/// ```text
/// u32 texture_count
/// u32 offsets[texture_count]     from the start of the lump
/// ... miptex records ...
/// ```
///
/// Every accessor checks the header and offsets against the buffer length
/// before touching the bytes they describe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LumpBuffer {
    data: Vec<u8>,
}

impl LumpBuffer {
    /// Take ownership of lump bytes.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Copy lump bytes out of a borrowed slice.
    pub fn copy_from(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// Copy a lump out of its container file using the container's directory entry.
    pub fn from_container(file: &[u8], offset: usize, length: usize) -> Result<Self> {
        let range_error = || Error::ContainerRange {
            offset,
            length,
            file_len: file.len(),
        };

        let end = offset.checked_add(length).ok_or_else(range_error)?;
        let bytes = file.get(offset..end).ok_or_else(range_error)?;
        Ok(Self::copy_from(bytes))
    }

    /// Raw lump bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Give up the buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Lump length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check whether the lump holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Swap in new lump bytes, returning the old ones.
    pub fn replace(&mut self, data: Vec<u8>) -> Vec<u8> {
        std::mem::replace(&mut self.data, data)
    }

    /// Header length for a given texture count: the count plus one slot per texture.
    pub fn header_len_for(count: u32) -> usize {
        (count as usize).saturating_add(1).saturating_mul(SLOT_SIZE)
    }

    /// Declared texture count.
    pub fn texture_count(&self) -> Result<u32> {
        if self.data.len() < SLOT_SIZE {
            return Err(Error::LumpTooShort {
                length: self.data.len(),
            });
        }
        Ok(BinaryReader::new(&self.data).read_u32()?)
    }

    /// Header length, checked against the buffer.
    pub fn header_len(&self) -> Result<usize> {
        let count = self.texture_count()?;
        let header_len = Self::header_len_for(count);

        if header_len > self.data.len() {
            return Err(Error::HeaderOverflow {
                count,
                header_len,
                length: self.data.len(),
            });
        }
        Ok(header_len)
    }

    /// Offset table entry for a texture, as stored.
    pub fn offset_at(&self, index: usize) -> Result<u32> {
        let count = self.header_len()? / SLOT_SIZE - 1;
        if index >= count {
            return Err(Error::IndexOutOfRange { index, len: count });
        }

        let mut reader = BinaryReader::new_at(&self.data, SLOT_SIZE * (index + 1))?;
        Ok(reader.read_u32()?)
    }

    /// Offset table entry reinterpreted as signed, where -1 marks a missing texture.
    pub fn raw_offset_at(&self, index: usize) -> Result<i32> {
        self.offset_at(index).map(|offset| offset as i32)
    }

    /// The whole offset table.
    pub fn offsets(&self) -> Result<Vec<u32>> {
        let header_len = self.header_len()?;
        let mut reader = BinaryReader::new_at(&self.data[..header_len], SLOT_SIZE)?;
        let mut offsets = Vec::with_capacity(header_len / SLOT_SIZE - 1);

        while !reader.is_empty() {
            offsets.push(reader.read_u32()?);
        }
        Ok(offsets)
    }

    /// Bytes in `offset..offset + length`, if entirely inside the lump.
    pub fn slice(&self, offset: usize, length: usize) -> Option<&[u8]> {
        let end = offset.checked_add(length)?;
        self.data.get(offset..end)
    }

    /// Name field of the record at `offset`, if the field lies inside the lump.
    pub fn record_name_at(&self, offset: usize) -> Option<TextureName> {
        self.slice(offset, NAME_FIELD_LEN).map(TextureName::from_bytes)
    }

    /// Everything after the offset table.
    pub fn data_region(&self) -> Result<&[u8]> {
        let header_len = self.header_len()?;
        Ok(&self.data[header_len..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lump_with(count: u32, offsets: &[u32], body: &[u8]) -> LumpBuffer {
        let mut data = count.to_le_bytes().to_vec();
        for offset in offsets {
            data.extend_from_slice(&offset.to_le_bytes());
        }
        data.extend_from_slice(body);
        LumpBuffer::from_vec(data)
    }

    #[test]
    fn test_header_accessors() {
        let lump = lump_with(2, &[12, 0xFFFF_FFFF], b"wall\0\0\0\0\0\0\0\0\0\0\0\0");

        assert_eq!(lump.texture_count().unwrap(), 2);
        assert_eq!(lump.header_len().unwrap(), 12);
        assert_eq!(lump.offset_at(0).unwrap(), 12);
        assert_eq!(lump.raw_offset_at(1).unwrap(), -1);
        assert!(matches!(
            lump.offset_at(2),
            Err(Error::IndexOutOfRange { index: 2, len: 2 })
        ));
        assert_eq!(lump.offsets().unwrap(), vec![12, 0xFFFF_FFFF]);
        assert_eq!(lump.data_region().unwrap().len(), 16);
        assert_eq!(lump.record_name_at(12).unwrap().as_bytes(), b"wall");
        assert_eq!(lump.record_name_at(13), None);
    }

    #[test]
    fn test_header_overflow() {
        let lump = lump_with(3, &[0, 0], &[]);
        assert!(matches!(
            lump.header_len(),
            Err(Error::HeaderOverflow {
                count: 3,
                header_len: 16,
                length: 12
            })
        ));
        assert!(lump.offsets().is_err());
    }

    #[test]
    fn test_too_short() {
        let lump = LumpBuffer::copy_from(&[1, 0]);
        assert!(matches!(
            lump.texture_count(),
            Err(Error::LumpTooShort { length: 2 })
        ));
    }

    #[test]
    fn test_slice_bounds() {
        let lump = LumpBuffer::from_vec(vec![0u8; 8]);
        assert_eq!(lump.slice(4, 4).map(<[u8]>::len), Some(4));
        assert_eq!(lump.slice(4, 5), None);
        assert_eq!(lump.slice(usize::MAX, 2), None);
    }

    #[test]
    fn test_from_container() {
        let file = [9u8, 9, 1, 0, 0, 0, 9];
        let lump = LumpBuffer::from_container(&file, 2, 4).unwrap();
        assert_eq!(lump.texture_count().unwrap(), 1);
        assert!(matches!(
            LumpBuffer::from_container(&file, 4, 4),
            Err(Error::ContainerRange { .. })
        ));
        assert!(LumpBuffer::from_container(&file, usize::MAX, 2).is_err());
    }

    #[test]
    fn test_replace() {
        let mut lump = LumpBuffer::from_vec(vec![1, 2]);
        let old = lump.replace(vec![3]);
        assert_eq!(old, vec![1, 2]);
        assert_eq!(lump.as_bytes(), &[3]);
    }
}
