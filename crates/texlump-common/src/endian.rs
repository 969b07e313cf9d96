//! Output byte order selection.

use byteorder::{ByteOrder, LittleEndian, NativeEndian};

/// Byte order used when writing multi-byte fields.
///
/// Reading is always little-endian, since that is what the lump format stores.
/// Writing defaults to little-endian too; [`Endian::Native`] reproduces writers
/// that dump host-order integers straight into the lump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Endian {
    /// Little-endian, as stored on disk.
    #[default]
    Little,
    /// Whatever the host uses.
    Native,
}

impl Endian {
    /// Encode a u16 in this byte order.
    #[inline]
    pub fn u16_bytes(self, value: u16) -> [u8; 2] {
        let mut buf = [0u8; 2];
        match self {
            Endian::Little => LittleEndian::write_u16(&mut buf, value),
            Endian::Native => NativeEndian::write_u16(&mut buf, value),
        }
        buf
    }

    /// Encode a u32 in this byte order.
    #[inline]
    pub fn u32_bytes(self, value: u32) -> [u8; 4] {
        let mut buf = [0u8; 4];
        match self {
            Endian::Little => LittleEndian::write_u32(&mut buf, value),
            Endian::Native => NativeEndian::write_u32(&mut buf, value),
        }
        buf
    }

    /// Encode an i32 in this byte order.
    #[inline]
    pub fn i32_bytes(self, value: i32) -> [u8; 4] {
        let mut buf = [0u8; 4];
        match self {
            Endian::Little => LittleEndian::write_i32(&mut buf, value),
            Endian::Native => NativeEndian::write_i32(&mut buf, value),
        }
        buf
    }

    /// Check whether this byte order produces the on-disk layout on this host.
    pub fn is_little_on_host(self) -> bool {
        match self {
            Endian::Little => true,
            Endian::Native => cfg!(target_endian = "little"),
        }
    }
}
