//! Miptex records for BSP texture lumps.
//!
//! A miptex is one palette-indexed texture with up to four precomputed mipmap
//! levels and a private 256-colour palette. This crate models a single record
//! and converts it to and from its packed on-disk form.
//!
//! # Record Layout
//!
//! ```text
//! 0x00  char name[16]            NUL-terminated, at most 15 visible characters
//! 0x10  u32  width               multiple of 16
//! 0x14  u32  height              multiple of 16
//! 0x18  i32  mip_offsets[4]      from the start of the record, -1 = absent
//! 0x28  u8   mip0[w * h]
//!       u8   mip1[(w / 2) * (h / 2)]
//!       u8   mip2[(w / 4) * (h / 4)]
//!       u8   mip3[(w / 8) * (h / 8)]
//!       u16  palette_size         always 256
//!       u8   palette[256 * 3]     RGB triples
//!       u16  terminator           always 0
//! ```
//!
//! # Example
//!
//! ```
//! use texlump_common::Endian;
//! use texlump_miptex::MiptexRecord;
//!
//! let mut record = MiptexRecord::new("brick");
//! record.initialise(32, 16)?;
//!
//! let bytes = record.export(Endian::Little)?;
//! assert_eq!(bytes.len(), MiptexRecord::ideal_bytes_for(32, 16));
//!
//! let mut copy = MiptexRecord::default();
//! copy.import_from(&bytes, false)?;
//! assert_eq!(copy.name().as_bytes(), b"brick");
//! # Ok::<(), texlump_miptex::Error>(())
//! ```

mod error;
mod external;
mod header;
mod name;
mod record;

pub use error::{Error, Result};
pub use external::ExternalTexture;
pub use header::{RawMiptexHeader, HEADER_SIZE};
pub use name::{TextureName, NAME_FIELD_LEN};
pub use record::{MipSelection, MiptexRecord, Rgb};

/// Number of mipmap levels a record can carry.
pub const MIP_LEVELS: usize = 4;

/// Number of entries in a record palette.
pub const PALETTE_SIZE: usize = 256;

/// Size in bytes of a full RGB palette.
pub const PALETTE_BYTES: usize = PALETTE_SIZE * 3;
