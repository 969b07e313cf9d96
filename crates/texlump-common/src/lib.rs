//! Common utilities for texlump.
//!
//! This crate provides the byte-level plumbing shared by the texture lump crates:
//!
//! - [`BinaryReader`] - Zero-copy, bounds-checked reading from byte slices
//! - [`BinaryWriter`] - Bounds-checked writing into preallocated byte slices
//! - [`Endian`] - Byte order selection for multi-byte fields on output

mod endian;
mod error;
mod reader;
mod writer;

pub use endian::Endian;
pub use error::{Error, Result};
pub use reader::BinaryReader;
pub use writer::BinaryWriter;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Re-export memchr for terminator searches in fixed-size name fields
pub use memchr;
