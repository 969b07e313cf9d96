//! Texlump - texture lump handling for BSP map compilers.
//!
//! This crate provides a unified interface to the texlump library ecosystem
//! for reading, writing and trimming the embedded texture lump of a map.
//!
//! # Crates
//!
//! - [`texlump_common`] - Common utilities (bounds-checked binary reading and writing)
//! - [`texlump_miptex`] - Single miptex records and external texture references
//! - [`texlump_lump`] - Lump decoding, encoding, reduction and the external texture registry
//!
//! # Example
//!
//! ```
//! use texlump::prelude::*;
//!
//! let mut collection = TextureCollection::new();
//! for name in ["+0lava", "+1lava", "brick"] {
//!     let mut record = MiptexRecord::new(name);
//!     record.initialise(16, 16)?;
//!     collection.push(TextureEntry::Miptex(record));
//! }
//!
//! let mut encoder = LumpEncoder::default();
//! encoder.encode_all(&collection)?;
//! let mut lump = encoder.take_lump();
//!
//! // Only the lava is on a surface, but its whole animation survives.
//! let mut surfaces = vec![TexInfo::new(1)];
//! let summary = ReductionPass::default().run(&mut lump, &mut surfaces)?;
//! assert_eq!(summary.reduced_count, 2);
//! assert_eq!(surfaces[0].miptex, 1);
//! # Ok::<(), texlump::Error>(())
//! ```

// Re-export all sub-crates
pub use texlump_common as common;
pub use texlump_lump as lump;
pub use texlump_miptex as miptex;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use texlump_common::{BinaryReader, BinaryWriter, Endian};
    pub use texlump_lump::{
        CodecConfig, DecodeMode, EntryKind, IndexRemap, LumpBuffer, LumpDecoder, LumpEncoder,
        ReductionPass, ReductionSummary, TexInfo, TextureBinding, TextureCollection,
        TextureEntry, TextureListing, TextureRegistry,
    };
    pub use texlump_miptex::{ExternalTexture, MipSelection, MiptexRecord, TextureName};
}

// Re-export commonly used types at the crate root
pub use texlump_lump::{Error, Result};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
