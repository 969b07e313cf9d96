//! Texture lump handling for BSP map files.
//!
//! The texture lump holds every miptex a map embeds, behind a table of
//! offsets:
//!
//! ```text
//! u32 texture_count
//! i32 offsets[texture_count]     from the start of the lump, -1 = missing
//! ... miptex records, packed ...
//! ```
//!
//! This crate provides:
//!
//! - [`LumpBuffer`]: owned lump bytes with checked header access
//! - [`LumpDecoder`]: validates offsets and record windows, then imports
//!   the surviving records into a [`TextureCollection`]
//! - [`LumpEncoder`]: packs the exportable records of a collection back
//!   into a lump
//! - [`ReductionPass`]: drops textures no surface uses and rewrites the
//!   surfaces' texture indices
//! - [`TextureRegistry`]: hands out stable indices for external textures
//!   across compile threads
//!
//! # Example
//!
//! ```
//! use texlump_lump::{LumpDecoder, LumpEncoder, TextureCollection, TextureEntry};
//! use texlump_miptex::MiptexRecord;
//!
//! let mut record = MiptexRecord::new("+0lava");
//! record.initialise(64, 64)?;
//!
//! let mut collection = TextureCollection::new();
//! collection.push(TextureEntry::Miptex(record));
//!
//! let mut encoder = LumpEncoder::default();
//! encoder.encode_all(&collection)?;
//!
//! let mut decoded = TextureCollection::new();
//! LumpDecoder::default().decode(encoder.encoded(), &mut decoded)?;
//! assert_eq!(decoded, collection);
//! # Ok::<(), texlump_lump::Error>(())
//! ```

pub mod collection;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod lump;
pub mod reduce;
pub mod registry;
pub mod remap;
pub mod surface;

pub use collection::{EntryKind, TextureCollection, TextureEntry};
pub use config::{CodecConfig, DecodeMode, DEFAULT_MAX_LUMP_BYTES};
pub use decoder::{DecodeState, LumpDecoder};
pub use encoder::LumpEncoder;
pub use error::{Error, Result};
pub use lump::LumpBuffer;
pub use reduce::{ReductionPass, ReductionPlan, ReductionSummary};
pub use registry::{TextureListing, TextureRegistry};
pub use remap::IndexRemap;
pub use surface::{TexInfo, TextureBinding};
