//! Error types for texture lump handling.

use thiserror::Error;

/// Errors that can occur when decoding, encoding or reducing a texture lump.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] texlump_common::Error),

    /// Miptex record error.
    #[error("{0}")]
    Miptex(#[from] texlump_miptex::Error),

    /// The lump is at or over the configured byte budget.
    ///
    /// This is fatal: the compile must stop, not retry.
    #[error("texture lump of {length} bytes exceeds the budget of {max} bytes")]
    BudgetExceeded { length: usize, max: usize },

    /// The lump cannot even hold its texture count.
    #[error("texture lump too short: {length} bytes")]
    LumpTooShort { length: usize },

    /// The offset table runs past the end of the lump.
    #[error("lump of {length} bytes cannot hold a header for {count} textures ({header_len} bytes)")]
    HeaderOverflow {
        count: u32,
        header_len: usize,
        length: usize,
    },

    /// A lump directory entry points outside its container file.
    #[error("lump at offset {offset} with length {length} exceeds container of {file_len} bytes")]
    ContainerRange {
        offset: usize,
        length: usize,
        file_len: usize,
    },

    /// An index past the end of the collection.
    #[error("texture index {index} out of range for collection of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// An index remap that does not describe a gapless compaction.
    #[error("invalid index remap: {0}")]
    InvalidRemap(String),

    /// Texture extents inferred from offsets do not cover the data region.
    #[error("texture data size mismatch: offsets account for {actual} bytes, data region is {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A surface refers to a texture that does not exist.
    #[error("surface {surface} references texture {index}, but only {count} exist")]
    TextureIndexOutOfRange {
        surface: usize,
        index: i32,
        count: usize,
    },
}

impl Error {
    /// Whether the error must abort the whole compile.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::BudgetExceeded { .. })
    }
}

/// Result type for lump operations.
pub type Result<T> = std::result::Result<T, Error>;
