//! Error types for miptex records.

use thiserror::Error;

/// Errors that can occur when working with miptex records.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] texlump_common::Error),

    /// Width or height is zero or not a multiple of 16.
    #[error("invalid dimensions {width}x{height}: both must be non-zero multiples of 16")]
    InvalidDimensions { width: u32, height: u32 },

    /// The record has no dimensions, so it cannot hold pixel data.
    #[error("record has no valid dimensions")]
    Undimensioned,

    /// The raw record is shorter than its dimensions require.
    #[error("insufficient data: {required} bytes required but only {available} available")]
    InsufficientData { required: usize, available: usize },

    /// A mipmap offset points outside the raw record.
    #[error("mip level {level} at offset {offset} ({size} bytes) exceeds record of {available} bytes")]
    MipOutOfBounds {
        level: usize,
        offset: i32,
        size: usize,
        available: usize,
    },

    /// The palette size field did not read 256.
    #[error("invalid palette size: expected {expected}, got {actual}")]
    InvalidPaletteSize { expected: usize, actual: u16 },

    /// The record lacks dimensions, mip data or a palette.
    #[error("record '{name}' is not exportable")]
    NotExportable { name: String },

    /// The output slice cannot hold the exported record.
    #[error("output too small: {required} bytes required but only {available} available")]
    OutputTooSmall { required: usize, available: usize },

    /// External texture path is empty or too long for the name field.
    #[error("invalid texture path '{path}': must be 1 to {max} bytes")]
    InvalidPath { path: String, max: usize },
}

/// Result type for miptex operations.
pub type Result<T> = std::result::Result<T, Error>;
