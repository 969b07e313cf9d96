//! Error types for texlump-common.

use thiserror::Error;

/// Common error type for texlump operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer: needed {needed} bytes but only {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    /// Not enough room left in the output buffer.
    #[error("output buffer overflow: writing {needed} bytes but only {available} left")]
    BufferOverflow { needed: usize, available: usize },

    /// A seek or slice started outside the buffer.
    #[error("position {position} is outside a buffer of {len} bytes")]
    OutOfBounds { position: usize, len: usize },
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
