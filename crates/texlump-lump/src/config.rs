//! Codec configuration.

use texlump_common::Endian;

/// Classic upper bound on the texture lump size, in bytes.
pub const DEFAULT_MAX_LUMP_BYTES: usize = 0x200_0000;

/// How much of each record the decoder materialises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecodeMode {
    /// Names, dimensions, mip data and palettes.
    #[default]
    Full,
    /// Names and dimensions only.
    HeaderOnly,
}

/// Settings shared by the decoder, encoder and reduction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CodecConfig {
    /// Lumps of this many bytes or more are rejected as fatal.
    pub max_lump_bytes: usize,
    /// Byte order for everything written out.
    pub output_endian: Endian,
    /// What the decoder imports per record.
    pub decode_mode: DecodeMode,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_lump_bytes: DEFAULT_MAX_LUMP_BYTES,
            output_endian: Endian::Little,
            decode_mode: DecodeMode::Full,
        }
    }
}

impl CodecConfig {
    /// Set the lump byte budget.
    pub fn with_max_lump_bytes(mut self, max_lump_bytes: usize) -> Self {
        self.max_lump_bytes = max_lump_bytes;
        self
    }

    /// Set the byte order for written fields.
    pub fn with_output_endian(mut self, output_endian: Endian) -> Self {
        self.output_endian = output_endian;
        self
    }

    /// Set how much of each record the decoder imports.
    pub fn with_decode_mode(mut self, decode_mode: DecodeMode) -> Self {
        self.decode_mode = decode_mode;
        self
    }
}
