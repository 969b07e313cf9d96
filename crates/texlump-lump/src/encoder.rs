//! Texture lump encoding.

use tracing::info;

use texlump_common::BinaryWriter;

use crate::collection::TextureCollection;
use crate::config::CodecConfig;
use crate::lump::LumpBuffer;
use crate::Result;

/// Serialises the exportable textures of a collection into a packed lump.
///
/// The encoder owns its output until the next [`Self::encode_all`].
#[derive(Debug, Default)]
pub struct LumpEncoder {
    config: CodecConfig,
    data: Vec<u8>,
    count: usize,
}

impl LumpEncoder {
    /// Create an encoder with no output yet.
    pub fn new(config: CodecConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Encode every exportable miptex entry, in collection order.
    ///
    /// Entries that cannot be exported are skipped and take no offset slot.
    /// Records are packed directly after the offset table; offsets are
    /// absolute from the start of the lump.
    pub fn encode_all(&mut self, collection: &TextureCollection) -> Result<()> {
        self.data.clear();
        self.count = 0;

        let endian = self.config.output_endian;
        let count = collection.exportable_count();
        let header_len = LumpBuffer::header_len_for(count as u32);
        let mut data = vec![0u8; header_len + collection.export_bytes_required()];

        let mut offsets = Vec::with_capacity(count);
        let mut cursor = header_len;

        for record in collection.exportable() {
            let size = record.required_export_bytes();
            assert!(size > 0, "exportable texture reported zero export size");
            assert!(
                cursor + size <= data.len(),
                "texture export overruns the sized lump buffer"
            );

            record.export_to(&mut data[cursor..cursor + size], endian)?;
            offsets.push(cursor as u32);
            cursor += size;
        }

        assert_eq!(
            offsets.len(),
            count,
            "exportable texture count changed while encoding"
        );

        let mut writer = BinaryWriter::new(&mut data[..header_len], endian);
        writer.write_u32(count as u32)?;
        for offset in &offsets {
            writer.write_u32(*offset)?;
        }

        info!(textures = count, bytes = data.len(), "encoded texture lump");

        self.data = data;
        self.count = count;
        Ok(())
    }

    /// Bytes from the last successful encode.
    pub fn encoded(&self) -> &[u8] {
        &self.data
    }

    /// Number of textures in the last encode.
    pub fn encoded_count(&self) -> usize {
        self.count
    }

    /// Hand the last encode over as a [`LumpBuffer`], leaving the encoder empty.
    pub fn take_lump(&mut self) -> LumpBuffer {
        self.count = 0;
        LumpBuffer::from_vec(std::mem::take(&mut self.data))
    }
}
