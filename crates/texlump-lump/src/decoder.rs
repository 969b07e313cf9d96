//! Texture lump decoding.
//!
//! Decoding validates the offset table before touching any record body:
//!
//! 1. Offsets that are zero, inside the header or past the end are dropped.
//! 2. The remaining offsets are ordered to find how many bytes each record
//!    has before the next one starts (or the lump ends).
//! 3. Records whose dimensions need more room than that window are dropped.
//!    Records sharing an offset with an earlier one get an empty window.
//! 4. Survivors keep their original relative order and become entries
//!    `0..n` of the collection.

use texlump_common::BinaryReader;
use texlump_miptex::{MiptexRecord, RawMiptexHeader, HEADER_SIZE};
use tracing::{debug, error, info, warn};

use crate::collection::{TextureCollection, TextureEntry};
use crate::config::{CodecConfig, DecodeMode};
use crate::lump::{LumpBuffer, SLOT_SIZE};
use crate::remap::IndexRemap;
use crate::{Error, Result};

/// Where a [`LumpDecoder`] is in its single pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeState {
    #[default]
    Idle,
    Parsing,
    Done,
    Failed,
}

/// A texture whose offset passed the header checks.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    offset: usize,
}

/// A texture that passed every check, with the bytes available to it.
#[derive(Debug, Clone, Copy)]
struct Accepted {
    index: usize,
    offset: usize,
    window: usize,
}

/// Parses raw lump bytes into a [`TextureCollection`].
#[derive(Debug, Default)]
pub struct LumpDecoder {
    config: CodecConfig,
    state: DecodeState,
    declared_count: usize,
    remap: IndexRemap,
    import_failures: usize,
}

impl LumpDecoder {
    /// Create an idle decoder.
    pub fn new(config: CodecConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Current state of the decoder.
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// Texture count the lump header declared.
    pub fn declared_count(&self) -> usize {
        self.declared_count
    }

    /// Number of textures that made it into the collection.
    pub fn valid_count(&self) -> usize {
        self.remap.retained_count()
    }

    /// Textures that survived the offset checks but failed to import.
    ///
    /// They stay in the collection as invalid miptex entries.
    pub fn import_failures(&self) -> usize {
        self.import_failures
    }

    /// Map from header index to collection index from the last decode.
    pub fn remap(&self) -> &IndexRemap {
        &self.remap
    }

    /// Decode a lump already held in a [`LumpBuffer`].
    pub fn decode_lump(&mut self, lump: &LumpBuffer, collection: &mut TextureCollection) -> Result<()> {
        self.decode(lump.as_bytes(), collection)
    }

    /// Decode raw lump bytes, replacing the contents of `collection`.
    ///
    /// Fails only on structural problems: a lump too short for its count, an
    /// offset table that runs past the end, or a lump over the byte budget
    /// (see [`Error::is_fatal`]). Malformed individual textures are logged and
    /// dropped. A lump where nothing survives decodes to an empty collection.
    pub fn decode(&mut self, data: &[u8], collection: &mut TextureCollection) -> Result<()> {
        self.reset();
        collection.clear();
        self.state = DecodeState::Parsing;

        match self.decode_inner(data, collection) {
            Ok(()) => {
                self.state = DecodeState::Done;
                info!(
                    declared = self.declared_count,
                    valid = self.valid_count(),
                    "decoded texture lump"
                );
                Ok(())
            }
            Err(err) => {
                self.state = DecodeState::Failed;
                collection.clear();
                Err(err)
            }
        }
    }

    fn reset(&mut self) {
        self.state = DecodeState::Idle;
        self.declared_count = 0;
        self.remap = IndexRemap::default();
        self.import_failures = 0;
    }

    fn decode_inner(&mut self, data: &[u8], collection: &mut TextureCollection) -> Result<()> {
        if data.len() < SLOT_SIZE {
            warn!(length = data.len(), "texture lump too short to hold a count");
            return Err(Error::LumpTooShort { length: data.len() });
        }

        if data.len() >= self.config.max_lump_bytes {
            error!(
                length = data.len(),
                max = self.config.max_lump_bytes,
                "texture lump exceeds byte budget"
            );
            return Err(Error::BudgetExceeded {
                length: data.len(),
                max: self.config.max_lump_bytes,
            });
        }

        let mut reader = BinaryReader::new(data);
        let count = reader.read_u32()?;
        let header_len = LumpBuffer::header_len_for(count);

        if header_len > data.len() {
            warn!(
                count,
                header_len,
                length = data.len(),
                "texture lump too short for its offset table"
            );
            return Err(Error::HeaderOverflow {
                count,
                header_len,
                length: data.len(),
            });
        }

        self.declared_count = count as usize;

        let mut candidates = Vec::with_capacity(self.declared_count);
        for index in 0..self.declared_count {
            let offset = reader.read_u32()? as usize;

            if offset >= data.len() {
                warn!(
                    index,
                    offset,
                    length = data.len(),
                    "texture offset exceeds lump size"
                );
            } else if offset == 0 || offset < header_len {
                warn!(
                    index,
                    offset,
                    min = header_len,
                    "texture offset points into the lump header"
                );
            } else {
                candidates.push(Candidate { index, offset });
            }
        }

        // Stable, so equal offsets stay in original index order.
        candidates.sort_by_key(|candidate| candidate.offset);

        let mut accepted = Self::check_windows(data, &candidates);
        accepted.sort_by_key(|texture| texture.index);

        let mut targets = vec![None; self.declared_count];
        for (new_index, texture) in accepted.iter().enumerate() {
            targets[texture.index] = Some(new_index);
        }
        self.remap = IndexRemap::new(targets)?;

        let header_only = self.config.decode_mode == DecodeMode::HeaderOnly;
        for texture in &accepted {
            let mut record = MiptexRecord::default();
            let raw = &data[texture.offset..texture.offset + texture.window];

            if let Err(err) = record.import_from(raw, header_only) {
                warn!(
                    index = texture.index,
                    offset = texture.offset,
                    error = %err,
                    "failed to import texture"
                );
                self.import_failures += 1;
            }

            collection.push(TextureEntry::Miptex(record));
        }

        Ok(())
    }

    /// Work out each candidate's window and keep those big enough.
    ///
    /// `candidates` must be ordered by offset.
    fn check_windows(data: &[u8], candidates: &[Candidate]) -> Vec<Accepted> {
        let mut accepted = Vec::with_capacity(candidates.len());

        for (position, candidate) in candidates.iter().enumerate() {
            let shares_offset = position > 0 && candidates[position - 1].offset == candidate.offset;

            let window = if shares_offset {
                0
            } else {
                let next = candidates[position + 1..]
                    .iter()
                    .map(|other| other.offset)
                    .find(|&offset| offset > candidate.offset)
                    .unwrap_or(data.len());
                next - candidate.offset
            };

            let raw = &data[candidate.offset..candidate.offset + window];
            let header = match BinaryReader::new(raw).read_struct::<RawMiptexHeader>() {
                Ok(header) => header,
                Err(_) => {
                    warn!(
                        index = candidate.index,
                        required = HEADER_SIZE,
                        available = window,
                        "texture has no room for its header"
                    );
                    continue;
                }
            };

            let (width, height) = (header.width.get(), header.height.get());
            if width == 0 || height == 0 || width % 16 != 0 || height % 16 != 0 {
                warn!(
                    index = candidate.index,
                    width, height, "texture has invalid dimensions"
                );
                continue;
            }

            let required = MiptexRecord::ideal_bytes_for(width, height);
            if window < required {
                warn!(
                    index = candidate.index,
                    required,
                    available = window,
                    "texture needs more bytes than the lump layout gives it"
                );
                continue;
            }

            if window > required {
                debug!(
                    index = candidate.index,
                    required,
                    available = window,
                    "texture has trailing bytes, ignoring them"
                );
            }

            accepted.push(Accepted {
                index: candidate.index,
                offset: candidate.offset,
                window,
            });
        }

        accepted
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use texlump_common::Endian;

    use super::*;

    fn texture(name: &str, size: u32) -> Vec<u8> {
        let mut record = MiptexRecord::new(name);
        record.initialise(size, size).unwrap();
        record.palette_mut().unwrap()[0] = 0x7F;
        record.export(Endian::Little).unwrap()
    }

    /// Assemble a lump from an explicit offset table and body.
    fn lump(offsets: &[u32], body: &[u8]) -> Vec<u8> {
        let mut data = (offsets.len() as u32).to_le_bytes().to_vec();
        for offset in offsets {
            data.extend_from_slice(&offset.to_le_bytes());
        }
        data.extend_from_slice(body);
        data
    }

    fn decoded_names(collection: &TextureCollection) -> Vec<String> {
        (0..collection.len())
            .map(|i| collection.miptex_at(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_decode_well_formed() {
        let a = texture("a", 16);
        let b = texture("b", 32);
        let header = 12u32;
        let mut body = a.clone();
        body.extend_from_slice(&b);
        let data = lump(&[header, header + a.len() as u32], &body);

        let mut decoder = LumpDecoder::default();
        let mut collection = TextureCollection::new();
        decoder.decode(&data, &mut collection).unwrap();

        assert_eq!(decoder.state(), DecodeState::Done);
        assert_eq!(decoded_names(&collection), vec!["a", "b"]);
        assert!(collection.miptex_at(1).unwrap().is_exportable());
        assert_eq!(collection.miptex_at(0).unwrap().palette().unwrap()[0], 0x7F);
        assert_eq!(decoder.remap(), &IndexRemap::identity(2));
    }

    #[test]
    fn test_records_out_of_table_order() {
        let a = texture("a", 16);
        let b = texture("b", 16);
        let mut body = b.clone();
        body.extend_from_slice(&a);
        // Index 0 ("a") is stored after index 1 ("b").
        let data = lump(&[12 + b.len() as u32, 12], &body);

        let mut collection = TextureCollection::new();
        LumpDecoder::default().decode(&data, &mut collection).unwrap();
        assert_eq!(decoded_names(&collection), vec!["a", "b"]);
    }

    #[test]
    fn test_header_larger_than_buffer_fails() {
        // Claims three textures but only has room for two offsets.
        let mut data = 3u32.to_le_bytes().to_vec();
        data.extend_from_slice(&[0u8; 8]);

        let mut decoder = LumpDecoder::default();
        let mut collection = TextureCollection::new();
        collection.push(TextureEntry::Undefined);

        assert!(matches!(
            decoder.decode(&data, &mut collection),
            Err(Error::HeaderOverflow { count: 3, .. })
        ));
        assert_eq!(decoder.state(), DecodeState::Failed);
        assert!(collection.is_empty());
    }

    #[test]
    fn test_too_short_fails() {
        let mut decoder = LumpDecoder::default();
        let mut collection = TextureCollection::new();
        assert!(matches!(
            decoder.decode(&[0, 0, 0], &mut collection),
            Err(Error::LumpTooShort { length: 3 })
        ));
    }

    #[test]
    fn test_budget_exceeded_is_fatal() {
        let data = lump(&[], &[0u8; 60]);
        let mut decoder = LumpDecoder::new(CodecConfig::default().with_max_lump_bytes(64));
        let mut collection = TextureCollection::new();

        let err = decoder.decode(&data, &mut collection).unwrap_err();
        assert!(matches!(err, Error::BudgetExceeded { length: 64, max: 64 }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_shared_offset_drops_later_index() {
        let a = texture("a", 16);
        let data = lump(&[16, 16, 16 + a.len() as u32], &{
            let mut body = a.clone();
            body.extend_from_slice(&texture("c", 16));
            body
        });

        let mut decoder = LumpDecoder::default();
        let mut collection = TextureCollection::new();
        decoder.decode(&data, &mut collection).unwrap();

        assert_eq!(decoded_names(&collection), vec!["a", "c"]);
        assert_eq!(decoder.remap().get(0), Some(0));
        assert!(decoder.remap().is_removed(1));
        assert_eq!(decoder.remap().get(2), Some(1));
    }

    #[test]
    fn test_invalid_offsets_are_dropped() {
        let a = texture("a", 16);
        let len = 20 + a.len() as u32;
        let data = lump(&[0, 8, len, 20], &a);

        let mut decoder = LumpDecoder::default();
        let mut collection = TextureCollection::new();
        decoder.decode(&data, &mut collection).unwrap();

        assert_eq!(decoder.declared_count(), 4);
        assert_eq!(decoder.valid_count(), 1);
        assert_eq!(decoder.remap().get(3), Some(0));
        assert_eq!(decoded_names(&collection), vec!["a"]);
    }

    #[test]
    fn test_insufficient_window_is_dropped() {
        let a = texture("a", 16);
        let b = texture("b", 16);
        let mut body = a.clone();
        body.extend_from_slice(&b[..b.len() - 1]);
        let data = lump(&[12, 12 + a.len() as u32], &body);

        let mut decoder = LumpDecoder::default();
        let mut collection = TextureCollection::new();
        decoder.decode(&data, &mut collection).unwrap();

        assert_eq!(decoded_names(&collection), vec!["a"]);
        assert!(decoder.remap().is_removed(1));
    }

    #[test]
    fn test_slack_is_ignored() {
        let mut body = texture("a", 16);
        body.extend_from_slice(&[0xAB; 37]);
        let data = lump(&[8], &body);

        let mut collection = TextureCollection::new();
        LumpDecoder::default().decode(&data, &mut collection).unwrap();
        assert_eq!(
            collection.miptex_at(0).unwrap().required_export_bytes(),
            MiptexRecord::ideal_bytes_for(16, 16)
        );
    }

    #[test]
    fn test_invalid_dimensions_are_dropped() {
        let mut a = texture("a", 16);
        a[16..20].copy_from_slice(&17u32.to_le_bytes());
        let data = lump(&[8], &a);

        let mut decoder = LumpDecoder::default();
        let mut collection = TextureCollection::new();
        decoder.decode(&data, &mut collection).unwrap();
        assert_eq!(decoder.valid_count(), 0);
        assert!(collection.is_empty());
    }

    #[test]
    fn test_bad_palette_keeps_invalid_entry() {
        let mut a = texture("a", 16);
        a[380..382].copy_from_slice(&12u16.to_le_bytes());
        let data = lump(&[8], &a);

        let mut decoder = LumpDecoder::default();
        let mut collection = TextureCollection::new();
        decoder.decode(&data, &mut collection).unwrap();

        assert_eq!(decoder.import_failures(), 1);
        assert_eq!(collection.len(), 1);
        assert!(!collection.miptex_at(0).unwrap().is_valid());
        assert_eq!(collection.exportable_count(), 0);
    }

    #[test]
    fn test_header_only_mode() {
        let data = lump(&[8], &texture("sky", 32));
        let mut decoder =
            LumpDecoder::new(CodecConfig::default().with_decode_mode(DecodeMode::HeaderOnly));
        let mut collection = TextureCollection::new();
        decoder.decode(&data, &mut collection).unwrap();

        let record = collection.miptex_at(0).unwrap();
        assert_eq!(record.width(), 32);
        assert!(!record.has_any_mipmap());
    }

    #[test]
    fn test_decode_resets_previous_run() {
        let mut decoder = LumpDecoder::default();
        let mut collection = TextureCollection::new();
        decoder
            .decode(&lump(&[8], &texture("a", 16)), &mut collection)
            .unwrap();
        decoder.decode(&lump(&[], &[]), &mut collection).unwrap();

        assert_eq!(decoder.valid_count(), 0);
        assert_eq!(decoder.declared_count(), 0);
        assert!(collection.is_empty());
    }
}
