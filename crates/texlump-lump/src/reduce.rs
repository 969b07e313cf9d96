//! Removal of textures no surface uses.
//!
//! [`ReductionPass::reduce_collection`] trims a [`TextureCollection`] before
//! it is encoded, with surfaces bound to collection indices.
//! [`ReductionPass::run`] trims an already encoded lump, with surfaces bound
//! to lump indices.
//!
//! The lump stores no record sizes, so each texture's extent is taken to be
//! the distance to the nearest record that starts after it (or the end of
//! the lump). This is a property of the format, not an exact measure: it
//! attributes any padding between records to the record before it.

use texlump_common::{BinaryWriter, Error as CommonError};
use texlump_miptex::TextureName;
use tracing::{debug, info, warn};

use crate::collection::{TextureCollection, TextureEntry};
use crate::config::CodecConfig;
use crate::lump::LumpBuffer;
use crate::remap::IndexRemap;
use crate::surface::TextureBinding;
use crate::{Error, Result};

/// Frame characters substituted into the second byte of `+`/`-` textures.
const FAMILY_FRAMES: &[u8; 20] = b"0123456789ABCDEFGHIJ";

/// Outcome of a completed reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReductionSummary {
    pub original_count: usize,
    pub reduced_count: usize,
    pub original_bytes: usize,
    pub reduced_bytes: usize,
}

/// Everything a reduction will change, computed without changing anything.
#[derive(Debug, Clone)]
pub struct ReductionPlan {
    lump_sizes: Vec<Option<usize>>,
    used: Vec<bool>,
    remap: IndexRemap,
    staged: Vec<u8>,
}

impl ReductionPlan {
    /// Inferred extent of each texture, `None` where its offset is invalid.
    pub fn lump_sizes(&self) -> &[Option<usize>] {
        &self.lump_sizes
    }

    /// Whether each texture survives, directly referenced or through its family.
    pub fn used(&self) -> &[bool] {
        &self.used
    }

    /// Old to new texture indices.
    pub fn remap(&self) -> &IndexRemap {
        &self.remap
    }

    /// The compacted lump bytes.
    pub fn staged(&self) -> &[u8] {
        &self.staged
    }
}

/// Drops textures that no surface references, from a collection or an encoded lump.
#[derive(Debug, Default)]
pub struct ReductionPass {
    config: CodecConfig,
}

impl ReductionPass {
    /// Create a pass writing offsets in the configured byte order.
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Reduce `lump` to the textures `surfaces` use and rewrite their indices.
    ///
    /// On any inconsistency the pass aborts and neither the lump nor the
    /// surfaces are modified.
    pub fn run<S: TextureBinding>(
        &self,
        lump: &mut LumpBuffer,
        surfaces: &mut [S],
    ) -> Result<ReductionSummary> {
        let plan = self.plan(lump, surfaces)?;
        Self::rewrite_surfaces(surfaces, &plan.remap);

        let summary = ReductionSummary {
            original_count: plan.remap.len(),
            reduced_count: plan.remap.retained_count(),
            original_bytes: lump.len(),
            reduced_bytes: plan.staged.len(),
        };
        lump.replace(plan.staged);

        info!(
            from = summary.original_count,
            to = summary.reduced_count,
            bytes_before = summary.original_bytes,
            bytes_after = summary.reduced_bytes,
            "reduced textures"
        );
        Ok(summary)
    }

    /// Work out what [`Self::run`] would do.
    pub fn plan<S: TextureBinding>(&self, lump: &LumpBuffer, surfaces: &[S]) -> Result<ReductionPlan> {
        let header_len = lump.header_len()?;
        let offsets: Vec<Option<usize>> = lump
            .offsets()?
            .into_iter()
            .map(|offset| offset as usize)
            .map(|offset| (offset >= header_len && offset < lump.len()).then_some(offset))
            .collect();
        let count = offsets.len();

        let lump_sizes = Self::infer_sizes(&offsets, lump.len());

        let expected = lump.len() - header_len;
        let actual: usize = lump_sizes.iter().flatten().sum();
        if actual != expected {
            warn!(expected, actual, "texture extents do not cover the data region, not reducing");
            return Err(Error::SizeMismatch { expected, actual });
        }

        let mut used = vec![false; count];
        Self::mark_surfaces(surfaces, &mut used)?;

        let names: Vec<Option<TextureName>> = offsets
            .iter()
            .map(|offset| offset.and_then(|offset| lump.record_name_at(offset)))
            .collect();
        Self::mark_families(&names, &mut used);

        let remap = IndexRemap::from_keep_flags(&used);
        let staged = self.stage(lump, &offsets, &lump_sizes, &remap)?;

        Ok(ReductionPlan {
            lump_sizes,
            used,
            remap,
            staged,
        })
    }

    /// Reduce `collection` to the miptex entries `surfaces` use and rewrite their indices.
    ///
    /// Only miptex entries take part: external references and undefined
    /// slots are always kept. Surfaces index the collection directly, so
    /// entries the encoder would skip do not shift them. On an out-of-range
    /// surface the pass aborts and neither input is modified.
    pub fn reduce_collection<S: TextureBinding>(
        &self,
        collection: &mut TextureCollection,
        surfaces: &mut [S],
    ) -> Result<ReductionSummary> {
        let used = Self::collection_usage(collection, surfaces)?;

        let original_count = collection.len();
        let original_bytes = collection.export_bytes_required();
        let remap = collection.filter(|index, _| used[index]);
        Self::rewrite_surfaces(surfaces, &remap);

        let summary = ReductionSummary {
            original_count,
            reduced_count: collection.len(),
            original_bytes,
            reduced_bytes: collection.export_bytes_required(),
        };

        info!(
            from = summary.original_count,
            to = summary.reduced_count,
            bytes_before = summary.original_bytes,
            bytes_after = summary.reduced_bytes,
            "reduced texture collection"
        );
        Ok(summary)
    }

    /// Which collection entries [`Self::reduce_collection`] would keep.
    pub fn collection_usage<S: TextureBinding>(
        collection: &TextureCollection,
        surfaces: &[S],
    ) -> Result<Vec<bool>> {
        let mut used = vec![false; collection.len()];
        Self::mark_surfaces(surfaces, &mut used)?;

        let names: Vec<Option<TextureName>> = collection
            .iter()
            .map(|entry| match entry {
                TextureEntry::Miptex(record) => Some(*record.name()),
                TextureEntry::External(_) | TextureEntry::Undefined => None,
            })
            .collect();
        Self::mark_families(&names, &mut used);

        for (flag, entry) in used.iter_mut().zip(collection.iter()) {
            if !matches!(entry, TextureEntry::Miptex(_)) {
                *flag = true;
            }
        }
        Ok(used)
    }

    /// Flag every texture a surface points at, failing on the first bad index.
    fn mark_surfaces<S: TextureBinding>(surfaces: &[S], used: &mut [bool]) -> Result<()> {
        let count = used.len();
        for (surface, binding) in surfaces.iter().enumerate() {
            let index = binding.texture_index();
            match usize::try_from(index).ok().filter(|&index| index < count) {
                Some(index) => used[index] = true,
                None => {
                    warn!(surface, index, count, "surface references a missing texture, not reducing");
                    return Err(Error::TextureIndexOutOfRange {
                        surface,
                        index,
                        count,
                    });
                }
            }
        }
        Ok(())
    }

    fn rewrite_surfaces<S: TextureBinding>(surfaces: &mut [S], remap: &IndexRemap) {
        for surface in surfaces.iter_mut() {
            let old = surface.texture_index() as usize;
            if let Some(new) = remap.get(old) {
                surface.set_texture_index(new as i32);
            }
        }
    }

    /// Distance from each offset to the nearest later record, or to the end.
    ///
    /// Among records sharing an offset, all but the last get size 0.
    fn infer_sizes(offsets: &[Option<usize>], lump_len: usize) -> Vec<Option<usize>> {
        offsets
            .iter()
            .enumerate()
            .map(|(index, offset)| {
                let offset = (*offset)?;
                let size = offsets
                    .iter()
                    .enumerate()
                    .filter_map(|(other_index, other)| {
                        let other = (*other)?;
                        (other > offset || (other == offset && other_index > index))
                            .then(|| other - offset)
                    })
                    .fold(lump_len - offset, usize::min);
                Some(size)
            })
            .collect()
    }

    /// Mark every frame of an animated or toggled family once any frame is used.
    fn mark_families(names: &[Option<TextureName>], used: &mut [bool]) {
        for index in 0..names.len() {
            if !used[index] {
                continue;
            }
            let Some(name) = names[index] else {
                continue;
            };
            if !matches!(name.byte_at(0), Some(b'+' | b'-')) || name.byte_at(1).is_none() {
                continue;
            }

            let mut bytes = name.as_bytes().to_vec();
            for &frame in FAMILY_FRAMES {
                bytes[1] = frame;
                let sibling = TextureName::from_bytes(&bytes);

                for (other_index, other) in names.iter().enumerate() {
                    if !used[other_index] && other.is_some_and(|other| other.eq_ignore_case(&sibling)) {
                        debug!(
                            texture = %name,
                            sibling = %sibling,
                            index = other_index,
                            "keeping texture family member"
                        );
                        used[other_index] = true;
                    }
                }
            }
        }
    }

    /// Copy retained records into a fresh lump in their new order.
    fn stage(
        &self,
        lump: &LumpBuffer,
        offsets: &[Option<usize>],
        lump_sizes: &[Option<usize>],
        remap: &IndexRemap,
    ) -> Result<Vec<u8>> {
        let new_count = remap.retained_count();
        let header_len = LumpBuffer::header_len_for(new_count as u32);
        let body_len: usize = remap
            .iter()
            .filter(|(_, new)| new.is_some())
            .filter_map(|(old, _)| lump_sizes[old])
            .sum();

        let mut staged = vec![0u8; header_len + body_len];
        let mut new_offsets = Vec::with_capacity(new_count);
        let mut cursor = header_len;

        for (old, new) in remap.iter() {
            if new.is_none() {
                continue;
            }

            let (Some(offset), Some(size)) = (offsets[old], lump_sizes[old]) else {
                new_offsets.push(-1);
                continue;
            };

            let bytes = lump.slice(offset, size).ok_or(CommonError::OutOfBounds {
                position: offset,
                len: lump.len(),
            })?;
            staged[cursor..cursor + size].copy_from_slice(bytes);
            new_offsets.push(cursor as i32);
            cursor += size;
        }

        let mut writer = BinaryWriter::new(&mut staged[..header_len], self.config.output_endian);
        writer.write_u32(new_count as u32)?;
        for offset in new_offsets {
            writer.write_i32(offset)?;
        }

        Ok(staged)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use texlump_miptex::{ExternalTexture, MiptexRecord};

    use super::*;
    use crate::decoder::LumpDecoder;
    use crate::encoder::LumpEncoder;
    use crate::surface::TexInfo;

    fn encoded(names: &[&str]) -> LumpBuffer {
        let mut collection = TextureCollection::new();
        for name in names {
            let mut record = MiptexRecord::new(name);
            record.initialise(16, 16).unwrap();
            collection.push(TextureEntry::Miptex(record));
        }

        let mut encoder = LumpEncoder::default();
        encoder.encode_all(&collection).unwrap();
        encoder.take_lump()
    }

    fn names_in(lump: &LumpBuffer) -> Vec<String> {
        let mut collection = TextureCollection::new();
        LumpDecoder::default()
            .decode_lump(lump, &mut collection)
            .unwrap();
        (0..collection.len())
            .map(|i| collection.miptex_at(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_family_members_survive() {
        let mut lump = encoded(&["+1wall", "brick", "+0wall", "+Awall"]);
        let mut surfaces = vec![TexInfo::new(2)];

        let summary = ReductionPass::default().run(&mut lump, &mut surfaces).unwrap();

        assert_eq!(names_in(&lump), vec!["+1wall", "+0wall", "+Awall"]);
        assert_eq!(surfaces[0].miptex, 1);
        assert_eq!(summary.original_count, 4);
        assert_eq!(summary.reduced_count, 3);
        assert_eq!(summary.reduced_bytes, lump.len());
    }

    #[test]
    fn test_family_match_ignores_case() {
        let mut lump = encoded(&["-0door", "-adoor", "-bdoor2", "other"]);
        let mut surfaces = vec![TexInfo::new(1), TexInfo::new(1)];

        ReductionPass::default().run(&mut lump, &mut surfaces).unwrap();

        assert_eq!(names_in(&lump), vec!["-0door", "-adoor"]);
        assert_eq!(surfaces[0].miptex, 1);
        assert_eq!(surfaces[1].miptex, 1);
    }

    #[test]
    fn test_single_character_name_has_no_family() {
        let lump = encoded(&["+", "+0"]);
        let plan = ReductionPass::default()
            .plan(&lump, &[TexInfo::new(0)])
            .unwrap();
        assert_eq!(plan.used(), &[true, false]);
    }

    #[test]
    fn test_unused_textures_go() {
        let mut lump = encoded(&["a", "b", "c"]);
        let mut surfaces = vec![TexInfo::new(2), TexInfo::new(0)];

        ReductionPass::default().run(&mut lump, &mut surfaces).unwrap();

        assert_eq!(names_in(&lump), vec!["a", "c"]);
        assert_eq!(surfaces[0].miptex, 1);
        assert_eq!(surfaces[1].miptex, 0);
    }

    #[test]
    fn test_sizes_follow_neighbouring_offsets() {
        let lump = encoded(&["a", "b"]);
        let plan = ReductionPass::default()
            .plan(&lump, &[TexInfo::new(0)])
            .unwrap();
        let size = MiptexRecord::ideal_bytes_for(16, 16);
        assert_eq!(plan.lump_sizes(), &[Some(size), Some(size)]);
    }

    #[test]
    fn test_out_of_range_surface_aborts() {
        let mut lump = encoded(&["a", "b"]);
        let before = lump.clone();
        let mut surfaces = vec![TexInfo::new(0), TexInfo::new(2)];

        let err = ReductionPass::default()
            .run(&mut lump, &mut surfaces)
            .unwrap_err();

        assert!(matches!(
            err,
            Error::TextureIndexOutOfRange {
                surface: 1,
                index: 2,
                count: 2
            }
        ));
        assert_eq!(lump, before);
        assert_eq!(surfaces[0].miptex, 0);
    }

    #[test]
    fn test_negative_surface_index_aborts() {
        let mut lump = encoded(&["a"]);
        let mut surfaces = vec![TexInfo::new(-1)];
        assert!(ReductionPass::default().run(&mut lump, &mut surfaces).is_err());
    }

    #[test]
    fn test_size_mismatch_aborts() {
        let lump = encoded(&["a"]);
        // Move the record four bytes further in, leaving a gap after the header.
        let mut data = 1u32.to_le_bytes().to_vec();
        data.extend_from_slice(&12u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 4]);
        data.extend_from_slice(&lump.as_bytes()[8..]);
        let mut lump = LumpBuffer::from_vec(data);
        let before = lump.clone();
        let mut surfaces = vec![TexInfo::new(0)];

        let err = ReductionPass::default()
            .run(&mut lump, &mut surfaces)
            .unwrap_err();

        assert!(matches!(err, Error::SizeMismatch { .. }));
        assert_eq!(lump, before);
    }

    #[test]
    fn test_shared_offsets_stay_shared() {
        let single = encoded(&["a"]);
        let size = single.len() - 8;
        let mut data = 2u32.to_le_bytes().to_vec();
        data.extend_from_slice(&12u32.to_le_bytes());
        data.extend_from_slice(&12u32.to_le_bytes());
        data.extend_from_slice(&single.as_bytes()[8..]);
        let mut lump = LumpBuffer::from_vec(data);

        let plan = ReductionPass::default()
            .plan(&lump, &[TexInfo::new(0), TexInfo::new(1)])
            .unwrap();
        assert_eq!(plan.lump_sizes(), &[Some(0), Some(size)]);

        let mut surfaces = vec![TexInfo::new(0), TexInfo::new(1)];
        ReductionPass::default().run(&mut lump, &mut surfaces).unwrap();
        assert_eq!(lump.offsets().unwrap(), vec![12, 12]);
    }

    #[test]
    fn test_invalid_offset_keeps_marker() {
        let single = encoded(&["a"]);
        let mut data = 2u32.to_le_bytes().to_vec();
        data.extend_from_slice(&(-1i32).to_le_bytes());
        data.extend_from_slice(&12u32.to_le_bytes());
        data.extend_from_slice(&single.as_bytes()[8..]);
        let mut lump = LumpBuffer::from_vec(data);
        let mut surfaces = vec![TexInfo::new(0), TexInfo::new(1)];

        let plan = ReductionPass::default().plan(&lump, &surfaces).unwrap();
        assert_eq!(plan.lump_sizes()[0], None);

        ReductionPass::default().run(&mut lump, &mut surfaces).unwrap();
        assert_eq!(lump.raw_offset_at(0).unwrap(), -1);
        assert_eq!(lump.offset_at(1).unwrap(), 12);
    }

    #[test]
    fn test_no_surfaces_empties_lump() {
        let mut lump = encoded(&["a", "b"]);
        let mut surfaces: Vec<TexInfo> = Vec::new();

        let summary = ReductionPass::default().run(&mut lump, &mut surfaces).unwrap();
        assert_eq!(summary.reduced_count, 0);
        assert_eq!(lump.as_bytes(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_offsets_listed_out_of_order() {
        let sorted = encoded(&["a", "b"]);
        let size = MiptexRecord::ideal_bytes_for(16, 16);
        let mut data = 2u32.to_le_bytes().to_vec();
        data.extend_from_slice(&(12 + size as u32).to_le_bytes());
        data.extend_from_slice(&12u32.to_le_bytes());
        data.extend_from_slice(&sorted.as_bytes()[12..]);
        let mut lump = LumpBuffer::from_vec(data);

        let plan = ReductionPass::default()
            .plan(&lump, &[TexInfo::new(0)])
            .unwrap();
        assert_eq!(plan.lump_sizes(), &[Some(size), Some(size)]);

        let mut surfaces = vec![TexInfo::new(0)];
        ReductionPass::default().run(&mut lump, &mut surfaces).unwrap();
        assert_eq!(names_in(&lump), vec!["b"]);
        assert_eq!(surfaces[0].miptex, 0);
    }

    fn collection_of(entries: Vec<TextureEntry>) -> TextureCollection {
        let mut collection = TextureCollection::new();
        for entry in entries {
            collection.push(entry);
        }
        collection
    }

    fn miptex(name: &str) -> TextureEntry {
        let mut record = MiptexRecord::new(name);
        record.initialise(16, 16).unwrap();
        TextureEntry::Miptex(record)
    }

    #[test]
    fn test_collection_indices_survive_unexportable_entries() {
        let mut collection = collection_of(vec![
            TextureEntry::Miptex(MiptexRecord::with_dimensions("bare", 16, 16)),
            miptex("a"),
            miptex("b"),
        ]);
        let mut surfaces = vec![TexInfo::new(1)];

        let summary = ReductionPass::default()
            .reduce_collection(&mut collection, &mut surfaces)
            .unwrap();

        assert_eq!(summary.original_count, 3);
        assert_eq!(summary.reduced_count, 1);
        assert_eq!(collection.miptex_at(0).unwrap().name().to_string(), "a");
        assert_eq!(surfaces[0].miptex, 0);

        let mut encoder = LumpEncoder::default();
        encoder.encode_all(&collection).unwrap();
        assert_eq!(names_in(&encoder.take_lump()), vec!["a"]);
    }

    #[test]
    fn test_collection_keeps_externals_and_families() {
        let mut collection = collection_of(vec![
            TextureEntry::External(ExternalTexture::with_path("sky.png").unwrap()),
            miptex("+0wall"),
            miptex("brick"),
            miptex("+1WALL"),
        ]);
        let mut surfaces = vec![TexInfo::new(1), TexInfo::new(1)];

        ReductionPass::default()
            .reduce_collection(&mut collection, &mut surfaces)
            .unwrap();

        assert_eq!(collection.len(), 3);
        assert_eq!(collection.external_at(0).unwrap().path(), "sky.png");
        assert_eq!(collection.miptex_at(1).unwrap().name().to_string(), "+0wall");
        assert_eq!(collection.miptex_at(2).unwrap().name().to_string(), "+1WALL");
        assert!(surfaces.iter().all(|surface| surface.miptex == 1));
    }

    #[test]
    fn test_collection_out_of_range_surface_aborts() {
        let mut collection = collection_of(vec![miptex("a"), miptex("b")]);
        let before = collection.clone();
        let mut surfaces = vec![TexInfo::new(1), TexInfo::new(5)];

        let err = ReductionPass::default()
            .reduce_collection(&mut collection, &mut surfaces)
            .unwrap_err();

        assert!(matches!(err, Error::TextureIndexOutOfRange { surface: 1, .. }));
        assert_eq!(collection, before);
        assert_eq!(surfaces[0].miptex, 1);
    }
}
