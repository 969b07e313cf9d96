//! Ordered, indexable set of texture entries.

use std::ops::Range;

use texlump_miptex::{ExternalTexture, MiptexRecord, TextureName};
use tracing::debug;

use crate::remap::IndexRemap;
use crate::{Error, Result};

/// Discriminant of a [`TextureEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Miptex,
    External,
    Undefined,
}

/// One slot in a [`TextureCollection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureEntry {
    /// Pixel data embedded in the lump.
    Miptex(MiptexRecord),
    /// A reference to an image file resolved elsewhere.
    External(ExternalTexture),
    /// Reserved slot with no payload.
    Undefined,
}

impl TextureEntry {
    /// An empty entry of the given kind.
    pub fn empty(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Miptex => TextureEntry::Miptex(MiptexRecord::default()),
            EntryKind::External => TextureEntry::External(ExternalTexture::default()),
            EntryKind::Undefined => TextureEntry::Undefined,
        }
    }

    /// Kind of this entry.
    pub fn kind(&self) -> EntryKind {
        match self {
            TextureEntry::Miptex(_) => EntryKind::Miptex,
            TextureEntry::External(_) => EntryKind::External,
            TextureEntry::Undefined => EntryKind::Undefined,
        }
    }

    /// Only miptex entries with dimensions, mip data and a palette go into a lump.
    pub fn is_exportable(&self) -> bool {
        match self {
            TextureEntry::Miptex(record) => record.is_exportable(),
            TextureEntry::External(_) | TextureEntry::Undefined => false,
        }
    }

    /// Bytes this entry contributes to an encoded lump body.
    pub fn export_bytes_required(&self) -> usize {
        match self {
            TextureEntry::Miptex(record) => record.required_export_bytes(),
            TextureEntry::External(_) | TextureEntry::Undefined => 0,
        }
    }
}

/// The set of textures a compile works with, in index order.
///
/// Entries keep their kind for life: there is no way to replace an entry
/// with one of another kind, only to edit its payload in place, append new
/// entries, or drop entries through [`Self::filter`] and [`Self::apply_remap`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureCollection {
    entries: Vec<TextureEntry>,
}

impl TextureCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entry at `index`.
    pub fn get(&self, index: usize) -> Option<&TextureEntry> {
        self.entries.get(index)
    }

    /// Kind of the entry at `index`.
    pub fn kind_at(&self, index: usize) -> Option<EntryKind> {
        self.get(index).map(TextureEntry::kind)
    }

    /// Entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = &TextureEntry> {
        self.entries.iter()
    }

    /// Miptex record at `index`, `None` for other kinds.
    pub fn miptex_at(&self, index: usize) -> Option<&MiptexRecord> {
        match self.entries.get(index)? {
            TextureEntry::Miptex(record) => Some(record),
            _ => None,
        }
    }

    /// Mutable miptex record at `index`.
    pub fn miptex_at_mut(&mut self, index: usize) -> Option<&mut MiptexRecord> {
        match self.entries.get_mut(index)? {
            TextureEntry::Miptex(record) => Some(record),
            _ => None,
        }
    }

    /// External reference at `index`, `None` for other kinds.
    pub fn external_at(&self, index: usize) -> Option<&ExternalTexture> {
        match self.entries.get(index)? {
            TextureEntry::External(texture) => Some(texture),
            _ => None,
        }
    }

    /// Mutable external reference at `index`.
    pub fn external_at_mut(&mut self, index: usize) -> Option<&mut ExternalTexture> {
        match self.entries.get_mut(index)? {
            TextureEntry::External(texture) => Some(texture),
            _ => None,
        }
    }

    /// Append an entry, returning its index.
    pub fn push(&mut self, entry: TextureEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    /// Append `count` empty entries of one kind, returning their index range.
    pub fn allocate_and_append(&mut self, count: usize, kind: EntryKind) -> Range<usize> {
        let start = self.entries.len();
        self.entries
            .extend(std::iter::repeat_with(|| TextureEntry::empty(kind)).take(count));
        start..self.entries.len()
    }

    /// Drop every entry at or past `len`.
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// Keep the entries the predicate accepts, preserving their order.
    ///
    /// Returns the remap from old to new indices.
    pub fn filter<F>(&mut self, mut keep: F) -> IndexRemap
    where
        F: FnMut(usize, &TextureEntry) -> bool,
    {
        let flags: Vec<bool> = self
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| keep(index, entry))
            .collect();

        let remap = IndexRemap::from_keep_flags(&flags);
        self.compact(&remap);
        remap
    }

    /// Rearrange storage to match a remap built for this collection.
    ///
    /// Removed entries are dropped and retained ones move to their new index.
    /// Fails without touching the collection if the remap covers a different
    /// number of entries.
    pub fn apply_remap(&mut self, remap: &IndexRemap) -> Result<()> {
        if remap.len() != self.entries.len() {
            return Err(Error::InvalidRemap(format!(
                "remap covers {} entries but the collection has {}",
                remap.len(),
                self.entries.len()
            )));
        }

        self.compact(remap);
        Ok(())
    }

    fn compact(&mut self, remap: &IndexRemap) {
        let mut slots: Vec<Option<TextureEntry>> = vec![None; remap.retained_count()];

        for (entry, (_, target)) in self.entries.drain(..).zip(remap.iter()) {
            if let Some(new) = target {
                slots[new] = Some(entry);
            }
        }

        self.entries = slots.into_iter().flatten().collect();

        debug!(
            retained = remap.retained_count(),
            removed = remap.removed_count(),
            "compacted texture collection"
        );
    }

    /// Index of the first miptex entry whose name matches, ignoring case.
    pub fn find_miptex(&self, name: &str) -> Option<usize> {
        let name = TextureName::new(name);
        self.entries.iter().position(|entry| match entry {
            TextureEntry::Miptex(record) => record.name().eq_ignore_case(&name),
            _ => false,
        })
    }

    /// Miptex records that would be written by an encoder, in index order.
    pub fn exportable(&self) -> impl Iterator<Item = &MiptexRecord> {
        self.entries.iter().filter_map(|entry| match entry {
            TextureEntry::Miptex(record) if record.is_exportable() => Some(record),
            _ => None,
        })
    }

    /// Number of records an encoder would write.
    pub fn exportable_count(&self) -> usize {
        self.exportable().count()
    }

    /// Total record bytes an encoder would write, excluding the header.
    pub fn export_bytes_required(&self) -> usize {
        self.entries
            .iter()
            .map(TextureEntry::export_bytes_required)
            .sum()
    }
}
