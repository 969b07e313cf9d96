//! In-memory miptex record.

use texlump_common::{BinaryReader, BinaryWriter, Endian};
use tracing::{debug, warn};

use crate::header::{RawMiptexHeader, HEADER_SIZE};
use crate::name::TextureName;
use crate::{Error, Result, MIP_LEVELS, PALETTE_BYTES, PALETTE_SIZE};

/// One RGB palette entry.
pub type Rgb = [u8; 3];

/// Size of the palette length field and of the trailing terminator.
const U16_FIELD: usize = 2;

/// Which mipmap levels an initialisation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MipSelection {
    /// A single level, 0 to 3.
    Level(usize),
    /// All four levels.
    All,
}

/// A palette-indexed texture with up to four mipmap levels.
///
/// A record starts out invalid (zero area). Giving it dimensions clears any
/// pixel and palette data; mip buffers and the palette are then allocated
/// separately, either zero-filled or by importing a packed record. Mip levels
/// are independent, so a record may carry some levels and not others.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MiptexRecord {
    name: TextureName,
    width: u32,
    height: u32,
    mipmaps: [Vec<u8>; MIP_LEVELS],
    palette: Vec<u8>,
}

impl MiptexRecord {
    /// Create an undimensioned record with a name.
    pub fn new(name: &str) -> Self {
        Self {
            name: TextureName::new(name),
            ..Self::default()
        }
    }

    /// Create a record with a name and dimensions.
    ///
    /// Invalid dimensions leave the record invalid, as [`Self::set_dimensions`] does.
    pub fn with_dimensions(name: &str, width: u32, height: u32) -> Self {
        let mut record = Self::new(name);
        if let Err(err) = record.set_dimensions(width, height) {
            debug!(texture = name, %err, "record left undimensioned");
        }
        record
    }

    /// A record is valid if it has a non-zero area.
    ///
    /// A valid record can still lack mipmaps or a palette, for example
    /// when those live in some external source.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Reset to zero area, dropping all pixel and palette data.
    pub fn invalidate(&mut self, clear_name: bool) {
        self.width = 0;
        self.height = 0;

        if clear_name {
            self.name = TextureName::default();
        }

        for mipmap in &mut self.mipmaps {
            mipmap.clear();
        }
        self.palette.clear();
    }

    /// Texture name.
    pub fn name(&self) -> &TextureName {
        &self.name
    }

    /// Replace the name, truncating to 15 bytes.
    pub fn set_name(&mut self, name: &str) {
        self.name = TextureName::new(name);
    }

    /// Width of mip level 0.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of mip level 0.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Set dimensions, clearing all mip and palette state first.
    ///
    /// Fails for zero dimensions or ones that are not multiples of 16; the
    /// record is left invalid in that case. The name is kept either way.
    pub fn set_dimensions(&mut self, width: u32, height: u32) -> Result<()> {
        self.invalidate(false);

        if !Self::dimensions_valid(width, height) {
            return Err(Error::InvalidDimensions { width, height });
        }

        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Set dimensions and allocate black mipmaps and palette.
    pub fn initialise(&mut self, width: u32, height: u32) -> Result<()> {
        self.set_dimensions(width, height)?;
        self.set_blank();
        Ok(())
    }

    /// Allocate all mipmaps at index 0 and a black palette.
    ///
    /// Does nothing on an invalid record.
    pub fn set_blank(&mut self) {
        if !self.is_valid() {
            return;
        }

        self.allocate_mipmaps(0..MIP_LEVELS);
        self.allocate_palette();
    }

    /// Check whether a palette is present.
    pub fn has_palette(&self) -> bool {
        !self.palette.is_empty()
    }

    /// Allocate a black 256-entry palette, replacing any existing one.
    pub fn initialise_palette(&mut self) -> Result<()> {
        if !self.is_valid() {
            return Err(Error::Undimensioned);
        }

        self.allocate_palette();
        Ok(())
    }

    fn allocate_palette(&mut self) {
        self.palette.clear();
        self.palette.resize(PALETTE_BYTES, 0);
    }

    /// Check whether a mip level is present.
    pub fn has_mipmap(&self, level: usize) -> bool {
        level < MIP_LEVELS && !self.mipmaps[level].is_empty()
    }

    /// Check whether at least one mip level is present.
    pub fn has_any_mipmap(&self) -> bool {
        (0..MIP_LEVELS).any(|level| self.has_mipmap(level))
    }

    /// Allocate zero-filled buffers for the selected mip levels.
    ///
    /// Levels past 3 are ignored.
    pub fn initialise_mipmap(&mut self, selection: MipSelection) -> Result<()> {
        if !self.is_valid() {
            return Err(Error::Undimensioned);
        }

        let levels = match selection {
            MipSelection::Level(level) if level >= MIP_LEVELS => return Ok(()),
            MipSelection::Level(level) => level..level + 1,
            MipSelection::All => 0..MIP_LEVELS,
        };

        self.allocate_mipmaps(levels);
        Ok(())
    }

    fn allocate_mipmaps(&mut self, levels: std::ops::Range<usize>) {
        for level in levels {
            let area = self.area_for_level(level);
            let mipmap = &mut self.mipmaps[level];
            mipmap.clear();
            mipmap.resize(area, 0);
        }
    }

    /// Width of a mip level. Levels past 3 are clamped to 3.
    pub fn width_for_level(&self, level: usize) -> u32 {
        Self::dimension_for_level(self.width, level)
    }

    /// Height of a mip level. Levels past 3 are clamped to 3.
    pub fn height_for_level(&self, level: usize) -> u32 {
        Self::dimension_for_level(self.height, level)
    }

    /// Pixel count of a mip level. Levels past 3 are clamped to 3.
    pub fn area_for_level(&self, level: usize) -> usize {
        Self::area_for(self.width, self.height, level)
    }

    /// Scale a dimension down to a mip level.
    pub fn dimension_for_level(dimension: u32, level: usize) -> u32 {
        dimension >> level.min(MIP_LEVELS - 1)
    }

    /// Pixel count of a mip level for the given level-0 dimensions.
    pub fn area_for(width: u32, height: u32, level: usize) -> usize {
        let area = u64::from(Self::dimension_for_level(width, level))
            * u64::from(Self::dimension_for_level(height, level));
        usize::try_from(area).unwrap_or(usize::MAX)
    }

    /// Raw palette indices of a mip level, if present.
    pub fn mipmap(&self, level: usize) -> Option<&[u8]> {
        self.has_mipmap(level).then(|| self.mipmaps[level].as_slice())
    }

    /// Mutable palette indices of a mip level, if present.
    pub fn mipmap_mut(&mut self, level: usize) -> Option<&mut [u8]> {
        if !self.has_mipmap(level) {
            return None;
        }
        Some(self.mipmaps[level].as_mut_slice())
    }

    /// Raw palette bytes (256 RGB triples), if present.
    pub fn palette(&self) -> Option<&[u8]> {
        self.has_palette().then_some(self.palette.as_slice())
    }

    /// Mutable palette bytes, if present.
    pub fn palette_mut(&mut self) -> Option<&mut [u8]> {
        if !self.has_palette() {
            return None;
        }
        Some(self.palette.as_mut_slice())
    }

    /// Palette index stored for a pixel of a mip level.
    pub fn palette_index_at(&self, x: u32, y: u32, level: usize) -> Option<u8> {
        if !self.has_mipmap(level)
            || x >= self.width_for_level(level)
            || y >= self.height_for_level(level)
        {
            return None;
        }

        let row = self.width_for_level(level) as usize;
        self.mipmaps[level].get(y as usize * row + x as usize).copied()
    }

    /// Colour of a palette entry.
    pub fn palette_colour(&self, index: u8) -> Option<Rgb> {
        let start = usize::from(index) * 3;
        let entry = self.palette().and_then(|palette| palette.get(start..start + 3))?;
        Some([entry[0], entry[1], entry[2]])
    }

    /// Colour of a pixel of a mip level.
    pub fn colour_at(&self, x: u32, y: u32, level: usize) -> Option<Rgb> {
        self.palette_index_at(x, y, level)
            .and_then(|index| self.palette_colour(index))
    }

    /// Populate this record from a packed record.
    ///
    /// `raw` starts at the record and spans every byte available to it. It
    /// must hold at least [`Self::ideal_bytes_for`] bytes for the declared
    /// dimensions. With `header_only`, only the name and dimensions are taken.
    ///
    /// Absent mip levels (offset -1) stay absent. If any level is present, a
    /// 256-entry palette must follow the mip data directly. On failure the
    /// record is left invalid with an empty name.
    pub fn import_from(&mut self, raw: &[u8], header_only: bool) -> Result<()> {
        self.invalidate(true);

        let result = self.import_inner(raw, header_only);
        if result.is_err() {
            self.invalidate(true);
        }
        result
    }

    fn import_inner(&mut self, raw: &[u8], header_only: bool) -> Result<()> {
        let mut reader = BinaryReader::new(raw);
        let header: RawMiptexHeader = reader.read_struct()?;

        self.name = TextureName::from_bytes(&header.name);

        let (width, height) = (header.width.get(), header.height.get());
        if let Err(err) = self.set_dimensions(width, height) {
            warn!(name = %self.name, width, height, "miptex has invalid dimensions");
            return Err(err);
        }

        let required = Self::ideal_bytes_for(width, height);
        if raw.len() < required {
            warn!(
                name = %self.name,
                required,
                available = raw.len(),
                "miptex data is shorter than its dimensions require"
            );
            return Err(Error::InsufficientData {
                required,
                available: raw.len(),
            });
        }

        if header_only {
            return Ok(());
        }

        let mut sources: [Option<&[u8]>; MIP_LEVELS] = [None; MIP_LEVELS];
        let mut total_mip_bytes = 0usize;

        for (level, source) in sources.iter_mut().enumerate() {
            let Some(offset) = header.mip_offset(level) else {
                continue;
            };

            let size = self.area_for_level(level);
            let start = offset as usize;
            let slice = start
                .checked_add(size)
                .and_then(|end| raw.get(start..end))
                .ok_or(Error::MipOutOfBounds {
                    level,
                    offset,
                    size,
                    available: raw.len(),
                })?;

            *source = Some(slice);
            total_mip_bytes += size;
        }

        // Mip data, if any, must be followed directly by a full palette.
        let palette = if total_mip_bytes > 0 {
            reader.seek(HEADER_SIZE + total_mip_bytes)?;
            let palette_size = reader.read_u16()?;

            if usize::from(palette_size) != PALETTE_SIZE {
                warn!(
                    name = %self.name,
                    expected = PALETTE_SIZE,
                    actual = palette_size,
                    "miptex has invalid palette size"
                );
                return Err(Error::InvalidPaletteSize {
                    expected: PALETTE_SIZE,
                    actual: palette_size,
                });
            }

            Some(reader.read_bytes(PALETTE_BYTES)?)
        } else {
            None
        };

        for (level, source) in sources.iter().enumerate() {
            if let Some(source) = source {
                self.mipmaps[level] = source.to_vec();
            }
        }

        if let Some(palette) = palette {
            self.palette = palette.to_vec();
        }

        debug!(
            name = %self.name,
            width,
            height,
            mip_bytes = total_mip_bytes,
            "imported miptex"
        );
        Ok(())
    }

    /// Check whether the record can be written to a lump.
    ///
    /// Requires valid dimensions, at least one mip level and a palette.
    pub fn is_exportable(&self) -> bool {
        self.is_valid() && self.has_any_mipmap() && self.has_palette()
    }

    /// Exact number of bytes [`Self::export_to`] writes, or 0 if not exportable.
    pub fn required_export_bytes(&self) -> usize {
        if !self.is_exportable() {
            return 0;
        }

        HEADER_SIZE
            + self.mipmaps.iter().map(Vec::len).sum::<usize>()
            + U16_FIELD
            + self.palette.len()
            + U16_FIELD
    }

    /// Bytes a fully populated record of these dimensions occupies.
    ///
    /// Header, all four mip areas, palette size field, 256-entry palette and
    /// terminator. Pure function of the dimensions.
    pub fn ideal_bytes_for(width: u32, height: u32) -> usize {
        (0..MIP_LEVELS)
            .map(|level| Self::area_for(width, height, level))
            .fold(HEADER_SIZE + U16_FIELD + PALETTE_BYTES + U16_FIELD, |total, area| {
                total.saturating_add(area)
            })
    }

    /// Write the packed record into `out`, returning the bytes written.
    ///
    /// Present mip levels are written contiguously in level order, absent
    /// ones get offset -1. The palette follows the last mip data. Nothing is
    /// written if the record is not exportable or `out` is too small.
    pub fn export_to(&self, out: &mut [u8], endian: Endian) -> Result<usize> {
        if !self.is_exportable() {
            return Err(Error::NotExportable {
                name: self.name.to_string(),
            });
        }

        let required = self.required_export_bytes();
        if out.len() < required {
            return Err(Error::OutputTooSmall {
                required,
                available: out.len(),
            });
        }

        let mut writer = BinaryWriter::new(&mut out[..required], endian);
        writer.write_bytes(self.name.as_field())?;
        writer.write_u32(self.width)?;
        writer.write_u32(self.height)?;

        let mut next_offset = HEADER_SIZE;
        for mipmap in &self.mipmaps {
            if mipmap.is_empty() {
                writer.write_i32(RawMiptexHeader::ABSENT_OFFSET)?;
                continue;
            }
            writer.write_i32(next_offset as i32)?;
            next_offset += mipmap.len();
        }

        for mipmap in &self.mipmaps {
            writer.write_bytes(mipmap)?;
        }

        writer.write_u16((self.palette.len() / 3) as u16)?;
        writer.write_bytes(&self.palette)?;
        writer.write_u16(0)?;

        debug_assert_eq!(writer.position(), required);
        Ok(required)
    }

    /// Export into a freshly allocated buffer.
    pub fn export(&self, endian: Endian) -> Result<Vec<u8>> {
        let mut out = vec![0u8; self.required_export_bytes()];
        self.export_to(&mut out, endian)?;
        Ok(out)
    }

    fn dimensions_valid(width: u32, height: u32) -> bool {
        width > 0 && height > 0 && width % 16 == 0 && height % 16 == 0
    }
}
