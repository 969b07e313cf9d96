//! Textures that live outside the lump as image files.

use crate::name::{TextureName, NAME_FIELD_LEN};
use crate::{Error, Result};

/// A texture referenced by relative path instead of embedded pixel data.
///
/// Only the path travels through the lump; pixels are loaded from disk by
/// whoever resolves the reference. When loaded, pixels are RGBA in row-major
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalTexture {
    path: String,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ExternalTexture {
    /// Longest path that fits the name field with its terminator.
    pub const MAX_PATH_LEN: usize = NAME_FIELD_LEN - 1;

    /// Create a reference to `path`.
    pub fn with_path(path: &str) -> Result<Self> {
        let mut texture = Self::default();
        texture.set_path(path)?;
        Ok(texture)
    }

    /// A texture is valid once it has pixel dimensions.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Drop pixel data, optionally forgetting the path too.
    pub fn invalidate(&mut self, clear_path: bool) {
        self.width = 0;
        self.height = 0;
        self.data.clear();

        if clear_path {
            self.path.clear();
        }
    }

    /// Width in pixels, 0 before initialisation.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels, 0 before initialisation.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels, not bytes.
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Relative path of the image file.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Set the relative path. Paths longer than 15 bytes are rejected.
    pub fn set_path(&mut self, path: &str) -> Result<()> {
        if path.is_empty() || path.len() > Self::MAX_PATH_LEN {
            return Err(Error::InvalidPath {
                path: path.to_string(),
                max: Self::MAX_PATH_LEN,
            });
        }

        self.path = path.to_string();
        Ok(())
    }

    /// Check whether the path is non-empty and fits a name field.
    pub fn has_valid_path(&self) -> bool {
        !self.path.is_empty() && self.path.len() <= Self::MAX_PATH_LEN
    }

    /// Allocate an opaque black image of the given size.
    pub fn initialise(&mut self, width: u32, height: u32) -> Result<()> {
        self.invalidate(false);

        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }

        self.width = width;
        self.height = height;
        self.data = [0, 0, 0, 0xFF].repeat(self.area());
        Ok(())
    }

    /// RGBA bytes, or `None` before [`Self::initialise`].
    pub fn raw_data(&self) -> Option<&[u8]> {
        self.is_valid().then_some(self.data.as_slice())
    }

    /// The RGBA value of a pixel.
    pub fn pixel_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let start = self.pixel_start(x, y)?;
        let pixel = &self.data[start..start + 4];
        Some([pixel[0], pixel[1], pixel[2], pixel[3]])
    }

    /// Mutable RGBA bytes of a pixel.
    pub fn pixel_at_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8]> {
        let start = self.pixel_start(x, y)?;
        Some(&mut self.data[start..start + 4])
    }

    /// The 16-byte name field this reference exports as, if the path is valid.
    pub fn export_name(&self) -> Option<[u8; NAME_FIELD_LEN]> {
        self.has_valid_path()
            .then(|| *TextureName::new(&self.path).as_field())
    }

    fn pixel_start(&self, x: u32, y: u32) -> Option<usize> {
        if !self.is_valid() || x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_limits() {
        assert!(ExternalTexture::with_path("walls/brick").is_ok());
        assert!(ExternalTexture::with_path("").is_err());
        assert!(ExternalTexture::with_path("walls/brick_long").is_err());

        let mut texture = ExternalTexture::with_path("a").unwrap();
        assert!(texture.set_path("0123456789abcdefg").is_err());
        assert_eq!(texture.path(), "a");
    }

    #[test]
    fn test_initialise_opaque_black() {
        let mut texture = ExternalTexture::with_path("sky").unwrap();
        assert_eq!(texture.raw_data(), None);

        texture.initialise(4, 2).unwrap();
        assert_eq!(texture.area(), 8);
        assert_eq!(texture.raw_data().map(<[u8]>::len), Some(32));
        assert_eq!(texture.pixel_at(3, 1), Some([0, 0, 0, 0xFF]));
        assert_eq!(texture.pixel_at(4, 0), None);

        texture.pixel_at_mut(1, 1).unwrap()[0] = 200;
        assert_eq!(texture.pixel_at(1, 1), Some([200, 0, 0, 0xFF]));
        assert_eq!(texture.pixel_at(0, 1), Some([0, 0, 0, 0xFF]));
    }

    #[test]
    fn test_invalidate_keeps_path() {
        let mut texture = ExternalTexture::with_path("sky").unwrap();
        texture.initialise(2, 2).unwrap();
        texture.invalidate(false);
        assert!(!texture.is_valid());
        assert_eq!(texture.path(), "sky");

        texture.invalidate(true);
        assert!(!texture.has_valid_path());
        assert_eq!(texture.export_name(), None);
    }

    #[test]
    fn test_export_name() {
        let texture = ExternalTexture::with_path("trims/edge").unwrap();
        let field = texture.export_name().unwrap();
        assert_eq!(&field[..10], b"trims/edge");
        assert!(field[10..].iter().all(|&b| b == 0));
    }
}
