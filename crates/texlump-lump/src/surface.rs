//! Surface descriptors that bind geometry to textures.

/// Anything that refers to a texture by collection index.
///
/// The reduction pass reads these indices to find which textures are in use
/// and rewrites them once textures have been compacted.
pub trait TextureBinding {
    fn texture_index(&self) -> i32;
    fn set_texture_index(&mut self, index: i32);
}

/// A texinfo record: texture projection vectors plus a texture index.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TexInfo {
    /// S and T projection vectors, each `[x, y, z, offset]`.
    pub vecs: [[f32; 4]; 2],
    /// Index of the texture in the lump.
    pub miptex: i32,
    pub flags: i32,
}

impl TexInfo {
    /// A texinfo with zero projection vectors bound to `miptex`.
    pub fn new(miptex: i32) -> Self {
        Self {
            miptex,
            ..Self::default()
        }
    }
}

impl TextureBinding for TexInfo {
    fn texture_index(&self) -> i32 {
        self.miptex
    }

    fn set_texture_index(&mut self, index: i32) {
        self.miptex = index;
    }
}
