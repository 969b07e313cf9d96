//! Names of external texture files and the indices handed out for them.

use std::hash::BuildHasherDefault;
use std::ops::Range;

use hashbrown::HashMap as FastHashMap;
use parking_lot::Mutex;
use rustc_hash::FxHasher;
use texlump_miptex::ExternalTexture;
use tracing::{debug, warn};

use crate::collection::{TextureCollection, TextureEntry};

type FxHashMap<K, V> = FastHashMap<K, V, BuildHasherDefault<FxHasher>>;

#[derive(Debug, Clone)]
struct ListedTexture {
    /// Path as it was listed, before case folding.
    path: String,
    ref_count: u32,
    index: Option<u32>,
}

/// Relative paths of the available external textures with reference counts.
///
/// Lookups fold ASCII case, so `Walls/Brick.png` and `walls/brick.png` are
/// the same texture.
#[derive(Debug, Clone, Default)]
pub struct TextureListing {
    textures: FxHashMap<String, ListedTexture>,
    next_index: u32,
}

impl TextureListing {
    /// Create an empty listing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a listing from already discovered relative paths.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let mut listing = Self::new();
        for path in paths {
            listing.insert(path.as_ref());
        }
        listing
    }

    fn key(path: &str) -> String {
        path.to_ascii_lowercase()
    }

    /// Add a texture with no references. Returns false if it was already listed.
    pub fn insert(&mut self, path: &str) -> bool {
        let key = Self::key(path);
        if self.textures.contains_key(&key) {
            return false;
        }

        self.textures.insert(
            key,
            ListedTexture {
                path: path.to_string(),
                ref_count: 0,
                index: None,
            },
        );
        true
    }

    /// Check whether a texture is listed.
    pub fn contains(&self, path: &str) -> bool {
        self.textures.contains_key(&Self::key(path))
    }

    /// References recorded for a texture, 0 if it is not listed.
    pub fn ref_count(&self, path: &str) -> u32 {
        self.textures
            .get(&Self::key(path))
            .map_or(0, |texture| texture.ref_count)
    }

    /// Check whether a texture has at least one reference.
    pub fn is_referenced(&self, path: &str) -> bool {
        self.ref_count(path) > 0
    }

    /// Add a reference, saturating. Returns false if the texture is not listed.
    pub fn increment_ref_count(&mut self, path: &str) -> bool {
        match self.textures.get_mut(&Self::key(path)) {
            Some(texture) => {
                texture.ref_count = texture.ref_count.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Drop a reference, stopping at zero. Returns false if the texture is not listed.
    pub fn decrement_ref_count(&mut self, path: &str) -> bool {
        match self.textures.get_mut(&Self::key(path)) {
            Some(texture) => {
                texture.ref_count = texture.ref_count.saturating_sub(1);
                true
            }
            None => false,
        }
    }

    /// Every listed path, sorted.
    pub fn texture_list(&self) -> Vec<String> {
        let mut list: Vec<String> = self
            .textures
            .values()
            .map(|texture| texture.path.clone())
            .collect();
        list.sort_unstable();
        list
    }

    /// Number of listed textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Forget every texture and every assigned index.
    pub fn clear(&mut self) {
        self.textures.clear();
        self.next_index = 0;
    }

    /// Index for a listed texture, handing out the next free one on first use.
    ///
    /// Each call counts as a reference. Returns `None` for unlisted textures.
    pub fn assign_next_index(&mut self, path: &str) -> Option<u32> {
        let texture = self.textures.get_mut(&Self::key(path))?;
        texture.ref_count = texture.ref_count.saturating_add(1);

        if let Some(index) = texture.index {
            return Some(index);
        }

        let index = self.next_index;
        texture.index = Some(index);
        self.next_index += 1;
        debug!(texture = %texture.path, index, "assigned external texture index");
        Some(index)
    }

    /// Index assigned to a texture, if any.
    pub fn index_of(&self, path: &str) -> Option<u32> {
        self.textures.get(&Self::key(path))?.index
    }

    /// Paths that have an index, in index order.
    pub fn assigned(&self) -> Vec<&str> {
        let mut assigned: Vec<(u32, &str)> = self
            .textures
            .values()
            .filter_map(|texture| Some((texture.index?, texture.path.as_str())))
            .collect();
        assigned.sort_unstable_by_key(|(index, _)| *index);
        assigned.into_iter().map(|(_, path)| path).collect()
    }
}

/// A [`TextureListing`] shared between compile threads.
///
/// Lookup and assignment happen in one critical section, so two threads
/// asking for the same texture always get the same index.
#[derive(Debug, Default)]
pub struct TextureRegistry {
    listing: Mutex<TextureListing>,
}

impl TextureRegistry {
    /// Share a listing between threads.
    pub fn new(listing: TextureListing) -> Self {
        Self {
            listing: Mutex::new(listing),
        }
    }

    /// Index for `name`, assigning one if this is its first use.
    pub fn find_or_assign(&self, name: &str) -> Option<u32> {
        self.listing.lock().assign_next_index(name)
    }

    /// Run `f` with exclusive access to the listing.
    pub fn with_listing<R>(&self, f: impl FnOnce(&mut TextureListing) -> R) -> R {
        f(&mut self.listing.lock())
    }

    /// Take the listing back once all threads are done.
    pub fn into_listing(self) -> TextureListing {
        self.listing.into_inner()
    }

    /// Append one external reference per assigned texture, in index order.
    ///
    /// Returns the collection range the new entries occupy. Paths too long
    /// for a texture name still get an entry, left without a path.
    pub fn append_external_references(&self, collection: &mut TextureCollection) -> Range<usize> {
        let listing = self.listing.lock();
        let start = collection.len();

        for path in listing.assigned() {
            let texture = match ExternalTexture::with_path(path) {
                Ok(texture) => texture,
                Err(err) => {
                    warn!(texture = path, %err, "external texture path cannot be stored");
                    ExternalTexture::default()
                }
            };
            collection.push(TextureEntry::External(texture));
        }

        start..collection.len()
    }
}
