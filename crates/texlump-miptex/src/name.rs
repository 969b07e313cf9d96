//! Fixed-width texture names.

use std::borrow::Cow;
use std::fmt;

/// Size of the name field in a miptex record, terminator included.
pub const NAME_FIELD_LEN: usize = 16;

/// A texture name stored the way the lump stores it.
///
/// Up to 15 bytes followed by NUL padding. Bytes are kept exactly as given;
/// only comparisons through [`TextureName::eq_ignore_case`] fold case.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureName([u8; NAME_FIELD_LEN]);

impl TextureName {
    /// Longest name that still leaves room for the terminator.
    pub const MAX_LEN: usize = NAME_FIELD_LEN - 1;

    /// Build a name from bytes, truncating to [`Self::MAX_LEN`] and at the first NUL.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut field = [0u8; NAME_FIELD_LEN];
        let end = texlump_common::memchr::memchr(0, bytes)
            .unwrap_or(bytes.len())
            .min(Self::MAX_LEN);
        field[..end].copy_from_slice(&bytes[..end]);
        Self(field)
    }

    /// Build a name from a string, truncating like [`Self::from_bytes`].
    pub fn new(name: &str) -> Self {
        Self::from_bytes(name.as_bytes())
    }

    /// The visible bytes, without terminator or padding.
    pub fn as_bytes(&self) -> &[u8] {
        let end = texlump_common::memchr::memchr(0, &self.0).unwrap_or(Self::MAX_LEN);
        &self.0[..end]
    }

    /// The full padded field as written to disk.
    pub fn as_field(&self) -> &[u8; NAME_FIELD_LEN] {
        &self.0
    }

    /// Length of the visible part.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Check whether the name is empty.
    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }

    /// Byte at `index`, or `None` at and past the terminator.
    pub fn byte_at(&self, index: usize) -> Option<u8> {
        self.as_bytes().get(index).copied()
    }

    /// ASCII case-insensitive comparison.
    pub fn eq_ignore_case(&self, other: &TextureName) -> bool {
        self.as_bytes().eq_ignore_ascii_case(other.as_bytes())
    }

    /// The name as text, replacing invalid UTF-8.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }
}

impl fmt::Debug for TextureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextureName({:?})", self.to_string_lossy())
    }
}

impl fmt::Display for TextureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl From<&str> for TextureName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncates_to_fifteen() {
        let name = TextureName::new("abcdefghijklmnopqrst");
        assert_eq!(name.as_bytes(), b"abcdefghijklmno");
        assert_eq!(name.as_field()[15], 0);
    }

    #[test]
    fn test_stops_at_embedded_nul() {
        let name = TextureName::from_bytes(b"wall\0junk");
        assert_eq!(name.as_bytes(), b"wall");
        assert_eq!(name.len(), 4);
    }

    #[test]
    fn test_case_insensitive_match() {
        let a = TextureName::new("+0Wall");
        let b = TextureName::new("+0wALL");
        assert_ne!(a, b);
        assert!(a.eq_ignore_case(&b));
        assert!(!a.eq_ignore_case(&TextureName::new("+0wal")));
    }

    #[test]
    fn test_byte_at_stops_at_terminator() {
        let name = TextureName::new("+");
        assert_eq!(name.byte_at(0), Some(b'+'));
        assert_eq!(name.byte_at(1), None);
        assert!(TextureName::default().is_empty());
    }
}
