//! Old-index to new-index maps produced by compaction.

use crate::{Error, Result};

/// Maps each original texture index to its index after compaction, or to removed.
///
/// Retained entries always occupy `0..retained_count()` exactly once each,
/// so the new index space has no gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexRemap {
    targets: Vec<Option<usize>>,
    retained: usize,
}

impl IndexRemap {
    /// Build a remap, checking that the targets form a gapless index space.
    pub fn new(targets: Vec<Option<usize>>) -> Result<Self> {
        let retained = targets.iter().flatten().count();
        let mut seen = vec![false; retained];

        for (old, target) in targets.iter().enumerate() {
            let Some(new) = *target else {
                continue;
            };

            match seen.get_mut(new) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(Error::InvalidRemap(format!(
                        "index {old} maps to {new}, which is already taken"
                    )))
                }
                None => {
                    return Err(Error::InvalidRemap(format!(
                        "index {old} maps to {new}, past the {retained} retained entries"
                    )))
                }
            }
        }

        Ok(Self { targets, retained })
    }

    /// Keep every index in place.
    pub fn identity(len: usize) -> Self {
        Self {
            targets: (0..len).map(Some).collect(),
            retained: len,
        }
    }

    /// Remove every index.
    pub fn remove_all(len: usize) -> Self {
        Self {
            targets: vec![None; len],
            retained: 0,
        }
    }

    /// Build the order-preserving remap that keeps the flagged indices.
    pub fn from_keep_flags(keep: &[bool]) -> Self {
        let mut next = 0;
        let targets = keep
            .iter()
            .map(|&kept| {
                kept.then(|| {
                    next += 1;
                    next - 1
                })
            })
            .collect();

        Self {
            targets,
            retained: next,
        }
    }

    /// Number of original indices.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Number of indices that survive.
    pub fn retained_count(&self) -> usize {
        self.retained
    }

    /// Number of indices that are dropped.
    pub fn removed_count(&self) -> usize {
        self.targets.len() - self.retained
    }

    /// New index for an original index, `None` if removed or out of range.
    pub fn get(&self, old: usize) -> Option<usize> {
        self.targets.get(old).copied().flatten()
    }

    /// Whether an original index was dropped.
    pub fn is_removed(&self, old: usize) -> bool {
        self.get(old).is_none()
    }

    /// `(old, new)` pairs in original order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<usize>)> + '_ {
        self.targets.iter().copied().enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_permutation() {
        let remap = IndexRemap::new(vec![Some(1), None, Some(0)]).unwrap();
        assert_eq!(remap.retained_count(), 2);
        assert_eq!(remap.removed_count(), 1);
        assert_eq!(remap.get(0), Some(1));
        assert!(remap.is_removed(1));
        assert!(remap.is_removed(7));
    }

    #[test]
    fn test_rejects_duplicate_target() {
        assert!(matches!(
            IndexRemap::new(vec![Some(0), Some(0)]),
            Err(Error::InvalidRemap(_))
        ));
    }

    #[test]
    fn test_rejects_gap() {
        assert!(IndexRemap::new(vec![Some(0), Some(2), None]).is_err());
    }

    #[test]
    fn test_keep_flags_preserve_order() {
        let remap = IndexRemap::from_keep_flags(&[false, true, true, false, true]);
        let pairs: Vec<_> = remap.iter().collect();
        assert_eq!(
            pairs,
            vec![(0, None), (1, Some(0)), (2, Some(1)), (3, None), (4, Some(2))]
        );
    }

    #[test]
    fn test_identity_and_remove_all() {
        assert_eq!(IndexRemap::identity(3).retained_count(), 3);
        let gone = IndexRemap::remove_all(3);
        assert_eq!(gone.retained_count(), 0);
        assert_eq!(gone.len(), 3);
        assert!((0..3).all(|i| gone.is_removed(i)));
    }
}
