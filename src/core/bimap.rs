//! Bidirectional dictionary.
//!
//! Keeps two one-directional maps in lockstep so that both sides of every
//! pair can be looked up in constant time. Both sides are unique.

use std::collections::HashMap;
use std::hash::Hash;
use thiserror::Error;

/// Errors raised when an insertion would break the one-to-one mapping.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum BiMapError {
    #[error("left value is already mapped")]
    LeftExists,

    #[error("right value is already mapped")]
    RightExists,
}

/// One-to-one mapping between `L` and `R`.
///
/// # Example
///
/// ```rust
/// use statecraft::core::BiMap;
///
/// let mut map = BiMap::new();
/// map.insert("idle", 0u8).unwrap();
/// map.insert("walk", 1u8).unwrap();
///
/// assert_eq!(map.get_by_left(&"walk"), Some(&1));
/// assert_eq!(map.get_by_right(&0), Some(&"idle"));
/// assert!(map.insert("run", 1).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct BiMap<L, R> {
    forward: HashMap<L, R>,
    backward: HashMap<R, L>,
}

impl<L, R> Default for BiMap<L, R> {
    fn default() -> Self {
        Self {
            forward: HashMap::new(),
            backward: HashMap::new(),
        }
    }
}

impl<L, R> BiMap<L, R>
where
    L: Eq + Hash + Clone,
    R: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair. Fails without modifying the map if either side is
    /// already present.
    pub fn insert(&mut self, left: L, right: R) -> Result<(), BiMapError> {
        if self.forward.contains_key(&left) {
            return Err(BiMapError::LeftExists);
        }
        if self.backward.contains_key(&right) {
            return Err(BiMapError::RightExists);
        }
        self.forward.insert(left.clone(), right.clone());
        self.backward.insert(right, left);
        Ok(())
    }

    pub fn get_by_left(&self, left: &L) -> Option<&R> {
        self.forward.get(left)
    }

    pub fn get_by_right(&self, right: &R) -> Option<&L> {
        self.backward.get(right)
    }

    pub fn contains_left(&self, left: &L) -> bool {
        self.forward.contains_key(left)
    }

    pub fn contains_right(&self, right: &R) -> bool {
        self.backward.contains_key(right)
    }

    /// Remove a pair by its left value, returning the right value.
    pub fn remove_by_left(&mut self, left: &L) -> Option<R> {
        let right = self.forward.remove(left)?;
        self.backward.remove(&right);
        Some(right)
    }

    /// Remove a pair by its right value, returning the left value.
    pub fn remove_by_right(&mut self, right: &R) -> Option<L> {
        let left = self.backward.remove(right)?;
        self.forward.remove(&left);
        Some(left)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn clear(&mut self) {
        self.forward.clear();
        self.backward.clear();
    }

    /// Iterate over all pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&L, &R)> {
        self.forward.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_maps_both_directions() {
        let mut map = BiMap::new();
        map.insert("a", 1).unwrap();
        map.insert("b", 2).unwrap();

        assert_eq!(map.get_by_left(&"a"), Some(&1));
        assert_eq!(map.get_by_right(&2), Some(&"b"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn duplicate_left_is_rejected() {
        let mut map = BiMap::new();
        map.insert("a", 1).unwrap();

        assert_eq!(map.insert("a", 2), Err(BiMapError::LeftExists));
        assert!(!map.contains_right(&2));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn duplicate_right_is_rejected() {
        let mut map = BiMap::new();
        map.insert("a", 1).unwrap();

        assert_eq!(map.insert("b", 1), Err(BiMapError::RightExists));
        assert!(!map.contains_left(&"b"));
        assert_eq!(map.get_by_right(&1), Some(&"a"));
    }

    #[test]
    fn removal_keeps_sides_in_sync() {
        let mut map = BiMap::new();
        map.insert("a", 1).unwrap();
        map.insert("b", 2).unwrap();

        assert_eq!(map.remove_by_left(&"a"), Some(1));
        assert!(!map.contains_right(&1));

        assert_eq!(map.remove_by_right(&2), Some("b"));
        assert!(!map.contains_left(&"b"));
        assert!(map.is_empty());
    }

    #[test]
    fn removed_values_can_be_reused() {
        let mut map = BiMap::new();
        map.insert("a", 1).unwrap();
        map.remove_by_left(&"a");

        assert!(map.insert("b", 1).is_ok());
        assert_eq!(map.get_by_right(&1), Some(&"b"));
    }

    #[test]
    fn clear_empties_both_sides() {
        let mut map = BiMap::new();
        map.insert(1u8, 'x').unwrap();
        map.clear();

        assert!(map.is_empty());
        assert!(map.get_by_right(&'x').is_none());
    }
}
