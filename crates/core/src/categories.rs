//! Category Sets
//!
//! Sorted, de-duplicated category names attached to products and consulted by
//! coupon conditions.

use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

/// A small sorted set of category names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySet {
    names: SmallVec<[String; 4]>,
}

impl CategorySet {
    /// Create a set from owned names.
    #[must_use]
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        let mut names: SmallVec<[String; 4]> = names.into_iter().collect();

        names.sort();
        names.dedup();

        Self { names }
    }

    /// Create a set from string slices.
    pub fn from_strs(names: &[&str]) -> Self {
        Self::new(names.iter().map(ToString::to_string))
    }

    /// Whether the set holds the given category.
    pub fn contains(&self, name: &str) -> bool {
        self.names
            .binary_search_by(|probe| probe.as_str().cmp(name))
            .is_ok()
    }

    /// Whether both sets share at least one category.
    pub fn intersects(&self, other: &Self) -> bool {
        let mut left = self.names.iter();
        let mut right = other.names.iter();
        let mut left_name = left.next();
        let mut right_name = right.next();

        while let (Some(l), Some(r)) = (left_name, right_name) {
            match l.cmp(r) {
                Ordering::Equal => return true,
                Ordering::Less => left_name = left.next(),
                Ordering::Greater => right_name = right.next(),
            }
        }

        false
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate category names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Owned copy of the names, for storage.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.names.to_vec()
    }
}

impl FromIterator<String> for CategorySet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl Serialize for CategorySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.names.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CategorySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<String>::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sorts_and_dedups() {
        let set = CategorySet::from_strs(&["shoes", "apparel", "shoes"]);

        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), ["apparel", "shoes"]);
    }

    #[test]
    fn contains_uses_sorted_lookup() {
        let set = CategorySet::from_strs(&["outdoor", "camping", "tents"]);

        assert!(set.contains("camping"));
        assert!(!set.contains("kitchen"));
    }

    #[test]
    fn intersects_when_any_name_is_shared() {
        let left = CategorySet::from_strs(&["audio", "sale"]);
        let right = CategorySet::from_strs(&["clearance", "sale"]);
        let other = CategorySet::from_strs(&["garden"]);

        assert!(left.intersects(&right));
        assert!(!left.intersects(&other));
        assert!(!left.intersects(&CategorySet::default()));
    }
}
