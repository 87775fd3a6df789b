use core::hash::{BuildHasher, Hash, Hasher};

use indexmap::{Equivalent, IndexMap};

use super::DataNode;
use crate::utils::StableHashState;

// -----------------------------------------------------------------------------
// TagKey

/// Borrowed lookup key matching a scalar node with the same text.
///
/// Lets [`MappingNode::get`] look up `&str` tags without building a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagKey<'a>(pub &'a str);

// Must agree with `ScalarNode::hash`.
impl Hash for TagKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(0);
        self.0.hash(state);
    }
}

impl Equivalent<DataNode> for TagKey<'_> {
    #[inline]
    fn equivalent(&self, key: &DataNode) -> bool {
        matches!(key, DataNode::Scalar(scalar) if scalar.value() == self.0)
    }
}

// -----------------------------------------------------------------------------
// MappingNode

/// Ordered key/value pairs with structurally unique keys.
///
/// Insertion order is kept for output; equality ignores it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingNode {
    entries: IndexMap<DataNode, DataNode, StableHashState>,
}

impl MappingNode {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity_and_hasher(capacity, StableHashState),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if a scalar key with this text exists.
    #[inline]
    pub fn has(&self, tag: &str) -> bool {
        self.entries.contains_key(&TagKey(tag))
    }

    /// Looks up the value stored under the scalar key `tag`.
    #[inline]
    pub fn get(&self, tag: &str) -> Option<&DataNode> {
        self.entries.get(&TagKey(tag))
    }

    /// Looks up a value by an arbitrary key node.
    #[inline]
    pub fn get_node(&self, key: &DataNode) -> Option<&DataNode> {
        self.entries.get(key)
    }

    /// Inserts or replaces an entry, returning the previous value.
    ///
    /// A replaced key keeps its original position.
    #[inline]
    pub fn insert(&mut self, key: impl Into<DataNode>, value: impl Into<DataNode>) -> Option<DataNode> {
        self.entries.insert(key.into(), value.into())
    }

    /// Removes the entry under `tag`, keeping the order of the rest.
    #[inline]
    pub fn remove(&mut self, tag: &str) -> Option<DataNode> {
        self.entries.shift_remove(&TagKey(tag))
    }

    /// Inserts every entry of `other`, replacing values under equal keys.
    pub fn splice(&mut self, other: MappingNode) {
        self.entries.reserve(other.len());
        for (key, value) in other.entries {
            self.entries.insert(key, value);
        }
    }

    #[inline]
    pub fn iter(&self) -> indexmap::map::Iter<'_, DataNode, DataNode> {
        self.entries.iter()
    }

    #[inline]
    pub fn keys(&self) -> indexmap::map::Keys<'_, DataNode, DataNode> {
        self.entries.keys()
    }
}

// Order-independent, matching `PartialEq`.
impl Hash for MappingNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let sum = self.entries.iter().fold(0_u64, |acc, entry| {
            acc.wrapping_add(StableHashState.hash_one(entry))
        });
        state.write_u8(2);
        state.write_usize(self.entries.len());
        state.write_u64(sum);
    }
}

impl<K: Into<DataNode>, V: Into<DataNode>> FromIterator<(K, V)> for MappingNode {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut mapping = Self::with_capacity(iter.size_hint().0);
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}

impl IntoIterator for MappingNode {
    type Item = (DataNode, DataNode);
    type IntoIter = indexmap::map::IntoIter<DataNode, DataNode>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a MappingNode {
    type Item = (&'a DataNode, &'a DataNode);
    type IntoIter = indexmap::map::Iter<'a, DataNode, DataNode>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::MappingNode;
    use crate::node::{DataNode, SequenceNode};

    #[test]
    fn lookup_by_tag() {
        let mut map = MappingNode::new();
        map.insert("health", "100");
        map.insert(SequenceNode::from_iter(["x"]), "weird key");

        assert!(map.has("health"));
        assert!(!map.has("x"));
        assert_eq!(map.get("health"), Some(&DataNode::scalar("100")));
        assert_eq!(
            map.get_node(&SequenceNode::from_iter(["x"]).into()),
            Some(&DataNode::scalar("weird key"))
        );
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut map = MappingNode::from_iter([("a", "1"), ("b", "2")]);
        let old = map.insert("a", "3");
        assert_eq!(old, Some(DataNode::scalar("1")));
        assert_eq!(map.len(), 2);
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, [DataNode::scalar("a"), DataNode::scalar("b")]);
    }

    #[test]
    fn splice_overrides() {
        let mut map = MappingNode::from_iter([("a", "1"), ("b", "2")]);
        map.splice(MappingNode::from_iter([("b", "9"), ("c", "3")]));
        assert_eq!(map, MappingNode::from_iter([("a", "1"), ("b", "9"), ("c", "3")]));
    }

    #[test]
    fn remove_keeps_order() {
        let mut map = MappingNode::from_iter([("type", "A"), ("x", "1"), ("y", "2")]);
        assert_eq!(map.remove("type"), Some(DataNode::scalar("A")));
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, [DataNode::scalar("x"), DataNode::scalar("y")]);
    }
}
