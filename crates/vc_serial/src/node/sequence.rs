use core::hash::{Hash, Hasher};
use core::slice;

use super::DataNode;

/// An ordered list of nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceNode {
    items: Vec<DataNode>,
}

impl SequenceNode {
    #[inline]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn push(&mut self, node: impl Into<DataNode>) {
        self.items.push(node.into());
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&DataNode> {
        self.items.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, DataNode> {
        self.items.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[DataNode] {
        &self.items
    }
}

impl Hash for SequenceNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(1);
        self.items.hash(state);
    }
}

impl From<Vec<DataNode>> for SequenceNode {
    #[inline]
    fn from(items: Vec<DataNode>) -> Self {
        Self { items }
    }
}

impl<N: Into<DataNode>> FromIterator<N> for SequenceNode {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl IntoIterator for SequenceNode {
    type Item = DataNode;
    type IntoIter = alloc::vec::IntoIter<DataNode>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a SequenceNode {
    type Item = &'a DataNode;
    type IntoIter = slice::Iter<'a, DataNode>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
