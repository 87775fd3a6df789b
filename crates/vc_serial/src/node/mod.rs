//! Document tree: the engine's input and output format.
//!
//! A [`DataNode`] is one of three shapes:
//!
//! - [`ScalarNode`]: plain text, interpreted only by codecs.
//! - [`SequenceNode`]: ordered list of nodes.
//! - [`MappingNode`]: ordered key/value pairs with structurally unique keys
//!   and O(1) lookup by tag.
//!
//! Trees are produced by an external parser. The `serde` bridge in this
//! module lets any `serde` format stand in for that parser:
//!
//! ```
//! use vc_serial::node::DataNode;
//!
//! let node: DataNode = serde_json::from_str(r#"{ "amount": 3, "tags": ["a", "b"] }"#).unwrap();
//! let mapping = node.as_mapping().unwrap();
//! assert_eq!(mapping.get("amount").unwrap().as_scalar().unwrap().value(), "3");
//! assert_eq!(mapping.get("tags").unwrap().as_sequence().unwrap().len(), 2);
//! ```

use core::fmt;
use core::hash::{Hash, Hasher};

// -----------------------------------------------------------------------------
// Modules

mod mapping;
mod scalar;
mod sequence;
mod serde;

// -----------------------------------------------------------------------------
// Exports

pub use mapping::{MappingNode, TagKey};
pub use scalar::ScalarNode;
pub use sequence::SequenceNode;

// -----------------------------------------------------------------------------
// NodeKind

/// The shape of a [`DataNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Scalar,
    Sequence,
    Mapping,
}

impl NodeKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -----------------------------------------------------------------------------
// DataNode

/// A node of the document tree.
///
/// Equality is structural. Mapping equality ignores entry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataNode {
    Scalar(ScalarNode),
    Sequence(SequenceNode),
    Mapping(MappingNode),
}

impl DataNode {
    /// Creates a scalar node.
    #[inline]
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(ScalarNode::new(value))
    }

    /// Creates the scalar `null`.
    #[inline]
    pub fn null() -> Self {
        Self::Scalar(ScalarNode::null())
    }

    #[inline]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Scalar(_) => NodeKind::Scalar,
            Self::Sequence(_) => NodeKind::Sequence,
            Self::Mapping(_) => NodeKind::Mapping,
        }
    }

    /// Returns `true` for the scalars `null` and `~`.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(scalar) if scalar.is_null())
    }

    #[inline]
    pub const fn as_scalar(&self) -> Option<&ScalarNode> {
        match self {
            Self::Scalar(node) => Some(node),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_sequence(&self) -> Option<&SequenceNode> {
        match self {
            Self::Sequence(node) => Some(node),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_mapping(&self) -> Option<&MappingNode> {
        match self {
            Self::Mapping(node) => Some(node),
            _ => None,
        }
    }

    #[inline]
    pub fn into_mapping(self) -> Option<MappingNode> {
        match self {
            Self::Mapping(node) => Some(node),
            _ => None,
        }
    }
}

impl Hash for DataNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Scalar(node) => node.hash(state),
            Self::Sequence(node) => node.hash(state),
            Self::Mapping(node) => node.hash(state),
        }
    }
}

impl fmt::Display for DataNode {
    /// Short form for diagnostics: scalar text, or the shape and size.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(node) => write!(f, "{:?}", node.value()),
            Self::Sequence(node) => write!(f, "<sequence of {}>", node.len()),
            Self::Mapping(node) => write!(f, "<mapping of {}>", node.len()),
        }
    }
}

impl From<ScalarNode> for DataNode {
    #[inline]
    fn from(value: ScalarNode) -> Self {
        Self::Scalar(value)
    }
}

impl From<SequenceNode> for DataNode {
    #[inline]
    fn from(value: SequenceNode) -> Self {
        Self::Sequence(value)
    }
}

impl From<MappingNode> for DataNode {
    #[inline]
    fn from(value: MappingNode) -> Self {
        Self::Mapping(value)
    }
}

impl From<&str> for DataNode {
    #[inline]
    fn from(value: &str) -> Self {
        Self::scalar(value)
    }
}

impl From<String> for DataNode {
    #[inline]
    fn from(value: String) -> Self {
        Self::scalar(value)
    }
}

#[cfg(test)]
mod tests {
    use core::hash::BuildHasher;

    use super::{DataNode, MappingNode, NodeKind, SequenceNode};
    use crate::utils::StableHashState;

    #[test]
    fn kinds_and_accessors() {
        let scalar = DataNode::scalar("1");
        assert_eq!(scalar.kind(), NodeKind::Scalar);
        assert!(scalar.as_mapping().is_none());

        let seq = DataNode::from(SequenceNode::from_iter(["a", "b"]));
        assert_eq!(seq.kind(), NodeKind::Sequence);
        assert_eq!(seq.as_sequence().unwrap().len(), 2);

        assert!(DataNode::scalar("~").is_null());
        assert!(DataNode::null().is_null());
        assert!(!DataNode::scalar("nil").is_null());
    }

    #[test]
    fn mapping_equality_ignores_order() {
        let a = MappingNode::from_iter([("x", "1"), ("y", "2")]);
        let b = MappingNode::from_iter([("y", "2"), ("x", "1")]);
        assert_eq!(a, b);

        let (a, b) = (DataNode::from(a), DataNode::from(b));
        assert_eq!(StableHashState.hash_one(&a), StableHashState.hash_one(&b));
    }

    #[test]
    fn serde_json_bridge() {
        let node: DataNode =
            serde_json::from_str(r#"{ "n": 1.5, "flag": true, "none": null, "list": [1, "two"] }"#)
                .unwrap();
        let map = node.as_mapping().unwrap();
        assert_eq!(map.get("n"), Some(&DataNode::scalar("1.5")));
        assert_eq!(map.get("flag"), Some(&DataNode::scalar("true")));
        assert!(map.get("none").unwrap().is_null());

        let list = map.get("list").unwrap().as_sequence().unwrap();
        assert_eq!(list.get(0), Some(&DataNode::scalar("1")));
        assert_eq!(list.get(1), Some(&DataNode::scalar("two")));

        let text = serde_json::to_string(&DataNode::from(MappingNode::from_iter([("k", "v")])))
            .unwrap();
        assert_eq!(text, r#"{"k":"v"}"#);
    }

    #[test]
    fn ron_bridge() {
        let node: DataNode = ron::from_str(r#"{ "name": "crate", "size": 3 }"#).unwrap();
        let map = node.as_mapping().unwrap();
        assert_eq!(map.get("name"), Some(&DataNode::scalar("crate")));
        assert_eq!(map.get("size"), Some(&DataNode::scalar("3")));
    }
}
