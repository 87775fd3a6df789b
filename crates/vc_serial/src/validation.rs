//! Validation trees.
//!
//! Validation never fails. Every problem becomes an [`ErrorNode`] placed at
//! the offending node, so one pass reports all of them.

use alloc::borrow::Cow;
use core::fmt;

use crate::node::DataNode;

// -----------------------------------------------------------------------------
// ErrorNode

/// A node that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNode {
    pub node: DataNode,
    pub message: Cow<'static, str>,
    /// A fatal error makes the document unreadable; a non-fatal one is
    /// reported but would be ignored on read.
    pub fatal: bool,
}

impl fmt::Display for ErrorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at `{}`", self.message, self.node)
    }
}

// -----------------------------------------------------------------------------
// ValidationNode

/// The outcome of validating a node, mirroring its shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationNode {
    /// The node is valid.
    Validated(DataNode),
    /// The node is invalid.
    Error(ErrorNode),
    /// The node was not checked, e.g. the value under an unknown key.
    Inconclusive(DataNode),
    /// Per-item results of a sequence.
    Sequence(Vec<ValidationNode>),
    /// Per-entry key and value results of a mapping.
    Mapping(Vec<(ValidationNode, ValidationNode)>),
}

impl ValidationNode {
    /// A fatal error at `node`.
    #[inline]
    pub fn error(node: DataNode, message: impl Into<Cow<'static, str>>) -> Self {
        Self::Error(ErrorNode {
            node,
            message: message.into(),
            fatal: true,
        })
    }

    /// A non-fatal error at `node`.
    #[inline]
    pub fn warning(node: DataNode, message: impl Into<Cow<'static, str>>) -> Self {
        Self::Error(ErrorNode {
            node,
            message: message.into(),
            fatal: false,
        })
    }

    /// Whether the tree holds no error at any depth.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Validated(_) | Self::Inconclusive(_) => true,
            Self::Error(_) => false,
            Self::Sequence(items) => items.iter().all(Self::is_valid),
            Self::Mapping(entries) => entries
                .iter()
                .all(|(key, value)| key.is_valid() && value.is_valid()),
        }
    }

    /// Whether the tree holds a fatal error at any depth.
    pub fn has_fatal_errors(&self) -> bool {
        self.errors().iter().any(|error| error.fatal)
    }

    /// Every error in the tree, in document order.
    pub fn errors(&self) -> Vec<&ErrorNode> {
        let mut errors = Vec::new();
        self.collect_errors(&mut errors);
        errors
    }

    fn collect_errors<'a>(&'a self, out: &mut Vec<&'a ErrorNode>) {
        match self {
            Self::Validated(_) | Self::Inconclusive(_) => {}
            Self::Error(error) => out.push(error),
            Self::Sequence(items) => {
                for item in items {
                    item.collect_errors(out);
                }
            }
            Self::Mapping(entries) => {
                for (key, value) in entries {
                    key.collect_errors(out);
                    value.collect_errors(out);
                }
            }
        }
    }

    /// The validated node.
    ///
    /// `None` for [`ValidationNode::Sequence`] and [`ValidationNode::Mapping`],
    /// whose nodes live in their children.
    pub fn node(&self) -> Option<&DataNode> {
        match self {
            Self::Validated(node) | Self::Inconclusive(node) => Some(node),
            Self::Error(error) => Some(&error.node),
            Self::Sequence(_) | Self::Mapping(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ValidationNode;
    use crate::node::DataNode;

    #[test]
    fn errors_are_collected_in_order() {
        let tree = ValidationNode::Mapping(vec![
            (
                ValidationNode::warning(DataNode::scalar("colour"), "unknown"),
                ValidationNode::Inconclusive(DataNode::scalar("red")),
            ),
            (
                ValidationNode::Validated(DataNode::scalar("items")),
                ValidationNode::Sequence(vec![
                    ValidationNode::Validated(DataNode::scalar("1")),
                    ValidationNode::error(DataNode::scalar("x"), "not a number"),
                ]),
            ),
        ]);

        assert!(!tree.is_valid());
        assert!(tree.has_fatal_errors());
        let messages: Vec<_> = tree.errors().iter().map(|e| e.message.as_ref()).collect();
        assert_eq!(messages, ["unknown", "not a number"]);
        assert_eq!(tree.errors()[1].to_string(), "not a number at `\"x\"`");
    }

    #[test]
    fn inconclusive_is_not_an_error() {
        let node = ValidationNode::Inconclusive(DataNode::null());
        assert!(node.is_valid());
        assert!(node.errors().is_empty());
        assert_eq!(node.node(), Some(&DataNode::null()));
    }
}
