//! Error types.
//!
//! - [`SchemaError`]: a type's definition is unusable. Cached per type.
//! - [`DecodeError`]: a document could not be read.
//! - [`EncodeError`]: a value could not be written.
//! - [`CopyError`]: a value could not be copied.
//! - [`MergeError`]: two result trees cannot be merged.
//!
//! Validation findings are not errors; see [`ValidationNode`](crate::validation::ValidationNode).

use alloc::borrow::Cow;

use thiserror::Error;

use crate::node::NodeKind;

// -----------------------------------------------------------------------------
// ValueMismatch

/// An erased value did not have the expected concrete type.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("expected a value of type `{expected}`, found `{found}`")]
pub struct ValueMismatch {
    pub expected: &'static str,
    pub found: &'static str,
}

impl ValueMismatch {
    #[inline]
    pub const fn new(expected: &'static str, found: &'static str) -> Self {
        Self { expected, found }
    }
}

// -----------------------------------------------------------------------------
// SchemaError

/// A type's data definition cannot be turned into a schema.
///
/// Raised at schema-build time and cached: every later request for the
/// same type returns the same error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    #[error("type `{type_path}` declares duplicate tags: {}", .tags.join(", "))]
    DuplicateTags {
        type_path: &'static str,
        tags: Vec<String>,
    },
    #[error("custom codec `{codec}` on field `{field}` of `{type_path}` has no capability")]
    NoCodecCapability {
        type_path: &'static str,
        field: &'static str,
        codec: &'static str,
    },
    #[error("field `{field}` of `{type_path}` has no getter")]
    MissingGetter {
        type_path: &'static str,
        field: &'static str,
    },
    #[error("field `{field}` of `{type_path}` is writable but has no mutable accessor")]
    MissingSetter {
        type_path: &'static str,
        field: &'static str,
    },
}

// -----------------------------------------------------------------------------
// DecodeError

/// A document node could not be read into a value.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("required field `{tag}` of `{type_path}` is missing")]
    MissingRequiredField {
        type_path: &'static str,
        tag: String,
    },
    #[error("`{type_path}` cannot be read from a {kind} node")]
    UnsupportedShape {
        type_path: &'static str,
        kind: NodeKind,
    },
    #[error("cannot parse {text:?} as `{type_path}`: {reason}")]
    Parse {
        type_path: &'static str,
        text: String,
        reason: String,
    },
    #[error("component entry has no `type` key")]
    MissingComponentType,
    #[error("unknown component kind `{0}`")]
    UnknownComponent(String),
    #[error("component kind `{0}` appears twice")]
    DuplicateComponent(String),
    #[error(transparent)]
    TypeMismatch(#[from] ValueMismatch),
    #[error("in field `{tag}` of `{type_path}`: {source}")]
    Field {
        type_path: &'static str,
        tag: String,
        source: Box<DecodeError>,
    },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("{0}")]
    Custom(Cow<'static, str>),
}

impl DecodeError {
    #[inline]
    pub fn custom(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Custom(message.into())
    }

    #[inline]
    pub fn parse(type_path: &'static str, text: &str, reason: impl ToString) -> Self {
        Self::Parse {
            type_path,
            text: text.into(),
            reason: reason.to_string(),
        }
    }

    /// Wraps `self` with the field it was raised in.
    #[inline]
    pub fn in_field(self, type_path: &'static str, tag: &str) -> Self {
        Self::Field {
            type_path,
            tag: tag.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, past any [`DecodeError::Field`] wrappers.
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

// -----------------------------------------------------------------------------
// EncodeError

/// A value could not be written to a document node.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum EncodeError {
    #[error("`{type_path}` has no writer")]
    Unsupported { type_path: &'static str },
    #[error("included field `{field}` of `{type_path}` did not write a mapping")]
    IncludeNotMapping {
        type_path: &'static str,
        field: &'static str,
    },
    #[error(transparent)]
    TypeMismatch(#[from] ValueMismatch),
    #[error("in field `{field}` of `{type_path}`: {source}")]
    Field {
        type_path: &'static str,
        field: &'static str,
        source: Box<EncodeError>,
    },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("{0}")]
    Custom(Cow<'static, str>),
}

impl EncodeError {
    #[inline]
    pub fn custom(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Custom(message.into())
    }

    #[inline]
    pub fn in_field(self, type_path: &'static str, field: &'static str) -> Self {
        Self::Field {
            type_path,
            field,
            source: Box::new(self),
        }
    }
}

// -----------------------------------------------------------------------------
// CopyError

/// A value could not be copied.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum CopyError {
    #[error(transparent)]
    TypeMismatch(#[from] ValueMismatch),
    #[error("in field `{field}` of `{type_path}`: {source}")]
    Field {
        type_path: &'static str,
        field: &'static str,
        source: Box<CopyError>,
    },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("{0}")]
    Custom(Cow<'static, str>),
}

impl CopyError {
    #[inline]
    pub fn custom(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Custom(message.into())
    }

    #[inline]
    pub fn in_field(self, type_path: &'static str, field: &'static str) -> Self {
        Self::Field {
            type_path,
            field,
            source: Box::new(self),
        }
    }
}

// -----------------------------------------------------------------------------
// MergeError

/// Two result trees disagree in shape and cannot be merged.
///
/// Usually the two documents were read with different versions of a type.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum MergeError {
    #[error("cannot merge a {child} result over a {parent} result")]
    KindMismatch {
        child: &'static str,
        parent: &'static str,
    },
    #[error("cannot merge `{child}` over `{parent}`")]
    TypeMismatch {
        child: &'static str,
        parent: &'static str,
    },
    #[error("`{type_path}` results disagree on field count: child {child}, parent {parent}")]
    FieldCountMismatch {
        type_path: &'static str,
        child: usize,
        parent: usize,
    },
    #[error("cannot rebuild merged value: {0}")]
    Rebuild(#[from] ValueMismatch),
}

// -----------------------------------------------------------------------------
// Error

/// Any error raised by the engine.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Copy(#[from] CopyError),
    #[error(transparent)]
    Merge(#[from] MergeError),
}

#[cfg(test)]
mod tests {
    use super::{DecodeError, SchemaError};

    #[test]
    fn field_context_is_kept() {
        let err = DecodeError::parse("i32", "ten", "invalid digit")
            .in_field("Inner", "count")
            .in_field("Outer", "inner");

        assert_eq!(
            err.to_string(),
            "in field `inner` of `Outer`: in field `count` of `Inner`: \
             cannot parse \"ten\" as `i32`: invalid digit"
        );
        assert!(matches!(err.root_cause(), DecodeError::Parse { .. }));
    }

    #[test]
    fn duplicate_tags_message() {
        let err = SchemaError::DuplicateTags {
            type_path: "Wallet",
            tags: vec!["amount".into()],
        };
        assert_eq!(err.to_string(), "type `Wallet` declares duplicate tags: amount");
    }
}
