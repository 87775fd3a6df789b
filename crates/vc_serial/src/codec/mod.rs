//! Pluggable per-type codecs.
//!
//! A codec implements any subset of four capabilities for one type:
//!
//! - **Read**: node to value plus [`ResultNode`], with one entry point per node shape.
//! - **Validate**: check a node without producing a value.
//! - **Write**: value to node.
//! - **Copy**: deep copy, optionally into an existing target.
//!
//! Codecs are written against [`TypeCodec<T>`] and stored as
//! `Arc<dyn DynCodec>` through [`CodecAdapter`]. The [`CodecRegistry`]
//! maps each declared type to its codec; a field can name a custom codec
//! that overrides only the capabilities it declares.
//!
//! # Examples
//!
//! A codec reading a point from either `"1,2"` or `[1, 2]`:
//!
//! ```
//! use vc_serial::codec::{CodecCaps, CodecCx, Decoded, TypeCodec};
//! use vc_serial::node::{DataNode, ScalarNode, SequenceNode};
//! use vc_serial::error::DecodeError;
//! use vc_serial::{DataType, SerializationManager};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Default)]
//! struct Point(i32, i32);
//!
//! #[derive(Default)]
//! struct PointCodec;
//!
//! impl TypeCodec<Point> for PointCodec {
//!     fn capabilities(&self) -> CodecCaps {
//!         CodecCaps::READ_SCALAR | CodecCaps::READ_SEQUENCE | CodecCaps::WRITE
//!     }
//!
//!     fn read_scalar(&self, _: CodecCx<'_>, node: &ScalarNode) -> Result<Decoded<Point>, DecodeError> {
//!         let (x, y) = node.value().split_once(',').ok_or_else(|| DecodeError::custom("expected `x,y`"))?;
//!         let parse = |s: &str| s.trim().parse::<i32>().map_err(|e| DecodeError::parse("i32", s, e));
//!         Ok(Decoded::scalar(Point(parse(x)?, parse(y)?)))
//!     }
//!
//!     fn read_sequence(&self, cx: CodecCx<'_>, node: &SequenceNode) -> Result<Decoded<Point>, DecodeError> {
//!         let [x, y] = node.as_slice() else { return Err(DecodeError::custom("expected two items")) };
//!         Ok(Decoded::scalar(Point(cx.read::<i32>(x)?.value, cx.read::<i32>(y)?.value)))
//!     }
//!
//!     fn write(&self, _: CodecCx<'_>, value: &Point, _: bool) -> Result<DataNode, vc_serial::error::EncodeError> {
//!         Ok(DataNode::scalar(format!("{},{}", value.0, value.1)))
//!     }
//! }
//!
//! impl DataType for Point {
//!     fn default_codec() -> std::sync::Arc<dyn vc_serial::codec::DynCodec> {
//!         vc_serial::codec::CodecAdapter::shared(PointCodec)
//!     }
//! }
//!
//! let manager = SerializationManager::default();
//! let a = manager.read_value::<Point>(&DataNode::scalar("1, 2"), None).unwrap();
//! let b = manager.read_value::<Point>(&SequenceNode::from_iter(["1", "2"]).into(), None).unwrap();
//! assert_eq!(a, b);
//! assert_eq!(manager.write(&a, false, None).unwrap(), DataNode::scalar("1,2"));
//! ```

use core::any::TypeId;

use crate::context::SerializationContext;
use crate::error::{CopyError, DecodeError, EncodeError, ValueMismatch};
use crate::manager::SerializationManager;
use crate::node::{DataNode, MappingNode, NodeKind, ScalarNode, SequenceNode};
use crate::result::ResultNode;
use crate::validation::ValidationNode;
use crate::value::{DataType, Value};

// -----------------------------------------------------------------------------
// Modules

mod adapter;
mod collections;
mod component;
mod definition;
mod option;
mod primitives;
mod raw;
mod registry;

// -----------------------------------------------------------------------------
// Exports

pub use adapter::CodecAdapter;
pub use collections::{ArrayCodec, CollectionCodec, CollectionType, DictionaryCodec, DictionaryType};
pub use component::{ComponentKind, ComponentKinds, ComponentSet, ComponentSetCodec, TYPE_KEY};
pub use definition::DefinitionCodec;
pub use option::OptionCodec;
pub use primitives::{BoolCodec, ScalarCodec};
pub use raw::RawNodeCodec;
pub use registry::CodecRegistry;

// -----------------------------------------------------------------------------
// CodecCaps

bitflags::bitflags! {
    /// The capabilities a codec declares.
    ///
    /// Only declared capabilities are ever called; a custom codec on a field
    /// falls back to the declared type's registry codec for the rest.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CodecCaps: u16 {
        const READ_SCALAR = 1 << 0;
        const READ_SEQUENCE = 1 << 1;
        const READ_MAPPING = 1 << 2;
        const VALIDATE_SCALAR = 1 << 3;
        const VALIDATE_SEQUENCE = 1 << 4;
        const VALIDATE_MAPPING = 1 << 5;
        const WRITE = 1 << 6;
        const COPY = 1 << 7;

        const READ = Self::READ_SCALAR.bits() | Self::READ_SEQUENCE.bits() | Self::READ_MAPPING.bits();
        const VALIDATE = Self::VALIDATE_SCALAR.bits()
            | Self::VALIDATE_SEQUENCE.bits()
            | Self::VALIDATE_MAPPING.bits();

        /// Full support for scalar-shaped values.
        const SCALAR = Self::READ_SCALAR.bits()
            | Self::VALIDATE_SCALAR.bits()
            | Self::WRITE.bits()
            | Self::COPY.bits();
        /// Full support for sequence-shaped values.
        const SEQUENCE = Self::READ_SEQUENCE.bits()
            | Self::VALIDATE_SEQUENCE.bits()
            | Self::WRITE.bits()
            | Self::COPY.bits();
        /// Full support for mapping-shaped values.
        const MAPPING = Self::READ_MAPPING.bits()
            | Self::VALIDATE_MAPPING.bits()
            | Self::WRITE.bits()
            | Self::COPY.bits();
    }
}

impl CodecCaps {
    #[inline]
    pub const fn reads(self, kind: NodeKind) -> bool {
        self.contains(match kind {
            NodeKind::Scalar => Self::READ_SCALAR,
            NodeKind::Sequence => Self::READ_SEQUENCE,
            NodeKind::Mapping => Self::READ_MAPPING,
        })
    }

    #[inline]
    pub const fn validates(self, kind: NodeKind) -> bool {
        self.contains(match kind {
            NodeKind::Scalar => Self::VALIDATE_SCALAR,
            NodeKind::Sequence => Self::VALIDATE_SEQUENCE,
            NodeKind::Mapping => Self::VALIDATE_MAPPING,
        })
    }
}

// -----------------------------------------------------------------------------
// Decoded

/// The output of a read: the value and its parallel result tree.
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    pub value: T,
    pub result: ResultNode,
}

impl<T: DataType> Decoded<T> {
    #[inline]
    pub const fn new(value: T, result: ResultNode) -> Self {
        Self { value, result }
    }

    /// A leaf read: the result is a [`ResultNode::Scalar`] holding a copy of `value`.
    #[inline]
    pub fn scalar(value: T) -> Self {
        Self {
            result: ResultNode::scalar(value.clone()),
            value,
        }
    }

    #[inline]
    pub fn erase(self) -> Decoded<Box<dyn Value>> {
        Decoded {
            value: Box::new(self.value),
            result: self.result,
        }
    }
}

impl Decoded<Box<dyn Value>> {
    #[inline]
    pub fn downcast<T: DataType>(self) -> Result<Decoded<T>, ValueMismatch> {
        Ok(Decoded {
            value: self.value.take::<T>()?,
            result: self.result,
        })
    }
}

// -----------------------------------------------------------------------------
// CodecCx

/// Handle passed to every codec call.
///
/// Carries the manager (for nested reads and writes), the caller's
/// [`SerializationContext`] and the hook flag.
#[derive(Clone, Copy)]
pub struct CodecCx<'a> {
    manager: &'a SerializationManager,
    context: Option<&'a SerializationContext>,
    skip_hooks: bool,
}

impl<'a> CodecCx<'a> {
    #[inline]
    pub const fn new(
        manager: &'a SerializationManager,
        context: Option<&'a SerializationContext>,
        skip_hooks: bool,
    ) -> Self {
        Self {
            manager,
            context,
            skip_hooks,
        }
    }

    #[inline]
    pub const fn manager(&self) -> &'a SerializationManager {
        self.manager
    }

    #[inline]
    pub const fn context(&self) -> Option<&'a SerializationContext> {
        self.context
    }

    /// Whether `after_deserialization` hooks are skipped.
    #[inline]
    pub const fn skip_hooks(&self) -> bool {
        self.skip_hooks
    }

    #[inline]
    pub fn is_authoritative(&self) -> bool {
        self.manager.is_authoritative()
    }

    /// Reads `T` through its registered codec.
    pub fn read<T: DataType>(self, node: &DataNode) -> Result<Decoded<T>, DecodeError> {
        let decoded = self.manager.codec::<T>().read(self, node)?;
        Ok(decoded.downcast::<T>()?)
    }

    /// Writes `T` through its registered codec.
    pub fn write<T: DataType>(self, value: &T, always_write: bool) -> Result<DataNode, EncodeError> {
        self.manager.codec::<T>().write(self, value, always_write)
    }

    /// Copies `source` into `target` through `T`'s registered codec.
    pub fn copy<T: DataType>(self, source: &T, target: &mut T) -> Result<(), CopyError> {
        self.manager.codec::<T>().copy(self, source, target)
    }

    /// Creates an independent copy of `source`.
    pub fn create_copy<T: DataType>(self, source: &T) -> Result<T, CopyError> {
        let copy = self.manager.codec::<T>().create_copy(self, source)?;
        Ok(copy.take::<T>()?)
    }

    /// Validates `node` as a `T`.
    pub fn validate<T: DataType>(self, node: &DataNode) -> ValidationNode {
        self.manager.codec::<T>().validate(self, node)
    }

    /// Structural equality as defined by `T`'s codec.
    pub fn equals<T: DataType>(self, a: &T, b: &T) -> bool {
        self.manager.codec::<T>().equals(a, b)
    }
}

// -----------------------------------------------------------------------------
// TypeCodec

/// A codec for `T`.
///
/// Every method has a default; [`TypeCodec::capabilities`] decides which
/// ones are used. Default `copy` and `create_copy` go through `Clone`, and
/// default `equals` through `PartialEq`.
pub trait TypeCodec<T: DataType>: Send + Sync + 'static {
    fn capabilities(&self) -> CodecCaps;

    fn read_scalar(&self, cx: CodecCx<'_>, node: &ScalarNode) -> Result<Decoded<T>, DecodeError> {
        let _ = (cx, node);
        Err(unsupported::<T>(NodeKind::Scalar))
    }

    fn read_sequence(&self, cx: CodecCx<'_>, node: &SequenceNode) -> Result<Decoded<T>, DecodeError> {
        let _ = (cx, node);
        Err(unsupported::<T>(NodeKind::Sequence))
    }

    fn read_mapping(&self, cx: CodecCx<'_>, node: &MappingNode) -> Result<Decoded<T>, DecodeError> {
        let _ = (cx, node);
        Err(unsupported::<T>(NodeKind::Mapping))
    }

    fn validate_scalar(&self, cx: CodecCx<'_>, node: &ScalarNode) -> ValidationNode {
        let _ = cx;
        ValidationNode::Inconclusive(node.clone().into())
    }

    fn validate_sequence(&self, cx: CodecCx<'_>, node: &SequenceNode) -> ValidationNode {
        let _ = cx;
        ValidationNode::Inconclusive(node.clone().into())
    }

    fn validate_mapping(&self, cx: CodecCx<'_>, node: &MappingNode) -> ValidationNode {
        let _ = cx;
        ValidationNode::Inconclusive(node.clone().into())
    }

    fn write(&self, cx: CodecCx<'_>, value: &T, always_write: bool) -> Result<DataNode, EncodeError> {
        let _ = (cx, value, always_write);
        Err(EncodeError::Unsupported {
            type_path: T::type_path(),
        })
    }

    fn copy(&self, cx: CodecCx<'_>, source: &T, target: &mut T) -> Result<(), CopyError> {
        let _ = cx;
        target.clone_from(source);
        Ok(())
    }

    fn create_copy(&self, cx: CodecCx<'_>, source: &T) -> Result<T, CopyError> {
        let _ = cx;
        Ok(source.clone())
    }

    fn equals(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

#[inline]
pub(crate) fn unsupported<T: DataType>(kind: NodeKind) -> DecodeError {
    DecodeError::UnsupportedShape {
        type_path: T::type_path(),
        kind,
    }
}

// -----------------------------------------------------------------------------
// DynCodec

/// Object-safe codec over erased values.
///
/// Usually produced by [`CodecAdapter`]; implement [`TypeCodec`] instead.
pub trait DynCodec: Send + Sync + 'static {
    /// The type this codec reads and writes.
    fn value_type_id(&self) -> TypeId;

    fn value_type_path(&self) -> &'static str;

    /// Name of the codec type, for diagnostics.
    fn codec_name(&self) -> &'static str;

    fn capabilities(&self) -> CodecCaps;

    /// Reads `node`, dispatching on its shape.
    fn read(&self, cx: CodecCx<'_>, node: &DataNode) -> Result<Decoded<Box<dyn Value>>, DecodeError>;

    /// Reads a whole mapping. Used for included fields.
    fn read_mapping(
        &self,
        cx: CodecCx<'_>,
        node: &MappingNode,
    ) -> Result<Decoded<Box<dyn Value>>, DecodeError>;

    /// Validates `node`. Never fails; problems become error nodes.
    fn validate(&self, cx: CodecCx<'_>, node: &DataNode) -> ValidationNode;

    /// Validates a whole mapping. Used for included fields.
    fn validate_mapping(&self, cx: CodecCx<'_>, node: &MappingNode) -> ValidationNode;

    fn write(&self, cx: CodecCx<'_>, value: &dyn Value, always_write: bool) -> Result<DataNode, EncodeError>;

    fn copy(&self, cx: CodecCx<'_>, source: &dyn Value, target: &mut dyn Value) -> Result<(), CopyError>;

    fn create_copy(&self, cx: CodecCx<'_>, source: &dyn Value) -> Result<Box<dyn Value>, CopyError>;

    /// Structural equality; `false` if either value is not of this codec's type.
    fn equals(&self, a: &dyn Value, b: &dyn Value) -> bool;
}

#[cfg(test)]
mod tests {
    use super::CodecCaps;
    use crate::node::NodeKind;

    #[test]
    fn caps_by_shape() {
        let caps = CodecCaps::READ_SCALAR | CodecCaps::VALIDATE_MAPPING;
        assert!(caps.reads(NodeKind::Scalar));
        assert!(!caps.reads(NodeKind::Mapping));
        assert!(caps.validates(NodeKind::Mapping));
        assert!(CodecCaps::SEQUENCE.contains(CodecCaps::WRITE | CodecCaps::COPY));
        assert!(!CodecCaps::SEQUENCE.intersects(CodecCaps::READ_MAPPING));
    }
}
