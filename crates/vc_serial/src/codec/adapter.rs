use alloc::sync::Arc;
use core::any::TypeId;
use core::marker::PhantomData;

use super::{CodecCaps, CodecCx, Decoded, DynCodec, TypeCodec};
use crate::error::{CopyError, DecodeError, EncodeError, ValueMismatch};
use crate::node::{DataNode, MappingNode, NodeKind};
use crate::validation::ValidationNode;
use crate::value::{DataType, Value};

/// Turns a [`TypeCodec<T>`] into a [`DynCodec`].
///
/// Dispatches reads and validation on node shape, and checks the concrete
/// type of every erased value it is handed.
pub struct CodecAdapter<T, C> {
    codec: C,
    marker: PhantomData<fn() -> T>,
}

impl<T: DataType, C: TypeCodec<T>> CodecAdapter<T, C> {
    #[inline]
    pub const fn new(codec: C) -> Self {
        Self {
            codec,
            marker: PhantomData,
        }
    }

    /// Wraps `codec` into a shareable [`DynCodec`].
    #[inline]
    pub fn shared(codec: C) -> Arc<dyn DynCodec> {
        Arc::new(Self::new(codec))
    }

    #[inline]
    pub const fn codec(&self) -> &C {
        &self.codec
    }
}

#[inline]
fn expect_ref<T: DataType>(value: &dyn Value) -> Result<&T, ValueMismatch> {
    value
        .downcast_ref::<T>()
        .ok_or_else(|| ValueMismatch::new(T::type_path(), value.value_type_path()))
}

impl<T: DataType, C: TypeCodec<T>> DynCodec for CodecAdapter<T, C> {
    #[inline]
    fn value_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    #[inline]
    fn value_type_path(&self) -> &'static str {
        T::type_path()
    }

    #[inline]
    fn codec_name(&self) -> &'static str {
        core::any::type_name::<C>()
    }

    #[inline]
    fn capabilities(&self) -> CodecCaps {
        self.codec.capabilities()
    }

    fn read(&self, cx: CodecCx<'_>, node: &DataNode) -> Result<Decoded<Box<dyn Value>>, DecodeError> {
        let caps = self.codec.capabilities();
        if !caps.reads(node.kind()) {
            return Err(super::unsupported::<T>(node.kind()));
        }
        let decoded = match node {
            DataNode::Scalar(scalar) => self.codec.read_scalar(cx, scalar),
            DataNode::Sequence(sequence) => self.codec.read_sequence(cx, sequence),
            DataNode::Mapping(mapping) => self.codec.read_mapping(cx, mapping),
        };
        decoded.map(Decoded::erase)
    }

    fn read_mapping(
        &self,
        cx: CodecCx<'_>,
        node: &MappingNode,
    ) -> Result<Decoded<Box<dyn Value>>, DecodeError> {
        if !self.codec.capabilities().contains(CodecCaps::READ_MAPPING) {
            return Err(super::unsupported::<T>(NodeKind::Mapping));
        }
        self.codec.read_mapping(cx, node).map(Decoded::erase)
    }

    fn validate(&self, cx: CodecCx<'_>, node: &DataNode) -> ValidationNode {
        let caps = self.codec.capabilities();
        let kind = node.kind();
        if caps.validates(kind) {
            return match node {
                DataNode::Scalar(scalar) => self.codec.validate_scalar(cx, scalar),
                DataNode::Sequence(sequence) => self.codec.validate_sequence(cx, sequence),
                DataNode::Mapping(mapping) => self.codec.validate_mapping(cx, mapping),
            };
        }
        // No validator for this shape: a successful read is a pass.
        match self.read(cx, node) {
            Ok(_) => ValidationNode::Validated(node.clone()),
            Err(err) => ValidationNode::error(node.clone(), err.to_string()),
        }
    }

    fn validate_mapping(&self, cx: CodecCx<'_>, node: &MappingNode) -> ValidationNode {
        if self
            .codec
            .capabilities()
            .contains(CodecCaps::VALIDATE_MAPPING)
        {
            return self.codec.validate_mapping(cx, node);
        }
        match self.read_mapping(cx, node) {
            Ok(_) => ValidationNode::Validated(node.clone().into()),
            Err(err) => ValidationNode::error(node.clone().into(), err.to_string()),
        }
    }

    fn write(&self, cx: CodecCx<'_>, value: &dyn Value, always_write: bool) -> Result<DataNode, EncodeError> {
        if !self.codec.capabilities().contains(CodecCaps::WRITE) {
            return Err(EncodeError::Unsupported {
                type_path: T::type_path(),
            });
        }
        self.codec.write(cx, expect_ref::<T>(value)?, always_write)
    }

    fn copy(&self, cx: CodecCx<'_>, source: &dyn Value, target: &mut dyn Value) -> Result<(), CopyError> {
        let source = expect_ref::<T>(source)?;
        let found = target.value_type_path();
        let target = target
            .downcast_mut::<T>()
            .ok_or_else(|| ValueMismatch::new(T::type_path(), found))?;
        self.codec.copy(cx, source, target)
    }

    fn create_copy(&self, cx: CodecCx<'_>, source: &dyn Value) -> Result<Box<dyn Value>, CopyError> {
        let source = expect_ref::<T>(source)?;
        Ok(Box::new(self.codec.create_copy(cx, source)?))
    }

    fn equals(&self, a: &dyn Value, b: &dyn Value) -> bool {
        match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
            (Some(a), Some(b)) => self.codec.equals(a, b),
            _ => false,
        }
    }
}
