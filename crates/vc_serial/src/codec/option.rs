use alloc::sync::Arc;
use core::marker::PhantomData;

use super::{CodecAdapter, CodecCaps, CodecCx, CodecRegistry, Decoded, DynCodec, TypeCodec};
use crate::error::{CopyError, DecodeError, EncodeError};
use crate::node::{DataNode, MappingNode, ScalarNode, SequenceNode};
use crate::validation::ValidationNode;
use crate::value::DataType;

/// Codec of `Option<T>`.
///
/// The scalar `null` (or `~`) is `None`; anything else is read as `T`.
/// `None` is written as `null`. The result of a read is always a scalar
/// result, so an optional value is replaced as a whole on inheritance.
pub struct OptionCodec<T>(PhantomData<fn() -> T>);

impl<T> OptionCodec<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for OptionCodec<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DataType> OptionCodec<T> {
    fn read_some(cx: CodecCx<'_>, node: &DataNode) -> Result<Decoded<Option<T>>, DecodeError> {
        let value = cx.read::<T>(node)?.value;
        Ok(Decoded::scalar(Some(value)))
    }
}

impl<T: DataType> TypeCodec<Option<T>> for OptionCodec<T> {
    #[inline]
    fn capabilities(&self) -> CodecCaps {
        CodecCaps::all()
    }

    fn read_scalar(&self, cx: CodecCx<'_>, node: &ScalarNode) -> Result<Decoded<Option<T>>, DecodeError> {
        if node.is_null() {
            return Ok(Decoded::scalar(None));
        }
        Self::read_some(cx, &node.clone().into())
    }

    fn read_sequence(
        &self,
        cx: CodecCx<'_>,
        node: &SequenceNode,
    ) -> Result<Decoded<Option<T>>, DecodeError> {
        Self::read_some(cx, &node.clone().into())
    }

    fn read_mapping(&self, cx: CodecCx<'_>, node: &MappingNode) -> Result<Decoded<Option<T>>, DecodeError> {
        Self::read_some(cx, &node.clone().into())
    }

    fn validate_scalar(&self, cx: CodecCx<'_>, node: &ScalarNode) -> ValidationNode {
        if node.is_null() {
            return ValidationNode::Validated(node.clone().into());
        }
        cx.validate::<T>(&node.clone().into())
    }

    fn validate_sequence(&self, cx: CodecCx<'_>, node: &SequenceNode) -> ValidationNode {
        cx.validate::<T>(&node.clone().into())
    }

    fn validate_mapping(&self, cx: CodecCx<'_>, node: &MappingNode) -> ValidationNode {
        cx.validate::<T>(&node.clone().into())
    }

    fn write(&self, cx: CodecCx<'_>, value: &Option<T>, always_write: bool) -> Result<DataNode, EncodeError> {
        match value {
            Some(value) => cx.write(value, always_write),
            None => Ok(DataNode::null()),
        }
    }

    fn copy(&self, cx: CodecCx<'_>, source: &Option<T>, target: &mut Option<T>) -> Result<(), CopyError> {
        let Some(source) = source else {
            *target = None;
            return Ok(());
        };
        match target {
            Some(target) => cx.copy(source, target),
            None => {
                *target = Some(cx.create_copy(source)?);
                Ok(())
            }
        }
    }

    fn create_copy(&self, cx: CodecCx<'_>, source: &Option<T>) -> Result<Option<T>, CopyError> {
        source.as_ref().map(|value| cx.create_copy(value)).transpose()
    }

    fn equals(&self, a: &Option<T>, b: &Option<T>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => a == b,
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: DataType> DataType for Option<T> {
    fn default_codec() -> Arc<dyn DynCodec> {
        CodecAdapter::shared(OptionCodec::<T>::new())
    }

    fn register_dependencies(registry: &mut CodecRegistry) {
        registry.register::<T>();
    }
}

#[cfg(test)]
mod tests {
    use crate::SerializationManager;
    use crate::node::DataNode;

    #[test]
    fn null_and_tilde_are_none() {
        let manager = SerializationManager::default();
        assert_eq!(manager.read_value::<Option<u8>>(&DataNode::null(), None), Ok(None));
        assert_eq!(manager.read_value::<Option<u8>>(&DataNode::scalar("~"), None), Ok(None));
        assert_eq!(manager.read_value::<Option<u8>>(&DataNode::scalar("4"), None), Ok(Some(4)));
        assert_eq!(manager.write(&None::<u8>, false, None), Ok(DataNode::null()));
        assert_eq!(manager.write(&Some(4_u8), false, None), Ok(DataNode::scalar("4")));
    }

    #[test]
    fn inner_values_are_validated() {
        let manager = SerializationManager::default();
        assert!(manager.validate::<Option<i32>>(&DataNode::null(), None).is_valid());
        assert!(!manager.validate::<Option<i32>>(&DataNode::scalar("x"), None).is_valid());
    }
}
