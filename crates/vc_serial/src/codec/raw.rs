use alloc::sync::Arc;

use super::{CodecAdapter, CodecCaps, CodecCx, Decoded, DynCodec, TypeCodec};
use crate::error::{DecodeError, EncodeError};
use crate::node::{DataNode, MappingNode, ScalarNode, SequenceNode};
use crate::validation::ValidationNode;
use crate::value::DataType;

/// Keeps a node as is. Lets a field hold an unparsed part of a document.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawNodeCodec;

impl TypeCodec<DataNode> for RawNodeCodec {
    #[inline]
    fn capabilities(&self) -> CodecCaps {
        CodecCaps::all()
    }

    fn read_scalar(&self, _: CodecCx<'_>, node: &ScalarNode) -> Result<Decoded<DataNode>, DecodeError> {
        Ok(Decoded::scalar(node.clone().into()))
    }

    fn read_sequence(&self, _: CodecCx<'_>, node: &SequenceNode) -> Result<Decoded<DataNode>, DecodeError> {
        Ok(Decoded::scalar(node.clone().into()))
    }

    fn read_mapping(&self, _: CodecCx<'_>, node: &MappingNode) -> Result<Decoded<DataNode>, DecodeError> {
        Ok(Decoded::scalar(node.clone().into()))
    }

    fn validate_scalar(&self, _: CodecCx<'_>, node: &ScalarNode) -> ValidationNode {
        ValidationNode::Validated(node.clone().into())
    }

    fn validate_sequence(&self, _: CodecCx<'_>, node: &SequenceNode) -> ValidationNode {
        ValidationNode::Validated(node.clone().into())
    }

    fn validate_mapping(&self, _: CodecCx<'_>, node: &MappingNode) -> ValidationNode {
        ValidationNode::Validated(node.clone().into())
    }

    fn write(&self, _: CodecCx<'_>, value: &DataNode, _: bool) -> Result<DataNode, EncodeError> {
        Ok(value.clone())
    }
}

impl DataType for DataNode {
    fn type_path() -> &'static str {
        "DataNode"
    }

    fn default_codec() -> Arc<dyn DynCodec> {
        CodecAdapter::shared(RawNodeCodec)
    }
}

#[cfg(test)]
mod tests {
    use crate::SerializationManager;
    use crate::node::DataNode;

    #[test]
    fn passthrough() {
        let manager = SerializationManager::default();
        let node: DataNode = serde_json::from_str(r#"{"any": ["shape", {"at": "all"}]}"#).unwrap();
        let read = manager.read::<DataNode>(&node, None).unwrap();
        assert_eq!(read.value, node);
        assert_eq!(manager.write(&read.value, false, None), Ok(node));
    }
}
