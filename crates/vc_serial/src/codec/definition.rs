use alloc::sync::Arc;
use core::marker::PhantomData;
use std::sync::OnceLock;

use super::{CodecAdapter, CodecCaps, CodecCx, Decoded, DynCodec, TypeCodec};
use crate::engine;
use crate::error::{CopyError, DecodeError, EncodeError, SchemaError};
use crate::node::{DataNode, MappingNode};
use crate::result::{DefinitionResult, ResultNode};
use crate::schema::{DataDefinition, TypeSchema};
use crate::validation::ValidationNode;

/// Codec of a [`DataDefinition`]: a mapping with one entry per field.
///
/// Resolves the schema through the manager on first use and keeps it, so
/// one codec instance belongs to one manager.
pub struct DefinitionCodec<T> {
    schema: OnceLock<Arc<TypeSchema>>,
    marker: PhantomData<fn() -> T>,
}

impl<T: DataDefinition> DefinitionCodec<T> {
    #[inline]
    pub const fn new() -> Self {
        Self {
            schema: OnceLock::new(),
            marker: PhantomData,
        }
    }

    /// A fresh codec as a [`DynCodec`].
    #[inline]
    pub fn shared() -> Arc<dyn DynCodec> {
        CodecAdapter::<T, Self>::shared(Self::new())
    }

    fn schema(&self, cx: CodecCx<'_>) -> Result<&Arc<TypeSchema>, SchemaError> {
        if let Some(schema) = self.schema.get() {
            return Ok(schema);
        }
        let schema = cx.manager().schema::<T>()?;
        Ok(self.schema.get_or_init(|| schema))
    }
}

impl<T: DataDefinition> Default for DefinitionCodec<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DataDefinition> TypeCodec<T> for DefinitionCodec<T> {
    #[inline]
    fn capabilities(&self) -> CodecCaps {
        CodecCaps::MAPPING
    }

    fn read_mapping(&self, cx: CodecCx<'_>, node: &MappingNode) -> Result<Decoded<T>, DecodeError> {
        let schema = self.schema(cx)?;
        let mut value = T::default();
        let fields = engine::populate(cx, schema, &mut value, node)?;
        let result = DefinitionResult::new(Box::new(value.clone()), schema.clone(), fields);
        Ok(Decoded::new(value, ResultNode::Definition(result)))
    }

    fn validate_mapping(&self, cx: CodecCx<'_>, node: &MappingNode) -> ValidationNode {
        match self.schema(cx) {
            Ok(schema) => engine::validate(cx, schema, node),
            Err(err) => ValidationNode::error(node.clone().into(), err.to_string()),
        }
    }

    fn write(&self, cx: CodecCx<'_>, value: &T, always_write: bool) -> Result<DataNode, EncodeError> {
        let schema = self.schema(cx)?;
        engine::serialize(cx, schema, value, always_write).map(DataNode::Mapping)
    }

    fn copy(&self, cx: CodecCx<'_>, source: &T, target: &mut T) -> Result<(), CopyError> {
        let schema = self.schema(cx)?;
        engine::copy(cx, schema, source, target)
    }

    fn create_copy(&self, cx: CodecCx<'_>, source: &T) -> Result<T, CopyError> {
        let mut target = T::default();
        self.copy(cx, source, &mut target)?;
        Ok(target)
    }
}
