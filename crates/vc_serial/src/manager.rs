use alloc::sync::Arc;
use core::any::TypeId;
use core::fmt;

use crate::codec::{CodecCx, CodecRegistry, ComponentKinds, Decoded, DynCodec, TypeCodec};
use crate::config::SerializationConfig;
use crate::context::SerializationContext;
use crate::error::{CopyError, DecodeError, EncodeError, MergeError, SchemaError};
use crate::node::{DataNode, MappingNode};
use crate::result::{DefinitionResult, ResultNode};
use crate::schema::{DataDefinition, SchemaBuilder, SchemaRegistry, TypeSchema};
use crate::validation::ValidationNode;
use crate::value::DataType;

// -----------------------------------------------------------------------------
// SerializationManager

/// Entry point of the engine.
///
/// Owns the [`CodecRegistry`], the [`SchemaRegistry`] and the
/// [`ComponentKinds`]. Registration takes `&mut self` and happens during
/// setup; every operation afterwards takes `&self`, so a manager can be
/// shared between threads once set up.
///
/// # Examples
///
/// ```
/// use vc_serial::node::DataNode;
/// use vc_serial::{DataDefinition, SerializationManager};
///
/// #[derive(DataDefinition, Debug, Clone, PartialEq, Default)]
/// struct Wallet {
///     #[datafield(required)]
///     owner: String,
///     amount: u32,
/// }
///
/// let manager = SerializationManager::default();
///
/// let node: DataNode = serde_json::from_str(r#"{ "owner": "ada", "amount": "12" }"#).unwrap();
/// let wallet = manager.read_value::<Wallet>(&node, None).unwrap();
/// assert_eq!(wallet.amount, 12);
///
/// let written = manager.write(&Wallet { amount: 0, ..wallet }, false, None).unwrap();
/// assert_eq!(serde_json::to_string(&written).unwrap(), r#"{"owner":"ada"}"#);
/// ```
pub struct SerializationManager {
    config: SerializationConfig,
    codecs: CodecRegistry,
    schemas: SchemaRegistry,
    components: ComponentKinds,
}

impl SerializationManager {
    /// Creates a manager from `config`.
    pub fn new(config: SerializationConfig) -> Self {
        let codecs = if config.register_primitives {
            CodecRegistry::with_primitives()
        } else {
            CodecRegistry::new()
        };
        Self {
            config,
            codecs,
            schemas: SchemaRegistry::new(),
            components: ComponentKinds::new(),
        }
    }

    #[inline]
    pub const fn config(&self) -> &SerializationConfig {
        &self.config
    }

    /// Whether this peer is the authority.
    #[inline]
    pub const fn is_authoritative(&self) -> bool {
        self.config.authoritative
    }

    #[inline]
    pub const fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    #[inline]
    pub const fn codecs_mut(&mut self) -> &mut CodecRegistry {
        &mut self.codecs
    }

    #[inline]
    pub const fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    #[inline]
    pub const fn components(&self) -> &ComponentKinds {
        &self.components
    }

    // -------------------------------------------------------------------------
    // Registration

    /// Registers `T` and everything it depends on with their default codecs.
    pub fn register<T: DataType>(&mut self) -> &mut Self {
        self.codecs.register::<T>();
        self
    }

    /// Registers `codec` for `T`, replacing its default codec.
    pub fn register_codec<T: DataType, C: TypeCodec<T>>(&mut self, codec: C) -> &mut Self {
        self.codecs.register_codec::<T, C>(codec);
        self
    }

    /// Registers the component kind `name`, holding a `T`.
    ///
    /// `markers` are extra capabilities; two kinds sharing one conflict on
    /// inheritance. See [`ComponentKinds::register`].
    pub fn register_component<T: DataType>(&mut self, name: &str, markers: &[&str]) -> &mut Self {
        self.components.register::<T>(name, markers);
        self.codecs.register::<T>();
        self
    }

    /// Registers every type marked `#[datadef(auto_register)]`.
    ///
    /// Returns `true` if the platform supports collecting them. Repeated
    /// calls register nothing new.
    #[cfg(feature = "auto_register")]
    pub fn auto_register(&mut self) -> bool {
        crate::__macro_exports::auto_register::register_types(&mut self.codecs)
    }

    /// Without the `auto_register` feature nothing is collected.
    #[cfg(not(feature = "auto_register"))]
    #[inline(always)]
    pub fn auto_register(&mut self) -> bool {
        false
    }

    // -------------------------------------------------------------------------
    // Schemas

    /// Builds the schema of every registered data definition.
    ///
    /// Schemas are otherwise built on first use; calling this during setup
    /// reports every schema defect at once.
    ///
    /// # Errors
    ///
    /// All schema defects found, one per failing type.
    pub fn initialize(&self) -> Result<(), Vec<SchemaError>> {
        let mut errors = Vec::new();
        for entry in self.codecs.definitions() {
            if let Err(err) = (entry.build)(self) {
                log::error!("data definition `{}` is unusable: {err}", entry.type_path);
                errors.push(err);
            }
        }
        log::debug!(
            "initialized {} data definitions, {} failed",
            self.codecs.definitions().len(),
            errors.len()
        );
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Returns the schema of `T`, building it on first use.
    ///
    /// # Errors
    ///
    /// The schema defect of `T`. A failed build is cached and returned again
    /// on every later call.
    pub fn schema<T: DataDefinition>(&self) -> Result<Arc<TypeSchema>, SchemaError> {
        self.schemas.get_or_build(TypeId::of::<T>(), || {
            SchemaBuilder::new(&self.codecs).build(T::definition())
        })
    }

    /// Returns the codec of `T`, inserting its default codec on first use.
    #[inline]
    pub fn codec<T: DataType>(&self) -> Arc<dyn DynCodec> {
        self.codecs.get_or_register::<T>()
    }

    #[inline]
    fn cx<'a>(&'a self, context: Option<&'a SerializationContext>, skip_hooks: bool) -> CodecCx<'a> {
        CodecCx::new(self, context, skip_hooks)
    }

    // -------------------------------------------------------------------------
    // Operations

    /// Reads `node` as a `T`, together with its result tree.
    ///
    /// # Errors
    ///
    /// A missing required field, a node shape `T` cannot be read from, or
    /// a scalar that fails to parse.
    #[inline]
    pub fn read<T: DataType>(
        &self,
        node: &DataNode,
        context: Option<&SerializationContext>,
    ) -> Result<Decoded<T>, DecodeError> {
        self.read_with(node, context, false)
    }

    /// Like [`read`](Self::read), optionally skipping `after_deserialization` hooks.
    pub fn read_with<T: DataType>(
        &self,
        node: &DataNode,
        context: Option<&SerializationContext>,
        skip_hooks: bool,
    ) -> Result<Decoded<T>, DecodeError> {
        self.cx(context, skip_hooks).read::<T>(node)
    }

    /// Reads `node` as a `T`, dropping the result tree.
    #[inline]
    pub fn read_value<T: DataType>(
        &self,
        node: &DataNode,
        context: Option<&SerializationContext>,
    ) -> Result<T, DecodeError> {
        self.read::<T>(node, context).map(|decoded| decoded.value)
    }

    /// Reads `node` into an existing instance.
    ///
    /// Fields whose tag is absent keep their current value. The returned
    /// result records which fields `node` mapped.
    ///
    /// # Errors
    ///
    /// As [`read`](Self::read). `target` may be partly updated on failure.
    pub fn populate<T: DataDefinition>(
        &self,
        target: &mut T,
        node: &MappingNode,
        context: Option<&SerializationContext>,
        skip_hooks: bool,
    ) -> Result<ResultNode, DecodeError> {
        let schema = self.schema::<T>()?;
        let fields = crate::engine::populate(self.cx(context, skip_hooks), &schema, target, node)?;
        let result = DefinitionResult::new(Box::new(target.clone()), schema, fields);
        Ok(ResultNode::Definition(result))
    }

    /// Writes `value` to a node.
    ///
    /// Fields equal to their default are omitted unless `always_write` is
    /// set or the field is required.
    ///
    /// # Errors
    ///
    /// A codec without write support, or an included field that did not
    /// write a mapping.
    pub fn write<T: DataType>(
        &self,
        value: &T,
        always_write: bool,
        context: Option<&SerializationContext>,
    ) -> Result<DataNode, EncodeError> {
        self.cx(context, false).write(value, always_write)
    }

    /// Deep-copies `source` into `target`, reusing what `target` already holds.
    pub fn copy<T: DataType>(
        &self,
        source: &T,
        target: &mut T,
        context: Option<&SerializationContext>,
    ) -> Result<(), CopyError> {
        self.cx(context, false).copy(source, target)
    }

    /// Returns a deep copy of `source` that shares no state with it.
    pub fn create_copy<T: DataType>(
        &self,
        source: &T,
        context: Option<&SerializationContext>,
    ) -> Result<T, CopyError> {
        self.cx(context, false).create_copy(source)
    }

    /// Validates `node` as a `T` without creating one.
    ///
    /// Never fails: every problem is an error node in the returned tree.
    pub fn validate<T: DataType>(
        &self,
        node: &DataNode,
        context: Option<&SerializationContext>,
    ) -> ValidationNode {
        self.cx(context, false).validate::<T>(node)
    }

    /// Merges `child` over `parent`. See [`ResultNode::push_inheritance_from`].
    #[inline]
    pub fn push_inheritance(
        &self,
        child: &ResultNode,
        parent: &ResultNode,
    ) -> Result<ResultNode, MergeError> {
        child.push_inheritance_from(parent)
    }

    /// Merges a chain of results ordered from root to leaf.
    ///
    /// Returns `None` for an empty chain.
    pub fn push_inheritance_chain(
        &self,
        chain: &[ResultNode],
    ) -> Result<Option<ResultNode>, MergeError> {
        let Some((root, rest)) = chain.split_first() else {
            return Ok(None);
        };
        let mut merged = root.clone();
        for child in rest {
            merged = child.push_inheritance_from(&merged)?;
        }
        Ok(Some(merged))
    }
}

impl Default for SerializationManager {
    #[inline]
    fn default() -> Self {
        Self::new(SerializationConfig::DEFAULT)
    }
}

impl fmt::Debug for SerializationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializationManager")
            .field("config", &self.config)
            .field("codecs", &self.codecs)
            .field("schemas", &self.schemas)
            .field("components", &self.components.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::SerializationManager;
    use crate::SerializationConfig;
    use crate::node::DataNode;

    #[test]
    fn primitives_are_optional() {
        let manager = SerializationManager::new(SerializationConfig::new().with_register_primitives(false));
        assert_eq!(manager.codecs().len(), 0);
        // Still usable: codecs are inserted on first use.
        assert_eq!(manager.read_value::<u8>(&DataNode::scalar("7"), None), Ok(7));
        assert_eq!(manager.codecs().len(), 1);
    }

    #[test]
    fn inheritance_chain() {
        let manager = SerializationManager::default();
        let read = |json: &str| {
            let node: DataNode = serde_json::from_str(json).unwrap();
            manager.read::<BTreeMap<String, u32>>(&node, None).unwrap().result
        };
        let chain = [read(r#"{"a":"1"}"#), read(r#"{"b":"2"}"#), read(r#"{"a":"3"}"#)];

        let merged = manager.push_inheritance_chain(&chain).unwrap().unwrap();
        let merged = merged.take::<BTreeMap<String, u32>>().unwrap();
        assert_eq!(merged, BTreeMap::from([("a".into(), 3), ("b".into(), 2)]));

        assert!(manager.push_inheritance_chain(&[]).unwrap().is_none());
    }
}
