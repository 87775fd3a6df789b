use alloc::sync::Arc;
use core::any::TypeId;
use core::fmt;
use std::sync::{PoisonError, RwLock};

use super::{CodecAdapter, DynCodec, TypeCodec};
use crate::error::SchemaError;
use crate::manager::SerializationManager;
use crate::schema::{DataDefinition, TypeSchema};
use crate::utils::{TypeIdMap, new_type_id_map};
use crate::value::DataType;

// -----------------------------------------------------------------------------
// DefinitionEntry

/// A data definition known to a registry, built by `initialize`.
#[derive(Clone, Copy)]
pub(crate) struct DefinitionEntry {
    pub type_path: &'static str,
    pub build: fn(&SerializationManager) -> Result<Arc<TypeSchema>, SchemaError>,
}

fn build_schema<T: DataDefinition>(
    manager: &SerializationManager,
) -> Result<Arc<TypeSchema>, SchemaError> {
    manager.schema::<T>()
}

// -----------------------------------------------------------------------------
// CodecRegistry

/// Maps declared types to their codecs.
///
/// Codecs registered through `&mut self` during setup are read without
/// locking. A type first seen at run time gets its
/// [default codec](DataType::default_codec) inserted into a separate map
/// guarded by an `RwLock`.
///
/// # Examples
///
/// ```
/// use core::any::TypeId;
/// use vc_serial::codec::CodecRegistry;
///
/// let mut registry = CodecRegistry::new();
/// assert!(registry.register::<Vec<u8>>());
/// // Element types are registered as dependencies.
/// assert!(registry.contains(TypeId::of::<u8>()));
/// // Already present.
/// assert!(!registry.register::<Vec<u8>>());
/// ```
pub struct CodecRegistry {
    codecs: TypeIdMap<Arc<dyn DynCodec>>,
    late: RwLock<TypeIdMap<Arc<dyn DynCodec>>>,
    definitions: Vec<DefinitionEntry>,
    definition_ids: TypeIdMap<()>,
}

impl CodecRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            codecs: new_type_id_map(),
            late: RwLock::new(new_type_id_map()),
            definitions: Vec::new(),
            definition_ids: new_type_id_map(),
        }
    }

    /// Creates a registry holding the codecs of all primitives and `String`.
    pub fn with_primitives() -> Self {
        let mut registry = Self::new();
        super::primitives::register_primitives(&mut registry);
        registry
    }

    /// Registers `T` with its default codec, then its dependencies.
    ///
    /// Returns `false` if `T` already had a codec; nothing changes then.
    pub fn register<T: DataType>(&mut self) -> bool {
        let type_id = TypeId::of::<T>();
        if self.codecs.contains_key(&type_id) {
            return false;
        }
        self.codecs.insert(type_id, T::default_codec());
        T::register_dependencies(self);
        true
    }

    /// Registers `codec` for `T`, replacing any previous codec.
    pub fn register_codec<T: DataType, C: TypeCodec<T>>(&mut self, codec: C) {
        let fresh = !self.codecs.contains_key(&TypeId::of::<T>());
        if self.insert_dyn(CodecAdapter::shared(codec)).is_some() {
            log::warn!("replacing the codec of `{}`", T::type_path());
        }
        if fresh {
            T::register_dependencies(self);
        }
    }

    /// Inserts an erased codec under its value type.
    pub fn insert_dyn(&mut self, codec: Arc<dyn DynCodec>) -> Option<Arc<dyn DynCodec>> {
        self.codecs.insert(codec.value_type_id(), codec)
    }

    /// Records `T` as a data definition so that `initialize` builds it.
    ///
    /// Called from the generated `register_dependencies`.
    pub fn note_definition<T: DataDefinition>(&mut self) {
        if self.definition_ids.insert(TypeId::of::<T>(), ()).is_none() {
            self.definitions.push(DefinitionEntry {
                type_path: T::type_path(),
                build: build_schema::<T>,
            });
        }
    }

    pub fn contains(&self, type_id: TypeId) -> bool {
        self.codecs.contains_key(&type_id)
            || self
                .late
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .contains_key(&type_id)
    }

    /// Returns the codec for `type_id`, if any.
    pub fn get(&self, type_id: TypeId) -> Option<Arc<dyn DynCodec>> {
        if let Some(codec) = self.codecs.get(&type_id) {
            return Some(codec.clone());
        }
        self.late
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .cloned()
    }

    /// Returns the codec for `T`, inserting its default codec on first use.
    #[inline]
    pub fn get_or_register<T: DataType>(&self) -> Arc<dyn DynCodec> {
        self.get_or_insert_with(TypeId::of::<T>(), T::default_codec)
    }

    pub(crate) fn get_or_insert_with(
        &self,
        type_id: TypeId,
        make: fn() -> Arc<dyn DynCodec>,
    ) -> Arc<dyn DynCodec> {
        if let Some(codec) = self.get(type_id) {
            return codec;
        }
        let mut late = self.late.write().unwrap_or_else(PoisonError::into_inner);
        late.entry(type_id)
            .or_insert_with(|| {
                let codec = make();
                log::debug!("registered codec for `{}` on first use", codec.value_type_path());
                codec
            })
            .clone()
    }

    /// Number of codecs, including those inserted on first use.
    pub fn len(&self) -> usize {
        self.codecs.len() + self.late.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub(crate) fn definitions(&self) -> &[DefinitionEntry] {
        &self.definitions
    }
}

impl Default for CodecRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("codecs", &self.len())
            .field("definitions", &self.definitions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use core::any::TypeId;

    use super::CodecRegistry;
    use crate::codec::{CodecCaps, TypeCodec};

    #[test]
    fn register_recurses_once() {
        let mut registry = CodecRegistry::new();
        assert!(registry.register::<Vec<Option<String>>>());
        assert!(registry.contains(TypeId::of::<Option<String>>()));
        assert!(registry.contains(TypeId::of::<String>()));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn late_registration() {
        let registry = CodecRegistry::new();
        assert!(registry.get(TypeId::of::<u16>()).is_none());
        let a = registry.get_or_register::<u16>();
        let b = registry.get_or_register::<u16>();
        assert!(alloc::sync::Arc::ptr_eq(&a, &b));
        assert_eq!(a.value_type_path(), "u16");
    }

    #[test]
    fn override_codec() {
        #[derive(Default)]
        struct WriteOnly;
        impl TypeCodec<u8> for WriteOnly {
            fn capabilities(&self) -> CodecCaps {
                CodecCaps::WRITE
            }
        }

        let mut registry = CodecRegistry::with_primitives();
        registry.register_codec::<u8, _>(WriteOnly);
        let codec = registry.get(TypeId::of::<u8>()).unwrap();
        assert_eq!(codec.capabilities(), CodecCaps::WRITE);
    }
}
