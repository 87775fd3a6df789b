//! Items used by generated code. Not public API.

pub use alloc::sync::Arc;

use crate::codec::{DefinitionCodec, DynCodec};
use crate::schema::DataDefinition;

/// The default codec of a derived data definition.
#[inline]
pub fn definition_codec<T: DataDefinition>() -> Arc<dyn DynCodec> {
    DefinitionCodec::<T>::shared()
}

pub use crate::schema::custom_codec;

#[cfg(feature = "auto_register")]
pub mod auto_register {
    use crate::codec::{CodecAdapter, CodecCaps, CodecRegistry, DynCodec, TypeCodec};
    use crate::value::DataType;

    pub use inventory;

    /// Collected by `#[datadef(auto_register)]`.
    pub struct AutoRegisterFn(pub fn(&mut CodecRegistry));

    inventory::collect!(AutoRegisterFn);

    /// Marks that collection ran on this platform.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct AvailableFlag;

    struct FlagCodec;

    impl TypeCodec<AvailableFlag> for FlagCodec {
        fn capabilities(&self) -> CodecCaps {
            CodecCaps::empty()
        }
    }

    impl DataType for AvailableFlag {
        fn default_codec() -> super::Arc<dyn DynCodec> {
            CodecAdapter::shared(FlagCodec)
        }
    }

    inventory::submit! { AutoRegisterFn(register_type::<AvailableFlag>) }

    #[inline]
    pub fn register_type<T: DataType>(registry: &mut CodecRegistry) {
        registry.register::<T>();
    }

    /// Runs every collected registration. Returns whether any ran.
    pub fn register_types(registry: &mut CodecRegistry) -> bool {
        use core::any::TypeId;

        if registry.contains(TypeId::of::<AvailableFlag>()) {
            return true;
        }
        for item in inventory::iter::<AutoRegisterFn> {
            (item.0)(registry);
        }
        registry.contains(TypeId::of::<AvailableFlag>())
    }
}
