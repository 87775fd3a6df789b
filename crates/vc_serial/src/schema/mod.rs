//! Type schemas.
//!
//! A [`DataDefinition`] lists its fields once as [`FieldDescriptor`]s. The
//! [`SchemaBuilder`] turns that list into a [`TypeSchema`]: fields sorted by
//! priority, tags resolved, default values captured from a default instance
//! and codecs resolved. Schemas are built lazily, once per type, and cached
//! in a [`SchemaRegistry`].
//!
//! # Examples
//!
//! Without the derive macro:
//!
//! ```
//! use vc_serial::schema::{DataDefinition, DefinitionInfo, FieldDescriptor};
//! use vc_serial::{DataType, SerializationManager, Value};
//!
//! #[derive(Debug, Clone, PartialEq, Default)]
//! struct Health {
//!     max_value: u32,
//! }
//!
//! impl DataType for Health {
//!     fn default_codec() -> std::sync::Arc<dyn vc_serial::codec::DynCodec> {
//!         vc_serial::codec::DefinitionCodec::<Self>::shared()
//!     }
//! }
//!
//! impl DataDefinition for Health {
//!     fn definition() -> DefinitionInfo {
//!         DefinitionInfo::new::<Self>().with_field(
//!             FieldDescriptor::new::<u32>("max_value").with_accessors(
//!                 |obj| obj.downcast_ref::<Self>().map(|o| &o.max_value as &dyn Value),
//!                 |obj| obj.downcast_mut::<Self>().map(|o| &mut o.max_value as &mut dyn Value),
//!             ),
//!         )
//!     }
//! }
//!
//! let manager = SerializationManager::default();
//! let schema = manager.schema::<Health>().unwrap();
//! assert_eq!(schema.fields()[0].tag(), Some("maxValue"));
//! ```

use crate::value::DataType;

// -----------------------------------------------------------------------------
// Modules

mod builder;
mod descriptor;
mod field;
mod registry;
mod tag;
mod type_schema;

// -----------------------------------------------------------------------------
// Exports

pub use builder::SchemaBuilder;
pub use descriptor::{DefinitionInfo, FieldDescriptor, FieldGetter, FieldGetterMut, custom_codec};
pub use field::FieldDefinition;
pub use registry::SchemaRegistry;
pub use tag::lower_camel;
pub use type_schema::TypeSchema;

// -----------------------------------------------------------------------------
// InheritancePolicy

/// How a field set by a child document combines with the parent's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InheritancePolicy {
    /// A set field replaces the parent's value; an unset field inherits it.
    #[default]
    Default,
    /// A set field is merged over the parent's value.
    Always,
    /// The field never inherits, set or not.
    Never,
}

// -----------------------------------------------------------------------------
// FieldFlags

bitflags::bitflags! {
    /// Per-field flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FieldFlags: u8 {
        /// Reading fails if the tag is missing. Always written.
        const REQUIRED = 1 << 0;
        /// Read but never written.
        const READ_ONLY = 1 << 1;
        /// Only read and written by an authoritative peer.
        const SERVER_ONLY = 1 << 2;
    }
}

// -----------------------------------------------------------------------------
// DataDefinition

/// A type read from and written to mappings, one field per tag.
///
/// Usually implemented with `#[derive(DataDefinition)]`.
pub trait DataDefinition: DataType + Default {
    /// The fields of this type, in declaration order.
    fn definition() -> DefinitionInfo;

    /// Runs after the value was read, or rebuilt by an inheritance merge.
    fn after_deserialization(&mut self) {}
}
