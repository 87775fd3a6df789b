#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// Generated code names `vc_serial`; inside this crate that must resolve too.
extern crate self as vc_serial;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod manager;
mod utils;
mod value;

pub mod codec;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod node;
pub mod result;
pub mod schema;
pub mod validation;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use config::SerializationConfig;
pub use context::SerializationContext;
pub use manager::SerializationManager;
pub use schema::DataDefinition;
pub use value::{DataType, Value};

/// Derives [`DataType`] and [`DataDefinition`] for a struct with named fields.
///
/// # Container attributes: `#[datadef(...)]`
///
/// - `auto_register`: collect the type for [`SerializationManager::auto_register`].
/// - `hook = path`: a `fn(&mut Self)` run after every read and every merge.
///
/// # Field attributes: `#[datafield(...)]`
///
/// - `tag = "name"`: tag used in documents, instead of the lowerCamel field name.
/// - `priority = N`: higher priorities are read first and win on write.
/// - `inherit = "always" | "never"`: the field's [`InheritancePolicy`](schema::InheritancePolicy).
/// - `required`, `read_only`, `server_only`: field flags.
/// - `include`: read the field from the enclosing mapping.
/// - `codec = Path`: a custom codec type implementing `TypeCodec<FieldType> + Default`.
/// - `skip`: not part of the definition.
pub use vc_serial_derive::DataDefinition;
