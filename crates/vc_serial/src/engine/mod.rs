//! Schema-driven operations on data definitions.
//!
//! Each function walks the fields of a [`TypeSchema`] and delegates every
//! field to its codec, so no per-call reflection happens. They back
//! [`DefinitionCodec`](crate::codec::DefinitionCodec) and are usable on
//! their own with an erased instance.
//!
//! [`TypeSchema`]: crate::schema::TypeSchema

// -----------------------------------------------------------------------------
// Modules

mod copy;
mod populate;
mod serialize;
mod validate;

// -----------------------------------------------------------------------------
// Exports

pub use copy::copy;
pub use populate::populate;
pub use serialize::serialize;
pub use validate::validate;

use crate::error::ValueMismatch;
use crate::schema::TypeSchema;
use crate::value::Value;

#[inline]
fn owner_mismatch(schema: &TypeSchema, owner: &dyn Value) -> ValueMismatch {
    ValueMismatch::new(schema.type_path(), owner.value_type_path())
}
