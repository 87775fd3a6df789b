//! Parsing of the derive input.

// -----------------------------------------------------------------------------
// Modules

mod definition_struct;
mod field_attributes;
mod type_attributes;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use definition_struct::{DefinitionField, DefinitionStruct};
pub(crate) use field_attributes::{FieldAttributes, Inheritance};
pub(crate) use type_attributes::TypeAttributes;
