// -----------------------------------------------------------------------------
// Modules

mod auto_register;
mod data_definition;
mod data_type;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use auto_register::get_auto_register_impl;
pub(crate) use data_definition::impl_data_definition;
pub(crate) use data_type::impl_data_type;
