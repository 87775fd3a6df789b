//! Paths into `vc_serial` used by generated code.
//!
//! Kept in one place so that moving an item in `vc_serial` only touches
//! this file.

use proc_macro2::TokenStream;
use quote::quote;

// -----------------------------------------------------------------------------
// Crate Path

/// The path of `vc_serial` as seen from the crate being expanded.
///
/// 1. For crates that depend on `vc_serial`, `::vc_serial`.
/// 2. For crates that depend on `vc_data`, `::vc_data::serial`.
/// 3. Otherwise `::vc_serial`, which is what `vc_serial` itself and its
///    tests need.
///
/// Reads the caller's Cargo.toml, so it is resolved once per expansion and
/// passed around.
pub(crate) fn vc_serial() -> syn::Path {
    vc_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("vc_serial"))
}

// -----------------------------------------------------------------------------
// Items

#[inline(always)]
pub(crate) fn macro_exports_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_serial_path::__macro_exports
    }
}

#[cfg(feature = "auto_register")]
#[inline(always)]
pub(crate) fn auto_register_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_serial_path::__macro_exports::auto_register
    }
}

#[inline(always)]
pub(crate) fn data_type_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_serial_path::DataType
    }
}

#[inline(always)]
pub(crate) fn data_definition_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_serial_path::DataDefinition
    }
}

#[inline(always)]
pub(crate) fn value_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_serial_path::Value
    }
}

#[inline(always)]
pub(crate) fn dyn_codec_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_serial_path::codec::DynCodec
    }
}

#[inline(always)]
pub(crate) fn codec_registry_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_serial_path::codec::CodecRegistry
    }
}

#[inline(always)]
pub(crate) fn definition_info_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_serial_path::schema::DefinitionInfo
    }
}

#[inline(always)]
pub(crate) fn field_descriptor_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_serial_path::schema::FieldDescriptor
    }
}

#[inline(always)]
pub(crate) fn inheritance_policy_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_serial_path::schema::InheritancePolicy
    }
}
