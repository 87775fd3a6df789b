//! Derive macro for `vc_serial`. See [`DataDefinition`](derive_data_definition).
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

static DATADEF_ATTRIBUTE_NAME: &str = "datadef";
static DATAFIELD_ATTRIBUTE_NAME: &str = "datafield";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;
mod utils;

// -----------------------------------------------------------------------------
// Macros

/// Implements `DataType` and `DataDefinition` for a struct with named fields.
///
/// Every field takes part unless marked `skip`, and its type must implement
/// `DataType`. The struct must implement `Clone`, `PartialEq`, `Debug` and
/// `Default`.
///
/// ```rust, ignore
/// #[derive(DataDefinition, Debug, Clone, PartialEq, Default)]
/// #[datadef(auto_register, hook = Self::rebuild_cache)]
/// struct Weapon {
///     #[datafield(required, priority = 10)]
///     id: String,
///     #[datafield(tag = "dmg")]
///     damage: f32,
///     #[datafield(inherit = "always")]
///     tags: Vec<String>,
///     #[datafield(include)]
///     stats: Stats,
///     #[datafield(server_only)]
///     loot_weight: u32,
///     #[datafield(codec = ColorCodec)]
///     tint: Color,
///     #[datafield(skip)]
///     cache: Vec<u8>,
/// }
/// ```
///
/// Field attributes:
///
/// - `tag = "..."`: document key. Defaults to the field name in lowerCamel.
/// - `priority = N`: higher priorities are processed first.
/// - `inherit = "default" | "always" | "never"`.
/// - `required`, `read_only`, `server_only`.
/// - `include`: the field is read from and written to the enclosing mapping.
/// - `codec = Path`: a `TypeCodec<FieldType> + Default` overriding the
///   capabilities it declares.
/// - `skip`: not part of the definition; reads leave it at its default.
///
/// Type attributes:
///
/// - `auto_register`: collected by `SerializationManager::auto_register`.
///   Non-generic types only.
/// - `hook = path`: a `fn(&mut Self)` run after every read and merge.
#[proc_macro_derive(DataDefinition, attributes(datadef, datafield))]
pub fn derive_data_definition(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let def = match derive_data::DefinitionStruct::from_input(&ast) {
        Ok(def) => def,
        Err(err) => return err.into_compile_error().into(),
    };

    let auto_register = match impls::get_auto_register_impl(&def) {
        Ok(tokens) => tokens,
        Err(err) => return err.into_compile_error().into(),
    };
    let data_type = impls::impl_data_type(&def);
    let data_definition = impls::impl_data_definition(&def);

    quote! {
        const _: () = {
            #data_type

            #data_definition

            #auto_register
        };
    }
    .into()
}
