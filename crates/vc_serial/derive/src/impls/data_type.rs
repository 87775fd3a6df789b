use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::DefinitionStruct;

/// `DataType` with the definition codec. Registering the type notes it as a
/// definition and registers every field type.
pub(crate) fn impl_data_type(def: &DefinitionStruct) -> TokenStream {
    let vc_serial_path = def.vc_serial_path();
    let data_type_ = crate::path::data_type_(vc_serial_path);
    let dyn_codec_ = crate::path::dyn_codec_(vc_serial_path);
    let codec_registry_ = crate::path::codec_registry_(vc_serial_path);
    let macro_exports_ = crate::path::macro_exports_(vc_serial_path);

    let ident = def.ident;
    let generics = def.bounded_generics();
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let field_types = def.fields.iter().map(|field| field.ty);

    quote! {
        impl #impl_generics #data_type_ for #ident #ty_generics #where_clause {
            fn default_codec() -> #macro_exports_::Arc<dyn #dyn_codec_> {
                #macro_exports_::definition_codec::<Self>()
            }

            fn register_dependencies(registry: &mut #codec_registry_) {
                registry.note_definition::<Self>();
                #( registry.register::<#field_types>(); )*
            }
        }
    }
}
