use proc_macro2::TokenStream;

use crate::derive_data::DefinitionStruct;

/// Submits the type to `inventory` for `SerializationManager::auto_register`.
#[cfg(feature = "auto_register")]
pub(crate) fn get_auto_register_impl(def: &DefinitionStruct) -> syn::Result<TokenStream> {
    let Some(span) = def.attrs.auto_register else {
        return Ok(crate::utils::empty());
    };
    if def.is_generic() {
        return Err(syn::Error::new(span, "`auto_register` needs a non-generic type"));
    }

    use quote::quote_spanned;

    let auto_register_ = crate::path::auto_register_(def.vc_serial_path());
    let ident = def.ident;

    Ok(quote_spanned! { span =>
        #auto_register_::inventory::submit! {
            #auto_register_::AutoRegisterFn(#auto_register_::register_type::<#ident>)
        }
    })
}

#[cfg(not(feature = "auto_register"))]
pub(crate) fn get_auto_register_impl(_: &DefinitionStruct) -> syn::Result<TokenStream> {
    Ok(crate::utils::empty())
}
