use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};

use crate::derive_data::{DefinitionField, DefinitionStruct, Inheritance};

/// `DataDefinition::definition()`, one `FieldDescriptor` per field, plus the
/// hook if one was named.
pub(crate) fn impl_data_definition(def: &DefinitionStruct) -> TokenStream {
    let vc_serial_path = def.vc_serial_path();
    let data_definition_ = crate::path::data_definition_(vc_serial_path);
    let definition_info_ = crate::path::definition_info_(vc_serial_path);

    let ident = def.ident;
    let mut generics = def.bounded_generics();
    generics
        .make_where_clause()
        .predicates
        .push(syn::parse_quote!(Self: ::core::default::Default));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = def.fields.iter().map(|field| field_descriptor(def, field));

    let hook = def.attrs.hook.as_ref().map(|hook| {
        quote! {
            fn after_deserialization(&mut self) {
                #hook(self)
            }
        }
    });

    quote! {
        impl #impl_generics #data_definition_ for #ident #ty_generics #where_clause {
            fn definition() -> #definition_info_ {
                #definition_info_::new::<Self>()
                    #( .with_field(#fields) )*
            }

            #hook
        }
    }
}

fn field_descriptor(def: &DefinitionStruct, field: &DefinitionField) -> TokenStream {
    let vc_serial_path = def.vc_serial_path();
    let field_descriptor_ = crate::path::field_descriptor_(vc_serial_path);
    let inheritance_policy_ = crate::path::inheritance_policy_(vc_serial_path);
    let macro_exports_ = crate::path::macro_exports_(vc_serial_path);
    let value_ = crate::path::value_(vc_serial_path);

    let member = field.ident;
    let name = member.to_string();
    let ty = field.ty;
    let attrs = &field.attrs;

    let tag = attrs.tag.as_ref().map(|tag| quote!(.with_tag(#tag)));
    let priority = attrs.priority.as_ref().map(|priority| quote!(.with_priority(#priority)));
    let inheritance = attrs.inheritance.map(|(inheritance, span)| {
        let variant = match inheritance {
            Inheritance::Default => quote_spanned!(span => Default),
            Inheritance::Always => quote_spanned!(span => Always),
            Inheritance::Never => quote_spanned!(span => Never),
        };
        quote!(.with_inheritance(#inheritance_policy_::#variant))
    });
    let required = attrs.required.map(|span| quote_spanned!(span => .required()));
    let read_only = attrs.read_only.map(|span| quote_spanned!(span => .read_only()));
    let server_only = attrs.server_only.map(|span| quote_spanned!(span => .server_only()));
    let include = attrs.include.map(|span| quote_spanned!(span => .included()));
    let codec = attrs
        .codec
        .as_ref()
        .map(|codec| quote!(.with_custom_codec(#macro_exports_::custom_codec::<#ty, #codec>)));

    quote! {
        #field_descriptor_::new::<#ty>(#name)
            .with_accessors(
                |owner| ::core::option::Option::Some(
                    &owner.downcast_ref::<Self>()?.#member as &dyn #value_
                ),
                |owner| ::core::option::Option::Some(
                    &mut owner.downcast_mut::<Self>()?.#member as &mut dyn #value_
                ),
            )
            #tag
            #priority
            #inheritance
            #required
            #read_only
            #server_only
            #include
            #codec
    }
}
