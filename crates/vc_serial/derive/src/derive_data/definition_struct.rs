use syn::{Data, DeriveInput, Fields, GenericParam, Generics, Ident, Path, Type, parse_quote};

use super::{FieldAttributes, TypeAttributes};

/// A struct field taking part in the definition.
pub(crate) struct DefinitionField<'a> {
    pub ident: &'a Ident,
    pub ty: &'a Type,
    pub attrs: FieldAttributes,
}

/// A struct with named fields, ready for code generation.
pub(crate) struct DefinitionStruct<'a> {
    vc_serial_path: Path,
    pub ident: &'a Ident,
    pub generics: Generics,
    pub attrs: TypeAttributes,
    pub fields: Vec<DefinitionField<'a>>,
}

impl<'a> DefinitionStruct<'a> {
    pub fn from_input(input: &'a DeriveInput) -> syn::Result<Self> {
        let Data::Struct(data) = &input.data else {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "`DataDefinition` can only be derived for structs",
            ));
        };
        let Fields::Named(named) = &data.fields else {
            return Err(syn::Error::new_spanned(
                &data.fields,
                "`DataDefinition` needs named fields",
            ));
        };

        let attrs = TypeAttributes::parse_attrs(&input.attrs)?;

        let mut errors: Option<syn::Error> = None;
        let mut fields = Vec::with_capacity(named.named.len());
        for field in &named.named {
            match FieldAttributes::parse_attrs(&field.attrs) {
                Ok(field_attrs) if field_attrs.skip.is_some() => {}
                Ok(field_attrs) => fields.push(DefinitionField {
                    // Named fields always have an ident.
                    ident: field.ident.as_ref().unwrap_or(&input.ident),
                    ty: &field.ty,
                    attrs: field_attrs,
                }),
                Err(err) => match &mut errors {
                    Some(errors) => errors.combine(err),
                    None => errors = Some(err),
                },
            }
        }
        if let Some(errors) = errors {
            return Err(errors);
        }

        Ok(Self {
            vc_serial_path: crate::path::vc_serial(),
            ident: &input.ident,
            generics: input.generics.clone(),
            attrs,
            fields,
        })
    }

    #[inline]
    pub fn vc_serial_path(&self) -> &Path {
        &self.vc_serial_path
    }

    /// Whether the type has type or const parameters.
    pub fn is_generic(&self) -> bool {
        self.generics
            .params
            .iter()
            .any(|param| !matches!(param, GenericParam::Lifetime(_)))
    }

    /// Generics with `DataType` required of every type parameter.
    pub fn bounded_generics(&self) -> Generics {
        let data_type_ = crate::path::data_type_(&self.vc_serial_path);
        let mut generics = self.generics.clone();
        let params: Vec<Ident> = generics
            .type_params()
            .map(|param| param.ident.clone())
            .collect();
        let where_clause = generics.make_where_clause();
        for ident in params {
            where_clause.predicates.push(parse_quote!(#ident: #data_type_));
        }
        generics
    }
}
