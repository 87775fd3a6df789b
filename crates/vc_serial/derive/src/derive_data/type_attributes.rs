use proc_macro2::Span;
use syn::{Attribute, Path, spanned::Spanned};

use crate::DATADEF_ATTRIBUTE_NAME;

/// Attributes in `#[datadef(...)]` on the type.
#[derive(Default, Debug)]
pub(crate) struct TypeAttributes {
    /// `auto_register`
    pub auto_register: Option<Span>,
    /// `hook = path`, a `fn(&mut Self)`.
    pub hook: Option<Path>,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(DATADEF_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("auto_register") {
                    if parsed.auto_register.is_some() {
                        return Err(meta.error("duplicate `auto_register`"));
                    }
                    parsed.auto_register = Some(meta.path.span());
                    Ok(())
                } else if meta.path.is_ident("hook") {
                    if parsed.hook.is_some() {
                        return Err(meta.error("duplicate `hook`"));
                    }
                    parsed.hook = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("unknown `datadef` attribute, expected `auto_register` or `hook`"))
                }
            })?;
        }
        Ok(parsed)
    }
}
