use proc_macro2::Span;
use syn::{Attribute, Expr, LitStr, Path, meta::ParseNestedMeta, spanned::Spanned};

use crate::DATAFIELD_ATTRIBUTE_NAME;

/// `#[datafield(inherit = "...")]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Inheritance {
    Default,
    Always,
    Never,
}

/// Attributes in `#[datafield(...)]` on a field.
#[derive(Default, Debug)]
pub(crate) struct FieldAttributes {
    pub tag: Option<LitStr>,
    /// Any `i32` expression, so negative priorities work.
    pub priority: Option<Expr>,
    pub inheritance: Option<(Inheritance, Span)>,
    pub required: Option<Span>,
    pub read_only: Option<Span>,
    pub server_only: Option<Span>,
    pub include: Option<Span>,
    pub codec: Option<Path>,
    pub skip: Option<Span>,
}

fn set_flag(slot: &mut Option<Span>, meta: &ParseNestedMeta) -> syn::Result<()> {
    if slot.is_some() {
        return Err(meta.error("duplicate flag"));
    }
    *slot = Some(meta.path.span());
    Ok(())
}

fn set_value<T>(slot: &mut Option<T>, meta: &ParseNestedMeta, value: T) -> syn::Result<()> {
    if slot.is_some() {
        return Err(meta.error("duplicate attribute"));
    }
    *slot = Some(value);
    Ok(())
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(DATAFIELD_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| parsed.parse_meta(&meta))?;
        }
        parsed.check()?;
        Ok(parsed)
    }

    fn parse_meta(&mut self, meta: &ParseNestedMeta) -> syn::Result<()> {
        let Some(ident) = meta.path.get_ident() else {
            return Err(meta.error("expected an identifier"));
        };
        match ident.to_string().as_str() {
            "tag" => {
                let tag: LitStr = meta.value()?.parse()?;
                if tag.value().is_empty() {
                    return Err(syn::Error::new(tag.span(), "tag cannot be empty"));
                }
                set_value(&mut self.tag, meta, tag)
            }
            "priority" => {
                let priority: Expr = meta.value()?.parse()?;
                set_value(&mut self.priority, meta, priority)
            }
            "inherit" => {
                let lit: LitStr = meta.value()?.parse()?;
                let inheritance = match lit.value().as_str() {
                    "default" => Inheritance::Default,
                    "always" => Inheritance::Always,
                    "never" => Inheritance::Never,
                    _ => {
                        return Err(syn::Error::new(
                            lit.span(),
                            "expected \"default\", \"always\" or \"never\"",
                        ));
                    }
                };
                set_value(&mut self.inheritance, meta, (inheritance, lit.span()))
            }
            "codec" => {
                let codec: Path = meta.value()?.parse()?;
                set_value(&mut self.codec, meta, codec)
            }
            "required" => set_flag(&mut self.required, meta),
            "read_only" => set_flag(&mut self.read_only, meta),
            "server_only" => set_flag(&mut self.server_only, meta),
            "include" => set_flag(&mut self.include, meta),
            "skip" => set_flag(&mut self.skip, meta),
            _ => Err(meta.error("unknown `datafield` attribute")),
        }
    }

    fn check(&self) -> syn::Result<()> {
        if let (Some(span), Some(tag)) = (self.include, &self.tag) {
            let mut err = syn::Error::new(span, "an included field has no tag");
            err.combine(syn::Error::new(tag.span(), "tag given here"));
            return Err(err);
        }
        if let (Some(span), Some(_)) = (self.include, self.required) {
            return Err(syn::Error::new(span, "an included field cannot be required"));
        }
        Ok(())
    }
}
