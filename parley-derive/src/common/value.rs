use darling::FromAttributes as _;
use heck::ToKebabCase as _;
use syn::{Fields, Ident, Variant, spanned::Spanned as _};

#[derive(darling::FromAttributes, Debug, Default)]
#[darling(attributes(parley))]
struct RawVariantAttr {
    rename: Option<String>,
}

/// The unit variants of a choice enum, with the name each is spelled as on
/// the command line
pub struct AnalyzedEnum<'a> {
    pub variants: Vec<(String, &'a Ident)>,
}

impl<'a> AnalyzedEnum<'a> {
    pub fn from_variants(variants: impl IntoIterator<Item = &'a Variant>) -> syn::Result<Self> {
        let mut collected: Vec<(String, &Ident)> = Vec::new();

        for variant in variants {
            if !matches!(variant.fields, Fields::Unit) {
                return Err(syn::Error::new(
                    variant.span(),
                    "choice variants can't have fields",
                ));
            }

            let attr = RawVariantAttr::from_attributes(&variant.attrs)?;
            let name = attr
                .rename
                .unwrap_or_else(|| variant.ident.to_string().to_kebab_case());

            if collected.iter().any(|(existing, _)| *existing == name) {
                return Err(syn::Error::new(
                    variant.span(),
                    format!("more than one variant is named {name:?}"),
                ));
            }

            collected.push((name, &variant.ident));
        }

        if collected.is_empty() {
            return Err(syn::Error::new(
                proc_macro2::Span::call_site(),
                "a choice needs at least one variant",
            ));
        }

        Ok(AnalyzedEnum {
            variants: collected,
        })
    }
}
