use darling::FromAttributes as _;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, spanned::Spanned};

use crate::{common::value::AnalyzedEnum, generics::reject_generics};

#[derive(darling::FromAttributes, Debug)]
#[darling(attributes(parley))]
struct RawChoiceAttr {
    /// Match variant names exactly, rather than ignoring case
    literal: Option<()>,
}

pub fn derive_choice_result(item: TokenStream2) -> syn::Result<TokenStream2> {
    let input: DeriveInput = syn::parse2(item)?;
    reject_generics(&input.generics, "Choice")?;

    let data = match input.data {
        Data::Enum(ref data) => data,
        _ => {
            return Err(syn::Error::new(
                input.span(),
                "`Choice` can only be derived on an enum of unit variants",
            ));
        }
    };

    let attr = RawChoiceAttr::from_attributes(&input.attrs)?;
    let analyzed = AnalyzedEnum::from_variants(&data.variants)?;
    let ident = &input.ident;
    let type_name = ident.to_string();

    let names: Vec<&str> = analyzed.variants.iter().map(|(name, _)| name.as_str()).collect();

    let descriptor = match attr.literal {
        Some(()) => quote! { ::parley::Ty::literal([ #(#names),* ]) },
        None => quote! { ::parley::Ty::enumeration(#type_name, [ #(#names),* ]) },
    };

    let from_arms = analyzed.variants.iter().map(|(name, variant)| {
        quote! { ::core::option::Option::Some(#name) => ::core::option::Option::Some(Self::#variant), }
    });

    let into_arms = analyzed.variants.iter().map(|(name, variant)| {
        quote! { Self::#variant => #name, }
    });

    Ok(quote! {
        impl ::parley::ArgType for #ident {
            fn descriptor() -> ::parley::Ty {
                #descriptor
            }

            fn from_value(
                value: ::parley::Value,
            ) -> ::core::result::Result<Self, ::parley::ValueMismatch> {
                let matched = match value.as_str() {
                    #(#from_arms)*
                    _ => ::core::option::Option::None,
                };

                matched.ok_or_else(|| ::parley::ValueMismatch::new(#type_name, value))
            }

            fn into_value(self) -> ::parley::Value {
                let name = match self {
                    #(#into_arms)*
                };

                ::parley::Value::Str(::std::borrow::ToOwned::to_owned(name))
            }
        }
    })
}
