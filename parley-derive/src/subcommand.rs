use itertools::Itertools as _;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, Fields, Ident, Token, Type, Variant, punctuated::Punctuated, spanned::Spanned as _};

use crate::generics::reject_generics;

/// Each variant wraps exactly one command
fn variant_command(variant: &Variant) -> syn::Result<&Type> {
    match variant.fields {
        Fields::Unnamed(ref fields) => fields
            .unnamed
            .iter()
            .exactly_one()
            .map(|field| &field.ty)
            .map_err(|_| {
                syn::Error::new(
                    variant.span(),
                    "subcommand variants must contain exactly one command",
                )
            }),
        _ => Err(syn::Error::new(
            variant.span(),
            "subcommand variants must be newtype variants, like `Build(BuildCommand)`",
        )),
    }
}

fn derive_subcommand_enum(
    name: &Ident,
    variants: &Punctuated<Variant, Token![,]>,
) -> syn::Result<TokenStream2> {
    if variants.is_empty() {
        return Err(syn::Error::new(
            name.span(),
            "a subcommand enum needs at least one variant",
        ));
    }

    let commands: Vec<(&Ident, &Type)> = variants
        .iter()
        .map(|variant| variant_command(variant).map(|ty| (&variant.ident, ty)))
        .try_collect()?;

    let schemas = commands.iter().map(|&(_, ty)| {
        quote! { <#ty as ::parley::Command>::schema()?, }
    });

    let dispatch = commands.iter().map(|&(variant, ty)| {
        quote! {
            if prog == <#ty as ::parley::Command>::prog() {
                return <#ty as ::parley::Command>::from_instance(instance).map(Self::#variant);
            }
        }
    });

    Ok(quote! {
        impl ::parley::Subcommand for #name {
            fn schemas() -> ::core::result::Result<
                ::std::vec::Vec<::std::sync::Arc<::parley::CommandSchema>>,
                ::parley::SchemaError,
            > {
                ::core::result::Result::Ok(::std::vec![ #(#schemas)* ])
            }

            fn from_subcommand(
                instance: ::core::option::Option<::parley::ParsedInstance>,
            ) -> ::core::result::Result<Self, ::parley::FromInstanceError> {
                let instance = instance.ok_or(::parley::FromInstanceError::MissingSubcommand)?;
                let prog = ::std::borrow::ToOwned::to_owned(instance.prog());

                #(#dispatch)*

                ::core::result::Result::Err(::parley::FromInstanceError::UnknownSubcommand { prog })
            }
        }
    })
}

pub fn derive_subcommand_result(item: TokenStream2) -> syn::Result<TokenStream2> {
    let input: DeriveInput = syn::parse2(item)?;
    reject_generics(&input.generics, "Subcommand")?;

    match input.data {
        syn::Data::Enum(ref data) => derive_subcommand_enum(&input.ident, &data.variants),
        _ => Err(syn::Error::new(
            input.span(),
            "`Subcommand` can only be derived on an enum",
        )),
    }
}
