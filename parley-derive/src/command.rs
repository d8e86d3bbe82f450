use std::collections::{HashMap, hash_map::Entry};

use darling::{FromAttributes, util::SpannedValue};
use heck::ToKebabCase as _;
use itertools::Itertools as _;
use lazy_format::lazy_format;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{ToTokens as _, quote};
use syn::{
    Attribute, DeriveInput, Field, Fields, Ident, LitStr, Token, punctuated::Punctuated,
    spanned::Spanned as _,
};

use crate::{
    common::{ArgFieldInfo, FieldDefault, ParsedFieldInfo, compute_docs},
    generics::reject_generics,
};

fn detect_collision(
    known_tags: &mut HashMap<char, Span>,
    new_tag: Option<SpannedValue<char>>,
) -> syn::Result<()> {
    match new_tag {
        Some(tag) => match known_tags.entry(*tag) {
            Entry::Occupied(entry) => {
                let mut err1 = syn::Error::new(
                    tag.span(),
                    lazy_format!("duplicate short option -{tag}", tag = *tag),
                );
                let err2 = syn::Error::new(*entry.get(), "original use here");

                err1.combine(err2);
                Err(err1)
            }
            Entry::Vacant(entry) => {
                entry.insert(tag.span());
                Ok(())
            }
        },
        None => Ok(()),
    }
}

#[derive(darling::FromAttributes, Debug)]
#[darling(attributes(parley))]
struct RawParsedTypeAttr {
    prog: Option<String>,
    epilog: Option<String>,
}

/// The `.field(...)` call that registers one field with the schema builder
fn field_decl(field: &ArgFieldInfo<'_>) -> TokenStream2 {
    let ty = field.ty;
    let name = field.ident.literal();

    let descriptor = match field.positional {
        true => quote! {
            ::parley::Ty::positional(<#ty as ::parley::ArgType>::descriptor())
        },
        false => quote! { <#ty as ::parley::ArgType>::descriptor() },
    };

    let mut config = quote! { ::parley::ArgConfig::new() };

    if let Some(ref parser) = field.parser {
        let parser_name = LitStr::new(
            &parser
                .segments
                .last()
                .map(|segment| segment.ident.to_string())
                .unwrap_or_default(),
            parser.span(),
        );
        config.extend(quote! { .parser(::parley::ParserFn::new(#parser_name, #parser)) });
    }

    // A deferred field's default is written as the inner value
    let given = |value: TokenStream2| match field.defer {
        true => quote! { ::parley::Deferred::ready(#value) },
        false => value,
    };

    config.extend(match field.default {
        FieldDefault::None => quote! {},
        FieldDefault::Trait => quote! {
            .default_factory(|| ::parley::ArgType::into_value(
                <#ty as ::core::default::Default>::default()
            ))
        },
        FieldDefault::Expr(ref expr) => {
            let expr = given(expr.to_token_stream());
            quote! {
                .default_value({
                    let value: #ty = #expr;
                    ::parley::ArgType::into_value(value)
                })
            }
        }
        FieldDefault::Factory(ref factory) => {
            let made = given(quote! { #factory() });
            quote! {
                .default_factory(|| {
                    let value: #ty = #made;
                    ::parley::ArgType::into_value(value)
                })
            }
        }
    });

    if let Some(ref help) = field.help {
        config.extend(quote! { .help(#help) });
    }

    if let Some(short) = field.short {
        let short = (*short).to_string();
        config.extend(quote! { .short(#short) });
    }

    if let Some(ref prompt) = field.prompt {
        config.extend(quote! { .prompt(#prompt) });
    }

    if field.hide_input {
        config.extend(quote! { .hide_input(true) });
    }

    if let Some(max_attempts) = field.max_attempts {
        config.extend(quote! { .max_attempts(#max_attempts) });
    }

    if field.defer {
        config.extend(quote! { .defer(true) });
    }

    if field.forwarded {
        config.extend(quote! { .forwarded(true) });
    }

    if field.hidden {
        config.extend(quote! { .hidden(true) });
    }

    if let Some(ref group) = field.group {
        config.extend(quote! { .group(#group) });
    }

    quote! {
        .field(::parley::FieldDecl::new(#name, #descriptor).config(#config))
    }
}

pub fn derive_command_struct(
    name: &Ident,
    fields: &Punctuated<Field, Token![,]>,
    attrs: &[Attribute],
) -> syn::Result<TokenStream2> {
    let attr = RawParsedTypeAttr::from_attributes(attrs)?;
    let description = compute_docs(attrs)?;

    let fields: Vec<ParsedFieldInfo> = fields
        .iter()
        .map(ParsedFieldInfo::from_field)
        .try_collect()?;

    // Collision detection
    {
        let mut short_tags = HashMap::new();

        for field in &fields {
            if let ParsedFieldInfo::Arg(field) = field {
                detect_collision(&mut short_tags, field.short)?;
            }
        }
    }

    let mut subcommands = fields.iter().filter_map(|field| match field {
        ParsedFieldInfo::Subcommand(field) => Some(field),
        ParsedFieldInfo::Arg(_) => None,
    });
    let _ = subcommands.next();
    if let Some(extra) = subcommands.next() {
        return Err(syn::Error::new(
            extra.ident.span(),
            "a command can only have one subcommand field",
        ));
    }

    let prog = attr
        .prog
        .unwrap_or_else(|| name.to_string().to_kebab_case());

    let description = match description.is_empty() {
        true => quote! {},
        false => quote! { .description(#description) },
    };

    let epilog = match attr.epilog {
        None => quote! {},
        Some(ref epilog) => quote! { .epilog(#epilog) },
    };

    let registrations = fields.iter().map(|field| match field {
        ParsedFieldInfo::Arg(field) => field_decl(field),
        ParsedFieldInfo::Subcommand(field) => {
            let ty = field.ty;
            quote! {
                .subcommands(
                    <#ty as ::parley::Subcommand>::schemas()?,
                    <#ty as ::parley::Subcommand>::OPTIONAL,
                )
            }
        }
    });

    let initializers = fields.iter().map(|field| match field {
        ParsedFieldInfo::Arg(field) => {
            let ident = &field.ident;
            let ty = field.ty;
            let name = field.ident.literal();

            quote! { #ident: instance.take::<#ty>(#name)?, }
        }
        ParsedFieldInfo::Subcommand(field) => {
            let ident = &field.ident;
            let ty = field.ty;

            quote! {
                #ident: <#ty as ::parley::Subcommand>::from_subcommand(
                    instance.take_optional_subcommand()
                )?,
            }
        }
    });

    Ok(quote! {
        impl ::parley::Command for #name {
            #[inline]
            fn prog() -> &'static str {
                #prog
            }

            fn schema() -> ::core::result::Result<
                ::std::sync::Arc<::parley::CommandSchema>,
                ::parley::SchemaError,
            > {
                fn build() -> ::core::result::Result<
                    ::std::sync::Arc<::parley::CommandSchema>,
                    ::parley::SchemaError,
                > {
                    let schema = ::parley::CommandSchema::builder(#prog)
                        #description
                        #epilog
                        #(#registrations)*
                        .build()?;

                    ::core::result::Result::Ok(::std::sync::Arc::new(schema))
                }

                static SCHEMA: ::std::sync::OnceLock<
                    ::core::result::Result<
                        ::std::sync::Arc<::parley::CommandSchema>,
                        ::parley::SchemaError,
                    >
                > = ::std::sync::OnceLock::new();

                ::core::clone::Clone::clone(SCHEMA.get_or_init(build))
            }

            #[allow(unused_mut)]
            fn from_instance(
                mut instance: ::parley::ParsedInstance,
            ) -> ::core::result::Result<Self, ::parley::FromInstanceError> {
                ::core::result::Result::Ok(Self {
                    #(#initializers)*
                })
            }
        }
    })
}

pub fn derive_command_result(item: TokenStream2) -> syn::Result<TokenStream2> {
    let input: DeriveInput = syn::parse2(item)?;
    reject_generics(&input.generics, "Command")?;

    match input.data {
        syn::Data::Struct(ref data) => match data.fields {
            Fields::Named(ref fields) => {
                derive_command_struct(&input.ident, &fields.named, &input.attrs)
            }
            Fields::Unit => derive_command_struct(&input.ident, &Punctuated::new(), &input.attrs),
            Fields::Unnamed(ref fields) => Err(syn::Error::new(
                fields.span(),
                "command fields must be named",
            )),
        },
        syn::Data::Enum(_) => Err(syn::Error::new(
            input.span(),
            "can't derive `Command` on an enum; did you mean `Subcommand`?",
        )),
        syn::Data::Union(_) => Err(syn::Error::new(
            input.span(),
            "can't derive `Command` on a union",
        )),
    }
}
