use darling::{FromMeta, ast::NestedMeta};
use proc_macro2::TokenStream as TokenStream2;
use quote::{ToTokens, quote};
use syn::{FnArg, ItemFn, PatType, Stmt, parse_quote, spanned::Spanned};

/// `#[parley::main]`, or `#[parley::main(config = make_config())]` to parse
/// with a custom `ParseConfig`
#[derive(FromMeta, Default)]
struct MainOptions {
    config: Option<syn::Expr>,
}

impl MainOptions {
    fn parse(attrs: TokenStream2) -> syn::Result<Self> {
        match attrs.is_empty() {
            true => Ok(Self::default()),
            false => Ok(Self::from_list(&NestedMeta::parse_meta_list(attrs)?)?),
        }
    }
}

/// Remove the command parameter from the signature. It has to be the only
/// parameter, since there's nowhere else for `main` to get arguments from.
fn take_command_param(function: &mut ItemFn) -> syn::Result<PatType> {
    let parens = function.sig.paren_token.span.join();
    let mut inputs = std::mem::take(&mut function.sig.inputs).into_iter();

    match (inputs.next(), inputs.next()) {
        (Some(FnArg::Typed(param)), None) => Ok(param),
        (None, _) => Err(syn::Error::new(
            parens,
            "#[parley::main] needs a parameter to parse the command line into",
        )),
        (Some(FnArg::Receiver(receiver)), _) => Err(syn::Error::new(
            receiver.span(),
            "#[parley::main] can't parse the command line into `self`",
        )),
        (Some(_), Some(extra)) => Err(syn::Error::new(
            extra.span(),
            "#[parley::main] functions take only the command as a parameter",
        )),
    }
}

pub fn decorate_fn_main(attrs: TokenStream2, function: TokenStream2) -> syn::Result<TokenStream2> {
    let options = MainOptions::parse(attrs)?;
    let mut function: ItemFn = syn::parse2(function)?;

    let PatType { attrs, pat, ty, .. } = take_command_param(&mut function)?;

    let parse = match options.config {
        Some(config) => quote! { <#ty as ::parley::Command>::parse_with(&(#config)) },
        None => quote! { <#ty as ::parley::Command>::parse() },
    };

    let parse_command: Stmt = parse_quote! {
        #(#attrs)*
        let #pat: #ty = #parse;
    };

    function.block.stmts.insert(0, parse_command);
    Ok(function.into_token_stream())
}
