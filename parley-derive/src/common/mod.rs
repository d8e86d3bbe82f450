pub mod value;

use darling::{
    FromAttributes as _, FromMeta,
    util::{Override, SpannedValue},
};
use itertools::Itertools as _;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::ToTokens;
use syn::{Attribute, Expr, Field, Ident, LitStr, Path, Type, spanned::Spanned as _};

pub struct IdentString<'a> {
    raw: &'a Ident,
    string: String,
}

impl<'a> IdentString<'a> {
    pub fn new(ident: &'a Ident) -> Self {
        let string = ident.to_string();

        Self {
            string: match string.strip_prefix("r#") {
                Some(stripped) => stripped.to_owned(),
                None => string,
            },
            raw: ident,
        }
    }

    pub fn as_str(&self) -> &str {
        self.string.as_str()
    }

    pub fn span(&self) -> Span {
        self.raw.span()
    }

    /// The name as a string literal, for embedding in generated code
    pub fn literal(&self) -> LitStr {
        LitStr::new(self.as_str(), self.span())
    }
}

impl ToTokens for IdentString<'_> {
    fn to_tokens(&self, tokens: &mut TokenStream2) {
        self.raw.to_tokens(tokens);
    }
}

/// `default` on its own, or `default = <expr>` with the expression taken
/// verbatim
#[derive(Debug)]
enum RawDefault {
    Trait,
    Expr(Expr),
}

impl FromMeta for RawDefault {
    fn from_word() -> darling::Result<Self> {
        Ok(Self::Trait)
    }

    fn from_expr(expr: &Expr) -> darling::Result<Self> {
        Ok(Self::Expr(expr.clone()))
    }
}

#[derive(darling::FromAttributes, Debug)]
#[darling(attributes(parley))]
struct RawParsedAttr {
    short: Option<Override<SpannedValue<char>>>,
    default: Option<RawDefault>,
    default_factory: Option<Path>,
    help: Option<String>,
    prompt: Option<String>,
    hide_input: Option<()>,
    max_attempts: Option<u32>,
    defer: Option<()>,
    forwarded: Option<()>,
    hidden: Option<()>,
    group: Option<String>,
    positional: Option<()>,
    parser: Option<Path>,
    subcommand: Option<()>,
}

pub enum FieldDefault {
    None,
    Trait,
    Expr(Expr),
    Factory(Path),
}

impl FieldDefault {
    fn new(
        default: Option<RawDefault>,
        factory: Option<Path>,
        span: Span,
    ) -> syn::Result<Self> {
        match (default, factory) {
            (Some(_), Some(_)) => Err(syn::Error::new(
                span,
                "a field can't have both a `default` and a `default_factory`",
            )),
            (Some(RawDefault::Expr(default)), None) => Ok(Self::Expr(default)),
            (Some(RawDefault::Trait), None) => Ok(Self::Trait),
            (None, Some(factory)) => Ok(Self::Factory(factory)),
            (None, None) => Ok(Self::None),
        }
    }
}

/// A regular field: an option, or a positional
pub struct ArgFieldInfo<'a> {
    pub ident: IdentString<'a>,
    pub ty: &'a Type,
    pub short: Option<SpannedValue<char>>,
    pub default: FieldDefault,
    pub help: Option<String>,
    pub prompt: Option<String>,
    pub hide_input: bool,
    pub max_attempts: Option<u32>,
    pub defer: bool,
    pub forwarded: bool,
    pub hidden: bool,
    pub group: Option<String>,
    pub positional: bool,
    pub parser: Option<Path>,
}

/// The field that holds the chosen subcommand
pub struct SubcommandFieldInfo<'a> {
    pub ident: IdentString<'a>,
    pub ty: &'a Type,
}

/// Collapse doc comment lines into a single paragraph
pub fn compute_docs(attrs: &[Attribute]) -> syn::Result<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter_map(|attr| match attr.meta {
            syn::Meta::NameValue(ref meta) => Some(meta),
            _ => None,
        })
        .filter(|meta| meta.path.is_ident("doc"))
        .map(|meta| match meta.value {
            Expr::Lit(ref lit) => match lit.lit {
                syn::Lit::Str(ref lit) => Ok(lit.value()),
                _ => Err(syn::Error::new(meta.span(), "malformed #[doc] attribute")),
            },
            Expr::Macro(ref expr) => Err(syn::Error::new(
                expr.span(),
                "macro #[doc] attributes aren't supported",
            )),
            _ => Err(syn::Error::new(meta.span(), "malformed #[doc] attribute")),
        })
        .try_collect()?;

    Ok(lines.iter().flat_map(|line| line.split_whitespace()).join(" "))
}

pub enum ParsedFieldInfo<'a> {
    Arg(ArgFieldInfo<'a>),
    Subcommand(SubcommandFieldInfo<'a>),
}

impl<'a> ParsedFieldInfo<'a> {
    pub fn from_field(field: &'a Field) -> syn::Result<Self> {
        let parsed = RawParsedAttr::from_attributes(&field.attrs)?;
        let docs = compute_docs(&field.attrs)?;

        let ty = &field.ty;
        let ident = field
            .ident
            .as_ref()
            .map(IdentString::new)
            .ok_or_else(|| syn::Error::new(field.span(), "command fields must be named"))?;

        if let Some(()) = parsed.subcommand {
            let conflicting = parsed.short.is_some()
                || parsed.default.is_some()
                || parsed.default_factory.is_some()
                || parsed.prompt.is_some()
                || parsed.defer.is_some()
                || parsed.positional.is_some()
                || parsed.parser.is_some()
                || parsed.forwarded.is_some();

            return match conflicting {
                true => Err(syn::Error::new(
                    field.span(),
                    "a subcommand field can't have any other field settings",
                )),
                false => Ok(Self::Subcommand(SubcommandFieldInfo { ident, ty })),
            };
        }

        let short = parsed
            .short
            .map(|short| compute_short(short.explicit(), &ident))
            .transpose()?;

        if short.is_some() && parsed.positional.is_some() {
            return Err(syn::Error::new(
                field.span(),
                "positional fields can't have a short option",
            ));
        }

        if parsed.defer.is_some() && parsed.prompt.is_none() {
            return Err(syn::Error::new(
                field.span(),
                "a deferred field needs a `prompt`",
            ));
        }

        let default = FieldDefault::new(parsed.default, parsed.default_factory, field.span())?;

        Ok(Self::Arg(ArgFieldInfo {
            ident,
            ty,
            short,
            default,
            help: parsed
                .help
                .or_else(|| (!docs.is_empty()).then_some(docs)),
            prompt: parsed.prompt,
            hide_input: parsed.hide_input.is_some(),
            max_attempts: parsed.max_attempts,
            defer: parsed.defer.is_some(),
            forwarded: parsed.forwarded.is_some(),
            hidden: parsed.hidden.is_some(),
            group: parsed.group,
            positional: parsed.positional.is_some(),
            parser: parsed.parser,
        }))
    }
}

fn compute_short(
    short: Option<SpannedValue<char>>,
    field_name: &IdentString<'_>,
) -> syn::Result<SpannedValue<char>> {
    let c = match short {
        Some(short) => short,
        None => {
            let first = field_name.as_str().chars().next().ok_or_else(|| {
                syn::Error::new(field_name.span(), "identifiers can't be empty")
            })?;
            SpannedValue::new(first, field_name.span())
        }
    };

    if *c == '-' {
        Err(syn::Error::new(c.span(), "short option must not be '-'"))
    } else if !c.is_ascii_graphic() {
        Err(syn::Error::new(
            c.span(),
            "short option should be an ascii printable",
        ))
    } else {
        Ok(c)
    }
}
