/*!
The token-consuming half of the parse engine. [`collect`] walks a command's
tokens left to right, routing each one to an option, a positional, or a
subcommand, and accumulates the raw (unconverted) values for each field. It
stops at the end of the input or at the first subcommand name, leaving the
cursor exactly where the subcommand should resume.
*/

use std::{collections::HashMap, sync::Arc};

use parley_parser::{Cursor, Token, TokenKind, snake_to_dash};
use tracing::trace;

use crate::{
    config::ParseConfig,
    distance,
    errors::{ArgumentKind, ParseError},
    schema::{ArgumentSpec, CommandSchema},
    ty::Nargs,
    value::Raw,
};

/// Atoms that request help, compared case-insensitively
pub const HELP_ARGS: [&str; 3] = ["help", "-h", "--help"];

/// True for an atom that requests help. Anything after a bare `--` is data.
#[must_use]
pub fn is_help_trigger(token: &Token) -> bool {
    !token.is_escaped()
        && HELP_ARGS
            .iter()
            .any(|trigger| token.original().eq_ignore_ascii_case(trigger))
}

/// Why token collection stopped early
#[derive(Debug)]
pub(crate) enum Stop {
    Help,
    Error(ParseError),
}

impl From<ParseError> for Stop {
    fn from(error: ParseError) -> Self {
        Self::Error(error)
    }
}

/// The raw values gathered for one command
#[derive(Debug, Default)]
pub(crate) struct Collected {
    pub unparsed: HashMap<String, Raw>,

    /// The subcommand named on the command line, if any
    pub subcommand: Option<Arc<CommandSchema>>,
}

/// How many more values a context can take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Remaining {
    Exactly(usize),
    OneOrMore,
    ZeroOrMore,
}

/// The field currently absorbing values
#[derive(Debug)]
struct ParseContext<'s> {
    spec: &'s ArgumentSpec,
    remaining: Remaining,
    collected: Vec<String>,
}

impl<'s> ParseContext<'s> {
    fn new(spec: &'s ArgumentSpec) -> Self {
        let remaining = match spec.nargs() {
            Nargs::Exactly(count) => Remaining::Exactly(count),
            Nargs::OneOrMore => Remaining::OneOrMore,
            Nargs::ZeroOrMore => Remaining::ZeroOrMore,
        };

        Self {
            spec,
            remaining,
            collected: Vec::new(),
        }
    }

    fn has_more(&self) -> bool {
        match self.remaining {
            Remaining::Exactly(count) => count > 0,
            Remaining::OneOrMore | Remaining::ZeroOrMore => true,
        }
    }

    fn needs_more(&self) -> bool {
        match self.remaining {
            Remaining::Exactly(count) => count > 0,
            Remaining::OneOrMore => true,
            Remaining::ZeroOrMore => false,
        }
    }

    fn push(&mut self, value: &str) {
        self.remaining = match self.remaining {
            Remaining::Exactly(count) => Remaining::Exactly(count.saturating_sub(1)),
            Remaining::OneOrMore | Remaining::ZeroOrMore => Remaining::ZeroOrMore,
        };

        self.collected.push(value.to_owned());
    }

    /// A field that takes at most one value gets a scalar
    fn into_raw(self) -> Raw {
        match self.spec.nargs() {
            Nargs::Exactly(1) => match self.collected.into_iter().next() {
                Some(value) => Raw::Scalar(value),
                None => Raw::Sequence(Vec::new()),
            },
            _ => Raw::Sequence(self.collected),
        }
    }
}

/// Close the open context, if any, and store what it collected
fn flush(
    context: &mut Option<ParseContext<'_>>,
    unparsed: &mut HashMap<String, Raw>,
) -> Result<(), ParseError> {
    let Some(context) = context.take() else {
        return Ok(());
    };

    if context.needs_more() {
        return Err(ParseError::Arity {
            name: context.spec.display_name(),
        });
    }

    let name = context.spec.name().to_owned();
    let variable = !matches!(context.spec.nargs(), Nargs::Exactly(_));
    let raw = context.into_raw();

    // Variable-length fields that appear more than once accumulate; anything
    // else is replaced by its last appearance.
    match (unparsed.get_mut(&name), raw) {
        (Some(Raw::Sequence(existing)), Raw::Sequence(values)) if variable => {
            existing.extend(values);
        }
        (_, raw) => {
            unparsed.insert(name, raw);
        }
    }

    Ok(())
}

/// The next positional that can take a value: the first one that hasn't been
/// filled, where catch-all positionals are never considered filled.
fn next_positional<'s>(
    schema: &'s CommandSchema,
    unparsed: &HashMap<String, Raw>,
) -> Option<&'s ArgumentSpec> {
    schema
        .positionals()
        .find(|spec| spec.is_catch_all() || !unparsed.contains_key(spec.name()))
        .map(|spec| &**spec)
}

/// Build an unknown-argument error, with a suggestion if something known is
/// close enough.
fn unknown(schema: &CommandSchema, token: &Token) -> ParseError {
    let (kind, suggestion) = match token.kind() {
        TokenKind::Positional => {
            let subcommands = schema
                .subcommand()
                .into_iter()
                .flat_map(|slot| slot.variants())
                .map(|variant| variant.prog());
            let positionals = schema.positionals().map(|spec| spec.name());

            let suggestion = distance::suggest(token.value(), subcommands.chain(positionals));
            (ArgumentKind::Argument, suggestion.map(str::to_owned))
        }
        TokenKind::LongOption | TokenKind::ShortOption => {
            let longs = schema.options().map(|spec| spec.name());
            let shorts = schema.options().filter_map(|spec| spec.short());

            let suggestion = distance::suggest(token.value(), longs.chain(shorts)).map(|name| {
                match name.chars().count() {
                    1 => format!("-{name}"),
                    _ => format!("--{}", snake_to_dash(name)),
                }
            });
            (ArgumentKind::Option, suggestion)
        }
    };

    ParseError::UnknownArgument {
        kind,
        original: token.original().to_owned(),
        suggestion,
    }
}

/// Match an option token to a spec. The boolean is false for a negated flag.
fn find_option<'s>(
    schema: &'s CommandSchema,
    token: &Token,
    config: &ParseConfig,
) -> Option<(&'s ArgumentSpec, bool)> {
    let found = match token.kind() {
        TokenKind::LongOption => schema.option(token.value()),
        TokenKind::ShortOption => schema.option_by_short(token.value()),
        TokenKind::Positional => None,
    };

    if let Some(spec) = found {
        return Some((spec, true));
    }

    if config.negative_flags && token.kind() == TokenKind::LongOption {
        return token
            .value()
            .strip_prefix("no_")
            .and_then(|name| schema.option(name))
            .filter(|spec| spec.nargs() == Nargs::Exactly(0))
            .map(|spec| (&**spec, false));
    }

    None
}

/// Consume tokens for a single command level
pub(crate) fn collect(
    schema: &CommandSchema,
    cursor: &mut Cursor<'_>,
    config: &ParseConfig,
) -> Result<Collected, Stop> {
    let mut collected = Collected::default();
    let mut context: Option<ParseContext<'_>> = None;

    while let Some(token) = cursor.next() {
        trace!(command = schema.prog(), ?token, "consuming token");

        if is_help_trigger(token) {
            return Err(Stop::Help);
        }

        if token.is_positional() && !token.is_escaped() {
            if let Some(subcommand) = schema
                .subcommand()
                .and_then(|slot| slot.get(token.value()))
            {
                collected.subcommand = Some(Arc::clone(subcommand));
                break;
            }
        }

        if token.is_option() {
            let Some((spec, enabled)) = find_option(schema, token, config) else {
                return Err(unknown(schema, token).into());
            };

            flush(&mut context, &mut collected.unparsed)?;

            // Flags are recorded immediately and never take values
            if spec.nargs() == Nargs::Exactly(0) {
                let raw = match enabled {
                    true => "true",
                    false => "false",
                };
                collected
                    .unparsed
                    .insert(spec.name().to_owned(), Raw::scalar(raw));
            } else {
                context = Some(ParseContext::new(spec));
            }

            continue;
        }

        if context.is_none() {
            context = next_positional(schema, &collected.unparsed).map(ParseContext::new);
        }

        match context.as_mut() {
            Some(open) if open.has_more() => {
                open.push(token.value());

                if !open.has_more() {
                    flush(&mut context, &mut collected.unparsed)?;
                }
            }
            _ => return Err(unknown(schema, token).into()),
        }
    }

    flush(&mut context, &mut collected.unparsed)?;
    Ok(collected)
}

#[cfg(test)]
mod tests {
    use parley_parser::normalize;

    use super::*;
    use crate::{
        printers::PlainFormatter,
        prompt::TerminalPrompter,
        schema::{ArgConfig, FieldDecl},
        ty::Ty,
        value::Value,
    };

    fn config() -> ParseConfig {
        ParseConfig {
            help_on_fail: false,
            negative_flags: true,
            prompter: Arc::new(TerminalPrompter::new(std::io::empty(), std::io::sink())),
            formatter: Box::new(PlainFormatter::default()),
        }
    }

    fn schema() -> CommandSchema {
        let sub = CommandSchema::builder("sub").build().unwrap();

        CommandSchema::builder("main")
            .field(FieldDecl::new("pos", Ty::positional(Ty::path())))
            .field(
                FieldDecl::new("flag", Ty::Bool)
                    .config(ArgConfig::new().short("f").default_value(Value::Bool(false))),
            )
            .field(
                FieldDecl::new("option", Ty::list(Ty::Str))
                    .config(ArgConfig::new().short("o")),
            )
            .field(FieldDecl::new("pair", Ty::tuple([Ty::Int, Ty::Int])))
            .field(FieldDecl::new("rest", Ty::positional(Ty::list(Ty::Str))))
            .subcommands([Arc::new(sub)], true)
            .build()
            .unwrap()
    }

    fn run(args: &[&str]) -> Result<(Collected, usize), Stop> {
        let schema = schema();
        let tokens = normalize(args);
        let mut cursor = Cursor::new(&tokens);
        let collected = collect(&schema, &mut cursor, &config())?;
        Ok((collected, cursor.position()))
    }

    fn unparsed(args: &[&str]) -> HashMap<String, Raw> {
        run(args).unwrap().0.unparsed
    }

    fn error(args: &[&str]) -> ParseError {
        match run(args) {
            Err(Stop::Error(error)) => error,
            other => panic!("expected an error, got {other:?}"),
        }
    }

    #[test]
    fn options_and_positionals() {
        let values = unparsed(&["./p", "-o", "a", "b", "-f"]);

        assert_eq!(values["pos"], Raw::scalar("./p"));
        assert_eq!(values["option"], Raw::sequence(["a", "b"]));
        assert_eq!(values["flag"], Raw::scalar("true"));
    }

    #[test]
    fn catch_all_absorbs_the_rest() {
        let values = unparsed(&["./p", "x", "y", "-f", "z"]);

        assert_eq!(values["rest"], Raw::sequence(["x", "y", "z"]));
    }

    #[test]
    fn repeated_list_options_accumulate() {
        let values = unparsed(&["-o", "a", "--option", "b"]);

        assert_eq!(values["option"], Raw::sequence(["a", "b"]));
    }

    #[test]
    fn fixed_arity() {
        assert_eq!(unparsed(&["--pair", "1", "2"])["pair"], Raw::sequence(["1", "2"]));
        assert_eq!(
            error(&["--pair", "1"]),
            ParseError::Arity {
                name: "--pair".to_owned()
            }
        );
        assert_eq!(
            error(&["--pair", "1", "-f"]),
            ParseError::Arity {
                name: "--pair".to_owned()
            }
        );
    }

    #[test]
    fn negative_flags() {
        assert_eq!(unparsed(&["-f", "--no-flag"])["flag"], Raw::scalar("false"));
    }

    #[test]
    fn stops_at_a_subcommand() {
        let (collected, position) = run(&["./p", "sub", "--whatever"]).unwrap();

        assert_eq!(collected.subcommand.unwrap().prog(), "sub");
        assert_eq!(position, 2);
    }

    #[test]
    fn escaped_atoms_are_data() {
        let values = unparsed(&["./p", "--", "--help", "sub", "-f"]);

        assert_eq!(values["rest"], Raw::sequence(["--help", "sub", "-f"]));
    }

    #[test]
    fn help_anywhere() {
        assert!(matches!(run(&["./p", "--HELP"]), Err(Stop::Help)));
        assert!(matches!(run(&["-h"]), Err(Stop::Help)));
    }

    #[test]
    fn unknown_options_get_suggestions() {
        assert_eq!(
            error(&["--flg"]),
            ParseError::UnknownArgument {
                kind: ArgumentKind::Option,
                original: "--flg".to_owned(),
                suggestion: Some("--flag".to_owned()),
            }
        );
        assert_eq!(
            error(&["-F"]),
            ParseError::UnknownArgument {
                kind: ArgumentKind::Option,
                original: "-F".to_owned(),
                suggestion: Some("-f".to_owned()),
            }
        );
        assert_eq!(
            error(&["--completely-different"]),
            ParseError::UnknownArgument {
                kind: ArgumentKind::Option,
                original: "--completely-different".to_owned(),
                suggestion: None,
            }
        );
    }
}
