/*!
The level driver: parse one command from the shared cursor, resolve every
field to a value, descend into the chosen subcommand, and validate the
result.

Each field is resolved by trying, in order:

1. the raw values collected from the command line, run through its parser;
2. the parent's resolved value, if the field is forwarded;
3. an interactive prompt, if the field has one (a deferred field gets a
   [`Value::Deferred`] instead, which prompts when it's first read);
4. its default;
5. null, if its type accepts it.

Anything left over is a missing required argument. That check only happens
once the subcommand has returned, because a forwarded field might be
supplied further down the tree.
*/

use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use parley_parser::Cursor;
use tracing::debug;

use crate::{
    config::ParseConfig,
    deferred::DeferredValue,
    errors::{Interrupt, ParseError},
    forward,
    instance::{ParsedInstance, validate},
    prompt::PromptRequest,
    schema::{ArgumentSpec, CommandSchema},
    state::{self, Stop, is_help_trigger},
    value::{Raw, Value},
};

fn failed(schema: &Arc<CommandSchema>, error: ParseError) -> Interrupt {
    Interrupt::Failed {
        schema: Arc::clone(schema),
        error,
    }
}

/// Where a field's value came from, when it came from anywhere
enum Resolution {
    Value(Value),

    /// The field is inherited by the chosen subcommand, which will resolve it
    Inherited,

    Absent,
}

fn resolve(
    spec: &Arc<ArgumentSpec>,
    raw: Option<Raw>,
    parent_values: &BTreeMap<String, Value>,
    inherited: bool,
    config: &ParseConfig,
) -> Result<Resolution, ParseError> {
    if let Some(raw) = raw {
        return spec
            .parser()
            .parse(&raw)
            .map(Resolution::Value)
            .map_err(|source| ParseError::TypeConversion {
                field: spec.display_name(),
                source,
            });
    }

    if spec.is_forwarded() {
        if let Some(value) = parent_values.get(spec.name()) {
            return Ok(Resolution::Value(value.clone()));
        }
    }

    if inherited {
        return Ok(Resolution::Inherited);
    }

    if let Some(text) = spec.prompt() {
        if spec.is_deferred() {
            debug!(field = spec.name(), "no value given, deferring the prompt");

            let deferred = DeferredValue::new(Arc::clone(spec), Arc::clone(&config.prompter));
            return Ok(Resolution::Value(Value::Deferred(deferred)));
        }

        debug!(field = spec.name(), "no value given, prompting");

        let default = spec.default().get();
        let value = config
            .prompter
            .prompt(&PromptRequest::for_field(spec, text, default.as_ref()))?;

        return Ok(Resolution::Value(value));
    }

    Ok(match spec.default().get() {
        Some(value) => Resolution::Value(value),
        None => Resolution::Absent,
    })
}

/**
Parse a single command level. `schema` is the effective schema for this
level: for a subcommand, that's its schema with forwarded fields replaced by
the parent's specs. `parent_values` holds whatever the parent resolved
before descending.
*/
pub(crate) fn parse_level(
    schema: Arc<CommandSchema>,
    cursor: &mut Cursor<'_>,
    parent_values: &BTreeMap<String, Value>,
    config: &ParseConfig,
) -> Result<ParsedInstance, Interrupt> {
    let collected = match state::collect(&schema, cursor, config) {
        Ok(collected) => collected,
        Err(Stop::Help) => return Err(Interrupt::Help { schema }),
        Err(Stop::Error(error)) => return Err(failed(&schema, error)),
    };

    let mut unparsed = collected.unparsed;
    let child = collected
        .subcommand
        .map(|subcommand| forward::inherit(&schema, &subcommand))
        .transpose()?;

    // A help request further down the line means nothing at this level
    // should be resolved; in particular, nothing should be prompted for.
    if let Some((effective, _)) = &child {
        if cursor.remaining().iter().any(is_help_trigger) {
            debug!(
                subcommand = effective.prog(),
                "help requested below, skipping resolution"
            );

            let effective = Arc::new(effective.clone());
            return Err(
                match parse_level(effective, cursor, &BTreeMap::new(), config) {
                    Err(interrupt) => interrupt,
                    Ok(_) => Interrupt::Help { schema },
                },
            );
        }
    }

    let inherited: HashSet<&str> = child
        .iter()
        .flat_map(|(_, inherited)| inherited)
        .map(String::as_str)
        .collect();

    let mut values = BTreeMap::new();

    for spec in schema.fields() {
        let raw = unparsed.remove(spec.name());
        let inherited = inherited.contains(spec.name());

        match resolve(spec, raw, parent_values, inherited, config) {
            Ok(Resolution::Value(value)) => {
                values.insert(spec.name().to_owned(), value);
            }
            Ok(Resolution::Inherited | Resolution::Absent) => {}
            Err(error) => return Err(failed(&schema, error)),
        }
    }

    let subcommand = match child {
        None => None,
        Some((effective, inherited)) => {
            debug!(
                command = schema.prog(),
                subcommand = effective.prog(),
                "descending into subcommand"
            );

            let subcommand = parse_level(Arc::new(effective), cursor, &values, config)?;
            forward::copy_back(&mut values, subcommand.values(), &inherited);
            Some(subcommand)
        }
    };

    validate(&schema, values, subcommand).map_err(|error| failed(&schema, error))
}

/// Parse a whole command tree, starting from the root command. Every token
/// must be consumed by some command in the tree.
pub(crate) fn parse_tree(
    schema: Arc<CommandSchema>,
    tokens: &[parley_parser::Token],
    config: &ParseConfig,
) -> Result<ParsedInstance, Interrupt> {
    let mut cursor = Cursor::new(tokens);
    let instance = parse_level(Arc::clone(&schema), &mut cursor, &BTreeMap::new(), config)?;

    match cursor.remaining() {
        [] => Ok(instance),
        leftover => Err(failed(
            &schema,
            ParseError::UnknownArguments {
                arguments: leftover
                    .iter()
                    .map(|token| token.original().to_owned())
                    .collect(),
            },
        )),
    }
}
