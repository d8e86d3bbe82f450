/*!
The materialized result of a parse: one resolved [`Value`] per field, plus
the chosen subcommand's own instance. Typed commands are built from a
[`ParsedInstance`] by taking their fields out of it one at a time.
*/

use std::collections::BTreeMap;

use tracing::trace;

use crate::{
    errors::{DuplicateReason, FromInstanceError, ParseError},
    parameter::ArgType,
    schema::{CommandSchema, SUBCOMMAND_FIELD},
    value::{Raw, Value},
};

/// A command whose fields have all been resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedInstance {
    prog: String,
    parents: Vec<String>,
    values: BTreeMap<String, Value>,
    subcommand: Option<Box<ParsedInstance>>,
}

impl ParsedInstance {
    /// Construct an instance directly, outside of argument parsing. The
    /// result is validated against `schema` exactly as a parsed one is.
    #[must_use]
    pub fn builder(schema: &CommandSchema) -> InstanceBuilder<'_> {
        InstanceBuilder {
            schema,
            positional: Vec::new(),
            named: Vec::new(),
            subcommand: None,
        }
    }

    #[must_use]
    pub fn prog(&self) -> &str {
        &self.prog
    }

    #[must_use]
    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    /// The parent chain followed by this command's own name
    #[must_use]
    pub fn full_command(&self) -> Vec<&str> {
        self.parents
            .iter()
            .map(String::as_str)
            .chain([self.prog.as_str()])
            .collect()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    #[must_use]
    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    #[must_use]
    pub fn subcommand(&self) -> Option<&ParsedInstance> {
        self.subcommand.as_deref()
    }

    /// Remove a field and convert it into its Rust type
    pub fn take<T: ArgType>(&mut self, field: &'static str) -> Result<T, FromInstanceError> {
        let value = self
            .values
            .remove(field)
            .ok_or(FromInstanceError::MissingField { field })?;

        T::from_value(value).map_err(|source| FromInstanceError::Mismatch { field, source })
    }

    pub fn take_subcommand(&mut self) -> Result<ParsedInstance, FromInstanceError> {
        self.take_optional_subcommand()
            .ok_or(FromInstanceError::MissingSubcommand)
    }

    pub fn take_optional_subcommand(&mut self) -> Option<ParsedInstance> {
        self.subcommand.take().map(|subcommand| *subcommand)
    }
}

/**
Check a set of resolved values against a schema and produce an instance.
This is the last step of parsing a command, and of building one by hand:

- a value for a field the schema doesn't have is rejected;
- a missing subcommand is an error, unless the subcommand is optional;
- absent fields take their default, or null if their type allows it;
- whatever is still absent is reported, all together.
*/
pub(crate) fn validate(
    schema: &CommandSchema,
    mut values: BTreeMap<String, Value>,
    subcommand: Option<ParsedInstance>,
) -> Result<ParsedInstance, ParseError> {
    if let Some(unknown) = values.keys().find(|name| schema.field(name).is_none()) {
        return Err(ParseError::DuplicateField {
            command: schema.prog().to_owned(),
            field: unknown.clone(),
            reason: DuplicateReason::Unknown,
        });
    }

    match (schema.subcommand(), &subcommand) {
        (Some(slot), None) if !slot.is_optional() => {
            return Err(ParseError::MissingRequiredSubcommand {
                command: schema.prog().to_owned(),
            });
        }
        (None, Some(_)) => {
            return Err(ParseError::DuplicateField {
                command: schema.prog().to_owned(),
                field: SUBCOMMAND_FIELD.to_owned(),
                reason: DuplicateReason::Unknown,
            });
        }
        _ => {}
    }

    let mut missing = Vec::new();

    for spec in schema.fields() {
        if values.contains_key(spec.name()) {
            continue;
        }

        let fallback = spec
            .default()
            .get()
            .or_else(|| spec.parser().parse(&Raw::Null).ok());

        match fallback {
            Some(value) => {
                trace!(field = spec.name(), %value, "filled absent field");
                values.insert(spec.name().to_owned(), value);
            }
            None => missing.push(spec.name().to_owned()),
        }
    }

    if !missing.is_empty() {
        return Err(ParseError::MissingRequiredArgument {
            command: schema.prog().to_owned(),
            fields: missing,
        });
    }

    Ok(ParsedInstance {
        prog: schema.prog().to_owned(),
        parents: schema.parents().to_vec(),
        values,
        subcommand: subcommand.map(Box::new),
    })
}

/// Builds a [`ParsedInstance`] by hand. See [`ParsedInstance::builder`].
#[derive(Debug)]
pub struct InstanceBuilder<'a> {
    schema: &'a CommandSchema,
    positional: Vec<Value>,
    named: Vec<(String, Value)>,
    subcommand: Option<ParsedInstance>,
}

impl InstanceBuilder<'_> {
    /// Supply the next field, in declaration order
    #[must_use]
    pub fn positional(mut self, value: Value) -> Self {
        self.positional.push(value);
        self
    }

    #[must_use]
    pub fn named(mut self, field: impl Into<String>, value: Value) -> Self {
        self.named.push((field.into(), value));
        self
    }

    #[must_use]
    pub fn subcommand(mut self, subcommand: ParsedInstance) -> Self {
        self.subcommand = Some(subcommand);
        self
    }

    pub fn build(self) -> Result<ParsedInstance, ParseError> {
        let Self {
            schema,
            positional,
            named,
            subcommand,
        } = self;

        let mut values = BTreeMap::new();

        // Positional values bind to fields in declaration order; the
        // subcommand selector is supplied separately and never takes one.
        let mut slots = schema
            .field_names()
            .iter()
            .filter(|name| *name != SUBCOMMAND_FIELD);

        let mut extra = Vec::new();
        for value in positional {
            match slots.next() {
                Some(name) => {
                    values.insert(name.clone(), value);
                }
                None => extra.push(value.to_string()),
            }
        }

        if !extra.is_empty() {
            return Err(ParseError::UnknownArguments { arguments: extra });
        }

        for (field, value) in named {
            if values.contains_key(&field) {
                return Err(ParseError::DuplicateField {
                    command: schema.prog().to_owned(),
                    field,
                    reason: DuplicateReason::Repeated,
                });
            }

            values.insert(field, value);
        }

        validate(schema, values, subcommand)
    }
}
