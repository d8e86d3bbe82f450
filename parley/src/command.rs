/*!
Typed commands. [`Command`] is usually derived: the derive registers the
command's schema once, and builds the command back out of a
[`ParsedInstance`] after parsing.
*/

use std::sync::Arc;

use crate::{
    arguments::{self, LoadedArguments},
    config::ParseConfig,
    errors::{FromInstanceError, Interrupt, SchemaError},
    instance::ParsedInstance,
    schema::CommandSchema,
};

/**
A type that can be parsed from command line arguments.

`schema` should build the command's [`CommandSchema`] exactly once and hand
out the same one every time; `#[derive(Command)]` caches it in a static.
*/
pub trait Command: Sized {
    /// The name of this command, as typed on the command line
    fn prog() -> &'static str;

    fn schema() -> Result<Arc<CommandSchema>, SchemaError>;

    /// Build this command from a resolved instance of its schema
    fn from_instance(instance: ParsedInstance) -> Result<Self, FromInstanceError>;

    /// Parse this command from a list of arguments (not including the
    /// program name).
    fn try_parse_from_with<I>(args: I, config: &ParseConfig) -> Result<Self, Interrupt>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let instance = arguments::parse_from(Self::schema()?, args, config)?;
        Ok(Self::from_instance(instance)?)
    }

    fn try_parse_from<I>(args: I) -> Result<Self, Interrupt>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self::try_parse_from_with(args, &ParseConfig::default())
    }

    /// Parse this command from the process arguments. On a help request or
    /// error, print it and exit.
    fn parse_with(config: &ParseConfig) -> Self {
        LoadedArguments::from_env().parse(config)
    }

    fn parse() -> Self {
        Self::parse_with(&ParseConfig::default())
    }
}

/**
The set of subcommands a command can dispatch to, usually derived on an enum
with one variant per subcommand. A command's subcommand field has a
`Subcommand` type; wrapping it in [`Option`] makes choosing one optional.
*/
pub trait Subcommand: Sized {
    /// If true, parsing can finish without any subcommand
    const OPTIONAL: bool = false;

    /// The schema of every subcommand, in declaration order
    fn schemas() -> Result<Vec<Arc<CommandSchema>>, SchemaError>;

    /// Build the chosen subcommand from its instance
    fn from_subcommand(instance: Option<ParsedInstance>) -> Result<Self, FromInstanceError>;
}

impl<S: Subcommand> Subcommand for Option<S> {
    const OPTIONAL: bool = true;

    fn schemas() -> Result<Vec<Arc<CommandSchema>>, SchemaError> {
        S::schemas()
    }

    fn from_subcommand(instance: Option<ParsedInstance>) -> Result<Self, FromInstanceError> {
        instance
            .map(|instance| S::from_subcommand(Some(instance)))
            .transpose()
    }
}
