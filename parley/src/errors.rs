/*!
Error types for every stage of `parley`: schema registration
([`SchemaError`]), individual value conversion ([`ConversionError`]),
per-invocation parsing ([`ParseError`]), and the top-level [`Interrupt`] that
carries a parse failure or help request together with the command it
belongs to.
 */

use core::fmt::Display;
use std::{path::PathBuf, sync::Arc};

use joinery::JoinableIterator;
use lazy_format::lazy_format;
use thiserror::Error;

use crate::{schema::CommandSchema, value::Value};

/// A declared type can't be turned into a parser. This is always a mistake in
/// the command definition, and is reported before any arguments are parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("don't know how to parse as {ty}: {reason}")]
pub struct UnsupportedTypeError {
    pub ty: String,
    pub reason: &'static str,
}

/// Errors in a command definition, detected when its schema is registered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SchemaError {
    #[error("field {field:?} in {command:?}: {source}")]
    UnsupportedType {
        command: String,
        field: String,
        source: UnsupportedTypeError,
    },

    #[error("short option -{short} in {command:?} is used by both {first:?} and {second:?}")]
    DuplicateShort {
        command: String,
        short: String,
        first: String,
        second: String,
    },

    #[error("field {field:?} is declared more than once in {command:?}")]
    DuplicateField { command: String, field: String },

    #[error("subcommand {name:?} is declared more than once in {command:?}")]
    DuplicateSubcommand { command: String, name: String },

    #[error("field {field:?} in {command:?} has an invalid short option {short:?}")]
    InvalidShort {
        command: String,
        field: String,
        short: String,
    },

    #[error("field name {field:?} in {command:?} is reserved for subcommand selection")]
    ReservedName { command: String, field: String },

    #[error("field {field:?} in {command:?} is deferred, but has no prompt")]
    DeferWithoutPrompt { command: String, field: String },
}

/// A raw value failed to convert through a field's parser
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConversionError {
    #[error("Cannot parse {raw} as {ty}")]
    CannotParse { raw: String, ty: String },

    #[error(
        "The string {raw:?} is not a valid boolean! The only allowed values are: \
        y, yes, true, n, no, false."
    )]
    InvalidBool { raw: String },

    #[error("The value {raw:?} is not a valid integer.")]
    InvalidInt { raw: String },

    #[error("The value {raw:?} is not a valid number.")]
    InvalidFloat { raw: String },

    #[error("The value {raw:?} is not a recognized date or date-time.")]
    InvalidDateTime { raw: String },

    #[error("Invalid duration {raw:?}.")]
    InvalidDuration { raw: String },

    #[error("File {} does not exist!", .path.display())]
    PathMissing { path: PathBuf },

    #[error("Expected tuple of length {expected} but instead got {got} items")]
    TupleLength { expected: usize, got: usize },

    #[error("{raw:?} is not one of: {}", .choices.iter().join_with(", "))]
    NotAChoice { raw: String, choices: Vec<String> },

    #[error("Value {raw:?} is not a valid choice between {name}")]
    NotAMember { raw: String, name: String },

    #[error("{raw} can only be satisfied by the absence of a value")]
    NotNull { raw: String },

    #[error("{0}")]
    Custom(String),
}

impl ConversionError {
    pub fn custom(message: impl Display) -> Self {
        Self::Custom(message.to_string())
    }
}

/// The interactive prompt ran out of attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Failed to get a valid value after {attempts} attempts.")]
pub struct MaxAttemptsExceeded {
    pub attempts: u32,
}

/// A deferred field couldn't produce its value when it was first read
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum DeferredError {
    #[error(transparent)]
    MaxAttemptsExceeded(#[from] MaxAttemptsExceeded),

    /// The prompted value didn't fit the field's Rust type
    #[error(transparent)]
    Mismatch(#[from] ValueMismatch),
}

/// Whether an unrecognized token looked like an option or a positional
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    Argument,
    Option,
}

impl Display for ArgumentKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            ArgumentKind::Argument => "argument",
            ArgumentKind::Option => "option",
        })
    }
}

fn did_you_mean(suggestion: &Option<String>) -> impl Display + '_ {
    lazy_format! {
        match (suggestion) {
            Some(suggestion) => ". Did you mean {suggestion:?}?",
            None => "",
        }
    }
}

fn plural(count: usize) -> &'static str {
    match count {
        1 => "",
        _ => "s",
    }
}

/// Why a programmatically constructed instance was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateReason {
    /// The field was supplied more than once
    Repeated,

    /// The field isn't part of the command
    Unknown,
}

/// Errors that occur while parsing one invocation
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// An option, positional, or subcommand wasn't recognized. Includes the
    /// closest known name, if it was close enough to be a likely typo.
    #[error("Unknown {kind} {original:?}{}", did_you_mean(.suggestion))]
    UnknownArgument {
        kind: ArgumentKind,
        original: String,
        suggestion: Option<String>,
    },

    /// Tokens were left over after the whole command tree was parsed
    #[error("Unknown arguments {}", .arguments.iter().map(|arg| lazy_format!("{arg:?}")).join_with(", "))]
    UnknownArguments { arguments: Vec<String> },

    /// A field stopped receiving values before it had as many as it needs
    #[error("Not enough values for {name}")]
    Arity { name: String },

    #[error("Invalid value for {field}: {source}")]
    TypeConversion {
        field: String,
        source: ConversionError,
    },

    #[error(
        "Missing required argument{} {} for {command:?}",
        plural(.fields.len()),
        .fields.iter().join_with(", ")
    )]
    MissingRequiredArgument {
        command: String,
        fields: Vec<String>,
    },

    #[error("Missing required subcommand for {command:?}")]
    MissingRequiredSubcommand { command: String },

    #[error(transparent)]
    MaxAttemptsExceeded(#[from] MaxAttemptsExceeded),

    #[error(
        "{} field {field} for {command:?}",
        match .reason {
            DuplicateReason::Repeated => "Found duplicate",
            DuplicateReason::Unknown => "Invalid",
        }
    )]
    DuplicateField {
        command: String,
        field: String,
        reason: DuplicateReason,
    },
}

/// A dynamic value didn't match the Rust type it was extracted into
#[derive(Debug, Clone, PartialEq, Error)]
#[error("expected {expected}, got {found:?}")]
pub struct ValueMismatch {
    pub expected: &'static str,
    pub found: Value,
}

impl ValueMismatch {
    pub fn new(expected: &'static str, found: Value) -> Self {
        Self { expected, found }
    }
}

/// Errors converting a resolved instance into a typed command. These indicate
/// a disagreement between a command's schema and its Rust type.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum FromInstanceError {
    #[error("field {field:?} is missing from the parsed instance")]
    MissingField { field: &'static str },

    #[error("field {field:?}: {source}")]
    Mismatch {
        field: &'static str,
        source: ValueMismatch,
    },

    #[error("{prog:?} isn't a known subcommand")]
    UnknownSubcommand { prog: String },

    #[error("a subcommand is required, but none was parsed")]
    MissingSubcommand,
}

/**
Parsing stopped before a command could be produced. Help requests and parse
errors carry the (effective) schema of the command that was active at that
point, so the correct help page can be rendered.
*/
#[derive(Debug, Error)]
pub enum Interrupt {
    #[error("help was requested for {:?}", .schema.prog())]
    Help { schema: Arc<CommandSchema> },

    #[error("{error}")]
    Failed {
        schema: Arc<CommandSchema>,
        error: ParseError,
    },

    #[error(transparent)]
    Definition(#[from] SchemaError),

    #[error(transparent)]
    Construction(#[from] FromInstanceError),
}

impl Interrupt {
    #[must_use]
    pub fn is_help(&self) -> bool {
        matches!(self, Self::Help { .. })
    }

    #[must_use]
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// The schema of the command this interrupt belongs to, if any
    #[must_use]
    pub fn schema(&self) -> Option<&Arc<CommandSchema>> {
        match self {
            Self::Help { schema } | Self::Failed { schema, .. } => Some(schema),
            Self::Definition(_) | Self::Construction(_) => None,
        }
    }

    /// 0 for help, 1 for everything else
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Help { .. } => 0,
            _ => 1,
        }
    }
}
