/*!
A declarative, schema-driven command line framework. Describe a command as a
struct, and `parley` derives argument parsing, subcommand dispatch, shared
("forwarded") options, interactive prompting for missing values, typo
suggestions, and help pages from that description.

- [`#[derive(Command)]`][macro@Command] registers a struct's fields as a
  [`CommandSchema`] (once per type) and builds the struct back from a
  [`ParsedInstance`]. The `#[parley]` attribute customizes fields with
  `short`, `default`, `default_factory`, `prompt`, `hide_input`,
  `max_attempts`, `defer`, `forwarded`, `hidden`, `group`, `positional`, and
  `parser`. A `defer` field has the type [`Deferred<T>`], and is only
  prompted for when the program first reads it.
- [`#[derive(Subcommand)]`][macro@Subcommand] turns an enum of commands into
  a subcommand selector; a field marked `#[parley(subcommand)]` holds it.
- [`#[derive(Choice)]`][macro@Choice] makes an enum of unit variants usable
  as a field type that accepts any of its variant names.
- [`#[parley::main]`][main] can be placed on your `main` function to make the
  parsed command available as a function argument. It works on tokio
  `async fn main`, too. `#[parley::main(config = make_config())]` parses
  with a custom [`ParseConfig`].

Everything the derives generate is also available directly: see
[`CommandSchema::builder`] and [`ParsedInstance::builder`].
*/

pub mod arguments;
mod build;
mod command;
pub mod config;
pub mod deferred;
pub mod distance;
pub mod errors;
mod forward;
pub mod help;
mod impls;
mod instance;
pub mod parameter;
pub mod parser;
mod printers;
pub mod prompt;
pub mod schema;
mod state;
pub mod ty;
pub mod value;

pub use parley_derive::{Choice, Command, Subcommand, main};

pub use command::{Command, Subcommand};
pub use config::ParseConfig;
pub use deferred::{Deferred, DeferredValue};
pub use errors::{
    ConversionError, DeferredError, FromInstanceError, Interrupt, ParseError, SchemaError,
    ValueMismatch,
};
pub use help::{HelpFormatter, HelpPage};
pub use instance::{InstanceBuilder, ParsedInstance};
pub use parameter::{ArgType, Either, ExistingPath, Variadic};
pub use parser::{ParserFn, compile};
pub use printers::PlainFormatter;
pub use prompt::{PromptRequest, Prompter, TerminalPrompter};
pub use schema::{ArgConfig, ArgumentSpec, CommandSchema, FieldDecl, SchemaBuilder};
pub use state::{HELP_ARGS, is_help_trigger};
pub use ty::{Nargs, Ty};
pub use value::{Raw, Value};
