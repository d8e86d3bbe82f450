use std::{
    io::{self, Write as _},
    sync::Arc,
};

use parley_parser::normalize;
use tracing::warn;

use crate::{
    build,
    command::Command,
    config::ParseConfig,
    errors::Interrupt,
    help::HelpPage,
    instance::ParsedInstance,
    schema::CommandSchema,
};

/// Parse arguments (not including the program name) against a schema
pub fn parse_from<I>(
    schema: Arc<CommandSchema>,
    args: I,
    config: &ParseConfig,
) -> Result<ParsedInstance, Interrupt>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let tokens = normalize(args);
    build::parse_tree(schema, &tokens, config)
}

/// Render whatever should be shown to the user for an interrupt: a help page,
/// a help page with an error, or just the error.
#[must_use]
pub fn render_interrupt(interrupt: &Interrupt, config: &ParseConfig) -> String {
    match interrupt {
        Interrupt::Help { schema } => config.formatter.render(&HelpPage::new(schema)),
        Interrupt::Failed { schema, error } if config.help_on_fail => config
            .formatter
            .render(&HelpPage::new(schema).with_error(error)),
        interrupt => format!("Error: {interrupt}\n"),
    }
}

/// Print an interrupt and exit the process: help goes to stdout with a
/// successful exit code; everything else goes to stderr.
pub fn exit(interrupt: &Interrupt, config: &ParseConfig) -> ! {
    let rendered = render_interrupt(interrupt, config);

    let written = match interrupt.is_help() {
        true => io::stdout().lock().write_all(rendered.as_bytes()),
        false => io::stderr().lock().write_all(rendered.as_bytes()),
    };

    if let Err(error) = written {
        warn!(%error, "failed to print parse result");
    }

    std::process::exit(interrupt.exit_code())
}

/// Helper type for loading arguments from the environment. Usually you can
/// just use `Command::parse` or `#[parley::main]` instead of reaching for
/// this type.
#[derive(Debug, Clone)]
pub struct LoadedArguments {
    arguments: Vec<String>,
}

impl LoadedArguments {
    /// Arguments that aren't valid UTF-8 are converted lossily
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            arguments: std::env::args_os()
                .map(|arg| arg.to_string_lossy().into_owned())
                .collect(),
        }
    }

    #[must_use]
    pub fn argv0(&self) -> Option<&str> {
        self.arguments.first().map(String::as_str)
    }

    /// Every argument after the program name
    #[must_use]
    pub fn args(&self) -> &[String] {
        self.arguments.get(1..).unwrap_or(&[])
    }

    pub fn try_parse<C: Command>(&self, config: &ParseConfig) -> Result<C, Interrupt> {
        C::try_parse_from_with(self.args(), config)
    }

    pub fn parse<C: Command>(&self, config: &ParseConfig) -> C {
        self.try_parse(config)
            .unwrap_or_else(|interrupt| exit(&interrupt, config))
    }
}
