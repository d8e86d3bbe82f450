/*!
The help-rendering collaborator. The engine gathers everything a help page
needs into a [`HelpPage`] and hands it to a [`HelpFormatter`]; how the page
looks is entirely up to the formatter. [`PlainFormatter`][crate::PlainFormatter]
is the default.
*/

use std::io;

use tracing::warn;

use crate::{
    errors::ParseError,
    schema::{ArgumentSpec, CommandSchema},
};

/// Everything needed to render help for one command
#[derive(Debug, Clone)]
pub struct HelpPage<'a> {
    /// The parent chain followed by the command itself
    pub full_command: Vec<&'a str>,
    pub description: Option<&'a str>,
    pub epilog: Option<&'a str>,
    pub options: Vec<&'a ArgumentSpec>,
    pub positionals: Vec<&'a ArgumentSpec>,
    pub subcommands: Vec<&'a CommandSchema>,

    /// The command can run without choosing a subcommand
    pub subcommand_optional: bool,

    /// The parse error that caused this page to be shown, if any
    pub error: Option<&'a ParseError>,
}

impl<'a> HelpPage<'a> {
    #[must_use]
    pub fn new(schema: &'a CommandSchema) -> Self {
        Self {
            full_command: schema.full_command(),
            description: schema.description(),
            epilog: schema.epilog(),
            options: schema.options().map(|spec| &**spec).collect(),
            positionals: schema.positionals().map(|spec| &**spec).collect(),
            subcommands: schema
                .subcommand()
                .map(|slot| slot.variants().iter().map(|variant| &**variant).collect())
                .unwrap_or_default(),
            subcommand_optional: schema.subcommand().is_some_and(|slot| slot.is_optional()),
            error: None,
        }
    }

    #[must_use]
    pub fn with_error(self, error: &'a ParseError) -> Self {
        Self {
            error: Some(error),
            ..self
        }
    }
}

/// Renders a [`HelpPage`]
pub trait HelpFormatter {
    fn write_help(&self, out: &mut dyn io::Write, page: &HelpPage<'_>) -> io::Result<()>;

    /// Render the page into a string
    fn render(&self, page: &HelpPage<'_>) -> String {
        let mut buffer = Vec::new();

        if let Err(error) = self.write_help(&mut buffer, page) {
            warn!(%error, "failed to render help page");
        }

        String::from_utf8_lossy(&buffer).into_owned()
    }
}
