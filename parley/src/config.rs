use core::fmt;
use std::sync::Arc;

use crate::{
    help::HelpFormatter,
    printers::PlainFormatter,
    prompt::{Prompter, TerminalPrompter},
};

/**
Settings for a single parse. A `ParseConfig` is passed explicitly to every
entry point and handed down by reference through the whole command tree;
nothing in the engine reads global state.
*/
pub struct ParseConfig {
    /// On a parse error, print the failing command's help page along with
    /// the error, rather than only the error
    pub help_on_fail: bool,

    /// Accept `--no-<flag>` to set a boolean option to false
    pub negative_flags: bool,

    /// Shared with any deferred values the parse produces
    pub prompter: Arc<dyn Prompter>,
    pub formatter: Box<dyn HelpFormatter>,
}

impl ParseConfig {
    #[must_use]
    pub fn help_on_fail(self, help_on_fail: bool) -> Self {
        Self {
            help_on_fail,
            ..self
        }
    }

    #[must_use]
    pub fn negative_flags(self, negative_flags: bool) -> Self {
        Self {
            negative_flags,
            ..self
        }
    }

    #[must_use]
    pub fn prompter(self, prompter: impl Prompter + 'static) -> Self {
        Self {
            prompter: Arc::new(prompter),
            ..self
        }
    }

    #[must_use]
    pub fn formatter(self, formatter: impl HelpFormatter + 'static) -> Self {
        Self {
            formatter: Box::new(formatter),
            ..self
        }
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            help_on_fail: true,
            negative_flags: false,
            prompter: Arc::new(TerminalPrompter::stdio()),
            formatter: Box::new(PlainFormatter::default()),
        }
    }
}

impl fmt::Debug for ParseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseConfig")
            .field("help_on_fail", &self.help_on_fail)
            .field("negative_flags", &self.negative_flags)
            .finish_non_exhaustive()
    }
}
