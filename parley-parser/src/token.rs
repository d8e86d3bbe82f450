use core::fmt;

use crate::dash_to_snake;

/// How a single command-line atom was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `--name`
    LongOption,

    /// `-n`
    ShortOption,

    /// Anything without a leading dash, or anything after a bare `--`
    Positional,
}

/**
A single classified argument from the command line.

The value of an option token is its normalized field name (dashes stripped,
inner dashes turned into underscores); the value of a positional is the
argument itself. The original spelling is always retained for error messages.
*/
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token {
    kind: TokenKind,
    value: String,
    original: String,
    escaped: bool,
}

impl Token {
    /// Classify an atom known to start with a `-`
    pub(crate) fn option(atom: &str) -> Self {
        let kind = match atom.starts_with("--") {
            true => TokenKind::LongOption,
            false => TokenKind::ShortOption,
        };

        Self {
            kind,
            value: dash_to_snake(atom),
            original: atom.to_owned(),
            escaped: false,
        }
    }

    pub(crate) fn positional(atom: &str) -> Self {
        Self {
            kind: TokenKind::Positional,
            value: atom.to_owned(),
            original: atom.to_owned(),
            escaped: false,
        }
    }

    /// A positional that came after a bare `--`
    pub(crate) fn escaped(atom: &str) -> Self {
        Self {
            escaped: true,
            ..Self::positional(atom)
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The normalized name (for options) or the argument (for positionals)
    #[inline]
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The atom exactly as it appeared on the command line
    #[inline]
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    #[inline]
    #[must_use]
    pub fn is_positional(&self) -> bool {
        self.kind == TokenKind::Positional
    }

    #[inline]
    #[must_use]
    pub fn is_option(&self) -> bool {
        !self.is_positional()
    }

    /// True if this atom came after a bare `--`. Escaped atoms are plain
    /// data: they never request help or select a subcommand.
    #[inline]
    #[must_use]
    pub fn is_escaped(&self) -> bool {
        self.escaped
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::LongOption => write!(f, "LongOption({:?})", self.value),
            TokenKind::ShortOption => write!(f, "ShortOption({:?})", self.value),
            TokenKind::Positional => write!(f, "Positional({:?})", self.value),
        }
    }
}
