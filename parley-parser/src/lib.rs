/*!
Low-level handling of raw command-line arguments. Splits `--option=value`
atoms, classifies every atom as a long option, short option, or positional,
and hands the result out through a [`Cursor`]. No type handling happens here;
usually this is too low level to use directly.
*/

mod token;

pub use token::{Token, TokenKind};

/// Convert an option spelling into a field name: leading dashes are stripped
/// and the remaining dashes become underscores (`--dry-run` => `dry_run`).
#[must_use]
pub fn dash_to_snake(option: &str) -> String {
    option.trim_start_matches('-').replace('-', "_")
}

/// The reverse of [`dash_to_snake`], used for display (`dry_run` => `dry-run`)
#[must_use]
pub fn snake_to_dash(name: &str) -> String {
    name.replace('_', "-")
}

/**
Turn the raw process arguments (excluding the program name) into classified
tokens.

- `--option=value` and `-o=value` are split at the first `=`; the value half
  is always a positional, even if it starts with a `-`.
- Two or more leading dashes make a long option, exactly one makes a short
  option, anything else is a positional.
- A bare `--` is consumed, and every atom after it is a positional, verbatim.
*/
pub fn normalize<I>(args: I) -> Vec<Token>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut tokens = Vec::new();
    let mut args = args.into_iter();

    for arg in args.by_ref() {
        let arg = arg.as_ref();

        if arg == "--" {
            break;
        }

        if arg.starts_with('-') {
            if let Some((option, value)) = split_once(arg, b'=') {
                tokens.push(Token::option(option));
                tokens.push(Token::positional(value));
                continue;
            }

            tokens.push(Token::option(arg));
        } else {
            tokens.push(Token::positional(arg));
        }
    }

    tokens.extend(args.map(|arg| Token::escaped(arg.as_ref())));
    tokens
}

fn split_once(input: &str, delimiter: u8) -> Option<(&str, &str)> {
    // The delimiter is ASCII, so both halves fall on char boundaries
    memchr::memchr(delimiter, input.as_bytes()).map(|i| (&input[..i], &input[i + 1..]))
}

/**
A read position into an immutable token buffer.

The parse engine threads a single `&mut Cursor` through the recursive descent
into subcommands: every consumed token advances it exactly once, and it is
never rewound, so a subcommand resumes exactly where its parent stopped.
*/
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    tokens: &'a [Token],
    position: usize,
}

impl<'a> Cursor<'a> {
    #[inline]
    #[must_use]
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// The tokens that haven't been consumed yet
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> &'a [Token] {
        &self.tokens[self.position..]
    }

    /// The number of tokens consumed so far
    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.tokens.len()
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = &'a Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.tokens.len().saturating_sub(self.position);
        (len, Some(len))
    }
}
