/*!
The link between Rust types and the declared-type grammar. A type that
implements [`ArgType`] can be used as the type of a command field: it
describes itself as a [`Ty`], from which the field's parser is compiled, and
it converts to and from the dynamic [`Value`] the parser produces.

Implementations are provided for the primitive and standard library types
that have a built-in parser. `#[derive(Choice)]` implements it for enums of
unit variants.
*/

use std::path::PathBuf;

use crate::{errors::ValueMismatch, ty::Ty, value::Value};

/**
A type that can be the type of a command field.

`from_value` is only ever handed values produced by the parser compiled from
`descriptor()` (or by a default), so a mismatch indicates that the two
disagree, rather than bad user input.
*/
pub trait ArgType: Sized {
    /// Describe this type in the declared-type grammar
    fn descriptor() -> Ty;

    /// Extract an instance of this type from a parsed value
    fn from_value(value: Value) -> Result<Self, ValueMismatch>;

    /// Convert an instance of this type into a value, for use as a default
    fn into_value(self) -> Value;
}

/// A filesystem path that must exist when it's parsed
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExistingPath(pub PathBuf);

impl ExistingPath {
    #[must_use]
    pub fn into_inner(self) -> PathBuf {
        self.0
    }
}

impl AsRef<std::path::Path> for ExistingPath {
    fn as_ref(&self) -> &std::path::Path {
        &self.0
    }
}

/// One or more values of the same type. As a field, this takes every value
/// up to the next option, and requires at least one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Variadic<T>(pub Vec<T>);

impl<T> Variadic<T> {
    #[must_use]
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

/// A value that parsed as either the first type or, failing that, the second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Either<L, R> {
    Left(L),
    Right(R),
}
