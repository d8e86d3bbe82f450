/*!
The declared-type grammar. Every field in a command is described by a [`Ty`],
built once when the command's schema is registered; the parser compiler and
the arity rules match exhaustively over this closed set.
*/

use core::fmt;

use joinery::JoinableIterator;

/// A declared field type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ty {
    /// `y`/`yes`/`true` or `n`/`no`/`false`; a presence-only flag as an option
    Bool,

    /// A whole number
    Int,

    Float,

    Str,

    /// A filesystem path, optionally checked for existence at parse time
    Path { must_exist: bool },

    /// A calendar date or date-time
    DateTime,

    /// `<integer><unit>`, such as `3d` or `90 seconds`
    Duration,

    /// Zero or more values of the same type
    List(Box<Ty>),

    /// Exactly one value for each of the given types
    Tuple(Vec<Ty>),

    /// One or more values of the same type
    Variadic(Box<Ty>),

    /// The first of these types that successfully parses
    Union(Vec<Ty>),

    /// Exactly one of these strings
    Literal(Vec<String>),

    /// One of these member names, matched case-insensitively
    Enum { name: String, members: Vec<String> },

    /// Only satisfied by the absence of a value
    None,

    /// Equivalent to `Union([inner, None])`
    Optional(Box<Ty>),

    /// Marks a field as positional; otherwise transparent
    Positional(Box<Ty>),

    /// A named type with no built-in parser. Fields of this type must supply
    /// their own parser.
    Opaque(String),
}

/// The number of raw tokens a single field consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nargs {
    /// Exactly this many tokens. `Exactly(0)` is a presence-only flag.
    Exactly(usize),

    /// `+`
    OneOrMore,

    /// `*`
    ZeroOrMore,
}

impl Ty {
    pub fn list(inner: Ty) -> Self {
        Self::List(Box::new(inner))
    }

    pub fn tuple(items: impl IntoIterator<Item = Ty>) -> Self {
        Self::Tuple(items.into_iter().collect())
    }

    pub fn variadic(inner: Ty) -> Self {
        Self::Variadic(Box::new(inner))
    }

    pub fn union(alternatives: impl IntoIterator<Item = Ty>) -> Self {
        Self::Union(alternatives.into_iter().collect())
    }

    pub fn literal<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::Literal(values.into_iter().map(Into::into).collect())
    }

    pub fn enumeration<S: Into<String>>(
        name: impl Into<String>,
        members: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::Enum {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn optional(inner: Ty) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn positional(inner: Ty) -> Self {
        match inner {
            Self::Positional(inner) => Self::Positional(inner),
            inner => Self::Positional(Box::new(inner)),
        }
    }

    pub fn path() -> Self {
        Self::Path { must_exist: false }
    }

    /// The type with any positional marker removed
    #[must_use]
    pub fn unmarked(&self) -> &Ty {
        match self {
            Self::Positional(inner) => inner.unmarked(),
            ty => ty,
        }
    }

    #[must_use]
    pub fn is_positional(&self) -> bool {
        matches!(self, Self::Positional(_))
    }

    /// Derive the arity of a field from its type
    #[must_use]
    pub fn nargs(&self) -> Nargs {
        match *self.unmarked() {
            Self::Bool => Nargs::Exactly(0),
            Self::List(_) => Nargs::ZeroOrMore,
            Self::Tuple(ref items) => Nargs::Exactly(items.len()),
            Self::Variadic(_) => Nargs::OneOrMore,
            _ => Nargs::Exactly(1),
        }
    }

    /// True if a parser compiled from this type accepts the null marker, so
    /// that an absent value is a valid value.
    #[must_use]
    pub fn accepts_null(&self) -> bool {
        match *self.unmarked() {
            Self::None | Self::Optional(_) => true,
            Self::Union(ref alternatives) => alternatives.iter().any(Ty::accepts_null),
            _ => false,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Str => f.write_str("str"),
            Self::Path { .. } => f.write_str("path"),
            Self::DateTime => f.write_str("datetime"),
            Self::Duration => f.write_str("duration"),
            Self::List(inner) => write!(f, "list[{inner}]"),
            Self::Tuple(items) => write!(f, "tuple[{}]", items.iter().join_with(", ")),
            Self::Variadic(inner) => write!(f, "tuple[{inner}, ...]"),
            Self::Union(alternatives) => write!(f, "{}", alternatives.iter().join_with(" | ")),
            Self::Literal(values) => write!(f, "{{{}}}", values.iter().join_with("|")),
            Self::Enum { name, .. } => f.write_str(name),
            Self::None => f.write_str("none"),
            Self::Optional(inner) => write!(f, "{inner} | none"),
            Self::Positional(inner) => inner.fmt(f),
            Self::Opaque(name) => f.write_str(name),
        }
    }
}
