/*!
Dynamic values: the raw input handed to a parser, and the typed value a
parser produces.
*/

use core::fmt;
use std::{path::PathBuf, time::Duration};

use chrono::{DateTime, FixedOffset};
use joinery::JoinableIterator;

use crate::{deferred::DeferredValue, parser::format_duration};

/**
The unconverted input for a single field. Fields that take at most one token
receive a [`Raw::Scalar`]; fields that collect several receive a
[`Raw::Sequence`]. [`Raw::Null`] is the internal marker for "no value at all",
which only nullable types accept.
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Raw {
    Scalar(String),
    Sequence(Vec<String>),
    Null,
}

impl Raw {
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    pub fn sequence<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::Sequence(values.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Raw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Raw::Scalar(value) => write!(f, "{value:?}"),
            Raw::Sequence(values) => write!(
                f,
                "[{}]",
                values.iter().map(|value| lazy_format::lazy_format!("{value:?}")).join_with(", ")
            ),
            Raw::Null => f.write_str("<none>"),
        }
    }
}

/// A fully parsed field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Path(PathBuf),
    DateTime(DateTime<FixedOffset>),
    Duration(Duration),
    List(Vec<Value>),
    Tuple(Vec<Value>),

    /// The value produced by the `index`th alternative of a union
    Alternative { index: usize, value: Box<Value> },

    /// A deferred field's value, which is prompted for when first read
    Deferred(DeferredValue),
}

impl Value {
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Remove any union tagging
    #[must_use]
    pub fn untagged(&self) -> &Value {
        match self {
            Value::Alternative { value, .. } => value.untagged(),
            value => value,
        }
    }
}

/// Values display in their canonical string form, which their type's parser
/// accepts back.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("none"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Str(value) => f.write_str(value),
            Value::Path(path) => write!(f, "{}", path.display()),
            Value::DateTime(datetime) => f.write_str(&datetime.to_rfc3339()),
            Value::Duration(duration) => write!(f, "{}", format_duration(*duration)),
            Value::List(values) | Value::Tuple(values) => {
                write!(f, "{}", values.iter().join_with(","))
            }
            Value::Alternative { value, .. } => value.fmt(f),
            Value::Deferred(deferred) => match deferred.peek() {
                Some(value) => value.fmt(f),
                None => f.write_str("<deferred>"),
            },
        }
    }
}
