/*!
Implementations of [`ArgType`] for various primitive and standard library
types
 */

use std::{path::PathBuf, time::Duration};

use chrono::{DateTime, FixedOffset};

use crate::{
    errors::ValueMismatch,
    parameter::{ArgType, Either, ExistingPath, Variadic},
    ty::Ty,
    value::Value,
};

/// Types that map onto a single `Value` variant
macro_rules! direct {
    ($($type:ty => $variant:ident ($descriptor:expr, $expected:literal),)*) => {
        $(
            impl ArgType for $type {
                #[inline]
                fn descriptor() -> Ty {
                    $descriptor
                }

                #[inline]
                fn from_value(value: Value) -> Result<Self, ValueMismatch> {
                    match value {
                        Value::$variant(inner) => Ok(inner),
                        value => Err(ValueMismatch::new($expected, value)),
                    }
                }

                #[inline]
                fn into_value(self) -> Value {
                    Value::$variant(self)
                }
            }
        )*
    };
}

direct! {
    bool => Bool(Ty::Bool, "a bool"),
    String => Str(Ty::Str, "a string"),
    PathBuf => Path(Ty::path(), "a path"),
    DateTime<FixedOffset> => DateTime(Ty::DateTime, "a datetime"),
    Duration => Duration(Ty::Duration, "a duration"),
}

macro_rules! integers {
    ($($type:ident)*) => {
        $(
            impl ArgType for $type {
                #[inline]
                fn descriptor() -> Ty {
                    Ty::Int
                }

                fn from_value(value: Value) -> Result<Self, ValueMismatch> {
                    match value {
                        Value::Int(int) => $type::try_from(int)
                            .map_err(|_| ValueMismatch::new(stringify!($type), value)),
                        value => Err(ValueMismatch::new("an integer", value)),
                    }
                }

                // Values beyond the range of i64 saturate
                #[inline]
                fn into_value(self) -> Value {
                    Value::Int(i64::try_from(self).unwrap_or(i64::MAX))
                }
            }
        )*
    };
}

integers! {
    u8 u16 u32 u64 usize
    i8 i16 i32 i64 isize
}

impl ArgType for f64 {
    #[inline]
    fn descriptor() -> Ty {
        Ty::Float
    }

    fn from_value(value: Value) -> Result<Self, ValueMismatch> {
        match value {
            Value::Float(float) => Ok(float),
            Value::Int(int) => Ok(int as f64),
            value => Err(ValueMismatch::new("a float", value)),
        }
    }

    #[inline]
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl ArgType for f32 {
    #[inline]
    fn descriptor() -> Ty {
        Ty::Float
    }

    fn from_value(value: Value) -> Result<Self, ValueMismatch> {
        f64::from_value(value).map(|float| float as f32)
    }

    #[inline]
    fn into_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl ArgType for ExistingPath {
    #[inline]
    fn descriptor() -> Ty {
        Ty::Path { must_exist: true }
    }

    fn from_value(value: Value) -> Result<Self, ValueMismatch> {
        PathBuf::from_value(value).map(ExistingPath)
    }

    #[inline]
    fn into_value(self) -> Value {
        Value::Path(self.0)
    }
}

fn from_values<T: ArgType>(values: Vec<Value>) -> Result<Vec<T>, ValueMismatch> {
    values.into_iter().map(T::from_value).collect()
}

impl<T: ArgType> ArgType for Vec<T> {
    fn descriptor() -> Ty {
        Ty::list(T::descriptor())
    }

    fn from_value(value: Value) -> Result<Self, ValueMismatch> {
        match value {
            Value::List(values) => from_values(values),
            value => Err(ValueMismatch::new("a list", value)),
        }
    }

    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(T::into_value).collect())
    }
}

impl<T: ArgType> ArgType for Variadic<T> {
    fn descriptor() -> Ty {
        Ty::variadic(T::descriptor())
    }

    fn from_value(value: Value) -> Result<Self, ValueMismatch> {
        match value {
            Value::Tuple(values) => from_values(values).map(Variadic),
            value => Err(ValueMismatch::new("a tuple", value)),
        }
    }

    fn into_value(self) -> Value {
        Value::Tuple(self.0.into_iter().map(T::into_value).collect())
    }
}

macro_rules! tuples {
    ($($len:literal => ($($name:ident)+),)*) => {
        $(
            impl<$($name: ArgType),+> ArgType for ($($name,)+) {
                fn descriptor() -> Ty {
                    Ty::tuple([$($name::descriptor()),+])
                }

                #[allow(non_snake_case)]
                fn from_value(value: Value) -> Result<Self, ValueMismatch> {
                    match value {
                        Value::Tuple(values) if values.len() == $len => {
                            let mut values = values.into_iter();
                            $(
                                let $name = match values.next() {
                                    Some(value) => $name::from_value(value)?,
                                    None => return Err(ValueMismatch::new(
                                        concat!("a tuple of ", $len),
                                        Value::Tuple(Vec::new()),
                                    )),
                                };
                            )+
                            Ok(($($name,)+))
                        }
                        value => Err(ValueMismatch::new(concat!("a tuple of ", $len), value)),
                    }
                }

                #[allow(non_snake_case)]
                fn into_value(self) -> Value {
                    let ($($name,)+) = self;
                    Value::Tuple(vec![$($name.into_value()),+])
                }
            }
        )*
    };
}

tuples! {
    1 => (A),
    2 => (A B),
    3 => (A B C),
    4 => (A B C D),
}

impl<T: ArgType> ArgType for Option<T> {
    fn descriptor() -> Ty {
        Ty::optional(T::descriptor())
    }

    fn from_value(value: Value) -> Result<Self, ValueMismatch> {
        match value {
            Value::None => Ok(None),
            value => T::from_value(value).map(Some),
        }
    }

    fn into_value(self) -> Value {
        match self {
            None => Value::None,
            Some(value) => value.into_value(),
        }
    }
}

impl<L: ArgType, R: ArgType> ArgType for Either<L, R> {
    fn descriptor() -> Ty {
        Ty::union([L::descriptor(), R::descriptor()])
    }

    fn from_value(value: Value) -> Result<Self, ValueMismatch> {
        match value {
            Value::Alternative { index: 0, value } => L::from_value(*value).map(Either::Left),
            Value::Alternative { index: 1, value } => R::from_value(*value).map(Either::Right),
            value => Err(ValueMismatch::new("a two-way union", value)),
        }
    }

    fn into_value(self) -> Value {
        let (index, value) = match self {
            Either::Left(left) => (0, left.into_value()),
            Either::Right(right) => (1, right.into_value()),
        };

        Value::Alternative {
            index,
            value: Box::new(value),
        }
    }
}
