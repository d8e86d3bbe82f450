/*!
The type→parser compiler. [`compile`] turns a declared [`Ty`] into a
[`ParserFn`], a pure function from [`Raw`] input to a [`Value`]. Container
parsers hold their inner parsers and delegate to them. Compilation fails fast,
when a schema is registered, for types that have no parser.
*/

use core::fmt;
use std::{
    path::PathBuf,
    sync::{Arc, LazyLock},
    time::Duration,
};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::{
    errors::{ConversionError, UnsupportedTypeError},
    ty::Ty,
    value::{Raw, Value},
};

type ParseFunction = dyn Fn(&Raw) -> Result<Value, ConversionError> + Send + Sync;

/// A compiled, shareable parser for a single field
#[derive(Clone)]
pub struct ParserFn {
    name: Arc<str>,
    func: Arc<ParseFunction>,
}

impl ParserFn {
    /// Wrap an arbitrary function as a parser. `name` is used in help pages
    /// and error messages.
    pub fn new(
        name: impl Into<Arc<str>>,
        func: impl Fn(&Raw) -> Result<Value, ConversionError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    #[inline]
    pub fn parse(&self, raw: &Raw) -> Result<Value, ConversionError> {
        (self.func)(raw)
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if this parser accepts the null marker
    #[must_use]
    pub fn accepts_null(&self) -> bool {
        self.parse(&Raw::Null).is_ok()
    }
}

impl fmt::Debug for ParserFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ParserFn").field(&self.name).finish()
    }
}

fn unsupported(ty: &Ty, reason: &'static str) -> UnsupportedTypeError {
    UnsupportedTypeError {
        ty: ty.to_string(),
        reason,
    }
}

/// Scalar parsers accept a single string, or a sequence of exactly one string.
fn scalar<'a>(raw: &'a Raw, name: &str) -> Result<&'a str, ConversionError> {
    match raw {
        Raw::Scalar(value) => Ok(value),
        Raw::Sequence(values) if values.len() == 1 => Ok(&values[0]),
        raw => Err(ConversionError::CannotParse {
            raw: raw.to_string(),
            ty: name.to_owned(),
        }),
    }
}

/// Container parsers split a scalar on commas; sequences are used as-is.
fn elements(raw: &Raw, name: &str) -> Result<Vec<String>, ConversionError> {
    match raw {
        Raw::Scalar(value) => Ok(value.split(',').map(str::to_owned).collect()),
        Raw::Sequence(values) => Ok(values.clone()),
        Raw::Null => Err(ConversionError::CannotParse {
            raw: raw.to_string(),
            ty: name.to_owned(),
        }),
    }
}

fn parse_each(parser: &ParserFn, items: Vec<String>) -> Result<Vec<Value>, ConversionError> {
    items
        .into_iter()
        .map(|item| parser.parse(&Raw::Scalar(item)))
        .collect()
}

/// Compile a declared type into a parser
pub fn compile(ty: &Ty) -> Result<ParserFn, UnsupportedTypeError> {
    let name = ty.to_string();

    let parser = match ty {
        Ty::Bool => ParserFn::new(name, |raw| {
            scalar(raw, "bool").and_then(parse_bool).map(Value::Bool)
        }),
        Ty::Int => ParserFn::new(name, |raw| {
            scalar(raw, "int").and_then(parse_int).map(Value::Int)
        }),
        Ty::Float => ParserFn::new(name, |raw| {
            scalar(raw, "float").and_then(parse_float).map(Value::Float)
        }),
        Ty::Str => ParserFn::new(name, |raw| {
            scalar(raw, "str").map(|value| Value::Str(value.to_owned()))
        }),
        &Ty::Path { must_exist } => ParserFn::new(name, move |raw| {
            let path = PathBuf::from(scalar(raw, "path")?);

            match must_exist && !path.exists() {
                true => Err(ConversionError::PathMissing { path }),
                false => Ok(Value::Path(path)),
            }
        }),
        Ty::DateTime => ParserFn::new(name, |raw| {
            scalar(raw, "datetime")
                .and_then(parse_datetime)
                .map(Value::DateTime)
        }),
        Ty::Duration => ParserFn::new(name, |raw| {
            scalar(raw, "duration")
                .and_then(parse_duration)
                .map(Value::Duration)
        }),
        Ty::List(inner) => {
            let inner = compile(inner)?;
            let label = name.clone();

            ParserFn::new(name, move |raw| {
                let items = elements(raw, &label)?;
                parse_each(&inner, items).map(Value::List)
            })
        }
        Ty::Tuple(items) if items.is_empty() => {
            return Err(unsupported(ty, "a tuple needs at least one element"));
        }
        Ty::Tuple(items) => {
            let parsers: Vec<ParserFn> = items.iter().map(compile).collect::<Result<_, _>>()?;
            let label = name.clone();

            ParserFn::new(name, move |raw| {
                let items = elements(raw, &label)?;

                if items.len() != parsers.len() {
                    return Err(ConversionError::TupleLength {
                        expected: parsers.len(),
                        got: items.len(),
                    });
                }

                parsers
                    .iter()
                    .zip(items)
                    .map(|(parser, item)| parser.parse(&Raw::Scalar(item)))
                    .collect::<Result<_, _>>()
                    .map(Value::Tuple)
            })
        }
        Ty::Variadic(inner) => {
            let inner = compile(inner)?;
            let label = name.clone();

            ParserFn::new(name, move |raw| {
                let items = elements(raw, &label)?;
                parse_each(&inner, items).map(Value::Tuple)
            })
        }
        Ty::Union(alternatives) if alternatives.is_empty() => {
            return Err(unsupported(ty, "a union needs at least one alternative"));
        }
        Ty::Union(alternatives) => {
            let parsers: Vec<ParserFn> = alternatives
                .iter()
                .map(compile)
                .collect::<Result<_, _>>()?;

            ParserFn::new(name, move |raw| {
                let mut first_error = None;

                for (index, parser) in parsers.iter().enumerate() {
                    match parser.parse(raw) {
                        Ok(value) => {
                            return Ok(Value::Alternative {
                                index,
                                value: Box::new(value),
                            });
                        }
                        Err(error) => {
                            first_error.get_or_insert(error);
                        }
                    }
                }

                Err(first_error.unwrap_or_else(|| ConversionError::CannotParse {
                    raw: raw.to_string(),
                    ty: "union".to_owned(),
                }))
            })
        }
        Ty::Literal(values) if values.is_empty() => {
            return Err(unsupported(ty, "a literal needs at least one value"));
        }
        Ty::Literal(values) => {
            let values = values.clone();
            let label = name.clone();

            ParserFn::new(name, move |raw| {
                let value = scalar(raw, &label)?;

                match values.iter().any(|candidate| candidate == value) {
                    true => Ok(Value::Str(value.to_owned())),
                    false => Err(ConversionError::NotAChoice {
                        raw: value.to_owned(),
                        choices: values.clone(),
                    }),
                }
            })
        }
        Ty::Enum { members, .. } if members.is_empty() => {
            return Err(unsupported(ty, "an enum needs at least one member"));
        }
        Ty::Enum {
            name: enum_name,
            members,
        } => {
            let members = members.clone();
            let enum_name = enum_name.clone();

            ParserFn::new(name, move |raw| {
                let value = scalar(raw, &enum_name)?;

                members
                    .iter()
                    .find(|member| member.eq_ignore_ascii_case(value))
                    .map(|member| Value::Str(member.clone()))
                    .ok_or_else(|| ConversionError::NotAMember {
                        raw: value.to_owned(),
                        name: enum_name.clone(),
                    })
            })
        }
        Ty::None => ParserFn::new(name, |raw| match raw {
            Raw::Null => Ok(Value::None),
            raw => Err(ConversionError::NotNull {
                raw: raw.to_string(),
            }),
        }),
        Ty::Optional(inner) => {
            let inner = compile(inner)?;

            ParserFn::new(name, move |raw| match raw {
                Raw::Null => Ok(Value::None),
                raw => inner.parse(raw),
            })
        }
        Ty::Positional(inner) => compile(inner)?,
        Ty::Opaque(_) => {
            return Err(unsupported(
                ty,
                "there is no built-in parser for this type; supply one explicitly",
            ));
        }
    };

    Ok(parser)
}

fn parse_bool(raw: &str) -> Result<bool, ConversionError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" => Ok(true),
        "n" | "no" | "false" => Ok(false),
        _ => Err(ConversionError::InvalidBool {
            raw: raw.to_owned(),
        }),
    }
}

fn parse_int(raw: &str) -> Result<i64, ConversionError> {
    let trimmed = raw.trim();

    if let Ok(value) = trimmed.parse::<i64>() {
        return Ok(value);
    }

    // Whole-valued numbers written with a fraction or exponent (`3.0`, `1e3`)
    // are still integers; anything with a fractional part is not.
    match trimmed.parse::<f64>() {
        Ok(value)
            if value.is_finite()
                && value.fract() == 0.0
                && value >= i64::MIN as f64
                && value < i64::MAX as f64 =>
        {
            Ok(value as i64)
        }
        _ => Err(ConversionError::InvalidInt {
            raw: raw.to_owned(),
        }),
    }
}

fn parse_float(raw: &str) -> Result<f64, ConversionError> {
    raw.trim()
        .parse()
        .map_err(|_| ConversionError::InvalidFloat {
            raw: raw.to_owned(),
        })
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a date or date-time. Values without an offset are taken as UTC.
fn parse_datetime(raw: &str) -> Result<DateTime<chrono::FixedOffset>, ConversionError> {
    let trimmed = raw.trim();

    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(datetime);
    }

    let naive = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            NAIVE_DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| ConversionError::InvalidDateTime {
            raw: raw.to_owned(),
        })?;

    Ok(naive.and_utc().fixed_offset())
}

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Every duration unit, largest first, with its accepted spellings. The last
/// spelling is the canonical one.
const DURATION_UNITS: &[(&[&str], u64)] = &[
    (&["weeks", "week", "w"], 7 * 24 * 60 * 60 * 1_000_000_000),
    (&["days", "day", "d"], 24 * 60 * 60 * 1_000_000_000),
    (&["hours", "hour", "h"], 60 * 60 * 1_000_000_000),
    (&["minutes", "minute", "m"], 60 * 1_000_000_000),
    (&["seconds", "second", "s"], 1_000_000_000),
    (&["milliseconds", "millisecond", "ms"], 1_000_000),
    (&["microseconds", "microsecond", "us"], 1_000),
];

static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s*([A-Za-z]+)$").expect("duration pattern is valid")
});

fn parse_duration(raw: &str) -> Result<Duration, ConversionError> {
    let invalid = || ConversionError::InvalidDuration {
        raw: raw.to_owned(),
    };

    let captures = DURATION_PATTERN.captures(raw.trim()).ok_or_else(invalid)?;
    let count: u64 = captures[1].parse().map_err(|_| invalid())?;
    let unit = captures[2].to_ascii_lowercase();

    let &(_, unit_nanos) = DURATION_UNITS
        .iter()
        .find(|(spellings, _)| spellings.contains(&unit.as_str()))
        .ok_or_else(invalid)?;

    let total = u128::from(count) * u128::from(unit_nanos);
    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| invalid())?;
    let nanos = u32::try_from(total % NANOS_PER_SEC).map_err(|_| invalid())?;

    Ok(Duration::new(secs, nanos))
}

/// The canonical form of a duration: a count of the largest unit that divides
/// it exactly. Sub-microsecond precision isn't expressible and is truncated.
pub(crate) fn format_duration(duration: Duration) -> String {
    let total = duration.as_nanos();

    if total == 0 {
        return "0s".to_owned();
    }

    DURATION_UNITS
        .iter()
        .find(|&&(_, unit_nanos)| total % u128::from(unit_nanos) == 0)
        .map(|&(spellings, unit_nanos)| {
            let short = spellings.last().copied().unwrap_or_default();
            format!("{}{short}", total / u128::from(unit_nanos))
        })
        .unwrap_or_else(|| format!("{}us", total / 1_000))
}
