//! Per-variant parsing and coercion rules.

use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::binder::context::{ExecutionContext, InjectableType};
use crate::binder::data_binder::Binder;
use crate::binder::error::{BindError, Result};
use crate::binder::operations::type_conversion::{convert, parse_lenient_bool};
use crate::binder::value::{DeclaredType, Value};
use crate::date_format::DateFormat;

/// The closed set of parameter variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    String,
    Integer,
    Long,
    Float,
    Double,
    Boolean,
    Date,
    ResultSet,
    Injected(InjectableType),
}

/// Category of a parameter as reported to the interpreter host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarCode {
    Unspecified,
    String,
    Integer,
    Float,
    Date,
}

impl GrammarCode {
    pub fn code(&self) -> i32 {
        match self {
            GrammarCode::Unspecified => -1,
            GrammarCode::String => 0,
            GrammarCode::Integer => 1,
            GrammarCode::Float => 2,
            GrammarCode::Date => 3,
        }
    }
}

impl Display for GrammarCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl ParameterKind {
    pub fn grammar_code(&self) -> GrammarCode {
        match self {
            ParameterKind::String | ParameterKind::ResultSet => GrammarCode::String,
            ParameterKind::Integer | ParameterKind::Long | ParameterKind::Boolean => {
                GrammarCode::Integer
            }
            ParameterKind::Float | ParameterKind::Double => GrammarCode::Float,
            ParameterKind::Date => GrammarCode::Date,
            ParameterKind::Injected(_) => GrammarCode::Unspecified,
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            ParameterKind::Integer => "an integer",
            ParameterKind::Long => "a long",
            ParameterKind::Float => "a float",
            ParameterKind::Double => "a double",
            ParameterKind::Date => "a date",
            ParameterKind::Boolean => "a boolean",
            ParameterKind::ResultSet => "a result set",
            ParameterKind::String => "a string",
            ParameterKind::Injected(_) => "an injected value",
        }
    }
}

/// Identity of the parameter being parsed, for error reporting.
pub(crate) struct Target<'a> {
    pub name: &'a str,
    pub required: bool,
    pub declared: DeclaredType,
    pub kind: ParameterKind,
}

impl<'a> Target<'a> {
    fn invalid(&self) -> BindError {
        BindError::InvalidFormat {
            name: self.name.to_string(),
            expected: self.kind.expected(),
        }
    }

    fn missing(&self) -> BindError {
        BindError::MissingRequired {
            name: self.name.to_string(),
        }
    }

    /// Empty text is nil for an optional parameter and missing for a
    /// required one.
    fn empty(&self) -> Result<Option<Value>> {
        if self.required {
            Err(self.missing())
        } else {
            Ok(None)
        }
    }
}

/// Parse a scalar read from the store. Never consults the conversion table.
/// Numbers must be the whole text; floats must be finite.
pub(crate) fn parse_text(target: &Target<'_>, raw: &str, format: &DateFormat) -> Result<Option<Value>> {
    let trimmed = raw.trim();
    match target.kind {
        ParameterKind::String => Ok(Some(Value::String(raw.to_string()))),
        ParameterKind::Boolean => Ok(Some(Value::Boolean(raw == "1" || parse_lenient_bool(raw)))),
        ParameterKind::Integer if raw.is_empty() => target.empty(),
        ParameterKind::Integer => raw
            .parse::<i32>()
            .map(|n| Some(Value::Integer(n)))
            .map_err(|_| target.invalid()),
        ParameterKind::Long if raw.is_empty() => target.empty(),
        ParameterKind::Long => raw
            .parse::<i64>()
            .map(|n| Some(Value::Long(n)))
            .map_err(|_| target.invalid()),
        ParameterKind::Float if raw.is_empty() => target.empty(),
        ParameterKind::Float => match raw.parse::<f32>() {
            Ok(n) if n.is_finite() => Ok(Some(Value::Float(n))),
            _ => Err(target.invalid()),
        },
        ParameterKind::Double if raw.is_empty() => target.empty(),
        ParameterKind::Double => match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Some(Value::Double(n))),
            _ => Err(target.invalid()),
        },
        ParameterKind::Date if trimmed.is_empty() => target.empty(),
        ParameterKind::Date => format
            .parse(trimmed)
            .map(|d| Some(Value::Date(d)))
            .map_err(|_| target.invalid()),
        ParameterKind::ResultSet | ParameterKind::Injected(_) => Err(target.invalid()),
    }
}

/// Read the parameter's value from the store held by `ctx`.
pub(crate) fn from_store(target: &Target<'_>, ctx: &ExecutionContext) -> Result<Option<Value>> {
    if target.name.is_empty() {
        return Ok(None);
    }
    let binder = ctx
        .binder()
        .ok_or_else(|| BindError::MissingContext("DataBinder".to_string()))?;

    if let ParameterKind::ResultSet = target.kind {
        return match binder.get_result_set(target.name) {
            Some(rs) => Ok(Some(Value::ResultSet(rs))),
            None if target.required => Err(target.missing()),
            None => Ok(None),
        };
    }

    match binder.get_local(target.name) {
        Some(raw) => parse_text(target, &raw, binder.date_format()),
        None if target.required => Err(target.missing()),
        None => Ok(None),
    }
}

/// Coerce a value handed over by the interpreter.
pub(crate) fn from_argument(
    target: &Target<'_>,
    raw: &Value,
    ctx: &ExecutionContext,
) -> Result<Option<Value>> {
    match (target.kind, raw) {
        (ParameterKind::String, Value::String(s)) => Ok(Some(Value::String(s.clone()))),
        (ParameterKind::Boolean, Value::Long(n)) => Ok(Some(Value::Boolean(*n == 1))),
        (ParameterKind::Boolean, Value::String(s)) => {
            Ok(Some(Value::Boolean(s == "1" || parse_lenient_bool(s))))
        }
        (ParameterKind::Integer, Value::String(s))
        | (ParameterKind::Long, Value::String(s))
        | (ParameterKind::Float, Value::String(s))
        | (ParameterKind::Double, Value::String(s)) => {
            parse_text(target, s, &DateFormat::default())
        }
        (ParameterKind::Date, Value::String(s)) => match ctx.binder() {
            Some(binder) => parse_text(target, s, binder.date_format()),
            None => parse_text(target, s, &DateFormat::default()),
        },
        (ParameterKind::ResultSet, Value::String(name)) => Ok(ctx
            .binder()
            .and_then(|b: &Arc<dyn Binder>| b.get_result_set(name))
            .map(Value::ResultSet)),
        _ => convert(Some(raw), target.declared),
    }
}
