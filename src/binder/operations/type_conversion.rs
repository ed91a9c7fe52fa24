//! Generic value coercion keyed by (source kind, target kind) pairs.
//!
//! Parameters fall back to this table whenever they have no bespoke rule for
//! an incoming value. The table is open: callers add pairs with
//! [`register_conversion`] at start-up.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::RwLock;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::binder::error::{BindError, Result};
use crate::binder::value::{DeclaredType, TypeKind, Value};
use crate::date_format::DateFormat;

/// A single registered conversion. Failures are reported as a message that
/// ends up in `BindError::ConversionFailed`.
pub type ConversionFn = Box<dyn Fn(&Value) -> std::result::Result<Value, String> + Send + Sync>;

lazy_static! {
    static ref DEFAULT_TABLE: RwLock<ConversionTable> = RwLock::new(ConversionTable::with_defaults());
}

pub struct ConversionTable {
    conversions: HashMap<(TypeKind, TypeKind), ConversionFn>,
}

impl ConversionTable {
    /// A table with no registered pairs; only nil and identity conversions work.
    pub fn new() -> Self {
        ConversionTable {
            conversions: HashMap::new(),
        }
    }

    /// A table holding the built-in conversions.
    pub fn with_defaults() -> Self {
        let mut table = ConversionTable::new();

        table.register_conversion(TypeKind::Integer, TypeKind::Boolean, |v| match v {
            Value::Integer(n) => Ok(Value::Boolean(*n != 0)),
            _ => Err(unexpected(v)),
        });
        table.register_conversion(TypeKind::Long, TypeKind::Boolean, |v| match v {
            Value::Long(n) => Ok(Value::Boolean(*n != 0)),
            _ => Err(unexpected(v)),
        });
        table.register_conversion(TypeKind::Boolean, TypeKind::Integer, |v| match v {
            Value::Boolean(b) => Ok(Value::Integer(if *b { 1 } else { 0 })),
            _ => Err(unexpected(v)),
        });
        table.register_conversion(TypeKind::Double, TypeKind::Decimal, |v| match v {
            Value::Double(d) => Decimal::from_f64(*d)
                .map(Value::Decimal)
                .ok_or_else(|| format!("{} has no decimal representation", d)),
            _ => Err(unexpected(v)),
        });
        table.register_conversion(TypeKind::Decimal, TypeKind::Double, |v| match v {
            Value::Decimal(d) => d
                .to_f64()
                .map(Value::Double)
                .ok_or_else(|| format!("{} does not fit a double", d)),
            _ => Err(unexpected(v)),
        });
        table.register_conversion(TypeKind::Long, TypeKind::Integer, |v| match v {
            Value::Long(n) => Ok(Value::Integer(*n as i32)),
            _ => Err(unexpected(v)),
        });
        table.register_conversion(TypeKind::Integer, TypeKind::Long, |v| match v {
            Value::Integer(n) => Ok(Value::Long(i64::from(*n))),
            _ => Err(unexpected(v)),
        });
        table.register_conversion(TypeKind::Double, TypeKind::Float, |v| match v {
            Value::Double(n) => Ok(Value::Float(*n as f32)),
            _ => Err(unexpected(v)),
        });
        table.register_conversion(TypeKind::Float, TypeKind::Double, |v| match v {
            Value::Float(n) => Ok(Value::Double(f64::from(*n))),
            _ => Err(unexpected(v)),
        });
        table.register_conversion(TypeKind::Long, TypeKind::Double, |v| match v {
            Value::Long(n) => Ok(Value::Double(*n as f64)),
            _ => Err(unexpected(v)),
        });
        table.register_conversion(TypeKind::Long, TypeKind::Float, |v| match v {
            Value::Long(n) => Ok(Value::Float(*n as f32)),
            _ => Err(unexpected(v)),
        });

        table.register_conversion(TypeKind::String, TypeKind::Integer, |v| {
            parse_str::<i32>(v).map(Value::Integer)
        });
        table.register_conversion(TypeKind::String, TypeKind::Long, |v| {
            parse_str::<i64>(v).map(Value::Long)
        });
        table.register_conversion(TypeKind::String, TypeKind::Float, |v| {
            parse_str::<f32>(v).map(Value::Float)
        });
        table.register_conversion(TypeKind::String, TypeKind::Double, |v| {
            parse_str::<f64>(v).map(Value::Double)
        });
        table.register_conversion(TypeKind::String, TypeKind::Decimal, |v| {
            parse_str::<Decimal>(v).map(Value::Decimal)
        });
        table.register_conversion(TypeKind::String, TypeKind::Boolean, |v| match v {
            Value::String(s) => Ok(Value::Boolean(parse_lenient_bool(s))),
            _ => Err(unexpected(v)),
        });

        for kind in &[
            TypeKind::Integer,
            TypeKind::Long,
            TypeKind::Float,
            TypeKind::Double,
            TypeKind::Boolean,
            TypeKind::Decimal,
            TypeKind::Conditional,
        ] {
            table.register_conversion(*kind, TypeKind::String, |v| Ok(Value::String(v.to_string())));
        }
        table.register_conversion(TypeKind::Date, TypeKind::String, |v| match v {
            Value::Date(d) => Ok(Value::String(DateFormat::default().format(d))),
            _ => Err(unexpected(v)),
        });

        table.register_conversion(TypeKind::Conditional, TypeKind::Boolean, |v| match v {
            Value::Conditional(c) => Ok(Value::Boolean(c.as_bool())),
            _ => Err(unexpected(v)),
        });
        table.register_conversion(TypeKind::Conditional, TypeKind::Long, |v| match v {
            Value::Conditional(c) => Ok(Value::Long(c.as_long())),
            _ => Err(unexpected(v)),
        });

        table
    }

    /// Register (or replace) the conversion from `from` to `to`.
    pub fn register_conversion<F>(&mut self, from: TypeKind, to: TypeKind, conversion: F)
    where
        F: Fn(&Value) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        self.conversions.insert((from, to), Box::new(conversion));
    }

    pub fn has_conversion(&self, from: TypeKind, to: TypeKind) -> bool {
        from == to || self.conversions.contains_key(&(from, to))
    }

    /// Convert `value` to `target`.
    ///
    /// Nil converts to nil, or to the zero value when `target` is a
    /// non-nullable declaration.
    pub fn convert(&self, value: Option<&Value>, target: DeclaredType) -> Result<Option<Value>> {
        let value = match value {
            None => return Ok(zero_value(target)),
            Some(v) => v,
        };
        let from = value.kind();
        let to = target.kind();
        if from == to {
            return Ok(Some(value.clone()));
        }
        match self.conversions.get(&(from, to)) {
            Some(conversion) => conversion(value)
                .map(Some)
                .map_err(|cause| BindError::ConversionFailed { from, to, cause }),
            None => Err(BindError::UnsupportedConversion { from, to }),
        }
    }
}

impl Default for ConversionTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Register a conversion in the process-wide table.
pub fn register_conversion<F>(from: TypeKind, to: TypeKind, conversion: F)
where
    F: Fn(&Value) -> std::result::Result<Value, String> + Send + Sync + 'static,
{
    let mut table = DEFAULT_TABLE.write().unwrap_or_else(|e| e.into_inner());
    table.register_conversion(from, to, conversion);
}

/// Convert using the process-wide table.
pub fn convert(value: Option<&Value>, target: DeclaredType) -> Result<Option<Value>> {
    let table = DEFAULT_TABLE.read().unwrap_or_else(|e| e.into_inner());
    table.convert(value, target)
}

/// The value a non-nullable declaration takes when handed nil.
pub fn zero_value(target: DeclaredType) -> Option<Value> {
    if !target.is_primitive() {
        return None;
    }
    match target.kind() {
        TypeKind::Integer => Some(Value::Integer(0)),
        TypeKind::Long => Some(Value::Long(0)),
        TypeKind::Float => Some(Value::Float(0.0)),
        TypeKind::Double => Some(Value::Double(0.0)),
        TypeKind::Boolean => Some(Value::Boolean(false)),
        _ => None,
    }
}

/// `"true"` in any case is true, everything else is false.
pub fn parse_lenient_bool(s: &str) -> bool {
    s.trim().eq_ignore_ascii_case("true")
}

fn parse_str<T>(v: &Value) -> std::result::Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match v {
        Value::String(s) => s.trim().parse::<T>().map_err(|e| format!("{}: '{}'", e, s)),
        _ => Err(unexpected(v)),
    }
}

fn unexpected(v: &Value) -> String {
    format!("unexpected source value {:?}", v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::value::{types, Conditional};
    use chrono::NaiveDate;

    #[test]
    fn test_nil_converts_to_nil_or_zero() {
        let table = ConversionTable::with_defaults();
        assert_eq!(table.convert(None, types::OPT_I32).unwrap(), None);
        assert_eq!(table.convert(None, types::STRING).unwrap(), None);
        assert_eq!(table.convert(None, types::I32).unwrap(), Some(Value::Integer(0)));
        assert_eq!(table.convert(None, types::BOOL).unwrap(), Some(Value::Boolean(false)));
        assert_eq!(table.convert(None, types::F64).unwrap(), Some(Value::Double(0.0)));
    }

    #[test]
    fn test_identity() {
        let table = ConversionTable::new();
        let v = Value::from("abc");
        assert_eq!(table.convert(Some(&v), types::STRING).unwrap(), Some(v));
    }

    #[test]
    fn test_integer_boolean_round_trip() {
        let table = ConversionTable::with_defaults();
        assert_eq!(
            table.convert(Some(&Value::Integer(5)), types::OPT_BOOL).unwrap(),
            Some(Value::Boolean(true))
        );
        assert_eq!(
            table.convert(Some(&Value::Integer(0)), types::BOOL).unwrap(),
            Some(Value::Boolean(false))
        );
        assert_eq!(
            table.convert(Some(&Value::Boolean(true)), types::I32).unwrap(),
            Some(Value::Integer(1))
        );
    }

    #[test]
    fn test_long_to_integer_truncates() {
        let table = ConversionTable::with_defaults();
        let big = Value::Long(i64::from(i32::MAX) + 2);
        assert_eq!(
            table.convert(Some(&big), types::I32).unwrap(),
            Some(Value::Integer(i32::MIN + 1))
        );
    }

    #[test]
    fn test_double_decimal() {
        let table = ConversionTable::with_defaults();
        let d = table.convert(Some(&Value::Double(1.5)), types::DECIMAL).unwrap();
        assert_eq!(d, Some(Value::Decimal(Decimal::new(15, 1))));
        let back = table.convert(d.as_ref(), types::F64).unwrap();
        assert_eq!(back, Some(Value::Double(1.5)));
    }

    #[test]
    fn test_string_parses() {
        let table = ConversionTable::with_defaults();
        assert_eq!(
            table.convert(Some(&Value::from("42")), types::I64).unwrap(),
            Some(Value::Long(42))
        );
        assert_eq!(
            table.convert(Some(&Value::from("TRUE")), types::BOOL).unwrap(),
            Some(Value::Boolean(true))
        );
        assert_eq!(
            table.convert(Some(&Value::from("banana")), types::BOOL).unwrap(),
            Some(Value::Boolean(false))
        );
        match table.convert(Some(&Value::from("sdsd")), types::I32) {
            Err(BindError::ConversionFailed { from, to, .. }) => {
                assert_eq!(from, TypeKind::String);
                assert_eq!(to, TypeKind::Integer);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_to_string_conversions() {
        let table = ConversionTable::with_defaults();
        assert_eq!(
            table.convert(Some(&Value::Integer(7)), types::STRING).unwrap(),
            Some(Value::from("7"))
        );
        assert_eq!(
            table.convert(Some(&Value::Boolean(false)), types::STRING).unwrap(),
            Some(Value::from("false"))
        );
        let date = NaiveDate::from_ymd_opt(2013, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(
            table.convert(Some(&Value::Date(date)), types::STRING).unwrap(),
            Some(Value::from("3/1/13 9:30 AM"))
        );
        assert_eq!(
            table
                .convert(Some(&Value::Conditional(Conditional::new(true))), types::STRING)
                .unwrap(),
            Some(Value::from("true"))
        );
    }

    #[test]
    fn test_unsupported_pair() {
        let table = ConversionTable::with_defaults();
        assert_eq!(
            table.convert(Some(&Value::from("x")), types::DATE),
            Err(BindError::UnsupportedConversion {
                from: TypeKind::String,
                to: TypeKind::Date
            })
        );
    }

    #[test]
    fn test_registered_conversion_is_used() {
        let mut table = ConversionTable::new();
        assert!(!table.has_conversion(TypeKind::Boolean, TypeKind::Long));
        table.register_conversion(TypeKind::Boolean, TypeKind::Long, |v| match v {
            Value::Boolean(b) => Ok(Value::Long(if *b { 10 } else { 20 })),
            _ => Err("no".to_string()),
        });
        assert!(table.has_conversion(TypeKind::Boolean, TypeKind::Long));
        assert_eq!(
            table.convert(Some(&Value::Boolean(true)), types::OPT_I64).unwrap(),
            Some(Value::Long(10))
        );
    }
}
