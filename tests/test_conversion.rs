//! Tests for the type coercion library.

extern crate twine;

use std::str::FromStr;

use chrono::{NaiveDate, Timelike};
use rust_decimal::Decimal;
use twine::binder::operations::type_conversion::{convert, register_conversion, ConversionTable};
use twine::binder::{types, BindError, TypeKind, Value};

#[test]
fn test_nil_converts_to_nil_or_zero() {
    assert_eq!(convert(None, types::OPT_I64), Ok(None));
    assert_eq!(convert(None, types::STRING), Ok(None));
    assert_eq!(convert(None, types::I64), Ok(Some(Value::Long(0))));
    assert_eq!(convert(None, types::F64), Ok(Some(Value::Double(0.0))));
    assert_eq!(convert(None, types::BOOL), Ok(Some(Value::Boolean(false))));
}

#[test]
fn test_identity() {
    let value = Value::from("unchanged");
    assert_eq!(convert(Some(&value), types::STRING), Ok(Some(value.clone())));
    assert_eq!(convert(Some(&Value::Long(3)), types::I64), Ok(Some(Value::Long(3))));
}

#[test]
fn test_integer_boolean_round_trip() {
    assert_eq!(convert(Some(&Value::Integer(0)), types::BOOL), Ok(Some(Value::Boolean(false))));
    assert_eq!(convert(Some(&Value::Integer(-4)), types::BOOL), Ok(Some(Value::Boolean(true))));
    assert_eq!(convert(Some(&Value::Boolean(true)), types::I32), Ok(Some(Value::Integer(1))));
}

#[test]
fn test_double_decimal_round_trip() {
    let decimal = Decimal::from_str("12.5").unwrap();
    assert_eq!(convert(Some(&Value::Double(12.5)), types::DECIMAL), Ok(Some(Value::Decimal(decimal))));
    assert_eq!(convert(Some(&Value::Decimal(decimal)), types::F64), Ok(Some(Value::Double(12.5))));
}

#[test]
fn test_string_parses() {
    assert_eq!(convert(Some(&Value::from(" 17 ")), types::I32), Ok(Some(Value::Integer(17))));
    assert_eq!(convert(Some(&Value::from("2.5")), types::F64), Ok(Some(Value::Double(2.5))));
    assert_eq!(convert(Some(&Value::from("TRUE")), types::BOOL), Ok(Some(Value::Boolean(true))));
    match convert(Some(&Value::from("seventeen")), types::I64) {
        Err(BindError::ConversionFailed { from, to, .. }) => {
            assert_eq!(from, TypeKind::String);
            assert_eq!(to, TypeKind::Long);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_date_to_string_uses_default_pattern() {
    let date = NaiveDate::from_ymd_opt(2026, 10, 17)
        .unwrap()
        .and_hms_opt(14, 5, 0)
        .unwrap();
    assert_eq!(
        convert(Some(&Value::Date(date)), types::STRING),
        Ok(Some(Value::from("10/17/26 2:05 PM")))
    );
}

#[test]
fn test_unsupported_conversion() {
    assert_eq!(
        convert(Some(&Value::Boolean(true)), types::DATE),
        Err(BindError::UnsupportedConversion {
            from: TypeKind::Boolean,
            to: TypeKind::Date
        })
    );
}

#[test]
fn test_table_is_open_for_extension() {
    let mut table = ConversionTable::new();
    assert!(!table.has_conversion(TypeKind::Date, TypeKind::Long));
    table.register_conversion(TypeKind::Date, TypeKind::Long, |v| match v {
        Value::Date(d) => Ok(Value::Long(i64::from(d.hour()))),
        _ => Err("not a date".to_string()),
    });
    assert!(table.has_conversion(TypeKind::Date, TypeKind::Long));

    let date = NaiveDate::from_ymd_opt(2026, 1, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    assert_eq!(table.convert(Some(&Value::Date(date)), types::I64), Ok(Some(Value::Long(9))));
}

#[test]
fn test_process_wide_registration() {
    register_conversion(TypeKind::Date, TypeKind::Integer, |v| match v {
        Value::Date(d) => Ok(Value::Integer(d.minute() as i32)),
        _ => Err("not a date".to_string()),
    });
    let date = NaiveDate::from_ymd_opt(2026, 1, 1)
        .unwrap()
        .and_hms_opt(9, 41, 0)
        .unwrap();
    assert_eq!(convert(Some(&Value::Date(date)), types::OPT_I32), Ok(Some(Value::Integer(41))));
}
