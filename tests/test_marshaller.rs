//! Tests for the parameter marshaller: value arrays and definition rows.

extern crate twine;

use std::sync::Arc;

use twine::binder::context::{UserData, Workspace};
use twine::binder::{types, BindError, Binder, DataBinder, ExecutionContext, InjectableType, TypeKind, Value};
use twine::parameter::{ParamSpec, Parameter, ParameterMarshaller};

fn marshaller(specs: &[ParamSpec]) -> ParameterMarshaller {
    ParameterMarshaller::from_specs(specs).unwrap()
}

fn strings(count: usize) -> Vec<ParamSpec> {
    (0..count).map(|_| ParamSpec::unnamed(types::STRING)).collect()
}

fn context() -> ExecutionContext {
    let mut binder = DataBinder::new();
    binder.put_local("dID", "42");
    binder.put_local("dDocName", "TEST_DOC");
    binder.put_local("bad", "sdsd");
    ExecutionContext::new()
        .with_user_data(UserData::new("sysadmin"))
        .with_binder(Arc::new(binder))
}

// ============================================================================
// Definition rows
// ============================================================================

mod row_tests {
    use super::*;

    #[test]
    fn test_rows_are_padded_to_max_params() {
        let methods = vec![
            marshaller(&strings(5)),
            marshaller(&strings(2)),
            marshaller(&[ParamSpec::unnamed(types::I64)]),
        ];
        for (i, m) in methods.iter().enumerate() {
            let row = m.function_definition_row(i, 6, 0).unwrap();
            assert_eq!(row.len(), 9);
            assert_eq!(row.index(), i as i32);
            assert_eq!(row.return_code(), 0);
        }

        let row = methods[0].function_definition_row(0, 6, 0).unwrap();
        assert_eq!(row.as_slice(), &[0, 5, 0, 0, 0, 0, 0, -1, 0]);
        let row = methods[1].function_definition_row(1, 6, 0).unwrap();
        assert_eq!(row.as_slice(), &[1, 2, 0, 0, -1, -1, -1, -1, 0]);
        let row = methods[2].function_definition_row(2, 6, 2).unwrap();
        assert_eq!(row.as_slice(), &[2, 1, 1, -1, -1, -1, -1, -1, 2]);
    }

    #[test]
    fn test_row_too_narrow() {
        let m = marshaller(&strings(5));
        assert_eq!(
            m.function_definition_row(0, 4, 0),
            Err(BindError::RowTooNarrow {
                bound: 5,
                max_params: 4
            })
        );
    }

    #[test]
    fn test_injected_parameters_take_no_grammar_slot() {
        let m = marshaller(&[
            ParamSpec::unnamed(types::STRING),
            ParamSpec::unnamed(types::USER_DATA),
            ParamSpec::unnamed(types::DATE),
        ]);
        assert_eq!(m.parameter_count(true), 3);
        assert_eq!(m.parameter_count(false), 2);
        let row = m.function_definition_row(0, 3, -1).unwrap();
        assert_eq!(row.as_slice(), &[0, 2, 0, 3, -1, -1]);
        assert_eq!(row.grammar_codes(), &[0, 3, -1]);
    }

    #[test]
    fn test_type_array() {
        let m = marshaller(&[ParamSpec::required("dID", types::I64), ParamSpec::unnamed(types::BINDER)]);
        assert_eq!(m.type_array(), vec![types::I64, types::BINDER]);
    }
}

// ============================================================================
// Value arrays
// ============================================================================

mod value_tests {
    use super::*;

    #[test]
    fn test_injected_parameter_does_not_consume_an_argument() {
        let m = marshaller(&[
            ParamSpec::unnamed(types::STRING),
            ParamSpec::unnamed(types::USER_DATA),
            ParamSpec::unnamed(types::STRING),
        ]);
        let ctx = context();
        let values = m.value_array_from_arguments(
            &[Some(Value::from("first")), Some(Value::from("second")), Some(Value::from("third"))],
            &ctx,
        );
        assert_eq!(values.len(), 3);
        assert_eq!(values[0], Some(Value::from("first")));
        assert_eq!(
            values[1].as_ref().map(|v| v.kind()),
            Some(TypeKind::Context(InjectableType::UserData))
        );
        assert_eq!(values[2], Some(Value::from("second")));
    }

    #[test]
    fn test_argument_failures_leave_the_slot_nil() {
        let m = marshaller(&[ParamSpec::unnamed(types::I64), ParamSpec::unnamed(types::STRING)]);
        let values = m.value_array_from_arguments(
            &[Some(Value::from("not a number")), Some(Value::from("ok"))],
            &context(),
        );
        assert_eq!(values, vec![None, Some(Value::from("ok"))]);
    }

    #[test]
    fn test_missing_arguments_are_nil() {
        let m = marshaller(&[ParamSpec::unnamed(types::STRING), ParamSpec::unnamed(types::STRING)]);
        let values = m.value_array_from_arguments(&[Some(Value::from("only"))], &context());
        assert_eq!(values, vec![Some(Value::from("only")), None]);
    }

    #[test]
    fn test_store_values() {
        let m = marshaller(&[
            ParamSpec::required("dID", types::I64),
            ParamSpec::required("dDocName", types::STRING),
            ParamSpec::optional("dRevLabel", types::STRING),
        ]);
        let values = m.value_array_from_store(&context()).unwrap();
        assert_eq!(
            values,
            vec![Some(Value::Long(42)), Some(Value::from("TEST_DOC")), None]
        );
    }

    #[test]
    fn test_store_failures_are_fatal() {
        let m = marshaller(&[
            ParamSpec::required("dDocName", types::STRING),
            ParamSpec::optional("bad", types::OPT_I32),
        ]);
        assert!(matches!(
            m.value_array_from_store(&context()),
            Err(BindError::InvalidFormat { .. })
        ));

        let m = marshaller(&[ParamSpec::required("dSecurityGroup", types::STRING)]);
        assert_eq!(
            m.value_array_from_store(&context()),
            Err(BindError::MissingRequired {
                name: "dSecurityGroup".to_string()
            })
        );
    }

    #[test]
    fn test_filter_values_only_fill_three_handles() {
        let m = marshaller(&[
            ParamSpec::unnamed(types::WORKSPACE),
            ParamSpec::unnamed(types::USER_DATA),
            ParamSpec::required("dID", types::I64),
            ParamSpec::unnamed(types::BINDER),
            ParamSpec::unnamed(types::EXECUTION_CONTEXT),
        ]);
        let ctx = context();
        let ws = Arc::new(Workspace::new("system"));
        let binder: Arc<dyn Binder> = Arc::new(DataBinder::new());
        let values = m.value_array_for_filter(Some(&ws), &binder, &ctx);

        let kinds: Vec<Option<TypeKind>> = values.iter().map(|v| v.as_ref().map(|v| v.kind())).collect();
        assert_eq!(
            kinds,
            vec![
                Some(TypeKind::Context(InjectableType::Workspace)),
                None,
                None,
                Some(TypeKind::Context(InjectableType::Binder)),
                Some(TypeKind::Context(InjectableType::ExecutionContext)),
            ]
        );
    }
}

// ============================================================================
// Action parameters
// ============================================================================

mod action_param_tests {
    use super::*;

    #[test]
    fn test_from_action_params() {
        let m = ParameterMarshaller::from_action_params(&[
            "long", "dID", "true", "string", "dDocName", "Required", "boolean", "isLatest", "false",
        ])
        .unwrap();
        let names: Vec<&str> = m.parameters().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["dID", "dDocName", "isLatest"]);
        assert!(m.parameters()[1].is_required());
        assert!(!m.parameters()[2].is_required());
        assert_eq!(m.parameters()[0].to_action_string(), "Long,dID,true");
    }

    #[test]
    fn test_unknown_action_type() {
        assert!(matches!(
            ParameterMarshaller::from_action_params(&["socket", "s", "true"]),
            Err(BindError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_parse_required_string() {
        assert!(Parameter::parse_required_string("TRUE"));
        assert!(Parameter::parse_required_string(" required "));
        assert!(!Parameter::parse_required_string("false"));
        assert!(!Parameter::parse_required_string(""));
    }
}
