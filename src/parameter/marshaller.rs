use std::sync::Arc;

use tracing::warn;

use crate::binder::context::{ExecutionContext, Workspace};
use crate::binder::data_binder::Binder;
use crate::binder::error::{BindError, Result};
use crate::binder::value::{DeclaredType, Value};
use crate::parameter::{injected, GrammarCode, Parameter};

/// Slots of a definition row besides the grammar codes: index, bound count
/// and return code.
pub const EXTRA_FUNC_DEF_VALUES: usize = 3;

/// Declaration-side metadata of one method argument.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub declared: DeclaredType,
    pub required: bool,
}

impl ParamSpec {
    pub fn new(name: &str, declared: DeclaredType, required: bool) -> Self {
        ParamSpec {
            name: name.to_string(),
            declared,
            required,
        }
    }

    pub fn required(name: &str, declared: DeclaredType) -> Self {
        ParamSpec::new(name, declared, true)
    }

    pub fn optional(name: &str, declared: DeclaredType) -> Self {
        ParamSpec::new(name, declared, false)
    }

    /// An argument with no metadata: no store name, required.
    pub fn unnamed(declared: DeclaredType) -> Self {
        ParamSpec::new("", declared, true)
    }
}

/// `[index, bound count, grammar codes.., return code]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDefinitionRow(Vec<i32>);

impl FunctionDefinitionRow {
    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn index(&self) -> i32 {
        self.0[0]
    }

    pub fn bound_count(&self) -> i32 {
        self.0[1]
    }

    pub fn grammar_codes(&self) -> &[i32] {
        &self.0[2..self.0.len() - 1]
    }

    pub fn return_code(&self) -> i32 {
        self.0[self.0.len() - 1]
    }
}

/// The ordered parameters of one bound method.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterMarshaller {
    parameters: Vec<Parameter>,
}

impl ParameterMarshaller {
    pub fn new() -> Self {
        ParameterMarshaller {
            parameters: Vec::new(),
        }
    }

    pub fn with_parameters(parameters: Vec<Parameter>) -> Self {
        ParameterMarshaller { parameters }
    }

    /// One parameter per spec, in declaration order.
    pub fn from_specs(specs: &[ParamSpec]) -> Result<Self> {
        let parameters = specs
            .iter()
            .map(|s| Parameter::create(&s.name, s.declared, s.required))
            .collect::<Result<Vec<_>>>()?;
        Ok(ParameterMarshaller { parameters })
    }

    /// Build from a flat `type, name, required` list as found in action
    /// definitions.
    pub fn from_action_params<S: AsRef<str>>(params: &[S]) -> Result<Self> {
        if params.len() % 3 != 0 {
            return Err(BindError::Config(format!(
                "action parameters must come in (type, name, required) triples, got {} values",
                params.len()
            )));
        }
        let mut parameters = Vec::with_capacity(params.len() / 3);
        for triple in params.chunks(3) {
            let declared = DeclaredType::parse_type_string(triple[0].as_ref().trim())?;
            let required = Parameter::parse_required_string(triple[2].as_ref());
            parameters.push(Parameter::create(triple[1].as_ref().trim(), declared, required)?);
        }
        Ok(ParameterMarshaller { parameters })
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn type_array(&self) -> Vec<DeclaredType> {
        self.parameters.iter().map(|p| p.declared_type()).collect()
    }

    pub fn parameter_count(&self, include_injected: bool) -> usize {
        self.parameters
            .iter()
            .filter(|p| include_injected || !p.is_injected())
            .count()
    }

    /// Fill every slot from the store. The first failing parameter aborts.
    pub fn value_array_from_store(&self, ctx: &ExecutionContext) -> Result<Vec<Option<Value>>> {
        self.parameters
            .iter()
            .map(|p| p.value_from_store(ctx))
            .collect()
    }

    /// Map script arguments positionally onto the bound parameters. Injected
    /// parameters do not consume an argument. A failing coercion is logged
    /// and leaves its slot nil.
    pub fn value_array_from_arguments(
        &self,
        arguments: &[Option<Value>],
        ctx: &ExecutionContext,
    ) -> Vec<Option<Value>> {
        let mut argument_index = 0;
        let mut values = Vec::with_capacity(self.parameters.len());
        for (i, p) in self.parameters.iter().enumerate() {
            let raw = if p.is_injected() {
                None
            } else {
                let raw = arguments.get(argument_index).and_then(|a| a.as_ref());
                argument_index += 1;
                raw
            };
            match p.value_from_argument(raw, ctx) {
                Ok(v) => values.push(v),
                Err(e) => {
                    warn!(target: "twine", "getArgumentValue failed on parameter {}: {}", i + 1, e);
                    values.push(None);
                }
            }
        }
        values
    }

    /// Filter-event variant: only workspace, binder and execution context
    /// parameters are filled.
    pub fn value_array_for_filter(
        &self,
        ws: Option<&Arc<Workspace>>,
        binder: &Arc<dyn Binder>,
        ctx: &ExecutionContext,
    ) -> Vec<Option<Value>> {
        self.parameters
            .iter()
            .map(|p| {
                injected::resolve_for_filter(
                    injected::injectable_type(p.declared_type()),
                    ws,
                    binder,
                    ctx,
                )
            })
            .collect()
    }

    /// Emit the row the interpreter host uses to call this method.
    pub fn function_definition_row(
        &self,
        function_index: usize,
        max_params: usize,
        return_code: i32,
    ) -> Result<FunctionDefinitionRow> {
        let bound = self.parameter_count(false);
        if bound > max_params {
            return Err(BindError::RowTooNarrow { bound, max_params });
        }

        let mut row = Vec::with_capacity(max_params + EXTRA_FUNC_DEF_VALUES);
        row.push(function_index as i32);
        row.push(bound as i32);
        row.extend(
            self.parameters
                .iter()
                .filter(|p| !p.is_injected())
                .map(|p| p.grammar_code().code()),
        );
        row.resize(max_params + 2, GrammarCode::Unspecified.code());
        row.push(return_code);
        Ok(FunctionDefinitionRow(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::value::types;

    #[test]
    fn test_empty_marshaller() {
        let m = ParameterMarshaller::new();
        assert!(m.type_array().is_empty());
        assert_eq!(m.parameter_count(true), 0);
        let row = m.function_definition_row(4, 2, -1).unwrap();
        assert_eq!(row.as_slice(), &[4, 0, -1, -1, -1]);
    }

    #[test]
    fn test_row_accessors() {
        let m = ParameterMarshaller::from_specs(&[
            ParamSpec::required("a", types::STRING),
            ParamSpec::unnamed(types::BINDER),
            ParamSpec::required("b", types::F64),
        ])
        .unwrap();
        let row = m.function_definition_row(1, 3, 3).unwrap();
        assert_eq!(row.len(), 3 + EXTRA_FUNC_DEF_VALUES);
        assert_eq!(row.index(), 1);
        assert_eq!(row.bound_count(), 2);
        assert_eq!(
            row.grammar_codes(),
            &[GrammarCode::String.code(), GrammarCode::Float.code(), -1]
        );
        assert_eq!(row.return_code(), 3);
    }

    #[test]
    fn test_incomplete_action_params() {
        let err = ParameterMarshaller::from_action_params(&["int", "a"]).unwrap_err();
        assert!(matches!(err, BindError::Config(_)));
    }
}
