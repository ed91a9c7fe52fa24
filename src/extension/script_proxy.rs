//! Compiles an extension package into script function and variable tables
//! and dispatches interpreter calls back to the package's methods.

use std::cmp::Ordering;

use tracing::{debug, error, warn};

use crate::binder::context::ExecutionContext;
use crate::binder::error::{BindError, Result};
use crate::binder::operations::type_conversion::convert;
use crate::binder::value::{types, Conditional, Value};
use crate::extension::tables::{ExtensionTable, ReturnType, VariableDefinitionRow};
use crate::extension::types::{BoundMethod, CompiledMethod, ExtensionPackage};

/// Result of evaluating a script variable.
#[derive(Debug, Clone, PartialEq)]
pub enum VariableValue {
    Conditional(bool),
    Text(String),
}

struct Entry<P> {
    exposed: String,
    method: CompiledMethod<P>,
}

/// Script surface of one package.
pub struct ScriptProxy<P> {
    table: ExtensionTable,
    functions: Vec<CompiledMethod<P>>,
    variables: Vec<CompiledMethod<P>>,
}

impl<P: ExtensionPackage> ScriptProxy<P> {
    /// Build the tables.
    ///
    /// A method that cannot be bound is skipped with a warning. Two entries
    /// exposing the same name fail the whole package.
    pub fn compile() -> Result<Self> {
        let package = P::package_name();
        let mut functions = Vec::new();
        let mut variables = Vec::new();

        for def in P::methods() {
            let (exposed, is_function) = match (&def.function, &def.variable) {
                (Some(_), Some(_)) => {
                    let e = BindError::ConflictingTags(def.method_name.to_string());
                    warn!(target: "twine", "Skipping {}.{}: {}", package, def.method_name, e);
                    continue;
                }
                (Some(tag), None) => (tag.name.unwrap_or(def.method_name), true),
                (None, Some(tag)) => (tag.name.unwrap_or(def.method_name), false),
                (None, None) => continue,
            };

            let method = match def.compile(package) {
                Ok(m) => m,
                Err(e) => {
                    warn!(target: "twine", "Skipping {}.{}: {}", package, def.method_name, e);
                    continue;
                }
            };

            if !is_function && method.marshaller().parameter_count(false) > 0 {
                let e = BindError::VariableTakesArguments(exposed.to_string());
                warn!(target: "twine", "Skipping {}.{}: {}", package, def.method_name, e);
                continue;
            }

            let entry = Entry {
                exposed: exposed.to_string(),
                method,
            };
            if is_function {
                functions.push(entry);
            } else {
                variables.push(entry);
            }
        }

        sort_entries(&mut functions)?;
        sort_entries(&mut variables)?;

        let max_params = functions
            .iter()
            .map(|e| e.method.marshaller().parameter_count(false))
            .max()
            .unwrap_or(0);

        let mut function_rows = Vec::with_capacity(functions.len());
        for (i, entry) in functions.iter().enumerate() {
            let return_code = ReturnType::for_function(entry.method.returns()).code();
            function_rows.push(
                entry
                    .method
                    .marshaller()
                    .function_definition_row(i, max_params, return_code)?,
            );
        }

        let variable_rows: Vec<VariableDefinitionRow> = variables
            .iter()
            .enumerate()
            .map(|(i, e)| [i as i32, ReturnType::for_variable(e.method.returns()).code()])
            .collect();

        debug!(
            target: "twine",
            "Compiled {}: {} functions, {} variables, {} max params",
            package,
            functions.len(),
            variables.len(),
            max_params
        );

        let (function_names, functions): (Vec<_>, Vec<_>) =
            functions.into_iter().map(|e| (e.exposed, e.method)).unzip();
        let (variable_names, variables): (Vec<_>, Vec<_>) =
            variables.into_iter().map(|e| (e.exposed, e.method)).unzip();

        Ok(ScriptProxy {
            table: ExtensionTable::new(
                function_names,
                function_rows,
                variable_names,
                variable_rows,
                max_params,
            ),
            functions,
            variables,
        })
    }

    pub fn table(&self) -> &ExtensionTable {
        &self.table
    }

    /// Run the function at `index`. `args` holds the caller's arguments
    /// followed by one slot that receives the normalized return value.
    ///
    /// Returns `Ok(false)` for an index this package does not know.
    pub fn invoke_function(
        &self,
        index: usize,
        args: &mut [Option<Value>],
        ctx: &ExecutionContext,
    ) -> Result<bool> {
        let (name, method) = match (self.table.function_table().get(index), self.functions.get(index)) {
            (Some(name), Some(method)) => (name, method),
            _ => {
                debug!(target: "twine", "Unknown function with index {}", index);
                return Ok(false);
            }
        };

        let expected = method.marshaller().parameter_count(false);
        if args.is_empty() || args.len() - 1 != expected {
            return Err(BindError::ArityMismatch {
                function: name.clone(),
                expected,
                actual: args.len().saturating_sub(1),
            });
        }
        if ctx.user_data().is_none() {
            return Err(BindError::MissingContext("UserData".to_string()));
        }

        let nargs = args.len() - 1;
        let values = method.marshaller().value_array_from_arguments(&args[..nargs], ctx);
        let result = method.invoke_fresh(values).map_err(|e| {
            error!(target: "twine", "Unable to execute function '{}()': {}", name, e);
            e
        })?;
        args[nargs] = normalize_return(result);
        Ok(true)
    }

    /// Evaluate the variable at `index`, either as a predicate or as text.
    ///
    /// Returns `Ok(None)` for an index this package does not know.
    pub fn evaluate_variable(
        &self,
        index: usize,
        ctx: &ExecutionContext,
        is_conditional: bool,
    ) -> Result<Option<VariableValue>> {
        let (name, method, row) = match (
            self.table.variable_table().get(index),
            self.variables.get(index),
            self.table.variable_definition_table().get(index),
        ) {
            (Some(name), Some(method), Some(row)) => (name, method, row),
            _ => {
                debug!(target: "twine", "Unknown variable with index {}", index);
                return Ok(None);
            }
        };

        if ctx.user_data().is_none() {
            // Boolean variables evaluate trivially outside a user context.
            if row[1] == ReturnType::Boolean.code() {
                return Ok(Some(if is_conditional {
                    VariableValue::Conditional(false)
                } else {
                    VariableValue::Text(String::new())
                }));
            }
            return Err(BindError::MissingContext("UserData".to_string()));
        }

        let values = method.marshaller().value_array_from_arguments(&[], ctx);
        let result = method.invoke_fresh(values).map_err(|e| {
            error!(target: "twine", "Unable to handle variable {}: {}", name, e);
            e
        })?;
        let result = normalize_return(result);

        if is_conditional {
            let flag = match convert(result.as_ref(), types::BOOL)? {
                Some(Value::Boolean(b)) => b,
                _ => false,
            };
            Ok(Some(VariableValue::Conditional(flag)))
        } else {
            let text = match convert(result.as_ref(), types::STRING)? {
                Some(Value::String(s)) => s,
                _ => String::new(),
            };
            Ok(Some(VariableValue::Text(text)))
        }
    }
}

/// Reduce a method's return value to the interpreter's value universe:
/// booleans become conditionals, integers widen to 64 bits, floats to
/// doubles. Everything else, nil included, passes through.
pub fn normalize_return(value: Option<Value>) -> Option<Value> {
    match value? {
        Value::Boolean(b) => Some(Value::Conditional(Conditional::new(b))),
        Value::Integer(n) => Some(Value::Long(i64::from(n))),
        Value::Float(n) => Some(Value::Double(f64::from(n))),
        other => Some(other),
    }
}

fn compare_exposed(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn sort_entries<P>(entries: &mut Vec<Entry<P>>) -> Result<()> {
    entries.sort_by(|a, b| compare_exposed(&a.exposed, &b.exposed));
    for pair in entries.windows(2) {
        if pair[0].exposed == pair[1].exposed {
            return Err(BindError::DuplicateName(pair[0].exposed.clone()));
        }
    }
    Ok(())
}
