//! Host side of the script surface.
//!
//! The interpreter host sees every compiled package through the object-safe
//! [`ScriptExtensions`] trait. [`ScriptContext`] holds packages in
//! registration order and routes a call by name:
//!
//! ```text
//! call_function("factorial", [5])
//!      ↓
//! 1. Cached owner for "factorial"? → use it
//! 2. Otherwise ask each package's function table in order
//! 3. Call by index; "not handled" falls through to later packages
//! 4. Remember which package handled the name
//! ```

use std::collections::HashMap;

use tracing::debug;

use crate::binder::context::ExecutionContext;
use crate::binder::error::{BindError, Result};
use crate::binder::value::Value;
use crate::extension::script_proxy::{ScriptProxy, VariableValue};
use crate::extension::tables::VariableDefinitionRow;
use crate::extension::types::ExtensionPackage;
use crate::parameter::FunctionDefinitionRow;

/// A source of script functions and variables.
pub trait ScriptExtensions: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    fn function_table(&self) -> &[String];

    fn function_definition_table(&self) -> &[FunctionDefinitionRow];

    fn variable_table(&self) -> &[String];

    fn variable_definition_table(&self) -> &[VariableDefinitionRow];

    /// Run a function by index. `Ok(false)` means "not handled here".
    fn evaluate_function(
        &self,
        index: usize,
        args: &mut [Option<Value>],
        ctx: &ExecutionContext,
    ) -> Result<bool>;

    /// Evaluate a variable by index. `Ok(None)` means "not handled here".
    fn evaluate_value(
        &self,
        index: usize,
        ctx: &ExecutionContext,
        is_conditional: bool,
    ) -> Result<Option<VariableValue>>;
}

impl<P: ExtensionPackage> ScriptExtensions for ScriptProxy<P> {
    fn name(&self) -> &str {
        P::package_name()
    }

    fn function_table(&self) -> &[String] {
        self.table().function_table()
    }

    fn function_definition_table(&self) -> &[FunctionDefinitionRow] {
        self.table().function_definition_table()
    }

    fn variable_table(&self) -> &[String] {
        self.table().variable_table()
    }

    fn variable_definition_table(&self) -> &[VariableDefinitionRow] {
        self.table().variable_definition_table()
    }

    fn evaluate_function(
        &self,
        index: usize,
        args: &mut [Option<Value>],
        ctx: &ExecutionContext,
    ) -> Result<bool> {
        self.invoke_function(index, args, ctx)
    }

    fn evaluate_value(
        &self,
        index: usize,
        ctx: &ExecutionContext,
        is_conditional: bool,
    ) -> Result<Option<VariableValue>> {
        self.evaluate_variable(index, ctx, is_conditional)
    }
}

/// Registered script extensions, queried in registration order.
pub struct ScriptContext {
    extensions: Vec<Box<dyn ScriptExtensions>>,
    /// Which extension last handled which function name.
    function_map: HashMap<String, usize>,
    /// Which extension last handled which variable name.
    variable_map: HashMap<String, usize>,
}

impl ScriptContext {
    pub fn new() -> Self {
        ScriptContext {
            extensions: Vec::new(),
            function_map: HashMap::new(),
            variable_map: HashMap::new(),
        }
    }

    /// Register an extension. Earlier registrations win on shared names.
    pub fn add_extension(&mut self, extension: Box<dyn ScriptExtensions>) {
        self.extensions.push(extension);
    }

    /// Compile `P` and register it.
    pub fn add_package<P: ExtensionPackage>(&mut self) -> Result<()> {
        let proxy = ScriptProxy::<P>::compile()?;
        self.add_extension(Box::new(proxy));
        Ok(())
    }

    pub fn extensions(&self) -> &[Box<dyn ScriptExtensions>] {
        &self.extensions
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.function_map.contains_key(name)
            || self
                .extensions
                .iter()
                .any(|e| e.function_table().iter().any(|n| n == name))
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variable_map.contains_key(name)
            || self
                .extensions
                .iter()
                .any(|e| e.variable_table().iter().any(|n| n == name))
    }

    /// Call the script function `name` with `args` and return its normalized
    /// result.
    pub fn call_function(
        &mut self,
        name: &str,
        args: &[Option<Value>],
        ctx: &ExecutionContext,
    ) -> Result<Option<Value>> {
        let start = self.function_map.get(name).copied().unwrap_or(0);
        for i in start..self.extensions.len() {
            let extension = &self.extensions[i];
            let position = match extension.function_table().iter().position(|n| n == name) {
                Some(p) => p,
                None => continue,
            };
            let index = match extension.function_definition_table().get(position) {
                Some(row) => row.index() as usize,
                None => continue,
            };

            let mut slots = Vec::with_capacity(args.len() + 1);
            slots.extend_from_slice(args);
            slots.push(None);
            if extension.evaluate_function(index, &mut slots, ctx)? {
                self.function_map.insert(name.to_string(), i);
                return Ok(slots.pop().flatten());
            }
            debug!(target: "twine", "{} did not handle {}, trying next", extension.name(), name);
        }
        Err(BindError::UnknownName(name.to_string()))
    }

    /// Evaluate the script variable `name`.
    pub fn evaluate_variable(
        &mut self,
        name: &str,
        ctx: &ExecutionContext,
        is_conditional: bool,
    ) -> Result<VariableValue> {
        let start = self.variable_map.get(name).copied().unwrap_or(0);
        for i in start..self.extensions.len() {
            let extension = &self.extensions[i];
            let position = match extension.variable_table().iter().position(|n| n == name) {
                Some(p) => p,
                None => continue,
            };
            let index = match extension.variable_definition_table().get(position) {
                Some(row) => row[0] as usize,
                None => continue,
            };

            if let Some(value) = extension.evaluate_value(index, ctx, is_conditional)? {
                self.variable_map.insert(name.to_string(), i);
                return Ok(value);
            }
            debug!(target: "twine", "{} did not handle {}, trying next", extension.name(), name);
        }
        Err(BindError::UnknownName(name.to_string()))
    }
}

impl Default for ScriptContext {
    fn default() -> Self {
        Self::new()
    }
}
