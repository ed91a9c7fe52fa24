//! The function and variable directories handed to the interpreter host.

use std::fmt;
use std::fmt::{Display, Formatter};

use crate::binder::value::{DeclaredType, TypeKind};
use crate::parameter::FunctionDefinitionRow;

/// Return categories understood by the interpreter host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    String,
    Boolean,
    Integer,
    Float,
}

pub const RETURN_VOID: i32 = -1;
pub const RETURN_STRING: i32 = 0;
pub const RETURN_BOOLEAN: i32 = 1;
pub const RETURN_INTEGER: i32 = 2;
pub const RETURN_FLOAT: i32 = 3;

impl ReturnType {
    pub fn code(&self) -> i32 {
        match self {
            ReturnType::Void => RETURN_VOID,
            ReturnType::String => RETURN_STRING,
            ReturnType::Boolean => RETURN_BOOLEAN,
            ReturnType::Integer => RETURN_INTEGER,
            ReturnType::Float => RETURN_FLOAT,
        }
    }

    /// Functions: anything unrecognised, dates included, is a string.
    pub fn for_function(returns: DeclaredType) -> ReturnType {
        match returns.kind() {
            TypeKind::Void => ReturnType::Void,
            TypeKind::Boolean | TypeKind::Conditional => ReturnType::Boolean,
            TypeKind::Integer | TypeKind::Long => ReturnType::Integer,
            TypeKind::Float | TypeKind::Double => ReturnType::Float,
            _ => ReturnType::String,
        }
    }

    /// Variables are either boolean or string.
    pub fn for_variable(returns: DeclaredType) -> ReturnType {
        match returns.kind() {
            TypeKind::Boolean | TypeKind::Conditional => ReturnType::Boolean,
            _ => ReturnType::String,
        }
    }
}

impl Display for ReturnType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// `[index, return code]`.
pub type VariableDefinitionRow = [i32; 2];

/// Name and definition directories of one compiled package, index aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensionTable {
    function_names: Vec<String>,
    function_rows: Vec<FunctionDefinitionRow>,
    variable_names: Vec<String>,
    variable_rows: Vec<VariableDefinitionRow>,
    max_params: usize,
}

impl ExtensionTable {
    pub(crate) fn new(
        function_names: Vec<String>,
        function_rows: Vec<FunctionDefinitionRow>,
        variable_names: Vec<String>,
        variable_rows: Vec<VariableDefinitionRow>,
        max_params: usize,
    ) -> Self {
        ExtensionTable {
            function_names,
            function_rows,
            variable_names,
            variable_rows,
            max_params,
        }
    }

    pub fn function_table(&self) -> &[String] {
        &self.function_names
    }

    pub fn function_definition_table(&self) -> &[FunctionDefinitionRow] {
        &self.function_rows
    }

    pub fn variable_table(&self) -> &[String] {
        &self.variable_names
    }

    pub fn variable_definition_table(&self) -> &[VariableDefinitionRow] {
        &self.variable_rows
    }

    /// Width of the grammar code section of every function row.
    pub fn max_params(&self) -> usize {
        self.max_params
    }

    pub fn function_index(&self, name: &str) -> Option<usize> {
        self.function_names.iter().position(|n| n == name)
    }

    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variable_names.iter().position(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::value::types;

    #[test]
    fn test_function_return_classification() {
        assert_eq!(ReturnType::for_function(types::VOID), ReturnType::Void);
        assert_eq!(ReturnType::for_function(types::BOOL), ReturnType::Boolean);
        assert_eq!(ReturnType::for_function(types::OPT_BOOL), ReturnType::Boolean);
        assert_eq!(ReturnType::for_function(types::I32), ReturnType::Integer);
        assert_eq!(ReturnType::for_function(types::OPT_I64), ReturnType::Integer);
        assert_eq!(ReturnType::for_function(types::F32), ReturnType::Float);
        assert_eq!(ReturnType::for_function(types::OPT_F64), ReturnType::Float);
        assert_eq!(ReturnType::for_function(types::DATE), ReturnType::String);
        assert_eq!(ReturnType::for_function(types::DECIMAL), ReturnType::String);
        assert_eq!(ReturnType::for_function(types::STRING), ReturnType::String);
    }

    #[test]
    fn test_variable_return_classification() {
        assert_eq!(ReturnType::for_variable(types::BOOL), ReturnType::Boolean);
        assert_eq!(ReturnType::for_variable(types::I64), ReturnType::String);
        assert_eq!(ReturnType::for_variable(types::VOID), ReturnType::String);
    }

    #[test]
    fn test_codes() {
        assert_eq!(ReturnType::Void.code(), -1);
        assert_eq!(ReturnType::String.code(), 0);
        assert_eq!(ReturnType::Boolean.code(), 1);
        assert_eq!(ReturnType::Integer.code(), 2);
        assert_eq!(ReturnType::Float.code(), 3);
    }
}
