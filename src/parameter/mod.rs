//! Typed parameters of bound methods.
//!
//! A [`Parameter`] knows where its value comes from (the store, a script
//! argument or the ambient context), how to coerce it, and which grammar code
//! it reports to the interpreter host. [`ParameterMarshaller`] owns the
//! ordered parameter list of one method.

pub mod injected;
pub mod kinds;
pub mod marshaller;

pub use kinds::{GrammarCode, ParameterKind};
pub use marshaller::{FunctionDefinitionRow, ParamSpec, ParameterMarshaller, EXTRA_FUNC_DEF_VALUES};

use crate::binder::context::ExecutionContext;
use crate::binder::error::{BindError, Result};
use crate::binder::value::{types, DeclaredType, TypeKind, Value};
use self::kinds::Target;

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    required: bool,
    declared: DeclaredType,
    kind: ParameterKind,
}

impl Parameter {
    /// Build the variant matching `declared`.
    ///
    /// Injectable types become injected parameters whatever `required` says.
    /// A non-nullable declaration must be required.
    pub fn create(name: &str, declared: DeclaredType, required: bool) -> Result<Parameter> {
        if let Some(injectable) = injected::injectable_type(declared) {
            return Ok(Parameter {
                name: name.to_string(),
                required,
                declared,
                kind: ParameterKind::Injected(injectable),
            });
        }

        if declared.is_primitive() && !required {
            return Err(BindError::NonNullableOptional {
                name: name.to_string(),
            });
        }

        let kind = match declared.kind() {
            TypeKind::String => ParameterKind::String,
            TypeKind::Integer => ParameterKind::Integer,
            TypeKind::Long => ParameterKind::Long,
            TypeKind::Float => ParameterKind::Float,
            TypeKind::Double => ParameterKind::Double,
            TypeKind::Boolean => ParameterKind::Boolean,
            TypeKind::Date => ParameterKind::Date,
            TypeKind::ResultSet => ParameterKind::ResultSet,
            _ => return Err(BindError::UnsupportedType(declared.to_string())),
        };

        Ok(Parameter {
            name: name.to_string(),
            required,
            declared,
            kind,
        })
    }

    /// A required string parameter read from `name`.
    pub fn named(name: &str) -> Parameter {
        Parameter {
            name: name.to_string(),
            required: true,
            declared: types::STRING,
            kind: ParameterKind::String,
        }
    }

    /// A required parameter with no store name.
    pub fn unnamed(declared: DeclaredType) -> Result<Parameter> {
        Parameter::create("", declared, true)
    }

    /// An injected parameter. Fails when `declared` is not on the injectable
    /// allow-list.
    pub fn injected(name: &str, declared: DeclaredType) -> Result<Parameter> {
        match injected::injectable_type(declared) {
            Some(injectable) => Ok(Parameter {
                name: name.to_string(),
                required: true,
                declared,
                kind: ParameterKind::Injected(injectable),
            }),
            None => Err(BindError::NotInjectable(declared.to_string())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn declared_type(&self) -> DeclaredType {
        self.declared
    }

    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    pub fn is_injected(&self) -> bool {
        matches!(self.kind, ParameterKind::Injected(_))
    }

    pub fn grammar_code(&self) -> GrammarCode {
        self.kind.grammar_code()
    }

    /// Read the value from the store carried by `ctx`. Injected parameters
    /// read the context instead.
    pub fn value_from_store(&self, ctx: &ExecutionContext) -> Result<Option<Value>> {
        match self.kind {
            ParameterKind::Injected(injectable) => Ok(injected::resolve(injectable, ctx)),
            _ => kinds::from_store(&self.target(), ctx),
        }
    }

    /// Coerce a loosely typed script argument. Injected parameters ignore
    /// `raw` and read the context.
    pub fn value_from_argument(
        &self,
        raw: Option<&Value>,
        ctx: &ExecutionContext,
    ) -> Result<Option<Value>> {
        match (self.kind, raw) {
            (ParameterKind::Injected(injectable), _) => Ok(injected::resolve(injectable, ctx)),
            (_, None) => Ok(None),
            (_, Some(raw)) => kinds::from_argument(&self.target(), raw, ctx),
        }
    }

    /// `type,name,required`, the form used in action parameter lists.
    pub fn to_action_string(&self) -> String {
        format!("{},{},{}", self.declared, self.name, self.required)
    }

    /// `true` or `required`, in any case, mean required.
    pub fn parse_required_string(required: &str) -> bool {
        let required = required.trim();
        required.eq_ignore_ascii_case("true") || required.eq_ignore_ascii_case("required")
    }

    fn target(&self) -> Target<'_> {
        Target {
            name: &self.name,
            required: self.required,
            declared: self.declared,
            kind: self.kind,
        }
    }
}
