use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::binder::context::{ContextHandle, InjectableType};
use crate::binder::data_binder::ResultSet;
use crate::binder::error::BindError;

/// The runtime category of a value or a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Void,
    String,
    Integer,
    Long,
    Float,
    Double,
    Boolean,
    Decimal,
    Date,
    ResultSet,
    Conditional,
    Context(InjectableType),
    Other(&'static str),
}

impl TypeKind {
    /// Kinds that have a non-nullable (primitive) declaration.
    pub fn has_primitive_form(&self) -> bool {
        matches!(
            self,
            TypeKind::Integer | TypeKind::Long | TypeKind::Float | TypeKind::Double | TypeKind::Boolean
        )
    }
}

impl Display for TypeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Void => write!(f, "void"),
            TypeKind::String => write!(f, "String"),
            TypeKind::Integer => write!(f, "Integer"),
            TypeKind::Long => write!(f, "Long"),
            TypeKind::Float => write!(f, "Float"),
            TypeKind::Double => write!(f, "Double"),
            TypeKind::Boolean => write!(f, "Boolean"),
            TypeKind::Decimal => write!(f, "Decimal"),
            TypeKind::Date => write!(f, "Date"),
            TypeKind::ResultSet => write!(f, "ResultSet"),
            TypeKind::Conditional => write!(f, "Conditional"),
            TypeKind::Context(t) => write!(f, "{}", t),
            TypeKind::Other(name) => write!(f, "{}", name),
        }
    }
}

/// A declared parameter or return type: a kind plus whether the declaration
/// is the non-nullable form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclaredType {
    kind: TypeKind,
    primitive: bool,
}

impl DeclaredType {
    pub const fn nullable(kind: TypeKind) -> Self {
        DeclaredType {
            kind,
            primitive: false,
        }
    }

    pub const fn primitive(kind: TypeKind) -> Self {
        DeclaredType {
            kind,
            primitive: true,
        }
    }

    /// A type the binding engine has no variant for.
    pub const fn other(name: &'static str) -> Self {
        DeclaredType::nullable(TypeKind::Other(name))
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// True for the non-nullable form of a numeric or boolean type.
    pub fn is_primitive(&self) -> bool {
        self.primitive && self.kind.has_primitive_form()
    }

    /// Resolve a textual type name as used in action parameter metadata.
    pub fn parse_type_string(type_string: &str) -> Result<Self, BindError> {
        let declared = match type_string {
            "string" | "String" => types::STRING,
            "int" | "integer" | "Integer" => types::OPT_I32,
            "long" | "Long" => types::OPT_I64,
            "float" | "Float" => types::OPT_F32,
            "double" | "Double" => types::OPT_F64,
            "boolean" | "Boolean" => types::OPT_BOOL,
            "date" | "Date" => types::DATE,
            "decimal" | "Decimal" => types::DECIMAL,
            "resultset" | "ResultSet" | "DataResultSet" => types::RESULT_SET,
            "i32" => types::I32,
            "i64" => types::I64,
            "f32" => types::F32,
            "f64" => types::F64,
            "bool" => types::BOOL,
            "UserData" => types::USER_DATA,
            "DataBinder" => types::BINDER,
            "PageMerger" => types::PAGE_MERGER,
            "HttpImplementor" => types::HTTP_IMPLEMENTOR,
            "ServiceRequestImplementor" => types::REQUEST_IMPLEMENTOR,
            "Workspace" => types::WORKSPACE,
            "ExecutionContext" => types::EXECUTION_CONTEXT,
            "Service" => types::SERVICE,
            _ => return Err(BindError::UnsupportedType(type_string.to_string())),
        };
        Ok(declared)
    }
}

impl Display for DeclaredType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_primitive() {
            let name = match self.kind {
                TypeKind::Integer => "i32",
                TypeKind::Long => "i64",
                TypeKind::Float => "f32",
                TypeKind::Double => "f64",
                _ => "bool",
            };
            write!(f, "{}", name)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

/// Declarations for every type the engine knows about.
pub mod types {
    use super::{DeclaredType, TypeKind};
    use crate::binder::context::InjectableType;

    pub const VOID: DeclaredType = DeclaredType::nullable(TypeKind::Void);
    pub const STRING: DeclaredType = DeclaredType::nullable(TypeKind::String);
    pub const I32: DeclaredType = DeclaredType::primitive(TypeKind::Integer);
    pub const OPT_I32: DeclaredType = DeclaredType::nullable(TypeKind::Integer);
    pub const I64: DeclaredType = DeclaredType::primitive(TypeKind::Long);
    pub const OPT_I64: DeclaredType = DeclaredType::nullable(TypeKind::Long);
    pub const F32: DeclaredType = DeclaredType::primitive(TypeKind::Float);
    pub const OPT_F32: DeclaredType = DeclaredType::nullable(TypeKind::Float);
    pub const F64: DeclaredType = DeclaredType::primitive(TypeKind::Double);
    pub const OPT_F64: DeclaredType = DeclaredType::nullable(TypeKind::Double);
    pub const BOOL: DeclaredType = DeclaredType::primitive(TypeKind::Boolean);
    pub const OPT_BOOL: DeclaredType = DeclaredType::nullable(TypeKind::Boolean);
    pub const DECIMAL: DeclaredType = DeclaredType::nullable(TypeKind::Decimal);
    pub const DATE: DeclaredType = DeclaredType::nullable(TypeKind::Date);
    pub const RESULT_SET: DeclaredType = DeclaredType::nullable(TypeKind::ResultSet);
    pub const CONDITIONAL: DeclaredType = DeclaredType::nullable(TypeKind::Conditional);

    pub const USER_DATA: DeclaredType =
        DeclaredType::nullable(TypeKind::Context(InjectableType::UserData));
    pub const BINDER: DeclaredType =
        DeclaredType::nullable(TypeKind::Context(InjectableType::Binder));
    pub const PAGE_MERGER: DeclaredType =
        DeclaredType::nullable(TypeKind::Context(InjectableType::PageMerger));
    pub const HTTP_IMPLEMENTOR: DeclaredType =
        DeclaredType::nullable(TypeKind::Context(InjectableType::HttpImplementor));
    pub const REQUEST_IMPLEMENTOR: DeclaredType =
        DeclaredType::nullable(TypeKind::Context(InjectableType::RequestImplementor));
    pub const WORKSPACE: DeclaredType =
        DeclaredType::nullable(TypeKind::Context(InjectableType::Workspace));
    pub const EXECUTION_CONTEXT: DeclaredType =
        DeclaredType::nullable(TypeKind::Context(InjectableType::ExecutionContext));
    pub const SERVICE: DeclaredType =
        DeclaredType::nullable(TypeKind::Context(InjectableType::Service));
}

/// Composite boolean result understood by the script interpreter. It behaves
/// as a boolean in conditionals and as 1/0 in arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conditional {
    value: bool,
}

impl Conditional {
    pub fn new(value: bool) -> Self {
        Conditional { value }
    }

    pub fn as_bool(&self) -> bool {
        self.value
    }

    pub fn as_long(&self) -> i64 {
        if self.value {
            1
        } else {
            0
        }
    }
}

/// An untyped value travelling between the store, the interpreter and bound
/// methods. Nil is represented by `Option::None` at every boundary.
pub enum Value {
    String(String),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    Decimal(Decimal),
    Date(NaiveDateTime),
    ResultSet(Arc<ResultSet>),
    Conditional(Conditional),
    Context(ContextHandle),
}

impl Value {
    pub fn kind(&self) -> TypeKind {
        match self {
            Value::String(_) => TypeKind::String,
            Value::Integer(_) => TypeKind::Integer,
            Value::Long(_) => TypeKind::Long,
            Value::Float(_) => TypeKind::Float,
            Value::Double(_) => TypeKind::Double,
            Value::Boolean(_) => TypeKind::Boolean,
            Value::Decimal(_) => TypeKind::Decimal,
            Value::Date(_) => TypeKind::Date,
            Value::ResultSet(_) => TypeKind::ResultSet,
            Value::Conditional(_) => TypeKind::Conditional,
            Value::Context(h) => TypeKind::Context(h.injectable_type()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        match self {
            Value::String(s) => Value::String(s.to_string()),
            Value::Integer(n) => Value::Integer(*n),
            Value::Long(n) => Value::Long(*n),
            Value::Float(n) => Value::Float(*n),
            Value::Double(n) => Value::Double(*n),
            Value::Boolean(b) => Value::Boolean(*b),
            Value::Decimal(d) => Value::Decimal(*d),
            Value::Date(d) => Value::Date(*d),
            Value::ResultSet(rs) => Value::ResultSet(rs.clone()),
            Value::Conditional(c) => Value::Conditional(*c),
            Value::Context(h) => Value::Context(h.clone()),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Long(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Double(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Date(d) => write!(f, "{}", d),
            Value::ResultSet(rs) => write!(f, "ResultSet({} rows)", rs.num_rows()),
            Value::Conditional(c) => write!(f, "{}", c.as_bool()),
            Value::Context(h) => write!(f, "<{}>", h.injectable_type()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "Value::String({:?})", s),
            Value::Integer(n) => write!(f, "Value::Integer({})", n),
            Value::Long(n) => write!(f, "Value::Long({})", n),
            Value::Float(n) => write!(f, "Value::Float({})", n),
            Value::Double(n) => write!(f, "Value::Double({})", n),
            Value::Boolean(b) => write!(f, "Value::Boolean({})", b),
            Value::Decimal(d) => write!(f, "Value::Decimal({})", d),
            Value::Date(d) => write!(f, "Value::Date({})", d),
            Value::ResultSet(rs) => write!(f, "Value::ResultSet({:?})", rs.fields()),
            Value::Conditional(c) => write!(f, "Value::Conditional({})", c.as_bool()),
            Value::Context(h) => write!(f, "Value::Context({})", h.injectable_type()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::ResultSet(a), Value::ResultSet(b)) => Arc::ptr_eq(a, b) || a == b,
            (Value::Conditional(a), Value::Conditional(b)) => a == b,
            (Value::Context(a), Value::Context(b)) => a.same_handle(b),
            _ => false,
        }
    }
}
