//! Core types for describing extension packages.

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::binder::context::{ContextHandle, ExecutionContext, PageMerger, Service, UserData, Workspace};
use crate::binder::data_binder::{Binder, ResultSet};
use crate::binder::error::{BindError, Result};
use crate::binder::value::{types, DeclaredType, Value};
use crate::parameter::{ParamSpec, ParameterMarshaller};

/// Function signature of a bound method body. The receiver is a fresh
/// package instance for every call.
pub type MethodFn<P> = fn(&mut P, &mut Arguments) -> Result<Option<Value>>;

/// Marks a method as a script function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionTag {
    /// Exposed name; the method name when unset.
    pub name: Option<&'static str>,
    pub cacheable: bool,
}

/// Marks a method as a script variable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableTag {
    pub name: Option<&'static str>,
}

/// Marks a method as a filter on a host event.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterTag {
    pub event: &'static str,
    /// Falls back to the configured default load order.
    pub load_order: Option<i32>,
}

pub const ACCESS_READ: u32 = 1;
pub const ACCESS_WRITE: u32 = 2;
pub const ACCESS_DELETE: u32 = 4;
pub const ACCESS_ADMIN: u32 = 8;
pub const ACCESS_GLOBAL: u32 = 16;
pub const ACCESS_SCRIPTABLE: u32 = 32;

pub const DEFAULT_ACCESS_LEVEL: u32 = ACCESS_READ | ACCESS_GLOBAL | ACCESS_SCRIPTABLE;

/// Marks a method as the body of a named service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceTag {
    pub name: &'static str,
    pub template: &'static str,
    /// Falls back to the configured default message.
    pub error_message: Option<&'static str>,
    pub service_type: Option<&'static str>,
    pub access_level: u32,
    pub subjects: &'static str,
}

impl ServiceTag {
    pub fn new(name: &'static str) -> Self {
        ServiceTag {
            name,
            template: "",
            error_message: None,
            service_type: None,
            access_level: DEFAULT_ACCESS_LEVEL,
            subjects: "",
        }
    }
}

/// A bindable method: its signature, its tags and the body to call.
pub struct MethodDef<P> {
    pub method_name: &'static str,
    pub params: Vec<ParamSpec>,
    pub returns: DeclaredType,
    pub function: Option<FunctionTag>,
    pub variable: Option<VariableTag>,
    pub filter: Option<FilterTag>,
    pub service: Option<ServiceTag>,
    pub invoke: MethodFn<P>,
}

impl<P> MethodDef<P> {
    /// An untagged method with no parameters returning nothing.
    pub fn new(method_name: &'static str, invoke: MethodFn<P>) -> Self {
        MethodDef {
            method_name,
            params: Vec::new(),
            returns: types::VOID,
            function: None,
            variable: None,
            filter: None,
            service: None,
            invoke,
        }
    }

    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    pub fn returns(mut self, returns: DeclaredType) -> Self {
        self.returns = returns;
        self
    }

    pub fn function(mut self) -> Self {
        self.function = Some(FunctionTag::default());
        self
    }

    pub fn function_named(mut self, name: &'static str) -> Self {
        self.function = Some(FunctionTag {
            name: Some(name),
            cacheable: false,
        });
        self
    }

    pub fn variable(mut self) -> Self {
        self.variable = Some(VariableTag::default());
        self
    }

    pub fn variable_named(mut self, name: &'static str) -> Self {
        self.variable = Some(VariableTag { name: Some(name) });
        self
    }

    pub fn filter(mut self, event: &'static str, load_order: Option<i32>) -> Self {
        self.filter = Some(FilterTag { event, load_order });
        self
    }

    pub fn service(mut self, tag: ServiceTag) -> Self {
        self.service = Some(tag);
        self
    }

    /// Bind the signature. Fails on the first parameter that cannot be built.
    pub fn compile(&self, package_name: &str) -> Result<CompiledMethod<P>> {
        Ok(CompiledMethod {
            name: format!("{}.{}", package_name, self.method_name),
            marshaller: ParameterMarshaller::from_specs(&self.params)?,
            returns: self.returns,
            invoke: self.invoke,
        })
    }
}

/// A class of bindable methods. Every call works on a fresh
/// `Default` instance; nothing survives between calls.
pub trait ExtensionPackage: Default + 'static {
    fn package_name() -> &'static str;

    fn methods() -> Vec<MethodDef<Self>>;
}

/// Type-erased handle of a compiled method, as stored in the method registry.
pub trait BoundMethod: Send + Sync {
    /// `package.method`
    fn name(&self) -> &str;

    fn marshaller(&self) -> &ParameterMarshaller;

    fn returns(&self) -> DeclaredType;

    /// Call the body on a new package instance.
    fn invoke_fresh(&self, values: Vec<Option<Value>>) -> Result<Option<Value>>;
}

/// A method whose parameters have been bound.
pub struct CompiledMethod<P> {
    name: String,
    marshaller: ParameterMarshaller,
    returns: DeclaredType,
    invoke: MethodFn<P>,
}

impl<P: ExtensionPackage> BoundMethod for CompiledMethod<P> {
    fn name(&self) -> &str {
        &self.name
    }

    fn marshaller(&self) -> &ParameterMarshaller {
        &self.marshaller
    }

    fn returns(&self) -> DeclaredType {
        self.returns
    }

    fn invoke_fresh(&self, values: Vec<Option<Value>>) -> Result<Option<Value>> {
        let mut instance = P::default();
        let mut args = Arguments::new(values);
        (self.invoke)(&mut instance, &mut args)
    }
}

/// The bound values a method body receives, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    values: Vec<Option<Value>>,
}

macro_rules! context_accessor {
    ($fn_name:ident, $variant:ident, $ty:ty, $expected:expr) => {
        pub fn $fn_name(&self, index: usize) -> Result<&$ty> {
            match self.get(index) {
                Some(Value::Context(ContextHandle::$variant(h))) => Ok(h),
                _ => Err(self.type_error(index, $expected)),
            }
        }
    };
}

impl Arguments {
    pub fn new(values: Vec<Option<Value>>) -> Self {
        Arguments { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value at `index`; nil and out of range are both `None`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(|v| v.as_ref())
    }

    pub fn get_str(&self, index: usize) -> Result<&str> {
        self.get_opt_str(index)?
            .ok_or_else(|| self.type_error(index, "String"))
    }

    pub fn get_opt_str(&self, index: usize) -> Result<Option<&str>> {
        match self.get(index) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(self.type_error(index, "String")),
        }
    }

    pub fn get_i32(&self, index: usize) -> Result<i32> {
        match self.get(index) {
            Some(Value::Integer(n)) => Ok(*n),
            _ => Err(self.type_error(index, "i32")),
        }
    }

    pub fn get_opt_i32(&self, index: usize) -> Result<Option<i32>> {
        match self.get(index) {
            None => Ok(None),
            Some(Value::Integer(n)) => Ok(Some(*n)),
            Some(_) => Err(self.type_error(index, "Integer")),
        }
    }

    pub fn get_i64(&self, index: usize) -> Result<i64> {
        match self.get(index) {
            Some(Value::Long(n)) => Ok(*n),
            _ => Err(self.type_error(index, "i64")),
        }
    }

    pub fn get_f32(&self, index: usize) -> Result<f32> {
        match self.get(index) {
            Some(Value::Float(n)) => Ok(*n),
            _ => Err(self.type_error(index, "f32")),
        }
    }

    pub fn get_f64(&self, index: usize) -> Result<f64> {
        match self.get(index) {
            Some(Value::Double(n)) => Ok(*n),
            _ => Err(self.type_error(index, "f64")),
        }
    }

    pub fn get_bool(&self, index: usize) -> Result<bool> {
        match self.get(index) {
            Some(Value::Boolean(b)) => Ok(*b),
            _ => Err(self.type_error(index, "bool")),
        }
    }

    pub fn get_opt_bool(&self, index: usize) -> Result<Option<bool>> {
        match self.get(index) {
            None => Ok(None),
            Some(Value::Boolean(b)) => Ok(Some(*b)),
            Some(_) => Err(self.type_error(index, "Boolean")),
        }
    }

    pub fn get_date(&self, index: usize) -> Result<Option<NaiveDateTime>> {
        match self.get(index) {
            None => Ok(None),
            Some(Value::Date(d)) => Ok(Some(*d)),
            Some(_) => Err(self.type_error(index, "Date")),
        }
    }

    pub fn get_result_set(&self, index: usize) -> Result<Option<&Arc<ResultSet>>> {
        match self.get(index) {
            None => Ok(None),
            Some(Value::ResultSet(rs)) => Ok(Some(rs)),
            Some(_) => Err(self.type_error(index, "ResultSet")),
        }
    }

    context_accessor!(get_user_data, UserData, Arc<UserData>, "UserData");
    context_accessor!(get_binder, Binder, Arc<dyn Binder>, "DataBinder");
    context_accessor!(get_page_merger, PageMerger, Arc<dyn PageMerger>, "PageMerger");
    context_accessor!(get_workspace, Workspace, Arc<Workspace>, "Workspace");
    context_accessor!(get_context, ExecutionContext, Arc<ExecutionContext>, "ExecutionContext");
    context_accessor!(get_service, Service, Arc<Service>, "Service");

    fn type_error(&self, index: usize, expected: &'static str) -> BindError {
        BindError::ArgumentType { index, expected }
    }
}
