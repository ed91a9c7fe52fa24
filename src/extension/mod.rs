//! Extension packages and the surfaces that expose them.
//!
//! An extension package is a plain type implementing [`ExtensionPackage`]. It
//! lists its bindable methods as [`MethodDef`]s: a signature, a body and the
//! tags saying where the method shows up.
//!
//! ```text
//! MethodDef ── function / variable tag ──> ScriptProxy ──> ScriptContext
//!           ── filter tag ───────────────> FilterProxy ──> MethodRegistry
//!           ── service tag ──────────────> ServiceProxy ─> MethodRegistry
//! ```
//!
//! ### Key Components
//!
//! - **[`ScriptProxy`]**: compiles a package into the function and variable
//!   tables of the script interpreter and dispatches calls by index
//! - **[`ScriptContext`]**: holds compiled packages in registration order and
//!   routes calls by name, caching which package owns which name
//! - **[`MethodRegistry`]**: process-wide map from opaque tokens to methods
//! - **[`FilterProxy`]** and **[`ServiceProxy`]**: host callbacks that look up a
//!   method by token, bind its arguments and run it
//!
//! Every call runs on a fresh `Default` instance of the package.
//!
//! ## Example: Custom Package
//!
//! ```
//! use twine::binder::{BindError, ExecutionContext, Value, types};
//! use twine::binder::context::UserData;
//! use twine::extension::{Arguments, ExtensionPackage, MethodDef, ScriptContext};
//! use twine::parameter::ParamSpec;
//!
//! #[derive(Default)]
//! struct Doubler;
//!
//! impl Doubler {
//!     fn double(&mut self, args: &mut Arguments) -> Result<Option<Value>, BindError> {
//!         Ok(Some(Value::Long(args.get_i64(0)? * 2)))
//!     }
//! }
//!
//! impl ExtensionPackage for Doubler {
//!     fn package_name() -> &'static str { "Doubler" }
//!
//!     fn methods() -> Vec<MethodDef<Self>> {
//!         vec![MethodDef::new("double", Doubler::double)
//!             .param(ParamSpec::unnamed(types::I64))
//!             .returns(types::I64)
//!             .function()]
//!     }
//! }
//!
//! let mut scripts = ScriptContext::new();
//! scripts.add_package::<Doubler>().unwrap();
//!
//! let ctx = ExecutionContext::new().with_user_data(UserData::new("sysadmin"));
//! let result = scripts.call_function("double", &[Some(Value::Long(21))], &ctx).unwrap();
//! assert_eq!(result, Some(Value::Long(42)));
//! ```

pub mod config;
pub mod filter_proxy;
pub mod host_error;
pub mod registry;
pub mod resolver;
pub mod script_proxy;
pub mod service_proxy;
pub mod tables;
pub mod types;

pub use config::TwineConfig;
pub use filter_proxy::{FilterProxy, FilterRegistration, FilterStatus, FILTER_PARAMETER};
pub use host_error::HostError;
pub use registry::MethodRegistry;
pub use resolver::{ScriptContext, ScriptExtensions};
pub use script_proxy::{normalize_return, ScriptProxy, VariableValue};
pub use service_proxy::{ServiceProxy, ServiceRegistration};
pub use tables::{ExtensionTable, ReturnType, VariableDefinitionRow};
pub use types::{
    Arguments, BoundMethod, CompiledMethod, ExtensionPackage, FilterTag, FunctionTag, MethodDef,
    MethodFn, ServiceTag, VariableTag,
};
