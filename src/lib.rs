//! # twine - typed method binding for a template script host
//!
//! Plain Rust methods are exposed to a content server's script interpreter,
//! filter events and named services. The crate handles:
//! - Typed parameters read from a request's named-value store, from script
//!   arguments or injected from the request context
//! - A type coercion library between the host's loose values and declared types
//! - Compilation of a package's methods into the interpreter's function and
//!   variable tables
//! - Normalization of return values into the interpreter's value universe
//! - Token based filter and service dispatch
//!
//! ## Quick Start
//!
//! ### Calling a script function
//!
//! ```
//! use twine::binder::ExecutionContext;
//! use twine::binder::context::UserData;
//! use twine::binder::Value;
//! use twine::extension::ScriptContext;
//! use twine::packages::register_script_packages;
//!
//! let mut scripts = ScriptContext::new();
//! register_script_packages(&mut scripts).unwrap();
//!
//! let ctx = ExecutionContext::new().with_user_data(UserData::new("sysadmin"));
//! let result = scripts.call_function("factorial", &[Some(Value::Long(5))], &ctx).unwrap();
//! assert_eq!(result, Some(Value::Long(120)));
//! ```
//!
//! ### Binding parameters from the store
//!
//! ```
//! use std::sync::Arc;
//! use twine::binder::{DataBinder, ExecutionContext, Value, types};
//! use twine::parameter::{ParamSpec, ParameterMarshaller};
//!
//! let mut binder = DataBinder::new();
//! binder.put_local("dID", "42");
//! let ctx = ExecutionContext::new().with_binder(Arc::new(binder));
//!
//! let marshaller = ParameterMarshaller::from_specs(&[
//!     ParamSpec::required("dID", types::I64),
//!     ParamSpec::optional("dRevLabel", types::STRING),
//! ]).unwrap();
//! let values = marshaller.value_array_from_store(&ctx).unwrap();
//! assert_eq!(values, vec![Some(Value::Long(42)), None]);
//! ```
//!
//! ## Architecture
//!
//! - **[`binder`]** - Values, the named-value store, the request context and
//!   type conversion
//! - **[`date_format`]** - Date pattern grammar used by the store
//! - **[`parameter`]** - Typed parameters and the parameter marshaller
//! - **[`extension`]** - Package descriptors, the script surface compiler and
//!   filter/service dispatch
//! - **[`packages`]** - Bundled example packages

#[macro_use]
extern crate lazy_static;

pub mod binder;
pub mod date_format;
pub mod extension;
pub mod packages;
pub mod parameter;
