//! Values, the named-value store and the ambient context bound methods see.

pub mod context;
pub mod data_binder;
pub mod error;
pub mod operations;
pub mod value;

pub use context::{ContextHandle, ExecutionContext, InjectableType};
pub use data_binder::{Binder, DataBinder, ResultSet};
pub use error::{BindError, Result};
pub use value::{types, Conditional, DeclaredType, TypeKind, Value};
