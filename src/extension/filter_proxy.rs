//! Filter dispatch.
//!
//! Every filter-tagged method is registered with the method registry and
//! described to the host as a [`FilterRegistration`]. When the host fires the
//! event it stores the registration's token in the context under
//! [`FILTER_PARAMETER`] and calls [`FilterProxy::do_filter`].

use std::sync::Arc;

use tracing::{debug, warn};

use crate::binder::context::{ExecutionContext, Workspace};
use crate::binder::data_binder::Binder;
use crate::binder::error::{BindError, Result};
use crate::binder::value::{TypeKind, Value};
use crate::extension::config::TwineConfig;
use crate::extension::host_error::HostError;
use crate::extension::registry::MethodRegistry;
use crate::extension::types::{BoundMethod, ExtensionPackage};

/// Context cache key holding the token of the filter being run.
pub const FILTER_PARAMETER: &str = "filterParameter";

/// What the host should do after a filter ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStatus {
    Continue = 0,
    Finished = 1,
    Abort = -1,
}

impl FilterStatus {
    /// Unknown codes continue.
    pub fn from_code(code: i64) -> FilterStatus {
        match code {
            1 => FilterStatus::Finished,
            -1 => FilterStatus::Abort,
            _ => FilterStatus::Continue,
        }
    }

    pub fn code(&self) -> i32 {
        *self as i32
    }
}

/// A filter as announced to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRegistration {
    pub event: String,
    pub load_order: i32,
    pub parameter_token: String,
}

pub struct FilterProxy;

impl FilterProxy {
    /// Register every filter-tagged method of `P`.
    ///
    /// Fails if a filter returns anything other than an integer or nothing.
    pub fn register<P: ExtensionPackage>(config: &TwineConfig) -> Result<Vec<FilterRegistration>> {
        let package = P::package_name();
        let mut registrations = Vec::new();

        for def in P::methods() {
            let tag = match &def.filter {
                Some(tag) => tag.clone(),
                None => continue,
            };
            match def.returns.kind() {
                TypeKind::Void | TypeKind::Integer | TypeKind::Long => {}
                _ => {
                    return Err(BindError::InvalidFilterSignature(format!(
                        "{}.{}",
                        package, def.method_name
                    )))
                }
            }
            let method = match def.compile(package) {
                Ok(m) => m,
                Err(e) => {
                    warn!(target: "twine", "Skipping filter {}.{}: {}", package, def.method_name, e);
                    continue;
                }
            };

            let parameter_token = MethodRegistry::add_method(Arc::new(method));
            let load_order = tag
                .load_order
                .unwrap_or(config.filters.default_load_order);
            debug!(
                target: "twine",
                "Registered filter {}.{} on {} (load order {})",
                package, def.method_name, tag.event, load_order
            );
            registrations.push(FilterRegistration {
                event: tag.event.to_string(),
                load_order,
                parameter_token,
            });
        }
        Ok(registrations)
    }

    /// Run the filter whose token the host cached in `ctx`.
    pub fn do_filter(
        ws: Option<&Arc<Workspace>>,
        binder: &Arc<dyn Binder>,
        ctx: &ExecutionContext,
    ) -> std::result::Result<FilterStatus, HostError> {
        let token = ctx.get_cached(FILTER_PARAMETER).unwrap_or_default();
        let method = MethodRegistry::get_method(token)
            .ok_or_else(|| BindError::UnknownMethodToken(token.to_string()))?;

        debug!(target: "twine", "Running filter {}", method.name());
        let values = method.marshaller().value_array_for_filter(ws, binder, ctx);
        let status = match method.invoke_fresh(values)? {
            Some(Value::Integer(n)) => FilterStatus::from_code(i64::from(n)),
            Some(Value::Long(n)) => FilterStatus::from_code(n),
            _ => FilterStatus::Continue,
        };
        Ok(status)
    }
}
