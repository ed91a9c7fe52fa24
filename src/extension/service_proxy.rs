//! Service dispatch.
//!
//! Service-tagged methods are registered with the method registry and
//! described to the host as [`ServiceRegistration`]s. The host calls back
//! through [`ServiceProxy::delegate_with_parameters`] with the method token as
//! the first action parameter.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::binder::context::ExecutionContext;
use crate::binder::error::{BindError, Result};
use crate::binder::value::Value;
use crate::extension::config::TwineConfig;
use crate::extension::host_error::HostError;
use crate::extension::registry::MethodRegistry;
use crate::extension::types::{BoundMethod, ExtensionPackage};

/// A service as announced to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRegistration {
    pub name: String,
    pub template: String,
    pub access_level: u32,
    pub error_message: String,
    pub service_type: Option<String>,
    pub subjects: String,
    pub method_token: String,
}

impl ServiceRegistration {
    /// Action parameters the host passes back on every call.
    pub fn action_params(&self) -> Vec<String> {
        vec![self.method_token.clone()]
    }
}

pub struct ServiceProxy;

impl ServiceProxy {
    /// Register every service-tagged method of `P`.
    pub fn register<P: ExtensionPackage>(config: &TwineConfig) -> Result<Vec<ServiceRegistration>> {
        let package = P::package_name();
        let mut registrations = Vec::new();

        for def in P::methods() {
            let tag = match &def.service {
                Some(tag) => tag.clone(),
                None => continue,
            };
            let method = match def.compile(package) {
                Ok(m) => m,
                Err(e) => {
                    warn!(target: "twine", "Skipping service {}: {}", tag.name, e);
                    continue;
                }
            };

            let method_token = MethodRegistry::add_method(Arc::new(method));
            debug!(target: "twine", "Registered service {} as {}.{}", tag.name, package, def.method_name);
            registrations.push(ServiceRegistration {
                name: tag.name.to_string(),
                template: tag.template.to_string(),
                access_level: tag.access_level,
                error_message: tag
                    .error_message
                    .map(str::to_string)
                    .unwrap_or_else(|| config.services.default_error_message.clone()),
                service_type: tag.service_type.map(str::to_string),
                subjects: tag.subjects.to_string(),
                method_token,
            });
        }
        Ok(registrations)
    }

    /// Bind the method's parameters from the store and run it.
    pub fn delegate_with_parameters<S: AsRef<str>>(
        action_params: &[S],
        ctx: &ExecutionContext,
    ) -> std::result::Result<Option<Value>, HostError> {
        let token = action_params.first().map(|s| s.as_ref()).unwrap_or_default();
        let method = MethodRegistry::get_method(token)
            .ok_or_else(|| BindError::UnknownMethodToken(token.to_string()))?;

        debug!(target: "twine", "Delegating to {}", method.name());
        let values = method.marshaller().value_array_from_store(ctx)?;
        Ok(method.invoke_fresh(values)?)
    }
}
