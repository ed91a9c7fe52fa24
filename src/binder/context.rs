//! Ambient execution context and the handles injected into bound methods.

use std::collections::HashMap;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use crate::binder::data_binder::Binder;
use crate::binder::error::Result;

/// The closed set of types a parameter may be injected with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InjectableType {
    UserData,
    Binder,
    PageMerger,
    HttpImplementor,
    RequestImplementor,
    Workspace,
    ExecutionContext,
    Service,
}

impl InjectableType {
    pub fn name(&self) -> &'static str {
        match self {
            InjectableType::UserData => "UserData",
            InjectableType::Binder => "DataBinder",
            InjectableType::PageMerger => "PageMerger",
            InjectableType::HttpImplementor => "HttpImplementor",
            InjectableType::RequestImplementor => "ServiceRequestImplementor",
            InjectableType::Workspace => "Workspace",
            InjectableType::ExecutionContext => "ExecutionContext",
            InjectableType::Service => "Service",
        }
    }
}

impl Display for InjectableType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The user the current request runs as.
#[derive(Debug, Clone, PartialEq)]
pub struct UserData {
    name: String,
    properties: HashMap<String, String>,
}

impl UserData {
    pub fn new(name: impl Into<String>) -> Self {
        UserData {
            name: name.into(),
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(|s| s.as_str())
    }
}

/// Page-render helper able to evaluate template script in the current request.
pub trait PageMerger: Send + Sync + Debug {
    fn evaluate_script(&self, script: &str) -> Result<String>;
}

/// Transport level handle of the current request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HttpImplementor {
    headers: HashMap<String, String>,
}

impl HttpImplementor {
    pub fn new() -> Self {
        HttpImplementor::default()
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|s| s.as_str())
    }
}

/// Request handle of the service currently executing.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestImplementor {
    request_id: String,
}

impl RequestImplementor {
    pub fn new(request_id: impl Into<String>) -> Self {
        RequestImplementor {
            request_id: request_id.into(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

/// Database workspace handle.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    name: String,
}

impl Workspace {
    pub fn new(name: impl Into<String>) -> Self {
        Workspace { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The service whose action is currently running.
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    name: String,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        Service { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A live context object handed to a bound method.
#[derive(Clone, Debug)]
pub enum ContextHandle {
    UserData(Arc<UserData>),
    Binder(Arc<dyn Binder>),
    PageMerger(Arc<dyn PageMerger>),
    HttpImplementor(Arc<HttpImplementor>),
    RequestImplementor(Arc<RequestImplementor>),
    Workspace(Arc<Workspace>),
    ExecutionContext(Arc<ExecutionContext>),
    Service(Arc<Service>),
}

impl ContextHandle {
    pub fn injectable_type(&self) -> InjectableType {
        match self {
            ContextHandle::UserData(_) => InjectableType::UserData,
            ContextHandle::Binder(_) => InjectableType::Binder,
            ContextHandle::PageMerger(_) => InjectableType::PageMerger,
            ContextHandle::HttpImplementor(_) => InjectableType::HttpImplementor,
            ContextHandle::RequestImplementor(_) => InjectableType::RequestImplementor,
            ContextHandle::Workspace(_) => InjectableType::Workspace,
            ContextHandle::ExecutionContext(_) => InjectableType::ExecutionContext,
            ContextHandle::Service(_) => InjectableType::Service,
        }
    }

    /// Identity comparison: two handles are the same when they point at the
    /// same underlying object.
    pub fn same_handle(&self, other: &ContextHandle) -> bool {
        match (self, other) {
            (ContextHandle::UserData(a), ContextHandle::UserData(b)) => Arc::ptr_eq(a, b),
            (ContextHandle::Binder(a), ContextHandle::Binder(b)) => {
                Arc::as_ptr(a) as *const u8 == Arc::as_ptr(b) as *const u8
            }
            (ContextHandle::PageMerger(a), ContextHandle::PageMerger(b)) => {
                Arc::as_ptr(a) as *const u8 == Arc::as_ptr(b) as *const u8
            }
            (ContextHandle::HttpImplementor(a), ContextHandle::HttpImplementor(b)) => {
                Arc::ptr_eq(a, b)
            }
            (ContextHandle::RequestImplementor(a), ContextHandle::RequestImplementor(b)) => {
                Arc::ptr_eq(a, b)
            }
            (ContextHandle::Workspace(a), ContextHandle::Workspace(b)) => Arc::ptr_eq(a, b),
            (ContextHandle::ExecutionContext(a), ContextHandle::ExecutionContext(b)) => {
                Arc::ptr_eq(a, b)
            }
            (ContextHandle::Service(a), ContextHandle::Service(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Everything the calling environment knows about the current request.
///
/// Handles are optional; a parameter injected with a handle the context does
/// not carry receives nil.
#[derive(Clone, Debug, Default)]
pub struct ExecutionContext {
    user_data: Option<Arc<UserData>>,
    binder: Option<Arc<dyn Binder>>,
    page_merger: Option<Arc<dyn PageMerger>>,
    http: Option<Arc<HttpImplementor>>,
    request: Option<Arc<RequestImplementor>>,
    workspace: Option<Arc<Workspace>>,
    service: Option<Arc<Service>>,
    cached: HashMap<String, String>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        ExecutionContext::default()
    }

    pub fn with_user_data(mut self, user_data: UserData) -> Self {
        self.user_data = Some(Arc::new(user_data));
        self
    }

    pub fn with_binder(mut self, binder: Arc<dyn Binder>) -> Self {
        self.binder = Some(binder);
        self
    }

    pub fn with_page_merger(mut self, page_merger: Arc<dyn PageMerger>) -> Self {
        self.page_merger = Some(page_merger);
        self
    }

    pub fn with_http(mut self, http: HttpImplementor) -> Self {
        self.http = Some(Arc::new(http));
        self
    }

    pub fn with_request(mut self, request: RequestImplementor) -> Self {
        self.request = Some(Arc::new(request));
        self
    }

    pub fn with_workspace(mut self, workspace: Workspace) -> Self {
        self.workspace = Some(Arc::new(workspace));
        self
    }

    pub fn with_service(mut self, service: Service) -> Self {
        self.service = Some(Arc::new(service));
        self
    }

    pub fn user_data(&self) -> Option<&Arc<UserData>> {
        self.user_data.as_ref()
    }

    pub fn binder(&self) -> Option<&Arc<dyn Binder>> {
        self.binder.as_ref()
    }

    pub fn page_merger(&self) -> Option<&Arc<dyn PageMerger>> {
        self.page_merger.as_ref()
    }

    pub fn workspace(&self) -> Option<&Arc<Workspace>> {
        self.workspace.as_ref()
    }

    pub fn service(&self) -> Option<&Arc<Service>> {
        self.service.as_ref()
    }

    /// Store a request scoped string, e.g. the parameter of the filter event
    /// being dispatched.
    pub fn set_cached(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.cached.insert(key.into(), value.into());
    }

    pub fn get_cached(&self, key: &str) -> Option<&str> {
        self.cached.get(key).map(|s| s.as_str())
    }

    /// Look up the handle of the given injectable type.
    pub fn handle_for(&self, injectable: InjectableType) -> Option<ContextHandle> {
        match injectable {
            InjectableType::UserData => self.user_data.clone().map(ContextHandle::UserData),
            InjectableType::Binder => self.binder.clone().map(ContextHandle::Binder),
            InjectableType::PageMerger => self.page_merger.clone().map(ContextHandle::PageMerger),
            InjectableType::HttpImplementor => self.http.clone().map(ContextHandle::HttpImplementor),
            InjectableType::RequestImplementor => {
                self.request.clone().map(ContextHandle::RequestImplementor)
            }
            InjectableType::Workspace => self.workspace.clone().map(ContextHandle::Workspace),
            InjectableType::ExecutionContext => Some(ContextHandle::ExecutionContext(Arc::new(
                self.clone(),
            ))),
            InjectableType::Service => self.service.clone().map(ContextHandle::Service),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::data_binder::DataBinder;

    #[test]
    fn test_missing_handles_resolve_to_none() {
        let ctx = ExecutionContext::new();
        assert!(ctx.handle_for(InjectableType::UserData).is_none());
        assert!(ctx.handle_for(InjectableType::Binder).is_none());
        assert!(ctx.handle_for(InjectableType::Workspace).is_none());
    }

    #[test]
    fn test_execution_context_is_always_available() {
        let ctx = ExecutionContext::new();
        let handle = ctx.handle_for(InjectableType::ExecutionContext);
        assert_eq!(
            handle.map(|h| h.injectable_type()),
            Some(InjectableType::ExecutionContext)
        );
    }

    #[test]
    fn test_handles_share_identity() {
        let ctx = ExecutionContext::new()
            .with_user_data(UserData::new("sysadmin"))
            .with_binder(Arc::new(DataBinder::new()));
        let first = ctx.handle_for(InjectableType::Binder).unwrap();
        let second = ctx.handle_for(InjectableType::Binder).unwrap();
        assert!(first.same_handle(&second));
        let user = ctx.handle_for(InjectableType::UserData).unwrap();
        assert!(!user.same_handle(&first));
    }

    #[test]
    fn test_cached_values() {
        let mut ctx = ExecutionContext::new();
        ctx.set_cached("filterParameter", "abc");
        assert_eq!(ctx.get_cached("filterParameter"), Some("abc"));
        assert_eq!(ctx.get_cached("other"), None);
    }
}
