//! The injectable allow-list and how each entry is resolved.

use std::sync::Arc;

use crate::binder::context::{ContextHandle, ExecutionContext, InjectableType, Workspace};
use crate::binder::data_binder::Binder;
use crate::binder::value::{DeclaredType, TypeKind, Value};

/// The injectable type a declaration names, if it is on the allow-list.
pub fn injectable_type(declared: DeclaredType) -> Option<InjectableType> {
    match declared.kind() {
        TypeKind::Context(t) => Some(t),
        _ => None,
    }
}

pub fn is_valid_type(declared: DeclaredType) -> bool {
    injectable_type(declared).is_some()
}

/// Pull the handle for `injectable` out of the ambient context. A handle the
/// context does not carry resolves to nil.
pub fn resolve(injectable: InjectableType, ctx: &ExecutionContext) -> Option<Value> {
    ctx.handle_for(injectable).map(Value::Context)
}

/// Filter events hand over their workspace, binder and context explicitly.
/// Only those three types are filled, everything else stays nil.
pub fn resolve_for_filter(
    injectable: Option<InjectableType>,
    ws: Option<&Arc<Workspace>>,
    binder: &Arc<dyn Binder>,
    ctx: &ExecutionContext,
) -> Option<Value> {
    match injectable? {
        InjectableType::Workspace => ws.cloned().map(|w| Value::Context(ContextHandle::Workspace(w))),
        InjectableType::Binder => Some(Value::Context(ContextHandle::Binder(binder.clone()))),
        InjectableType::ExecutionContext => Some(Value::Context(ContextHandle::ExecutionContext(
            Arc::new(ctx.clone()),
        ))),
        _ => None,
    }
}
