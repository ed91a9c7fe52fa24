//! Process-wide registry of bound methods, keyed by opaque tokens.
//!
//! The dispatch proxies hand a token to the host at registration time; the
//! host hands it back on every call and the proxy looks the method up here.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::extension::types::BoundMethod;

lazy_static! {
    static ref METHODS: RwLock<MethodRegistry> = RwLock::new(MethodRegistry::new());
}

/// Token to method map.
#[derive(Default)]
pub struct MethodRegistry {
    methods: HashMap<String, Arc<dyn BoundMethod>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        MethodRegistry {
            methods: HashMap::new(),
        }
    }

    /// Store `method` under a fresh token and return the token.
    pub fn insert(&mut self, method: Arc<dyn BoundMethod>) -> String {
        let token = Uuid::new_v4().to_hyphenated().to_string();
        self.methods.insert(token.clone(), method);
        token
    }

    pub fn get(&self, token: &str) -> Option<Arc<dyn BoundMethod>> {
        self.methods.get(token).cloned()
    }

    pub fn remove(&mut self, token: &str) -> Option<Arc<dyn BoundMethod>> {
        self.methods.remove(token)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Register in the process-wide registry.
    pub fn add_method(method: Arc<dyn BoundMethod>) -> String {
        match METHODS.write() {
            Ok(mut guard) => guard.insert(method),
            Err(poisoned) => poisoned.into_inner().insert(method),
        }
    }

    /// Look up in the process-wide registry.
    pub fn get_method(token: &str) -> Option<Arc<dyn BoundMethod>> {
        match METHODS.read() {
            Ok(guard) => guard.get(token),
            Err(poisoned) => poisoned.into_inner().get(token),
        }
    }

    /// Drop from the process-wide registry.
    pub fn remove_method(token: &str) -> Option<Arc<dyn BoundMethod>> {
        match METHODS.write() {
            Ok(mut guard) => guard.remove(token),
            Err(poisoned) => poisoned.into_inner().remove(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::error::Result;
    use crate::binder::value::Value;
    use crate::extension::types::{Arguments, ExtensionPackage, MethodDef};

    #[derive(Default)]
    struct Probe;

    impl Probe {
        fn ping(&mut self, _args: &mut Arguments) -> Result<Option<Value>> {
            Ok(Some(Value::from("pong")))
        }
    }

    impl ExtensionPackage for Probe {
        fn package_name() -> &'static str {
            "Probe"
        }

        fn methods() -> Vec<MethodDef<Self>> {
            vec![MethodDef::new("ping", Probe::ping)]
        }
    }

    #[test]
    fn test_tokens_are_unique() {
        let mut registry = MethodRegistry::new();
        let def = &Probe::methods()[0];
        let a = registry.insert(Arc::new(def.compile("Probe").unwrap()));
        let b = registry.insert(Arc::new(def.compile("Probe").unwrap()));
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(&a).unwrap().name(), "Probe.ping");
        assert!(registry.remove(&a).is_some());
        assert!(registry.get(&a).is_none());
    }

    #[test]
    fn test_global_registry() {
        let def = &Probe::methods()[0];
        let token = MethodRegistry::add_method(Arc::new(def.compile("Probe").unwrap()));
        let method = MethodRegistry::get_method(&token).unwrap();
        assert_eq!(method.invoke_fresh(Vec::new()).unwrap(), Some(Value::from("pong")));
        assert!(MethodRegistry::remove_method(&token).is_some());
        assert!(MethodRegistry::get_method(&token).is_none());
    }
}
