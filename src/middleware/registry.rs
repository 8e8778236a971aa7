//! Middleware registry for managing factory registration and lookup.

use super::ToolMiddlewareFactory;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of tool middleware factories, keyed by their configuration type name
pub struct MiddlewareRegistry {
    factories: HashMap<String, Arc<dyn ToolMiddlewareFactory>>,
}

impl std::fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareRegistry")
            .field("factories", &format!("HashMap [keys={:?}]", self.factories.keys().collect::<Vec<_>>()))
            .finish()
    }
}

impl MiddlewareRegistry {
    /// Create a new registry with built-in middleware pre-registered
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };

        registry.register_builtin_middleware();

        registry
    }

    /// Register a factory, replacing any factory with the same type name
    pub fn register_factory(&mut self, factory: Arc<dyn ToolMiddlewareFactory>) {
        let middleware_type = factory.middleware_type().to_string();
        self.factories.insert(middleware_type, factory);
    }

    /// Get a factory by type name
    pub fn get_factory(&self, middleware_type: &str) -> Option<&Arc<dyn ToolMiddlewareFactory>> {
        self.factories.get(middleware_type)
    }

    fn register_builtin_middleware(&mut self) {
        use super::response_metadata::ResponseMetadataFactory;
        use super::strip_unknown_arguments::StripUnknownArgumentsFactory;

        self.register_factory(Arc::new(StripUnknownArgumentsFactory));
        self.register_factory(Arc::new(ResponseMetadataFactory));
    }
}

impl Default for MiddlewareRegistry {
    fn default() -> Self {
        Self::new()
    }
}
