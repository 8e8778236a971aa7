//! The surface the host server exposes to call middleware.
//!
//! The host owns the tool registry and the final dispatch of a call. Both
//! are reached through the traits below; `ToolCatalog` is an in-memory
//! registry for hosts that already hold their tool list.

use async_trait::async_trait;
use rmcp::model::Tool;
use rmcp::Error as McpError;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{MiddlewareError, Result};
use crate::model::{Invocation, ToolDescriptor, ToolResponse};

/// Looks up registered tools by name.
#[async_trait]
pub trait ToolRegistry: Send + Sync {
    async fn get_tool(&self, name: &str) -> Result<ToolDescriptor>;
}

/// The last stage of the pipeline: actually runs the tool.
///
/// `Ok(None)` means the host produced no result object for the call.
#[async_trait]
pub trait ToolDispatcher: Send + Sync {
    async fn dispatch(&self, ctx: CallContext) -> std::result::Result<Option<ToolResponse>, McpError>;
}

/// Everything a middleware sees about one tool call.
#[derive(Clone)]
pub struct CallContext {
    /// Identifies the call in log lines
    pub request_id: Uuid,
    pub invocation: Invocation,
    /// Handle to the host registry, absent when the host did not provide one
    pub registry: Option<Arc<dyn ToolRegistry>>,
}

impl std::fmt::Debug for CallContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallContext")
            .field("request_id", &self.request_id)
            .field("invocation", &self.invocation)
            .field("registry", &self.registry.as_ref().map(|_| "<ToolRegistry>"))
            .finish()
    }
}

impl CallContext {
    pub fn new(invocation: Invocation) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            invocation,
            registry: None,
        }
    }

    pub fn with_registry(mut self, registry: Arc<dyn ToolRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Short form of the request id for log lines
    pub fn short_id(&self) -> String {
        self.request_id.to_string()[..8].to_string()
    }
}

/// Immutable registry built from a host's tool list.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: HashMap<String, ToolDescriptor>,
}

impl ToolCatalog {
    pub fn new(tools: &[Tool]) -> Self {
        tools.iter().map(ToolDescriptor::from).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl FromIterator<ToolDescriptor> for ToolCatalog {
    fn from_iter<I: IntoIterator<Item = ToolDescriptor>>(iter: I) -> Self {
        Self {
            tools: iter
                .into_iter()
                .map(|descriptor| (descriptor.name.clone(), descriptor))
                .collect(),
        }
    }
}

#[async_trait]
impl ToolRegistry for ToolCatalog {
    async fn get_tool(&self, name: &str) -> Result<ToolDescriptor> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| MiddlewareError::tool_not_found(name))
    }
}
