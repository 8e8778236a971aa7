//! Call-scoped values the middleware reads and mutates.
//!
//! These are thin, owned views over the rmcp protocol types so that the
//! middleware never reaches into host objects reflectively.

use rmcp::model::{CallToolRequestParam, CallToolResult, JsonObject, Tool};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A single tool call: the tool name and its argument mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub name: String,
    pub arguments: Option<JsonObject>,
}

impl Invocation {
    pub fn new(name: impl Into<String>, arguments: Option<JsonObject>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// True when the call carries at least one argument.
    pub fn has_arguments(&self) -> bool {
        self.arguments.as_ref().is_some_and(|args| !args.is_empty())
    }

    /// Name used in log lines; empty names show as `unknown`.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "unknown"
        } else {
            &self.name
        }
    }
}

impl From<CallToolRequestParam> for Invocation {
    fn from(request: CallToolRequestParam) -> Self {
        Self {
            name: request.name.to_string(),
            arguments: request.arguments,
        }
    }
}

impl From<Invocation> for CallToolRequestParam {
    fn from(invocation: Invocation) -> Self {
        CallToolRequestParam {
            name: invocation.name.into(),
            arguments: invocation.arguments,
        }
    }
}

/// Read-only description of a registered tool, as the host registry reports it.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub input_schema: Arc<JsonObject>,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, input_schema: Arc<JsonObject>) -> Self {
        Self {
            name: name.into(),
            input_schema,
        }
    }

    /// Names declared under the schema's `properties` object.
    ///
    /// A schema without `properties` (or with a non-object value there)
    /// declares no parameters at all.
    pub fn parameter_names(&self) -> BTreeSet<String> {
        self.input_schema
            .get("properties")
            .and_then(|properties| properties.as_object())
            .map(|properties| properties.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl From<&Tool> for ToolDescriptor {
    fn from(tool: &Tool) -> Self {
        Self {
            name: tool.name.to_string(),
            input_schema: tool.input_schema.clone(),
        }
    }
}

/// A tool call result plus the optional `_meta` map middleware may extend.
#[derive(Debug, Clone, Serialize)]
pub struct ToolResponse {
    #[serde(flatten)]
    pub result: CallToolResult,
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<JsonObject>,
}

impl ToolResponse {
    pub fn new(result: CallToolResult) -> Self {
        Self { result, meta: None }
    }

    /// The metadata map, created empty on first use.
    pub fn meta_mut(&mut self) -> &mut JsonObject {
        self.meta.get_or_insert_with(JsonObject::new)
    }
}

impl From<CallToolResult> for ToolResponse {
    fn from(result: CallToolResult) -> Self {
        Self::new(result)
    }
}
