//! Removes arguments a tool does not declare before the call reaches it.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{error, info};

use crate::error::Result;
use crate::host::{CallContext, ToolRegistry};
use crate::middleware::{CallOutcome, Next, ToolMiddleware, ToolMiddlewareFactory};
use crate::model::Invocation;

/// What the filter did to one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// No arguments or no registry: nothing was looked up
    Skipped,
    /// Every argument is declared by the tool
    Unchanged,
    /// These argument names were removed
    Stripped(BTreeSet<String>),
    /// The lookup failed; the original arguments were kept
    FailedOpen(String),
}

/// Strips unknown arguments from tool calls.
///
/// The tool's declared parameters come from the host registry. Filtering
/// is best effort: if the lookup fails the call continues with its
/// original arguments and the failure is only logged.
#[derive(Debug, Default)]
pub struct StripUnknownArgumentsMiddleware;

impl StripUnknownArgumentsMiddleware {
    pub fn new() -> Self {
        Self
    }

    /// Filters `ctx.invocation` in place and reports what happened.
    pub async fn filter(&self, ctx: &mut CallContext) -> FilterOutcome {
        let registry = match ctx.registry.as_ref() {
            Some(registry) if ctx.invocation.has_arguments() => registry.clone(),
            _ => return FilterOutcome::Skipped,
        };

        match Self::strip(&mut ctx.invocation, registry.as_ref()).await {
            Ok(unknown) if unknown.is_empty() => FilterOutcome::Unchanged,
            Ok(unknown) => {
                info!(
                    request_id = %ctx.short_id(),
                    "Unknown arguments for tool '{}': {:?}",
                    ctx.invocation.name, unknown
                );
                FilterOutcome::Stripped(unknown)
            }
            Err(e) => {
                error!(
                    request_id = %ctx.short_id(),
                    error = ?e,
                    "Error in StripUnknownArgumentsMiddleware for tool '{}': {}",
                    ctx.invocation.display_name(), e
                );
                FilterOutcome::FailedOpen(e.to_string())
            }
        }
    }

    /// Keeps only declared arguments and returns the names that were dropped.
    ///
    /// The invocation is untouched unless the lookup succeeds.
    async fn strip(invocation: &mut Invocation, registry: &dyn ToolRegistry) -> Result<BTreeSet<String>> {
        let declared = registry.get_tool(&invocation.name).await?.parameter_names();

        let Some(arguments) = invocation.arguments.as_mut() else {
            return Ok(BTreeSet::new());
        };

        let unknown: BTreeSet<String> = arguments
            .keys()
            .filter(|name| !declared.contains(*name))
            .cloned()
            .collect();
        arguments.retain(|name, _| declared.contains(name));

        Ok(unknown)
    }
}

#[async_trait]
impl ToolMiddleware for StripUnknownArgumentsMiddleware {
    async fn on_call_tool(&self, mut ctx: CallContext, next: Next<'_>) -> CallOutcome {
        self.filter(&mut ctx).await;
        next.run(ctx).await
    }
}

/// Factory for creating StripUnknownArgumentsMiddleware from configuration
#[derive(Debug)]
pub struct StripUnknownArgumentsFactory;

impl ToolMiddlewareFactory for StripUnknownArgumentsFactory {
    fn create(&self, _config: &serde_json::Value) -> Result<Arc<dyn ToolMiddleware>> {
        Ok(Arc::new(StripUnknownArgumentsMiddleware::new()))
    }

    fn middleware_type(&self) -> &'static str {
        "strip_unknown_arguments"
    }
}
