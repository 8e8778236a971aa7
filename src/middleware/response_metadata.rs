//! Attaches package identity and call timing to tool responses.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::{MiddlewareError, Result};
use crate::host::CallContext;
use crate::middleware::{CallOutcome, Next, ToolMiddleware, ToolMiddlewareFactory};
use crate::model::ToolResponse;
use crate::package::{self, PackageMetadata};

/// Response metadata key holding the package name and version
pub const PACKAGE_METADATA_KEY: &str = "_package_metadata";

/// Response metadata key holding the call timing
pub const TIMING_METADATA_KEY: &str = "_timing_metadata";

/// Configuration for response metadata middleware
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMetadataConfig {
    /// Identity to report instead of the process-wide one
    #[serde(default)]
    pub package: Option<PackageMetadata>,
}

/// Times every tool call and records the result in the response `_meta` map.
///
/// Failed calls are logged with their elapsed time and returned unchanged;
/// they never get metadata.
#[derive(Debug, Clone)]
pub struct ResponseMetadataMiddleware {
    package: PackageMetadata,
}

impl ResponseMetadataMiddleware {
    pub fn new(package: PackageMetadata) -> Self {
        Self { package }
    }

    pub fn package(&self) -> &PackageMetadata {
        &self.package
    }

    /// Runs `next` and returns its outcome with the elapsed time.
    async fn time_operation(ctx: CallContext, next: Next<'_>) -> (CallOutcome, Duration) {
        let start = Instant::now();
        let outcome = next.run(ctx).await;
        (outcome, start.elapsed())
    }

    fn annotate(&self, response: &mut ToolResponse, elapsed_ms: f64) {
        let meta = response.meta_mut();
        meta.insert(
            PACKAGE_METADATA_KEY.to_string(),
            json!({
                "name": self.package.name,
                "version": self.package.version,
            }),
        );
        meta.insert(
            TIMING_METADATA_KEY.to_string(),
            json!({ "tool_response_time_ms": elapsed_ms }),
        );
    }
}

impl Default for ResponseMetadataMiddleware {
    fn default() -> Self {
        Self::new(package::current().clone())
    }
}

fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

#[async_trait]
impl ToolMiddleware for ResponseMetadataMiddleware {
    async fn on_call_tool(&self, ctx: CallContext, next: Next<'_>) -> CallOutcome {
        let tool_name = ctx.invocation.display_name().to_string();
        let request_id = ctx.short_id();

        let (outcome, elapsed) = Self::time_operation(ctx, next).await;
        let elapsed_ms = as_millis_f64(elapsed);

        let response = match outcome {
            Ok(response) => {
                debug!(request_id = %request_id, "Tool '{}' completed in {:.2}ms", tool_name, elapsed_ms);
                response
            }
            Err(e) => {
                warn!(request_id = %request_id, "Tool '{}' failed after {:.2}ms: {}", tool_name, elapsed_ms, e);
                return Err(e);
            }
        };

        let Some(mut response) = response else {
            return Ok(None);
        };

        self.annotate(&mut response, elapsed_ms);
        debug!(
            request_id = %request_id,
            "Added package metadata to tool response: {} {}",
            self.package.name, self.package.version
        );

        Ok(Some(response))
    }
}

/// Factory for creating ResponseMetadataMiddleware from configuration
#[derive(Debug)]
pub struct ResponseMetadataFactory;

impl ToolMiddlewareFactory for ResponseMetadataFactory {
    fn create(&self, config: &serde_json::Value) -> Result<Arc<dyn ToolMiddleware>> {
        let metadata_config: ResponseMetadataConfig = if config.is_null() {
            ResponseMetadataConfig::default()
        } else {
            serde_json::from_value(config.clone()).map_err(|e| {
                MiddlewareError::config(format!("Invalid response metadata configuration: {}", e))
            })?
        };

        let middleware = match metadata_config.package {
            Some(package) => ResponseMetadataMiddleware::new(package),
            None => ResponseMetadataMiddleware::default(),
        };
        Ok(Arc::new(middleware))
    }

    fn middleware_type(&self) -> &'static str {
        "response_metadata"
    }
}
