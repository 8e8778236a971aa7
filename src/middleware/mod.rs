//! The middleware module provides a way to intercept tool calls on their way
//! to the host and their results on the way back.
//!
//! A [`MiddlewarePipeline`] holds an ordered list of [`ToolMiddleware`].
//! Each middleware receives the call context and a [`Next`] continuation;
//! calling [`Next::run`] hands the call to the following middleware, and the
//! last one hands it to the host's [`ToolDispatcher`].

pub mod registry;
pub mod response_metadata;
pub mod strip_unknown_arguments;

use self::registry::MiddlewareRegistry;
use crate::config::{MiddlewareConfig, MiddlewareSpec};
use crate::error::{MiddlewareError, Result};
use crate::host::{CallContext, ToolDispatcher};
use crate::model::ToolResponse;
use async_trait::async_trait;
use rmcp::Error as McpError;
use std::sync::Arc;

/// What a tool call produces: a response (possibly none) or the host's error.
pub type CallOutcome = std::result::Result<Option<ToolResponse>, McpError>;

/// A trait for middleware that wraps a single tool call.
///
/// Implementations may change the context before calling `next`, and
/// inspect or change the outcome after it returns.
#[async_trait]
pub trait ToolMiddleware: Send + Sync {
    async fn on_call_tool(&self, ctx: CallContext, next: Next<'_>) -> CallOutcome;
}

/// The remainder of the pipeline after the current middleware.
pub struct Next<'a> {
    middleware: &'a [Arc<dyn ToolMiddleware>],
    dispatcher: &'a dyn ToolDispatcher,
}

impl<'a> Next<'a> {
    pub fn new(middleware: &'a [Arc<dyn ToolMiddleware>], dispatcher: &'a dyn ToolDispatcher) -> Self {
        Self {
            middleware,
            dispatcher,
        }
    }

    /// Run the rest of the chain with the given context.
    pub async fn run(self, ctx: CallContext) -> CallOutcome {
        match self.middleware.split_first() {
            Some((current, rest)) => {
                current
                    .on_call_tool(ctx, Next::new(rest, self.dispatcher))
                    .await
            }
            None => self.dispatcher.dispatch(ctx).await,
        }
    }
}

/// Factory trait for creating tool middleware from configuration
pub trait ToolMiddlewareFactory: Send + Sync {
    /// Create a new middleware instance from its `config` value
    fn create(&self, config: &serde_json::Value) -> Result<Arc<dyn ToolMiddleware>>;

    /// Get the type name this factory handles
    fn middleware_type(&self) -> &'static str;
}

/// An ordered chain of tool middleware in front of a host dispatcher.
#[derive(Clone, Default)]
pub struct MiddlewarePipeline {
    middleware: Vec<Arc<dyn ToolMiddleware>>,
}

impl std::fmt::Debug for MiddlewarePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewarePipeline")
            .field("middleware", &format!("Vec<Arc<dyn ToolMiddleware>> [len={}]", self.middleware.len()))
            .finish()
    }
}

impl MiddlewarePipeline {
    pub fn new(middleware: Vec<Arc<dyn ToolMiddleware>>) -> Self {
        Self { middleware }
    }

    /// Builds the pipeline described by `config` using the built-in factories.
    pub fn from_config(config: &MiddlewareConfig) -> Result<Self> {
        Self::from_config_with_registry(config, &MiddlewareRegistry::new())
    }

    /// Builds the pipeline described by `config` using `registry` for lookups.
    pub fn from_config_with_registry(config: &MiddlewareConfig, registry: &MiddlewareRegistry) -> Result<Self> {
        let middleware = Self::create_middleware(&config.middleware, registry)?;
        Ok(Self { middleware })
    }

    /// Appends a middleware; it runs after the ones already present.
    pub fn push(&mut self, middleware: Arc<dyn ToolMiddleware>) {
        self.middleware.push(middleware);
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Runs a tool call through every middleware and then the dispatcher.
    pub async fn call_tool(&self, ctx: CallContext, dispatcher: &dyn ToolDispatcher) -> CallOutcome {
        Next::new(&self.middleware, dispatcher).run(ctx).await
    }

    fn create_middleware(specs: &[MiddlewareSpec], registry: &MiddlewareRegistry) -> Result<Vec<Arc<dyn ToolMiddleware>>> {
        let mut middleware = Vec::new();

        for spec in specs {
            if !spec.enabled {
                continue;
            }

            let factory = registry.get_factory(&spec.middleware_type).ok_or_else(|| {
                MiddlewareError::config(format!("Unknown middleware type: {}", spec.middleware_type))
            })?;

            middleware.push(factory.create(&spec.config)?);
        }

        Ok(middleware)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::config::MiddlewareSpec;
    use crate::model::Invocation;
    use serde_json::json;
    use std::sync::Mutex;

    /// Appends its label to a shared log before and after the rest of the chain.
    struct Tracer {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ToolMiddleware for Tracer {
        async fn on_call_tool(&self, ctx: CallContext, next: Next<'_>) -> CallOutcome {
            self.log.lock().unwrap().push(format!("before {}", self.label));
            let outcome = next.run(ctx).await;
            self.log.lock().unwrap().push(format!("after {}", self.label));
            outcome
        }
    }

    /// Answers without calling the rest of the chain.
    struct ShortCircuit;

    #[async_trait]
    impl ToolMiddleware for ShortCircuit {
        async fn on_call_tool(&self, _ctx: CallContext, _next: Next<'_>) -> CallOutcome {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_pipeline_runs_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = MiddlewarePipeline::new(vec![
            Arc::new(Tracer { label: "outer", log: log.clone() }),
            Arc::new(Tracer { label: "inner", log: log.clone() }),
        ]);
        let dispatcher = RecordingDispatcher::default();

        let outcome = pipeline
            .call_tool(CallContext::new(Invocation::new("execute_query", None)), &dispatcher)
            .await;

        assert!(outcome.unwrap().is_some());
        assert_eq!(
            *log.lock().unwrap(),
            vec!["before outer", "before inner", "after inner", "after outer"]
        );
        assert_eq!(dispatcher.last().unwrap().name, "execute_query");
    }

    #[tokio::test]
    async fn test_empty_pipeline_dispatches_directly() {
        let pipeline = MiddlewarePipeline::default();
        assert!(pipeline.is_empty());
        let dispatcher = RecordingDispatcher::default();

        let outcome = pipeline
            .call_tool(CallContext::new(Invocation::new("health_check", None)), &dispatcher)
            .await;

        assert!(outcome.unwrap().is_some());
        assert_eq!(dispatcher.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_middleware_can_short_circuit() {
        let mut pipeline = MiddlewarePipeline::default();
        pipeline.push(Arc::new(ShortCircuit));
        let dispatcher = RecordingDispatcher::default();

        let outcome = pipeline
            .call_tool(CallContext::new(Invocation::new("execute_query", None)), &dispatcher)
            .await;

        assert!(outcome.unwrap().is_none());
        assert!(dispatcher.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_default_config_builds_both_middleware() {
        let pipeline = MiddlewarePipeline::from_config(&MiddlewareConfig::default()).unwrap();
        assert_eq!(pipeline.len(), 2);
    }

    #[test]
    fn test_disabled_middleware_not_created() {
        let config = MiddlewareConfig {
            middleware: vec![
                MiddlewareSpec {
                    middleware_type: "strip_unknown_arguments".to_string(),
                    enabled: true,
                    config: serde_json::Value::Null,
                },
                MiddlewareSpec {
                    middleware_type: "response_metadata".to_string(),
                    enabled: false,
                    config: serde_json::Value::Null,
                },
            ],
        };

        let pipeline = MiddlewarePipeline::from_config(&config).unwrap();
        assert_eq!(pipeline.len(), 1);
    }

    #[test]
    fn test_unknown_middleware_type_error() {
        let config = MiddlewareConfig {
            middleware: vec![MiddlewareSpec {
                middleware_type: "nonexistent_middleware".to_string(),
                enabled: true,
                config: serde_json::Value::Null,
            }],
        };

        let error = MiddlewarePipeline::from_config(&config).unwrap_err();
        assert!(error.to_string().contains("Unknown middleware type: nonexistent_middleware"));
    }

    #[tokio::test]
    async fn test_configured_pipeline_filters_and_annotates() {
        let config: MiddlewareConfig = serde_json::from_value(json!({
            "middleware": [
                {"type": "strip_unknown_arguments"},
                {"type": "response_metadata", "config": {"package": {"name": "prometheus-mcp-server", "version": "1.2.0"}}}
            ]
        }))
        .unwrap();
        let pipeline = MiddlewarePipeline::from_config(&config).unwrap();
        let registry = Arc::new(CountingRegistry::new(
            "execute_query",
            json!({"properties": {"query": {}, "time": {}}}),
        ));
        let dispatcher = RecordingDispatcher::default();

        let ctx = CallContext::new(Invocation::new(
            "execute_query",
            args(json!({"query": "up", "time": "now", "step": "15s"})),
        ))
        .with_registry(registry);

        let response = pipeline.call_tool(ctx, &dispatcher).await.unwrap().unwrap();

        let seen = dispatcher.last().unwrap();
        assert_eq!(seen.arguments, args(json!({"query": "up", "time": "now"})));

        let meta = response.meta.unwrap();
        assert_eq!(meta["_package_metadata"]["name"], "prometheus-mcp-server");
        assert_eq!(meta["_package_metadata"]["version"], "1.2.0");
        assert!(meta["_timing_metadata"]["tool_response_time_ms"].as_f64().unwrap() >= 0.0);
    }

    #[tokio::test]
    async fn test_concurrent_calls_do_not_interfere() {
        let pipeline = MiddlewarePipeline::from_config(&MiddlewareConfig::default()).unwrap();
        let registry: Arc<CountingRegistry> = Arc::new(CountingRegistry::new(
            "execute_query",
            json!({"properties": {"query": {}}}),
        ));
        let dispatcher = RecordingDispatcher::default();

        let calls = (0..8).map(|i| {
            let ctx = CallContext::new(Invocation::new(
                "execute_query",
                args(json!({"query": format!("q{}", i), "extra": i})),
            ))
            .with_registry(registry.clone());
            pipeline.call_tool(ctx, &dispatcher)
        });

        let outcomes = futures::future::join_all(calls).await;
        assert!(outcomes.iter().all(|outcome| matches!(outcome, Ok(Some(_)))));

        let seen = dispatcher.seen.lock().unwrap();
        assert_eq!(seen.len(), 8);
        assert!(seen.iter().all(|invocation| {
            let arguments = invocation.arguments.as_ref().unwrap();
            arguments.len() == 1 && arguments.contains_key("query")
        }));
        assert_eq!(registry.lookups(), 8);
    }
}
