//! Configuration management for the call middleware pipeline.

use crate::error::{MiddlewareError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the middleware pipeline
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MiddlewareConfig {
    /// Middleware in the order they wrap a tool call (first is outermost)
    #[serde(default = "default_middleware")]
    pub middleware: Vec<MiddlewareSpec>,
}

/// Specification for a single middleware instance
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MiddlewareSpec {
    /// Type/name of the middleware
    #[serde(rename = "type")]
    pub middleware_type: String,

    /// Whether this middleware is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Middleware-specific configuration
    #[serde(default)]
    pub config: serde_json::Value,
}

impl MiddlewareSpec {
    pub fn new(middleware_type: impl Into<String>) -> Self {
        Self {
            middleware_type: middleware_type.into(),
            enabled: true,
            config: serde_json::Value::Null,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_middleware() -> Vec<MiddlewareSpec> {
    vec![
        MiddlewareSpec::new("strip_unknown_arguments"),
        MiddlewareSpec::new("response_metadata"),
    ]
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            middleware: default_middleware(),
        }
    }
}

/// Load configuration from a JSON file
pub fn load_config(path: &str) -> Result<MiddlewareConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| MiddlewareError::config(format!("Failed to read config file '{}': {}", path, e)))?;
    let config: MiddlewareConfig = serde_json::from_str(&content)?;
    Ok(config)
}
