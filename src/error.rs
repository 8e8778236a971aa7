//! Error types for the call middleware.

use rmcp::Error as McpError;
use std::io;
use thiserror::Error;

/// Main error type for middleware construction and host lookups
#[derive(Debug, Error)]
pub enum MiddlewareError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The host registry has no tool with this name
    #[error("Tool '{0}' not found")]
    ToolNotFound(String),

    /// Any other failure reported by a host tool registry
    #[error("Tool registry error: {0}")]
    Registry(String),

    /// The process-wide package identity was installed twice
    #[error("Package metadata already installed as {name} {version}")]
    AlreadyInstalled { name: String, version: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type alias for Results using MiddlewareError
pub type Result<T> = std::result::Result<T, MiddlewareError>;

impl MiddlewareError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a tool not found error
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound(tool.into())
    }

    /// Create a registry error
    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry(message.into())
    }
}

/// Convert MiddlewareError to McpError for protocol compatibility
impl From<MiddlewareError> for McpError {
    fn from(error: MiddlewareError) -> Self {
        match error {
            MiddlewareError::ToolNotFound(tool) => {
                McpError::invalid_params(format!("Unknown tool: {}", tool), None)
            }
            _ => McpError::internal_error(error.to_string(), None),
        }
    }
}
