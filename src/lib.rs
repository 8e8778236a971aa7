//! Tool-call middleware for MCP servers.
//!
//! Two middleware wrap each tool call a host server dispatches:
//!
//! - [`StripUnknownArgumentsMiddleware`] drops arguments the target tool
//!   does not declare in its input schema. It never blocks a call: lookup
//!   failures are logged and the call keeps its original arguments.
//! - [`ResponseMetadataMiddleware`] times the call and adds the package
//!   identity and the elapsed milliseconds to the response `_meta` map.
//!   Failures propagate untouched.
//!
//! Hosts plug in through [`ToolRegistry`] and [`ToolDispatcher`] and run
//! calls through a [`MiddlewarePipeline`], usually built from a
//! [`MiddlewareConfig`].

pub mod config;
pub mod error;
pub mod host;
pub mod middleware;
pub mod model;
pub mod package;
pub mod telemetry;

pub use config::{load_config, MiddlewareConfig, MiddlewareSpec};
pub use error::{MiddlewareError, Result};
pub use host::{CallContext, ToolCatalog, ToolDispatcher, ToolRegistry};
pub use middleware::registry::MiddlewareRegistry;
pub use middleware::response_metadata::ResponseMetadataMiddleware;
pub use middleware::strip_unknown_arguments::{FilterOutcome, StripUnknownArgumentsMiddleware};
pub use middleware::{CallOutcome, MiddlewarePipeline, Next, ToolMiddleware, ToolMiddlewareFactory};
pub use model::{Invocation, ToolDescriptor, ToolResponse};
pub use package::PackageMetadata;
