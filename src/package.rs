//! Package identity reported in response metadata.
//!
//! The identity is resolved once when the process starts and is read-only
//! afterwards. Hosts install their own identity with [`install`], usually
//! through the [`package_metadata!`](crate::package_metadata) macro so the
//! values come from the host crate's Cargo manifest rather than this one.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::{MiddlewareError, Result};

static INSTALLED: OnceLock<PackageMetadata> = OnceLock::new();

/// Name and version of the package serving tool calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
}

impl PackageMetadata {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Identity of this middleware crate itself.
    pub fn this_crate() -> Self {
        Self::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }
}

/// Builds a [`PackageMetadata`] from the calling crate's Cargo manifest.
#[macro_export]
macro_rules! package_metadata {
    () => {
        $crate::package::PackageMetadata::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    };
}

/// Install the process-wide package identity. Fails if one is already set.
pub fn install(metadata: PackageMetadata) -> Result<()> {
    INSTALLED.set(metadata).map_err(|_| {
        let current = current();
        MiddlewareError::AlreadyInstalled {
            name: current.name.clone(),
            version: current.version.clone(),
        }
    })
}

/// The installed identity, or this crate's own when nothing was installed.
pub fn current() -> &'static PackageMetadata {
    INSTALLED.get_or_init(PackageMetadata::this_crate)
}
