//! Registry lookups for pinned releases
//!
//! This module provides:
//! - HTTP client with retry logic
//! - PyPI JSON API adapter
//! - Concurrent pin checks (unknown and yanked releases)

mod check;
mod client;
mod pypi;

pub use check::{check_pins, PinCheck};
pub use client::HttpClient;
pub use pypi::PyPIAdapter;

use crate::error::RegistryError;
use async_trait::async_trait;

/// One published release of a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    /// Version string as published
    pub version: String,
    /// Every file of the release is yanked
    pub yanked: bool,
    pub yanked_reason: Option<String>,
}

impl ReleaseInfo {
    /// A release that has not been yanked
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            yanked: false,
            yanked_reason: None,
        }
    }

    /// Mark the release as yanked (builder pattern)
    pub fn yanked(mut self, reason: Option<&str>) -> Self {
        self.yanked = true;
        self.yanked_reason = reason.map(str::to_string);
        self
    }
}

/// Trait for registry adapters
#[async_trait]
pub trait RegistryAdapter: Send + Sync {
    /// Get the registry name
    fn registry_name(&self) -> &'static str;

    /// Fetch every release of a project
    async fn fetch_releases(&self, package: &str) -> Result<Vec<ReleaseInfo>, RegistryError>;
}
