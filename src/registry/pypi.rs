//! PyPI JSON API adapter
//!
//! Fetches the release list of a project from PyPI.
//! API endpoint: https://pypi.org/pypi/{project}/json

use crate::domain::normalize_name;
use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryAdapter, ReleaseInfo};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

/// PyPI API base URL
const PYPI_API_URL: &str = "https://pypi.org/pypi";

/// PyPI adapter
pub struct PyPIAdapter {
    client: HttpClient,
    base_url: String,
}

/// PyPI project metadata response
#[derive(Debug, Deserialize)]
struct PyPIResponse {
    /// Files keyed by release version
    #[serde(default)]
    releases: HashMap<String, Vec<ReleaseFile>>,
}

/// One distribution file of a release
#[derive(Debug, Deserialize)]
struct ReleaseFile {
    #[serde(default)]
    yanked: bool,
    #[serde(default)]
    yanked_reason: Option<String>,
}

impl PyPIAdapter {
    /// Create a new PyPI adapter
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, PYPI_API_URL)
    }

    /// Create an adapter against a PyPI-compatible mirror
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build the URL for a project
    fn build_url(&self, package: &str) -> String {
        format!("{}/{}/json", self.base_url, normalize_name(package))
    }
}

/// Collapses per-file data into one entry per release
///
/// A release counts as yanked when it has files and all of them are yanked.
fn releases_from(response: PyPIResponse) -> Vec<ReleaseInfo> {
    let mut releases: Vec<ReleaseInfo> = response
        .releases
        .into_iter()
        .map(|(version, files)| {
            let yanked = !files.is_empty() && files.iter().all(|f| f.yanked);
            let yanked_reason = files
                .into_iter()
                .find_map(|f| f.yanked_reason.filter(|r| !r.trim().is_empty()));
            ReleaseInfo {
                version,
                yanked,
                yanked_reason: if yanked { yanked_reason } else { None },
            }
        })
        .collect();
    releases.sort_by(|a, b| a.version.cmp(&b.version));
    releases
}

#[async_trait]
impl RegistryAdapter for PyPIAdapter {
    fn registry_name(&self) -> &'static str {
        "PyPI"
    }

    async fn fetch_releases(&self, package: &str) -> Result<Vec<ReleaseInfo>, RegistryError> {
        let url = self.build_url(package);
        tracing::debug!("fetching {}", url);
        let response: PyPIResponse = self
            .client
            .get_json(&url, package, self.registry_name())
            .await?;
        Ok(releases_from(response))
    }
}
