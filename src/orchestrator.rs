//! Lint orchestrator coordinating one run
//!
//! This module provides:
//! - Workflow coordination: load → parse → lint → (registry check) → report
//! - Concurrent registry queries with a request limit
//! - Rule filtering and stable ordering of findings

use crate::config::RunConfig;
use crate::domain::{Diagnostic, EditableInstall, LintSummary};
use crate::error::{AppError, ConfigError};
use crate::lint::{EntryStatus, Linter};
use crate::loader::ManifestLoader;
use crate::progress::Progress;
use crate::registry::{check_pins, HttpClient, PinCheck, PyPIAdapter, RegistryAdapter};
use pep440_rs::Version;
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Everything a run produced, shared by every output format
#[derive(Debug, Clone, Default, Serialize)]
pub struct LintReport {
    /// Manifest files in load order
    pub files: Vec<PathBuf>,
    pub summary: LintSummary,
    /// Sorted by file, line, then rule
    pub diagnostics: Vec<Diagnostic>,
    pub entries: Vec<EntryStatus>,
    /// Editable installs in load order
    pub editables: Vec<EditableInstall>,
}

/// Orchestrator for a lint run
pub struct Orchestrator {
    config: RunConfig,
    /// Present only when registry checks are enabled
    adapter: Option<Arc<dyn RegistryAdapter>>,
    show_progress: bool,
}

impl Orchestrator {
    /// Create an orchestrator; builds the PyPI client when registry checks are on
    pub fn new(config: RunConfig) -> Result<Self, AppError> {
        let adapter: Option<Arc<dyn RegistryAdapter>> = if config.check_registry {
            let client = HttpClient::new()?;
            let pypi = match &config.registry_url {
                Some(url) => PyPIAdapter::with_base_url(client, url),
                None => PyPIAdapter::new(client),
            };
            Some(Arc::new(pypi))
        } else {
            None
        };
        Ok(Self {
            config,
            adapter,
            show_progress: false,
        })
    }

    /// Create an orchestrator with a custom registry adapter (for testing)
    pub fn with_adapter(config: RunConfig, adapter: Arc<dyn RegistryAdapter>) -> Self {
        Self {
            config,
            adapter: Some(adapter),
            show_progress: false,
        }
    }

    /// Enable the progress display (builder pattern)
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Run the lint workflow
    ///
    /// Only an unreadable root manifest aborts; everything else is a finding.
    pub async fn run(&self) -> Result<LintReport, AppError> {
        let mut progress = Progress::new(self.show_progress);

        // Step 1: Load manifests and their includes
        progress.spinner("Loading manifests...");
        let loaded = ManifestLoader::new().load(&self.config.paths)?;
        progress.finish_and_clear();
        tracing::debug!(
            "loaded {} manifests: {}",
            loaded.set.manifests.len(),
            loaded
                .set
                .paths()
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        // Step 2: Lint
        let env = self
            .config
            .environment
            .to_marker_environment()
            .map_err(|e| ConfigError::invalid_environment("environment", "", e.to_string()))?;
        let linter = Linter::new(self.config.policy.clone());
        let outcome = linter.lint(&loaded.set, &env);

        let mut diagnostics = loaded.diagnostics;
        diagnostics.extend(outcome.diagnostics);

        // Step 3: Registry check
        if let Some(adapter) = &self.adapter {
            let pins = collect_pins(&outcome.entries);
            tracing::debug!("checking {} pins against {}", pins.len(), adapter.registry_name());
            let found =
                check_pins(Arc::clone(adapter), pins, self.config.concurrency, &mut progress).await;
            diagnostics.extend(found);
        }

        self.config.policy.retain(&mut diagnostics);
        diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        // Step 4: Summarize
        let mut summary = LintSummary::new();
        summary.files = loaded.set.manifests.len();
        summary.entries = outcome.entries.len();
        summary.active_entries = outcome.entries.iter().filter(|e| e.active).count();
        summary.pinned_entries = outcome.entries.iter().filter(|e| e.pinned.is_some()).count();
        summary.editables = loaded.set.editables().count();
        summary.count_diagnostics(&diagnostics);

        Ok(LintReport {
            files: loaded.set.paths().into_iter().map(PathBuf::from).collect(),
            summary,
            diagnostics,
            entries: outcome.entries,
            editables: loaded.set.editables().cloned().collect(),
        })
    }
}

/// Exact pins worth a registry lookup; direct URL references are skipped
fn collect_pins(entries: &[EntryStatus]) -> Vec<PinCheck> {
    entries
        .iter()
        .filter(|status| status.entry.url.is_none())
        .filter_map(|status| {
            let pinned = status.pinned.as_deref()?;
            let version = Version::from_str(pinned).ok()?;
            Some(PinCheck::new(
                &status.entry.name,
                version,
                status.entry.location.clone(),
            ))
        })
        .collect()
}
