//! Lint engine
//!
//! This module provides:
//! - Per-line rules (names, versions, markers, extras, options, pinning)
//! - Cross-entry rules (duplicates within a marker scope, conflicting pins)
//! - The lint policy that enables rules and relaxes pinning

mod conflict;
mod policy;
mod rules;

pub use conflict::{find_conflicts, find_duplicates, Candidate};
pub use policy::LintPolicy;
pub use rules::{check_editable, check_entry, check_option, exact_pin, is_valid_name, EntryCheck};

use crate::domain::{Diagnostic, ManifestSet, RequirementEntry};
use crate::marker::{ExtraName, MarkerEnvironment};
use serde::Serialize;
use std::str::FromStr;

/// How an entry fared in the evaluated environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryStatus {
    pub entry: RequirementEntry,
    /// Marker is absent, invalid, or true
    pub active: bool,
    /// Exact pin, rendered as a version string
    pub pinned: Option<String>,
    /// Declared in a constraints file
    pub constraint: bool,
}

/// Result of linting a manifest set
#[derive(Debug, Clone, Default)]
pub struct LintOutcome {
    pub diagnostics: Vec<Diagnostic>,
    pub entries: Vec<EntryStatus>,
}

/// Runs every lint rule over a manifest set
#[derive(Debug, Clone, Default)]
pub struct Linter {
    policy: LintPolicy,
}

impl Linter {
    /// Create a linter with the given policy
    pub fn new(policy: LintPolicy) -> Self {
        Self { policy }
    }

    /// Lint all manifests in `set` against `env`
    pub fn lint(&self, set: &ManifestSet, env: &MarkerEnvironment) -> LintOutcome {
        let mut diagnostics = Vec::new();

        for manifest in &set.manifests {
            for option in manifest.options() {
                check_option(option, &mut diagnostics);
            }
        }
        for editable in set.editables() {
            check_editable(editable, &mut diagnostics);
        }

        let extras: Vec<ExtraName> = self
            .policy
            .extras
            .iter()
            .filter_map(|extra| ExtraName::from_str(extra).ok())
            .collect();
        let entries: Vec<&RequirementEntry> = set.entries().collect();
        let checks: Vec<EntryCheck> = entries
            .iter()
            .map(|entry| check_entry(entry, env, &extras, &self.policy, &mut diagnostics))
            .collect();

        let candidates: Vec<Candidate> = entries
            .iter()
            .zip(&checks)
            .map(|(&entry, check)| Candidate {
                entry,
                check,
                constraint: set.is_constraint(&entry.location),
            })
            .collect();

        diagnostics.extend(find_duplicates(&candidates));
        diagnostics.extend(find_conflicts(&candidates));
        self.policy.retain(&mut diagnostics);

        tracing::debug!(
            "linted {} entries across {} manifests: {} findings",
            entries.len(),
            set.manifests.len(),
            diagnostics.len()
        );

        let entries = candidates
            .iter()
            .map(|c| EntryStatus {
                entry: c.entry.clone(),
                active: c.check.active,
                pinned: c.check.pin.as_ref().map(|v| v.to_string()),
                constraint: c.constraint,
            })
            .collect();

        LintOutcome {
            diagnostics,
            entries,
        }
    }
}
