//! Lint run summary
//!
//! Counts collected over a whole run, shared by every output format.

use super::{Diagnostic, Severity};
use serde::{Deserialize, Serialize};

/// Totals for a lint run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintSummary {
    /// Number of manifest files loaded
    pub files: usize,
    /// Number of dependency entries
    pub entries: usize,
    /// Entries whose marker is true in the evaluated environment
    pub active_entries: usize,
    /// Entries with an exact `==` or `===` pin
    pub pinned_entries: usize,
    /// Number of editable installs
    pub editables: usize,
    /// Error-level findings
    pub errors: usize,
    /// Warning-level findings
    pub warnings: usize,
    /// Info-level findings
    pub infos: usize,
}

impl LintSummary {
    /// Creates an empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts diagnostics by severity
    pub fn count_diagnostics(&mut self, diagnostics: &[Diagnostic]) {
        self.errors = 0;
        self.warnings = 0;
        self.infos = 0;
        for diag in diagnostics {
            match diag.severity {
                Severity::Error => self.errors += 1,
                Severity::Warning => self.warnings += 1,
                Severity::Info => self.infos += 1,
            }
        }
    }

    /// Returns true if the run should fail
    pub fn is_failure(&self, deny_warnings: bool) -> bool {
        self.errors > 0 || (deny_warnings && self.warnings > 0)
    }

    /// Returns true if nothing at warning level or above was found
    pub fn is_clean(&self) -> bool {
        self.errors == 0 && self.warnings == 0
    }
}
