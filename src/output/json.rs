//! JSON output formatter for machine processing
//!
//! Shape: `{ files, summary, diagnostics, entries, editables }`. Entries are always
//! included; verbosity does not change the document.

use crate::domain::{Diagnostic, EditableInstall, LintSummary};
use crate::lint::EntryStatus;
use crate::orchestrator::LintReport;
use crate::output::{OutputFormatter, Verbosity};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    files: Vec<String>,
    summary: &'a LintSummary,
    diagnostics: Vec<JsonDiagnostic<'a>>,
    entries: Vec<JsonEntry<'a>>,
    editables: &'a [EditableInstall],
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    /// Stable code, e.g. `RL003`
    code: &'static str,
    /// Rule name, e.g. `unpinned`
    rule: &'static str,
    severity: &'static str,
    path: String,
    line: usize,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    package: Option<&'a str>,
}

impl<'a> From<&'a Diagnostic> for JsonDiagnostic<'a> {
    fn from(diag: &'a Diagnostic) -> Self {
        Self {
            code: diag.rule.code(),
            rule: diag.rule.name(),
            severity: diag.severity.label(),
            path: diag.location.path.display().to_string(),
            line: diag.location.line,
            message: &diag.message,
            package: diag.package.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    name: &'a str,
    normalized_name: &'a str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    extras: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    specifier: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    marker: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    path: String,
    line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    section: Option<&'a str>,
    active: bool,
    pinned: Option<&'a str>,
    constraint: bool,
}

impl<'a> From<&'a EntryStatus> for JsonEntry<'a> {
    fn from(status: &'a EntryStatus) -> Self {
        let entry = &status.entry;
        Self {
            name: &entry.name,
            normalized_name: &entry.normalized_name,
            extras: &entry.extras,
            specifier: entry.specifier.as_deref(),
            marker: entry.marker.as_deref(),
            url: entry.url.as_deref(),
            path: entry.location.path.display().to_string(),
            line: entry.location.line,
            section: entry.section.as_deref(),
            active: status.active,
            pinned: status.pinned.as_deref(),
            constraint: status.constraint,
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &LintReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            files: report.files.iter().map(|p| p.display().to_string()).collect(),
            summary: &report.summary,
            diagnostics: report.diagnostics.iter().map(JsonDiagnostic::from).collect(),
            entries: report.entries.iter().map(JsonEntry::from).collect(),
            editables: &report.editables,
        };

        if self.verbosity == Verbosity::Quiet {
            serde_json::to_writer(&mut *writer, &output)?;
        } else {
            serde_json::to_writer_pretty(&mut *writer, &output)?;
        }
        writeln!(writer)
    }
}
