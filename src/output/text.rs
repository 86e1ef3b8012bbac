//! Text output formatter for human-readable display
//!
//! - One `path:line: severity[code rule] message` line per finding
//! - Entry and editable listing grouped by file and section (verbose)
//! - Summary line with counts per severity

use crate::domain::{Diagnostic, EditableInstall, LintSummary, Severity};
use crate::lint::EntryStatus;
use crate::orchestrator::LintReport;
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;
use std::path::Path;

/// Text formatter for human-readable output
pub struct TextFormatter {
    verbosity: Verbosity,
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn severity_label(&self, severity: Severity) -> String {
        if !self.color {
            return severity.label().to_string();
        }
        match severity {
            Severity::Error => severity.label().red().bold().to_string(),
            Severity::Warning => severity.label().yellow().bold().to_string(),
            Severity::Info => severity.label().cyan().to_string(),
        }
    }

    fn write_diagnostic(&self, diag: &Diagnostic, writer: &mut dyn Write) -> std::io::Result<()> {
        let location = diag.location.to_string();
        let tag = format!("[{} {}]", diag.rule.code(), diag.rule.name());
        if self.color {
            writeln!(
                writer,
                "{}: {}{} {}",
                location.bold(),
                self.severity_label(diag.severity),
                tag.dimmed(),
                diag.message
            )
        } else {
            writeln!(writer, "{}", diag)
        }
    }

    fn write_entries(&self, report: &LintReport, writer: &mut dyn Write) -> std::io::Result<()> {
        for file in &report.files {
            let mut rows: Vec<Row> = report
                .entries
                .iter()
                .filter(|s| s.entry.location.path == *file)
                .map(Row::entry)
                .chain(
                    report
                        .editables
                        .iter()
                        .filter(|e| e.location.path == *file)
                        .map(Row::editable),
                )
                .collect();
            rows.sort_by_key(|r| r.line);
            self.write_file_rows(file, &rows, writer)?;
        }
        Ok(())
    }

    fn write_file_rows(
        &self,
        file: &Path,
        rows: &[Row],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let header = file.display().to_string();
        if self.color {
            writeln!(writer, "{}", header.bold().underline())?;
        } else {
            writeln!(writer, "{}", header)?;
        }
        if rows.is_empty() {
            writeln!(writer, "  (no entries)")?;
            return Ok(());
        }

        let width = rows.iter().map(|r| r.text.len()).max().unwrap_or(0);

        let mut section: Option<&str> = None;
        for row in rows {
            if let Some(current) = row.section.filter(|s| Some(*s) != section) {
                section = Some(current);
                let name = format!("[{}]", current);
                if self.color {
                    writeln!(writer, "  {}", name.bright_white())?;
                } else {
                    writeln!(writer, "  {}", name)?;
                }
            }

            let notes = if row.notes.is_empty() {
                String::new()
            } else {
                format!(" ({})", row.notes.join(", "))
            };
            let line = format!("{:width$}  {:8}{}", row.text, row.state, notes, width = width);
            if self.color && row.state == "inactive" {
                writeln!(writer, "    {}", line.dimmed())?;
            } else {
                writeln!(writer, "    {}", line)?;
            }
        }
        Ok(())
    }

    fn summary_line(&self, summary: &LintSummary) -> String {
        let count = |n: usize, one: &str, many: &str| {
            format!("{} {}", n, if n == 1 { one } else { many })
        };
        let counts = format!(
            "{}, {}, {} info",
            count(summary.errors, "error", "errors"),
            count(summary.warnings, "warning", "warnings"),
            summary.infos
        );
        let counts = if !self.color {
            counts
        } else if summary.errors > 0 {
            counts.red().bold().to_string()
        } else if summary.warnings > 0 {
            counts.yellow().to_string()
        } else {
            counts.green().to_string()
        };
        format!(
            "Checked {}, {} ({} active, {} pinned): {}",
            count(summary.files, "file", "files"),
            count(summary.entries, "entry", "entries"),
            summary.active_entries,
            summary.pinned_entries,
            counts
        )
    }
}

/// One line of the verbose listing
struct Row<'a> {
    line: usize,
    section: Option<&'a str>,
    text: String,
    state: &'static str,
    notes: Vec<&'static str>,
}

impl<'a> Row<'a> {
    fn entry(status: &'a EntryStatus) -> Self {
        let mut notes = Vec::new();
        if status.pinned.is_none() {
            notes.push("unpinned");
        }
        if status.constraint {
            notes.push("constraint");
        }
        Self {
            line: status.entry.location.line,
            section: status.entry.section.as_deref(),
            text: status.entry.to_string(),
            state: if status.active { "active" } else { "inactive" },
            notes,
        }
    }

    fn editable(editable: &'a EditableInstall) -> Self {
        Self {
            line: editable.location.line,
            section: editable.section.as_deref(),
            text: editable.to_string(),
            state: "editable",
            notes: Vec::new(),
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &LintReport, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity == Verbosity::Verbose {
            self.write_entries(report, writer)?;
            writeln!(writer)?;
        }

        let shown: Vec<&Diagnostic> = report
            .diagnostics
            .iter()
            .filter(|d| self.verbosity != Verbosity::Quiet || d.is_error())
            .collect();
        for diag in &shown {
            self.write_diagnostic(diag, writer)?;
        }
        if !shown.is_empty() {
            writeln!(writer)?;
        }

        writeln!(writer, "{}", self.summary_line(&report.summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, RequirementEntry, Rule};
    use std::path::PathBuf;

    fn report() -> LintReport {
        let path = PathBuf::from("requirements.txt");
        let trio = RequirementEntry::new("trio", Location::new(&path, 9))
            .with_specifier("==0.22.0rc1")
            .with_marker("python_version >= '3.11'")
            .with_section(Some("Testing".to_string()));
        let twine = RequirementEntry::new("twine", Location::new(&path, 14))
            .with_section(Some("Packaging".to_string()));
        let editable = EditableInstall {
            path: ".".to_string(),
            extras: vec!["full".to_string()],
            location: Location::new(&path, 2),
            section: None,
        };

        let diagnostics = vec![
            Diagnostic::new(
                Rule::InactiveEntry,
                trio.location.clone(),
                "'trio' is skipped in this environment",
            ),
            Diagnostic::new(Rule::Unpinned, twine.location.clone(), "'twine' has no version pin"),
            Diagnostic::new(
                Rule::InvalidName,
                Location::new(&path, 15),
                "'_x' is not a valid package name",
            ),
        ];
        let mut summary = LintSummary {
            files: 1,
            entries: 2,
            active_entries: 1,
            pinned_entries: 1,
            ..LintSummary::default()
        };
        summary.count_diagnostics(&diagnostics);

        LintReport {
            files: vec![path],
            summary,
            diagnostics,
            entries: vec![
                EntryStatus {
                    entry: trio,
                    active: false,
                    pinned: Some("0.22.0rc1".to_string()),
                    constraint: false,
                },
                EntryStatus {
                    entry: twine,
                    active: true,
                    pinned: None,
                    constraint: false,
                },
            ],
            editables: vec![editable],
        }
    }

    fn render(verbosity: Verbosity) -> String {
        let mut out = Vec::new();
        TextFormatter::with_color(verbosity, false)
            .format(&report(), &mut out)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_normal_output() {
        let out = render(Verbosity::Normal);
        assert!(out.contains("requirements.txt:9: info[RL012 inactive-entry]"));
        assert!(out.contains("requirements.txt:14: warning[RL003 unpinned] 'twine' has no version pin"));
        assert!(out.contains("requirements.txt:15: error[RL001 invalid-name]"));
        assert!(out.contains(
            "Checked 1 file, 2 entries (1 active, 1 pinned): 1 error, 1 warning, 1 info"
        ));
    }

    #[test]
    fn test_quiet_output_shows_errors_only() {
        let out = render(Verbosity::Quiet);
        assert!(out.contains("RL001"));
        assert!(!out.contains("RL003"));
        assert!(!out.contains("RL012"));
        assert!(out.contains("Checked 1 file"));
    }

    #[test]
    fn test_verbose_lists_entries_by_section() {
        let out = render(Verbosity::Verbose);
        assert!(out.contains("  [Testing]"));
        assert!(out.contains("  [Packaging]"));
        let trio_line = out.lines().find(|l| l.contains("trio==0.22.0rc1")).unwrap();
        assert!(trio_line.contains("inactive"));
        let twine_line = out.lines().find(|l| l.trim_start().starts_with("twine")).unwrap();
        assert!(twine_line.contains("active"));
        assert!(twine_line.contains("(unpinned)"));
    }

    #[test]
    fn test_verbose_lists_editables_in_line_order() {
        let out = render(Verbosity::Verbose);
        let lines: Vec<&str> = out.lines().collect();
        let editable = lines.iter().position(|l| l.contains("-e .[full]")).unwrap();
        let trio = lines.iter().position(|l| l.contains("trio==")).unwrap();
        assert!(editable < trio);
        assert!(lines[editable].contains("editable"));
        assert!(!render(Verbosity::Normal).contains("-e .[full]"));
    }

    #[test]
    fn test_clean_summary() {
        let mut out = Vec::new();
        TextFormatter::with_color(Verbosity::Normal, false)
            .format(&LintReport::default(), &mut out)
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out,
            "Checked 0 files, 0 entries (0 active, 0 pinned): 0 errors, 0 warnings, 0 info\n"
        );
    }
}
