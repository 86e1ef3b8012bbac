//! Requirements manifest parser
//!
//! This module provides:
//! - Logical line assembly (continuations, comments)
//! - Requirement line parsing (name, extras, specifier, URL, marker, hashes)
//! - Option line parsing (editable installs, includes, pip options)
//! - Section derivation from comment headers
//!
//! Malformed lines never abort parsing; they become `parse-error` diagnostics.

mod lines;
mod option;
mod requirement;

pub use lines::{logical_lines, RawLine};
pub use option::{parse_option, OptionLine};
pub use requirement::parse_requirement;

use crate::domain::{Diagnostic, Location, Manifest, ManifestLine, Rule};
use crate::error::ManifestError;
use std::path::Path;

/// Parsed manifest plus any parse diagnostics
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub manifest: Manifest,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parser for pip requirements manifests
#[derive(Debug, Default, Clone, Copy)]
pub struct ManifestParser;

impl ManifestParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Read and parse a manifest file
    pub fn parse_file(&self, path: &Path) -> Result<ParseOutput, ManifestError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ManifestError::from_io(path, e))?;
        Ok(self.parse_content(&content, path))
    }

    /// Parse manifest content read from `path`
    pub fn parse_content(&self, content: &str, path: &Path) -> ParseOutput {
        let mut manifest = Manifest::new(path);
        let mut diagnostics = Vec::new();

        for raw in logical_lines(content) {
            match raw {
                RawLine::Blank { .. } => manifest.lines.push(ManifestLine::Blank),
                RawLine::Comment { text, .. } => {
                    manifest.lines.push(ManifestLine::Comment { text })
                }
                RawLine::Content { line, text } => {
                    let location = Location::new(path, line);
                    let parsed = if text.starts_with('-') {
                        parse_option(&text, location.clone()).map(|opt| match opt {
                            OptionLine::Editable(e) => ManifestLine::Editable(e),
                            OptionLine::Include(i) => ManifestLine::Include(i),
                            OptionLine::Option(o) => ManifestLine::Option(o),
                        })
                    } else {
                        parse_requirement(&text, location.clone()).map(ManifestLine::Requirement)
                    };

                    match parsed {
                        Ok(parsed_line) => manifest.lines.push(parsed_line),
                        Err(message) => {
                            tracing::debug!("skipping unparseable line {}: {}", location, message);
                            diagnostics.push(Diagnostic::new(Rule::ParseError, location, message));
                        }
                    }
                }
            }
        }

        assign_sections(&mut manifest.lines);
        ParseOutput {
            manifest,
            diagnostics,
        }
    }
}

/// Assigns each entry to the section opened by the nearest header above it
///
/// A header is a comment that starts a block (first line, or after a blank
/// line) and is directly followed by a non-comment, non-blank line.
fn assign_sections(lines: &mut [ManifestLine]) {
    let mut current: Option<String> = None;

    for i in 0..lines.len() {
        let starts_block = i == 0 || matches!(lines[i - 1], ManifestLine::Blank);
        let followed_by_content = matches!(
            lines.get(i + 1),
            Some(line) if !matches!(line, ManifestLine::Blank | ManifestLine::Comment { .. })
        );

        match &mut lines[i] {
            ManifestLine::Comment { text } if starts_block && followed_by_content => {
                current = Some(text.clone()).filter(|t| !t.is_empty());
            }
            ManifestLine::Requirement(entry) => entry.section = current.clone(),
            ManifestLine::Editable(editable) => editable.section = current.clone(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARLETTE_STYLE: &str = "\
# Optionals
-e .[full]

# Testing
autoflake==1.5.3
black==22.10.0
coverage==6.5.0
databases[sqlite]==0.6.2
trio==0.22.0rc1; python_version >= '3.11'

# Documentation
mkdocs==1.4.2

# Packaging
build==0.9.0
twine==4.0.1
";

    fn parse(content: &str) -> ParseOutput {
        ManifestParser::new().parse_content(content, Path::new("requirements.txt"))
    }

    #[test]
    fn test_parse_grouped_manifest() {
        let output = parse(STARLETTE_STYLE);
        assert!(output.diagnostics.is_empty());

        let manifest = output.manifest;
        assert_eq!(manifest.entries().count(), 8);
        assert_eq!(manifest.editables().count(), 1);
        assert_eq!(
            manifest.sections(),
            vec!["Optionals", "Testing", "Documentation", "Packaging"]
        );
    }

    #[test]
    fn test_entries_carry_sections_and_lines() {
        let output = parse(STARLETTE_STYLE);
        let trio = output
            .manifest
            .entries()
            .find(|e| e.name == "trio")
            .unwrap();
        assert_eq!(trio.section.as_deref(), Some("Testing"));
        assert_eq!(trio.location.line, 9);
        assert_eq!(trio.marker.as_deref(), Some("python_version >= '3.11'"));

        let editable = output.manifest.editables().next().unwrap();
        assert_eq!(editable.section.as_deref(), Some("Optionals"));
        assert_eq!(editable.extras, vec!["full"]);
    }

    #[test]
    fn test_header_comment_needs_following_content() {
        let output = parse("# just a note\n\n# Testing\npytest==7.2.0\n");
        let entry = output.manifest.entries().next().unwrap();
        assert_eq!(entry.section.as_deref(), Some("Testing"));
    }

    #[test]
    fn test_no_sections() {
        let output = parse("pytest==7.2.0\nmypy==0.991\n");
        assert!(output.manifest.sections().is_empty());
    }

    #[test]
    fn test_parse_errors_are_diagnostics() {
        let output = parse("pytest==7.2.0\npytest 7.2.0\nmypy==0.991\n");
        assert_eq!(output.manifest.entries().count(), 2);
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].rule, Rule::ParseError);
        assert_eq!(output.diagnostics[0].location.line, 2);
    }

    #[test]
    fn test_parse_file_not_found() {
        let err = ManifestParser::new()
            .parse_file(Path::new("/nonexistent/requirements.txt"))
            .unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
    }
}
