//! Core domain models for reqlint
//!
//! This module contains the fundamental types used throughout the application:
//! - Manifest entries (dependencies, editable installs, includes, options)
//! - Parsed manifests and manifest sets
//! - Lint rules, severities and diagnostics
//! - Run summary

mod diagnostic;
mod entry;
mod manifest;
mod summary;

pub use diagnostic::{Diagnostic, Rule, Severity};
pub use entry::{
    normalize_name, EditableInstall, Include, IncludeKind, Location, PipOption, RequirementEntry,
};
pub use manifest::{Manifest, ManifestLine, ManifestSet};
pub use summary::LintSummary;
