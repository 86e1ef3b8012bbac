//! Manifest entry structures
//!
//! One requirements line becomes one of these: a dependency entry, an
//! editable install of a local project, an include of another manifest,
//! or a pip option.

use pep508_rs::Requirement;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;

static SEPARATOR_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_.]+").unwrap());

/// Normalizes a package name the way package indexes compare them
///
/// Lowercases and collapses runs of `-`, `_` and `.` into a single `-`,
/// so `Zope.Interface` and `zope_interface` are the same package.
pub fn normalize_name(name: &str) -> String {
    SEPARATOR_RUN_RE
        .replace_all(&name.to_ascii_lowercase(), "-")
        .into_owned()
}

/// Position of a line in a manifest file
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Manifest file the line belongs to
    pub path: PathBuf,
    /// 1-based number of the first physical line
    pub line: usize,
}

impl Location {
    /// Creates a new location
    pub fn new(path: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.line)
    }
}

/// A single dependency declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementEntry {
    /// Package name as written
    pub name: String,
    /// Normalized package name used for comparisons
    pub normalized_name: String,
    /// Requested extras, e.g. `sqlite` in `databases[sqlite]`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<String>,
    /// Raw version constraint, e.g. `==1.4` or `>=1.0,<2`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifier: Option<String>,
    /// Raw environment marker text after `;`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    /// Direct reference for `name @ url`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// `--hash` values attached to the line
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hashes: Vec<String>,
    /// Where the entry was declared
    pub location: Location,
    /// Section grouping the entry belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// The line as parsed by `pep508_rs`; `None` when it rejected the line
    #[serde(skip)]
    pub requirement: Option<Requirement>,
}

impl RequirementEntry {
    /// Creates a bare entry with only a name
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        let name = name.into();
        Self {
            normalized_name: normalize_name(&name),
            name,
            extras: Vec::new(),
            specifier: None,
            marker: None,
            url: None,
            hashes: Vec::new(),
            location,
            section: None,
            requirement: None,
        }
    }

    /// Sets the version constraint (builder pattern)
    pub fn with_specifier(mut self, specifier: impl Into<String>) -> Self {
        self.specifier = Some(specifier.into());
        self
    }

    /// Sets the environment marker (builder pattern)
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    /// Sets the extras (builder pattern)
    pub fn with_extras(mut self, extras: Vec<String>) -> Self {
        self.extras = extras;
        self
    }

    /// Sets the section (builder pattern)
    pub fn with_section(mut self, section: Option<String>) -> Self {
        self.section = section;
        self
    }
}

impl fmt::Display for RequirementEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        if let Some(url) = &self.url {
            write!(f, " @ {}", url)?;
        } else if let Some(spec) = &self.specifier {
            write!(f, "{}", spec)?;
        }
        if let Some(marker) = &self.marker {
            write!(f, "; {}", marker)?;
        }
        Ok(())
    }
}

/// Editable install of a local project, e.g. `-e .[full]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditableInstall {
    /// Path or VCS URL of the project
    pub path: String,
    /// Requested extras group(s)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<String>,
    /// Where the directive was declared
    pub location: Location,
    /// Section grouping the directive belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl fmt::Display for EditableInstall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-e {}", self.path)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        Ok(())
    }
}

/// Kind of manifest include
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncludeKind {
    /// `-r file`: the file's requirements are installed too
    Requirement,
    /// `-c file`: the file only constrains versions
    Constraint,
}

impl IncludeKind {
    /// Returns the short flag used in manifests
    pub fn flag(&self) -> &'static str {
        match self {
            IncludeKind::Requirement => "-r",
            IncludeKind::Constraint => "-c",
        }
    }
}

/// Include of another manifest file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Include {
    /// Whether this is a requirements or constraints include
    pub kind: IncludeKind,
    /// Target path as written, relative to the including file
    pub target: String,
    /// Where the directive was declared
    pub location: Location,
}

/// A global pip option line, e.g. `--index-url https://...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipOption {
    /// Option name including dashes
    pub name: String,
    /// Option value, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Whether pip understands this option in a requirements file
    pub known: bool,
    /// Where the option was declared
    pub location: Location,
}
