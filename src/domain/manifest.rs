//! Parsed manifest structures

use super::{EditableInstall, Include, Location, PipOption, RequirementEntry};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One logical line of a requirements manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ManifestLine {
    /// Empty or whitespace-only line
    Blank,
    /// Full-line comment, text without the leading `#`
    Comment { text: String },
    /// Dependency entry
    Requirement(RequirementEntry),
    /// `-e path[extras]`
    Editable(EditableInstall),
    /// `-r file` or `-c file`
    Include(Include),
    /// Any other option line
    Option(PipOption),
}

/// A parsed requirements manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    /// Path the manifest was read from
    pub path: PathBuf,
    /// True when loaded through `-c`: entries only constrain versions
    pub constraint: bool,
    /// Logical lines in file order
    pub lines: Vec<ManifestLine>,
}

impl Manifest {
    /// Creates an empty manifest
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            constraint: false,
            lines: Vec::new(),
        }
    }

    /// Returns true if the entry at `location` was declared in this manifest
    pub fn declares(&self, location: &Location) -> bool {
        self.path == location.path
    }

    /// Returns all dependency entries in file order
    pub fn entries(&self) -> impl Iterator<Item = &RequirementEntry> {
        self.lines.iter().filter_map(|line| match line {
            ManifestLine::Requirement(entry) => Some(entry),
            _ => None,
        })
    }

    /// Returns all editable installs
    pub fn editables(&self) -> impl Iterator<Item = &EditableInstall> {
        self.lines.iter().filter_map(|line| match line {
            ManifestLine::Editable(editable) => Some(editable),
            _ => None,
        })
    }

    /// Returns all includes
    pub fn includes(&self) -> impl Iterator<Item = &Include> {
        self.lines.iter().filter_map(|line| match line {
            ManifestLine::Include(include) => Some(include),
            _ => None,
        })
    }

    /// Returns all option lines
    pub fn options(&self) -> impl Iterator<Item = &PipOption> {
        self.lines.iter().filter_map(|line| match line {
            ManifestLine::Option(option) => Some(option),
            _ => None,
        })
    }

    /// Returns section names in order of first appearance
    pub fn sections(&self) -> Vec<String> {
        let mut sections: Vec<String> = Vec::new();
        let section_of = |line: &ManifestLine| match line {
            ManifestLine::Requirement(entry) => entry.section.clone(),
            ManifestLine::Editable(editable) => editable.section.clone(),
            _ => None,
        };
        for section in self.lines.iter().filter_map(section_of) {
            if !sections.contains(&section) {
                sections.push(section);
            }
        }
        sections
    }
}

/// A root manifest plus every manifest it includes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManifestSet {
    /// Manifests in load order; the root comes first
    pub manifests: Vec<Manifest>,
}

impl ManifestSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a manifest
    pub fn push(&mut self, manifest: Manifest) {
        self.manifests.push(manifest);
    }

    /// Returns all dependency entries across every manifest
    pub fn entries(&self) -> impl Iterator<Item = &RequirementEntry> {
        self.manifests.iter().flat_map(|m| m.entries())
    }

    /// Returns all editable installs across every manifest
    pub fn editables(&self) -> impl Iterator<Item = &EditableInstall> {
        self.manifests.iter().flat_map(|m| m.editables())
    }

    /// Returns true if `location` lies in a constraints manifest
    pub fn is_constraint(&self, location: &Location) -> bool {
        self.manifests
            .iter()
            .any(|m| m.constraint && m.declares(location))
    }

    /// Returns the paths of every loaded manifest
    pub fn paths(&self) -> Vec<&Path> {
        self.manifests.iter().map(|m| m.path.as_path()).collect()
    }
}
