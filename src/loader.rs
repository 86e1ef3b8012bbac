//! Manifest loading with include resolution
//!
//! Features:
//! - Detects `requirements*.txt` files when given a directory
//! - Follows `-r` and `-c` includes relative to the including file
//! - Reports missing, unreadable and cyclic includes as diagnostics

use crate::domain::{Diagnostic, Include, IncludeKind, ManifestSet, Rule};
use crate::error::{AppError, IoError, ManifestError};
use crate::parser::ManifestParser;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static MANIFEST_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^requirements([-_.][A-Za-z0-9_.-]+)?\.txt$").unwrap());

/// Loaded manifests plus parse and include diagnostics
#[derive(Debug, Clone, Default)]
pub struct LoadOutput {
    pub set: ManifestSet,
    pub diagnostics: Vec<Diagnostic>,
}

/// Detect requirements manifests in a directory
///
/// Matches `requirements.txt` and variants such as `requirements-dev.txt`
/// or `requirements.docs.txt`. `requirements.txt` comes first, the rest
/// are sorted by name.
pub fn detect_manifests(dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    let entries = std::fs::read_dir(dir).map_err(|e| map_io(dir, e))?;

    let mut found: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| map_io(dir, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if MANIFEST_NAME_RE.is_match(name) && entry.path().is_file() {
            found.push(entry.path());
        }
    }

    found.sort_by_key(|p| {
        let is_primary = p.file_name().is_some_and(|n| n == "requirements.txt");
        (!is_primary, p.clone())
    });
    Ok(found)
}

fn map_io(path: &Path, err: std::io::Error) -> IoError {
    if err.kind() == std::io::ErrorKind::PermissionDenied {
        IoError::permission_denied(path)
    } else {
        IoError::generic(path, err)
    }
}

/// Loads root manifests and everything they include
#[derive(Debug, Default, Clone)]
pub struct ManifestLoader {
    parser: ManifestParser,
}

impl ManifestLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every root path
    ///
    /// A root that is a directory expands to the manifests detected in it.
    /// Unreadable roots are fatal; problems with included files are not.
    pub fn load(&self, roots: &[PathBuf]) -> Result<LoadOutput, AppError> {
        let mut state = LoadState::default();

        for root in roots {
            if root.is_dir() {
                let detected = detect_manifests(root)?;
                if detected.is_empty() {
                    return Err(ManifestError::not_found(root.join("requirements.txt")).into());
                }
                for path in detected {
                    self.load_root(&path, &mut state)?;
                }
            } else {
                self.load_root(root, &mut state)?;
            }
        }

        Ok(LoadOutput {
            set: state.set,
            diagnostics: state.diagnostics,
        })
    }

    fn load_root(&self, path: &Path, state: &mut LoadState) -> Result<(), AppError> {
        let key = identity(path);
        if state.loaded.contains_key(&key) {
            tracing::debug!("{} already loaded through an include", path.display());
            self.promote(&key, state);
            return Ok(());
        }

        let output = self.parser.parse_file(path).map_err(|e| match e {
            ManifestError::ReadError { path, source }
                if source.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                AppError::from(IoError::permission_denied(path))
            }
            other => AppError::from(other),
        })?;

        self.add(path, false, output, state);
        Ok(())
    }

    fn add(
        &self,
        path: &Path,
        constraint: bool,
        output: crate::parser::ParseOutput,
        state: &mut LoadState,
    ) {
        let key = identity(path);
        tracing::debug!("loaded {} (constraint: {})", path.display(), constraint);

        let mut manifest = output.manifest;
        manifest.constraint = constraint;
        let includes: Vec<Include> = manifest.includes().cloned().collect();

        state.loaded.insert(key.clone(), state.set.manifests.len());
        state.stack.push(key);
        state.diagnostics.extend(output.diagnostics);
        state.set.push(manifest);

        for include in includes {
            self.follow(path, constraint, &include, state);
        }

        state.stack.pop();
    }

    fn follow(&self, from: &Path, constraint: bool, include: &Include, state: &mut LoadState) {
        if include.target.contains("://") {
            tracing::debug!("not following remote include {}", include.target);
            return;
        }

        let target = include_path(from, &include.target);
        let key = identity(&target);
        let constraint = constraint || include.kind == IncludeKind::Constraint;

        if state.stack.contains(&key) {
            state.diagnostics.push(Diagnostic::new(
                Rule::IncludeError,
                include.location.clone(),
                format!(
                    "'{} {}' creates an include cycle",
                    include.kind.flag(),
                    include.target
                ),
            ));
            return;
        }
        if state.loaded.contains_key(&key) {
            if !constraint {
                self.promote(&key, state);
            }
            return;
        }

        match self.parser.parse_file(&target) {
            Ok(output) => self.add(&target, constraint, output, state),
            Err(e) => {
                tracing::debug!("include {} failed: {}", target.display(), e);
                let message = match e {
                    ManifestError::NotFound { .. } => format!(
                        "included file '{}' does not exist",
                        target.display()
                    ),
                    ManifestError::ReadError { source, .. } => format!(
                        "included file '{}' could not be read: {}",
                        target.display(),
                        source
                    ),
                };
                state.diagnostics.push(Diagnostic::new(
                    Rule::IncludeError,
                    include.location.clone(),
                    message,
                ));
            }
        }
    }
}

impl ManifestLoader {
    /// Clears the constraint flag of a loaded file that is also reached as a
    /// requirements file, along with the files it pulls in through `-r`
    fn promote(&self, key: &Path, state: &mut LoadState) {
        let Some(&index) = state.loaded.get(key) else {
            return;
        };
        let manifest = &mut state.set.manifests[index];
        if !manifest.constraint {
            return;
        }
        tracing::debug!("{} is also a requirements file", manifest.path.display());
        manifest.constraint = false;

        let nested: Vec<PathBuf> = manifest
            .includes()
            .filter(|i| i.kind == IncludeKind::Requirement && !i.target.contains("://"))
            .map(|i| identity(&include_path(&manifest.path, &i.target)))
            .collect();
        for key in nested {
            self.promote(&key, state);
        }
    }
}

#[derive(Debug, Default)]
struct LoadState {
    set: ManifestSet,
    diagnostics: Vec<Diagnostic>,
    /// Identity of every loaded file, with its index in the set
    loaded: HashMap<PathBuf, usize>,
    /// Identities on the current include chain
    stack: Vec<PathBuf>,
}

/// Resolves an include target against the including file's directory
fn include_path(from: &Path, target: &str) -> PathBuf {
    from.parent().unwrap_or_else(|| Path::new("")).join(target)
}

/// Stable identity for a manifest path
fn identity(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn rules(output: &LoadOutput) -> Vec<Rule> {
        output.diagnostics.iter().map(|d| d.rule).collect()
    }

    #[test]
    fn test_load_single_file() {
        let dir = TempDir::new().unwrap();
        let root = write(dir.path(), "requirements.txt", "pytest==7.2.0\n");

        let output = ManifestLoader::new().load(&[root]).unwrap();
        assert_eq!(output.set.manifests.len(), 1);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_follows_includes_relative_to_including_file() {
        let dir = TempDir::new().unwrap();
        let root = write(dir.path(), "requirements.txt", "-r reqs/dev.txt\n-c constraints.txt\n");
        write(dir.path(), "reqs/dev.txt", "-r base.txt\nmypy==0.991\n");
        write(dir.path(), "reqs/base.txt", "httpx==0.23.3\n");
        write(dir.path(), "constraints.txt", "httpx<0.24\n");

        let output = ManifestLoader::new().load(&[root]).unwrap();
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);

        let names: Vec<String> = output
            .set
            .manifests
            .iter()
            .map(|m| m.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["requirements.txt", "dev.txt", "base.txt", "constraints.txt"]);

        let constraint: Vec<bool> = output.set.manifests.iter().map(|m| m.constraint).collect();
        assert_eq!(constraint, vec![false, false, false, true]);
    }

    #[test]
    fn test_missing_include_is_diagnostic() {
        let dir = TempDir::new().unwrap();
        let root = write(dir.path(), "requirements.txt", "pytest==7.2.0\n-r missing.txt\n");

        let output = ManifestLoader::new().load(&[root]).unwrap();
        assert_eq!(rules(&output), vec![Rule::IncludeError]);
        assert_eq!(output.diagnostics[0].location.line, 2);
        assert!(output.diagnostics[0].message.contains("does not exist"));
    }

    #[test]
    fn test_include_cycle_is_diagnostic() {
        let dir = TempDir::new().unwrap();
        let root = write(dir.path(), "requirements.txt", "-r dev.txt\n");
        write(dir.path(), "dev.txt", "-r requirements.txt\nmypy==0.991\n");

        let output = ManifestLoader::new().load(&[root]).unwrap();
        assert_eq!(output.set.manifests.len(), 2);
        assert_eq!(rules(&output), vec![Rule::IncludeError]);
        assert!(output.diagnostics[0].message.contains("cycle"));
    }

    #[test]
    fn test_shared_include_loaded_once() {
        let dir = TempDir::new().unwrap();
        let root = write(dir.path(), "requirements.txt", "-r a.txt\n-r b.txt\n");
        write(dir.path(), "a.txt", "-r common.txt\n");
        write(dir.path(), "b.txt", "-r common.txt\n");
        write(dir.path(), "common.txt", "pytest==7.2.0\n");

        let output = ManifestLoader::new().load(&[root]).unwrap();
        assert_eq!(output.set.manifests.len(), 4);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_constraint_file_also_given_as_root() {
        let dir = TempDir::new().unwrap();
        let dev = write(dir.path(), "requirements-dev.txt", "-c requirements.txt
mypy==0.991
");
        let base = write(dir.path(), "requirements.txt", "-r common.txt
black==22.10.0
");
        write(dir.path(), "common.txt", "click==8.1.3
");

        let output = ManifestLoader::new().load(&[dev, base]).unwrap();
        assert_eq!(output.set.manifests.len(), 3);
        let constraint: Vec<bool> = output.set.manifests.iter().map(|m| m.constraint).collect();
        assert_eq!(constraint, vec![false, false, false]);
    }

    #[test]
    fn test_constraint_file_later_required() {
        let dir = TempDir::new().unwrap();
        let root = write(
            dir.path(),
            "requirements.txt",
            "-c pins.txt
-r extra.txt
-r pins.txt
",
        );
        write(dir.path(), "pins.txt", "-c upper.txt
httpx==0.23.3
");
        write(dir.path(), "upper.txt", "httpx<0.24
");
        write(dir.path(), "extra.txt", "rich==12.6.0
");

        let output = ManifestLoader::new().load(&[root]).unwrap();
        let flags: Vec<(String, bool)> = output
            .set
            .manifests
            .iter()
            .map(|m| {
                (
                    m.path.file_name().unwrap().to_string_lossy().into_owned(),
                    m.constraint,
                )
            })
            .collect();
        assert_eq!(
            flags,
            vec![
                ("requirements.txt".to_string(), false),
                ("pins.txt".to_string(), false),
                ("upper.txt".to_string(), true),
                ("extra.txt".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = ManifestLoader::new()
            .load(&[dir.path().join("requirements.txt")])
            .unwrap_err();
        assert!(matches!(err, AppError::Manifest(ManifestError::NotFound { .. })));
    }

    #[test]
    fn test_directory_root_detects_manifests() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "requirements-dev.txt", "mypy==0.991\n");
        write(dir.path(), "requirements.txt", "pytest==7.2.0\n");
        write(dir.path(), "notes.txt", "not a manifest\n");

        let detected = detect_manifests(dir.path()).unwrap();
        let names: Vec<_> = detected
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["requirements.txt", "requirements-dev.txt"]);

        let output = ManifestLoader::new().load(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(output.set.manifests.len(), 2);
    }

    #[test]
    fn test_empty_directory_is_fatal() {
        let dir = TempDir::new().unwrap();
        assert!(ManifestLoader::new().load(&[dir.path().to_path_buf()]).is_err());
    }
}
