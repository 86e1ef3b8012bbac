//! Checks exact pins against a registry
//!
//! One lookup per project, bounded by a semaphore. Lookup failures become
//! `registry-unavailable` warnings; they never abort the run.

use super::{RegistryAdapter, ReleaseInfo};
use crate::domain::{normalize_name, Diagnostic, Location, Rule};
use crate::error::RegistryError;
use crate::progress::Progress;
use pep440_rs::Version;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinSet};

/// An exact pin to verify
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinCheck {
    /// Project name as written
    pub package: String,
    pub version: Version,
    pub location: Location,
}

impl PinCheck {
    pub fn new(package: impl Into<String>, version: Version, location: Location) -> Self {
        Self {
            package: package.into(),
            version,
            location,
        }
    }
}

/// Verify every pin, querying each project once
pub async fn check_pins(
    adapter: Arc<dyn RegistryAdapter>,
    pins: Vec<PinCheck>,
    concurrency: usize,
    progress: &mut Progress,
) -> Vec<Diagnostic> {
    let mut by_project: BTreeMap<String, Vec<PinCheck>> = BTreeMap::new();
    for pin in pins {
        by_project
            .entry(normalize_name(&pin.package))
            .or_default()
            .push(pin);
    }
    if by_project.is_empty() {
        return Vec::new();
    }

    progress.start(by_project.len() as u64, "Checking registry");

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let registry = adapter.registry_name();
    let mut tasks = JoinSet::new();
    // Pins stay here so a task that panics still gets its findings
    let mut pending: HashMap<Id, Vec<PinCheck>> = HashMap::new();
    for (project, pins) in by_project {
        let adapter = Arc::clone(&adapter);
        let semaphore = Arc::clone(&semaphore);
        let handle = tasks.spawn(async move {
            match semaphore.acquire_owned().await {
                Ok(_permit) => adapter.fetch_releases(&project).await,
                Err(_) => Err(RegistryError::network_error(
                    &project,
                    adapter.registry_name(),
                    "request queue closed",
                )),
            }
        });
        pending.insert(handle.id(), pins);
    }

    let mut diagnostics = Vec::new();
    while let Some(joined) = tasks.join_next_with_id().await {
        progress.inc();
        match joined {
            Ok((id, result)) => {
                let pins = pending.remove(&id).unwrap_or_default();
                if let Some(pin) = pins.first() {
                    progress.set_message(&format!("Checked {}", pin.package));
                }
                diagnostics.extend(judge(&pins, result, registry));
            }
            Err(e) => {
                tracing::warn!("registry task failed: {}", e);
                let pins = pending.remove(&e.id()).unwrap_or_default();
                diagnostics.extend(unavailable(&pins, "lookup task failed"));
            }
        }
    }
    progress.finish_and_clear();

    diagnostics
}

/// Turn one project's lookup result into diagnostics for its pins
fn judge(
    pins: &[PinCheck],
    result: Result<Vec<ReleaseInfo>, RegistryError>,
    registry: &str,
) -> Vec<Diagnostic> {
    let releases = match result {
        Ok(releases) => releases,
        Err(RegistryError::PackageNotFound { .. }) => {
            return pins
                .iter()
                .map(|pin| {
                    Diagnostic::new(
                        Rule::UnknownRelease,
                        pin.location.clone(),
                        format!("'{}' is not a project on {}", pin.package, registry),
                    )
                    .for_package(&pin.package)
                })
                .collect();
        }
        Err(e) => {
            tracing::debug!("lookup failed: {}", e);
            return unavailable(pins, &e.to_string());
        }
    };

    let parsed: Vec<(Version, &ReleaseInfo)> = releases
        .iter()
        .filter_map(|r| Version::from_str(&r.version).ok().map(|v| (v, r)))
        .collect();

    let mut out = Vec::new();
    for pin in pins {
        match parsed.iter().find(|(v, _)| *v == pin.version) {
            None => out.push(
                Diagnostic::new(
                    Rule::UnknownRelease,
                    pin.location.clone(),
                    format!(
                        "'{}' has no release {} on {}",
                        pin.package, pin.version, registry
                    ),
                )
                .for_package(&pin.package),
            ),
            Some((_, release)) if release.yanked => {
                let reason = release
                    .yanked_reason
                    .as_deref()
                    .map(|r| format!(": {}", r))
                    .unwrap_or_default();
                out.push(
                    Diagnostic::new(
                        Rule::YankedRelease,
                        pin.location.clone(),
                        format!(
                            "'{}' {} was yanked from {}{}",
                            pin.package, pin.version, registry, reason
                        ),
                    )
                    .for_package(&pin.package),
                );
            }
            Some(_) => {}
        }
    }
    out
}

fn unavailable(pins: &[PinCheck], reason: &str) -> Vec<Diagnostic> {
    pins.iter()
        .map(|pin| {
            Diagnostic::new(
                Rule::RegistryUnavailable,
                pin.location.clone(),
                format!("could not verify '{}=={}': {}", pin.package, pin.version, reason),
            )
            .for_package(&pin.package)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticRegistry {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RegistryAdapter for StaticRegistry {
        fn registry_name(&self) -> &'static str {
            "TestPyPI"
        }

        async fn fetch_releases(&self, package: &str) -> Result<Vec<ReleaseInfo>, RegistryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match package {
                "black" => Ok(vec![
                    ReleaseInfo::new("22.10.0"),
                    ReleaseInfo::new("22.12.0").yanked(Some("regression")),
                ]),
                "flaky" => Err(RegistryError::timeout(package, "TestPyPI")),
                "broken" => panic!("malformed release data"),
                _ => Err(RegistryError::package_not_found(package, "TestPyPI")),
            }
        }
    }

    fn pin(name: &str, version: &str, line: usize) -> PinCheck {
        PinCheck::new(
            name,
            Version::from_str(version).unwrap(),
            Location::new("requirements.txt", line),
        )
    }

    async fn run(pins: Vec<PinCheck>) -> (Vec<Diagnostic>, usize) {
        let registry = Arc::new(StaticRegistry {
            calls: AtomicUsize::new(0),
        });
        let adapter: Arc<dyn RegistryAdapter> = registry.clone();
        let mut diags = check_pins(adapter, pins, 2, &mut Progress::disabled()).await;
        diags.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        (diags, registry.calls.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_published_release_is_clean() {
        let (diags, _) = run(vec![pin("black", "22.10.0", 1)]).await;
        assert!(diags.is_empty());
    }

    #[tokio::test]
    async fn test_version_equality_is_pep440() {
        let (diags, _) = run(vec![pin("Black", "22.10", 1)]).await;
        assert!(diags.is_empty());

        let (diags, _) = run(vec![pin("black", "22.11", 1)]).await;
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].rule, Rule::UnknownRelease);
    }

    #[tokio::test]
    async fn test_yanked_release() {
        let (diags, _) = run(vec![pin("black", "22.12.0", 3)]).await;
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].rule, Rule::YankedRelease);
        assert!(diags[0].message.contains("regression"));
    }

    #[tokio::test]
    async fn test_unknown_project_and_unavailable_registry() {
        let (diags, _) = run(vec![pin("no-such-project", "1.0", 1), pin("flaky", "1.0", 2)]).await;
        let rules: Vec<Rule> = diags.iter().map(|d| d.rule).collect();
        assert_eq!(rules, vec![Rule::UnknownRelease, Rule::RegistryUnavailable]);
    }

    #[tokio::test]
    async fn test_failed_lookup_task_reports_its_pins() {
        let (diags, _) = run(vec![
            pin("broken", "1.0", 4),
            pin("broken", "2.0", 5),
            pin("black", "22.12.0", 6),
        ])
        .await;
        let found: Vec<(Rule, usize)> = diags.iter().map(|d| (d.rule, d.location.line)).collect();
        assert_eq!(
            found,
            vec![
                (Rule::RegistryUnavailable, 4),
                (Rule::RegistryUnavailable, 5),
                (Rule::YankedRelease, 6),
            ]
        );
        assert!(diags[0].message.contains("'broken==1.0'"));
    }

    #[tokio::test]
    async fn test_one_lookup_per_project() {
        let (diags, calls) = run(vec![
            pin("black", "22.10.0", 1),
            pin("Black", "22.12.0", 2),
            pin("black", "21.0.0", 3),
        ])
        .await;
        assert_eq!(calls, 1);
        assert_eq!(diags.len(), 2);
    }

    #[tokio::test]
    async fn test_no_pins_no_lookups() {
        let (diags, calls) = run(Vec::new()).await;
        assert!(diags.is_empty());
        assert_eq!(calls, 0);
    }
}
