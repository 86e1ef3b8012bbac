//! Per-line checks
//!
//! Each check looks at one entry, editable install or option in isolation.

use super::LintPolicy;
use crate::domain::{Diagnostic, EditableInstall, PipOption, RequirementEntry, Rule};
use pep440_rs::{Operator, Version, VersionSpecifiers};
use pep508_rs::{ExtraName, MarkerEnvironment, MarkerTree, PackageName, VersionOrUrl};
use std::str::FromStr;

/// Returns true if `name` is a syntactically valid package name
pub fn is_valid_name(name: &str) -> bool {
    PackageName::from_str(name).is_ok()
}

fn is_valid_extra(extra: &str) -> bool {
    ExtraName::from_str(extra).is_ok()
}

/// Returns the version an exact `==` or `===` specifier pins to
pub fn exact_pin(specifiers: &VersionSpecifiers) -> Option<Version> {
    specifiers
        .iter()
        .find(|s| matches!(s.operator(), Operator::Equal | Operator::ExactEqual))
        .map(|s| s.version().clone())
}

/// What the per-entry checks learned about an entry
#[derive(Debug, Clone)]
pub struct EntryCheck {
    /// Parsed specifiers, when present and valid
    pub specifiers: Option<VersionSpecifiers>,
    /// Parsed marker, when present and valid
    pub marker: Option<MarkerTree>,
    /// False only when a valid marker evaluates false
    pub active: bool,
    /// Exact pin, when the specifiers carry one
    pub pin: Option<Version>,
    /// False when the specifier or marker failed to parse
    pub well_formed: bool,
}

/// Specifier and marker of an entry, parsed or with the parse error
struct Parts {
    specifiers: Option<Result<VersionSpecifiers, String>>,
    marker: Option<Result<MarkerTree, String>>,
}

impl Parts {
    /// Takes the parts from the `pep508_rs` parse, or parses the raw text
    /// piece by piece when the line as a whole was rejected
    fn of(entry: &RequirementEntry) -> Self {
        match &entry.requirement {
            Some(requirement) => Self {
                specifiers: match &requirement.version_or_url {
                    Some(VersionOrUrl::VersionSpecifier(specifiers)) => {
                        Some(Ok(specifiers.clone()))
                    }
                    _ => None,
                },
                marker: (!requirement.marker.is_true()).then(|| Ok(requirement.marker.clone())),
            },
            None => Self {
                specifiers: entry
                    .specifier
                    .as_deref()
                    .map(|spec| VersionSpecifiers::from_str(spec).map_err(|e| e.to_string())),
                marker: entry
                    .marker
                    .as_deref()
                    .map(|marker| MarkerTree::from_str(marker).map_err(|e| e.to_string())),
            },
        }
    }
}

/// Runs the per-entry rules and records what was parsed
///
/// `extras` are the extras requested for `extra == '...'` markers.
pub fn check_entry(
    entry: &RequirementEntry,
    env: &MarkerEnvironment,
    extras: &[ExtraName],
    policy: &LintPolicy,
    out: &mut Vec<Diagnostic>,
) -> EntryCheck {
    let mut check = EntryCheck {
        specifiers: None,
        marker: None,
        active: true,
        pin: None,
        well_formed: true,
    };
    let marker_text = entry.marker.as_deref().unwrap_or_default();

    if !is_valid_name(&entry.name) {
        out.push(
            Diagnostic::new(
                Rule::InvalidName,
                entry.location.clone(),
                format!("'{}' is not a valid package name", entry.name),
            )
            .for_package(&entry.name),
        );
    }

    check_extras(entry, out);

    let parts = Parts::of(entry);

    match parts.specifiers {
        Some(Ok(specifiers)) => {
            check.pin = exact_pin(&specifiers);
            check.specifiers = Some(specifiers);
        }
        Some(Err(e)) => {
            check.well_formed = false;
            out.push(
                Diagnostic::new(
                    Rule::InvalidVersion,
                    entry.location.clone(),
                    format!(
                        "invalid version specifier '{}' for '{}': {}",
                        entry.specifier.as_deref().unwrap_or_default(),
                        entry.name,
                        e
                    ),
                )
                .for_package(&entry.name),
            );
        }
        None => {}
    }

    match parts.marker {
        Some(Ok(tree)) => {
            check.active = tree.evaluate(env, extras);
            if !check.active {
                out.push(
                    Diagnostic::new(
                        Rule::InactiveEntry,
                        entry.location.clone(),
                        format!(
                            "'{}' is skipped in this environment: '{}' is false",
                            entry.name, marker_text
                        ),
                    )
                    .for_package(&entry.name),
                );
            }
            check.marker = Some(tree);
        }
        Some(Err(e)) => {
            check.well_formed = false;
            out.push(
                Diagnostic::new(
                    Rule::InvalidMarker,
                    entry.location.clone(),
                    format!("invalid environment marker '{}': {}", marker_text, e),
                )
                .for_package(&entry.name),
            );
        }
        None => {}
    }

    let spec_is_valid = entry.specifier.is_none() || check.specifiers.is_some();
    if entry.url.is_none()
        && check.pin.is_none()
        && spec_is_valid
        && policy.requires_pin(&entry.normalized_name)
    {
        let message = match &entry.specifier {
            Some(spec) => format!(
                "'{}' is constrained by '{}' but not pinned with '=='",
                entry.name, spec
            ),
            None => format!("'{}' has no version pin", entry.name),
        };
        out.push(
            Diagnostic::new(Rule::Unpinned, entry.location.clone(), message)
                .for_package(&entry.name),
        );
    }

    if let Some(pin) = &check.pin {
        if pin.is_pre() || pin.is_dev() {
            let gate = match &check.marker {
                Some(_) => format!(" (only when {})", marker_text),
                None => String::new(),
            };
            out.push(
                Diagnostic::new(
                    Rule::PrereleasePin,
                    entry.location.clone(),
                    format!("'{}' is pinned to pre-release {}{}", entry.name, pin, gate),
                )
                .for_package(&entry.name),
            );
        }
    }

    check
}

/// Checks the extras of an editable install
pub fn check_editable(editable: &EditableInstall, out: &mut Vec<Diagnostic>) {
    for extra in &editable.extras {
        if !is_valid_extra(extra) {
            out.push(Diagnostic::new(
                Rule::InvalidExtra,
                editable.location.clone(),
                format!("'{}' is not a valid extra name for '{}'", extra, editable.path),
            ));
        }
    }
}

/// Flags option lines pip would reject
pub fn check_option(option: &PipOption, out: &mut Vec<Diagnostic>) {
    if !option.known {
        out.push(Diagnostic::new(
            Rule::UnknownOption,
            option.location.clone(),
            format!("'{}' is not a recognised requirements file option", option.name),
        ));
    }
}

fn check_extras(entry: &RequirementEntry, out: &mut Vec<Diagnostic>) {
    for extra in &entry.extras {
        if !is_valid_extra(extra) {
            out.push(
                Diagnostic::new(
                    Rule::InvalidExtra,
                    entry.location.clone(),
                    format!("'{}' is not a valid extra name for '{}'", extra, entry.name),
                )
                .for_package(&entry.name),
            );
        }
    }
}
