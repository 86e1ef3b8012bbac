//! Cross-entry checks: duplicates and conflicting pins
//!
//! Marker scope is the canonical marker text, or empty for unconditional
//! entries. Two entries for one package in the same scope are duplicates.
//! Two entries conflict when they share a scope, or are both active in the
//! evaluated environment, and one's exact pin falls outside the other's
//! specifiers.

use super::rules::EntryCheck;
use crate::domain::{Diagnostic, RequirementEntry, Rule};
use std::collections::BTreeMap;

/// An entry together with what the per-entry checks learned about it
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub entry: &'a RequirementEntry,
    pub check: &'a EntryCheck,
    /// Declared in a `-c` constraints file
    pub constraint: bool,
}

impl Candidate<'_> {
    fn scope(&self) -> String {
        self.check
            .marker
            .as_ref()
            .and_then(|m| m.try_to_string())
            .unwrap_or_default()
    }
}

fn group_by_name<'a, 'b>(candidates: &'b [Candidate<'a>]) -> BTreeMap<&'a str, Vec<&'b Candidate<'a>>> {
    let mut groups: BTreeMap<&str, Vec<&Candidate>> = BTreeMap::new();
    for candidate in candidates.iter().filter(|c| c.check.well_formed) {
        groups
            .entry(candidate.entry.normalized_name.as_str())
            .or_default()
            .push(candidate);
    }
    groups
}

/// Reports repeated declarations of a package within one marker scope
///
/// Constraints files restate names on purpose and are not counted.
pub fn find_duplicates(candidates: &[Candidate<'_>]) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for group in group_by_name(candidates).values() {
        let mut seen: Vec<(String, &Candidate)> = Vec::new();
        for candidate in group.iter().filter(|c| !c.constraint) {
            let scope = candidate.scope();
            if let Some((_, first)) = seen.iter().find(|(s, _)| *s == scope) {
                let scope_label = if scope.is_empty() {
                    "unconditionally".to_string()
                } else {
                    format!("for '{}'", scope)
                };
                out.push(
                    Diagnostic::new(
                        Rule::DuplicateEntry,
                        candidate.entry.location.clone(),
                        format!(
                            "'{}' is already declared {} at {}",
                            candidate.entry.name, scope_label, first.entry.location
                        ),
                    )
                    .for_package(&candidate.entry.name),
                );
            } else {
                seen.push((scope, candidate));
            }
        }
    }
    out
}

/// Reports pins that cannot be satisfied together
pub fn find_conflicts(candidates: &[Candidate<'_>]) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for group in group_by_name(candidates).values() {
        for (i, earlier) in group.iter().enumerate() {
            for later in &group[i + 1..] {
                if let Some(message) = conflict_between(earlier, later) {
                    out.push(
                        Diagnostic::new(
                            Rule::ConflictingPins,
                            later.entry.location.clone(),
                            message,
                        )
                        .for_package(&later.entry.name),
                    );
                }
            }
        }
    }
    out
}

fn conflict_between(a: &Candidate<'_>, b: &Candidate<'_>) -> Option<String> {
    let (Some(a_specs), Some(b_specs)) = (&a.check.specifiers, &b.check.specifiers) else {
        return None;
    };
    let overlapping = a.scope() == b.scope() || (a.check.active && b.check.active);
    if !overlapping {
        return None;
    }

    let a_rejects_b = b.check.pin.as_ref().is_some_and(|pin| !a_specs.contains(pin));
    let b_rejects_a = a.check.pin.as_ref().is_some_and(|pin| !b_specs.contains(pin));
    if !(a_rejects_b || b_rejects_a) {
        return None;
    }

    Some(format!(
        "'{}' conflicts with '{}' at {}",
        b.entry, a.entry, a.entry.location
    ))
}
