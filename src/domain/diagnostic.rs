//! Lint findings
//!
//! A diagnostic pairs a rule with the place it fired and a message.

use super::Location;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, never fails a run
    Info,
    /// Policy violation, fails only with `--deny-warnings`
    Warning,
    /// The manifest is broken or inconsistent
    Error,
}

impl Severity {
    /// Returns the display label
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lint rules with stable codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    InvalidName,
    InvalidVersion,
    Unpinned,
    DuplicateEntry,
    ConflictingPins,
    InvalidMarker,
    InvalidExtra,
    UnknownOption,
    PrereleasePin,
    IncludeError,
    ParseError,
    InactiveEntry,
    UnknownRelease,
    YankedRelease,
    RegistryUnavailable,
}

impl Rule {
    /// All rules in code order
    pub const ALL: [Rule; 15] = [
        Rule::InvalidName,
        Rule::InvalidVersion,
        Rule::Unpinned,
        Rule::DuplicateEntry,
        Rule::ConflictingPins,
        Rule::InvalidMarker,
        Rule::InvalidExtra,
        Rule::UnknownOption,
        Rule::PrereleasePin,
        Rule::IncludeError,
        Rule::ParseError,
        Rule::InactiveEntry,
        Rule::UnknownRelease,
        Rule::YankedRelease,
        Rule::RegistryUnavailable,
    ];

    /// Returns the stable code, e.g. `RL003`
    pub fn code(&self) -> &'static str {
        match self {
            Rule::InvalidName => "RL001",
            Rule::InvalidVersion => "RL002",
            Rule::Unpinned => "RL003",
            Rule::DuplicateEntry => "RL004",
            Rule::ConflictingPins => "RL005",
            Rule::InvalidMarker => "RL006",
            Rule::InvalidExtra => "RL007",
            Rule::UnknownOption => "RL008",
            Rule::PrereleasePin => "RL009",
            Rule::IncludeError => "RL010",
            Rule::ParseError => "RL011",
            Rule::InactiveEntry => "RL012",
            Rule::UnknownRelease => "RL013",
            Rule::YankedRelease => "RL014",
            Rule::RegistryUnavailable => "RL015",
        }
    }

    /// Returns the kebab-case rule name
    pub fn name(&self) -> &'static str {
        match self {
            Rule::InvalidName => "invalid-name",
            Rule::InvalidVersion => "invalid-version",
            Rule::Unpinned => "unpinned",
            Rule::DuplicateEntry => "duplicate-entry",
            Rule::ConflictingPins => "conflicting-pins",
            Rule::InvalidMarker => "invalid-marker",
            Rule::InvalidExtra => "invalid-extra",
            Rule::UnknownOption => "unknown-option",
            Rule::PrereleasePin => "prerelease-pin",
            Rule::IncludeError => "include-error",
            Rule::ParseError => "parse-error",
            Rule::InactiveEntry => "inactive-entry",
            Rule::UnknownRelease => "unknown-release",
            Rule::YankedRelease => "yanked-release",
            Rule::RegistryUnavailable => "registry-unavailable",
        }
    }

    /// Returns the severity a rule reports at
    pub fn default_severity(&self) -> Severity {
        match self {
            Rule::InvalidName
            | Rule::InvalidVersion
            | Rule::ConflictingPins
            | Rule::InvalidMarker
            | Rule::InvalidExtra
            | Rule::IncludeError
            | Rule::ParseError
            | Rule::UnknownRelease => Severity::Error,
            Rule::Unpinned
            | Rule::DuplicateEntry
            | Rule::UnknownOption
            | Rule::YankedRelease
            | Rule::RegistryUnavailable => Severity::Warning,
            Rule::PrereleasePin | Rule::InactiveEntry => Severity::Info,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Rule {
    type Err = String;

    /// Accepts either the code (`RL003`, case-insensitive) or the name (`unpinned`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Rule::ALL
            .into_iter()
            .find(|rule| rule.code().eq_ignore_ascii_case(s) || rule.name() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// A single lint finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Rule that fired
    pub rule: Rule,
    /// Severity of the finding
    pub severity: Severity,
    /// Where it fired
    pub location: Location,
    /// Human-readable message
    pub message: String,
    /// Package the finding is about, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

impl Diagnostic {
    /// Creates a diagnostic at the rule's default severity
    pub fn new(rule: Rule, location: Location, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity: rule.default_severity(),
            location,
            message: message.into(),
            package: None,
        }
    }

    /// Attaches the package name (builder pattern)
    pub fn for_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Returns true for error-level findings
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Sort key: file, line, then rule code
    pub fn sort_key(&self) -> (&Location, Rule) {
        (&self.location, self.rule)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}[{} {}] {}",
            self.location,
            self.severity,
            self.rule.code(),
            self.rule.name(),
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_codes_are_unique_and_ordered() {
        let codes: Vec<&str> = Rule::ALL.iter().map(|r| r.code()).collect();
        let mut sorted = codes.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(codes, sorted);
    }

    #[test]
    fn test_rule_from_code_and_name() {
        assert_eq!("RL003".parse::<Rule>(), Ok(Rule::Unpinned));
        assert_eq!("rl005".parse::<Rule>(), Ok(Rule::ConflictingPins));
        assert_eq!("duplicate-entry".parse::<Rule>(), Ok(Rule::DuplicateEntry));
        assert_eq!("RL999".parse::<Rule>(), Err("RL999".to_string()));
    }

    #[test]
    fn test_default_severities() {
        assert_eq!(Rule::ConflictingPins.default_severity(), Severity::Error);
        assert_eq!(Rule::Unpinned.default_severity(), Severity::Warning);
        assert_eq!(Rule::InactiveEntry.default_severity(), Severity::Info);
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::new(
            Rule::Unpinned,
            Location::new("requirements.txt", 4),
            "'twine' has no exact version pin",
        )
        .for_package("twine");
        assert_eq!(
            diag.to_string(),
            "requirements.txt:4: warning[RL003 unpinned] 'twine' has no exact version pin"
        );
        assert!(!diag.is_error());
        assert_eq!(diag.package.as_deref(), Some("twine"));
    }

    #[test]
    fn test_serde_rule_name() {
        let json = serde_json::to_string(&Rule::ConflictingPins).unwrap();
        assert_eq!(json, "\"conflicting-pins\"");
    }
}
