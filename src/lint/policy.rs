//! Lint policy
//!
//! Which rules run and how strict pinning is. Built from defaults, then the
//! config file, then CLI flags.

use crate::domain::{normalize_name, Diagnostic, Rule};

/// Settings that shape a lint run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintPolicy {
    /// Report entries without an exact `==` pin
    pub require_pins: bool,
    /// Normalized names exempt from the pinning rule
    pub allow_unpinned: Vec<String>,
    /// Rules whose findings are dropped
    pub ignore: Vec<Rule>,
    /// Extras considered requested when evaluating `extra == '...'` markers
    pub extras: Vec<String>,
    /// Treat warnings as failures
    pub deny_warnings: bool,
}

impl Default for LintPolicy {
    fn default() -> Self {
        Self {
            require_pins: true,
            allow_unpinned: Vec::new(),
            ignore: Vec::new(),
            extras: Vec::new(),
            deny_warnings: false,
        }
    }
}

impl LintPolicy {
    /// Create the default policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Exempts packages from the pinning rule (builder pattern)
    pub fn with_allow_unpinned<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let normalized = normalize_name(name.as_ref());
            if !self.allow_unpinned.contains(&normalized) {
                self.allow_unpinned.push(normalized);
            }
        }
        self
    }

    /// Disables rules (builder pattern)
    pub fn with_ignored(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        for rule in rules {
            if !self.ignore.contains(&rule) {
                self.ignore.push(rule);
            }
        }
        self
    }

    /// Returns true if findings of this rule are reported
    pub fn is_enabled(&self, rule: Rule) -> bool {
        !self.ignore.contains(&rule)
    }

    /// Returns true if `normalized_name` must carry an exact pin
    pub fn requires_pin(&self, normalized_name: &str) -> bool {
        self.require_pins && !self.allow_unpinned.iter().any(|n| n == normalized_name)
    }

    /// Drops findings of ignored rules
    pub fn retain(&self, diagnostics: &mut Vec<Diagnostic>) {
        diagnostics.retain(|d| self.is_enabled(d.rule));
    }
}
