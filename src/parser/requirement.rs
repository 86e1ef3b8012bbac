//! Requirement line parser
//!
//! Handles the forms pip accepts for a named requirement:
//! - `name`
//! - `name==1.4`, `name>=1.0,<2`, `name (>=1.0)`
//! - `name[extra1,extra2]==1.4`
//! - `name @ https://example.com/name.whl`
//! - any of the above followed by `; marker` and `--hash=...` options

use crate::domain::{Location, RequirementEntry};
use pep508_rs::Requirement;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static HASH_OPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*--hash(?:=|\s+)(\S+)").unwrap());
static HEAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[^\s\[\]=<>!~;@,()]+)\s*(?:\[(?P<extras>[^\]]*)\])?\s*(?P<rest>.*)$")
        .unwrap()
});

/// Parses a requirement line into an entry
///
/// The line is parsed with `pep508_rs`; the raw name, extras, specifier
/// and marker text are kept alongside for reporting, and are all the
/// linter has to go on when `pep508_rs` rejects the line.
/// Returns an error message for lines that are not a named requirement.
pub fn parse_requirement(text: &str, location: Location) -> Result<RequirementEntry, String> {
    let mut hashes = Vec::new();
    for caps in HASH_OPTION_RE.captures_iter(text) {
        hashes.push(caps[1].to_string());
    }
    let text = HASH_OPTION_RE.replace_all(text, "");
    let text = text.trim();

    if (text.contains("://") && !text.contains('@')) || text.starts_with(['.', '/']) {
        return Err(format!(
            "unnamed requirement '{}'; use 'name @ url' so the package can be identified",
            text
        ));
    }
    if text.starts_with(';') {
        return Err("requirement has a marker but no package name".to_string());
    }

    let caps = HEAD_RE
        .captures(text)
        .ok_or_else(|| format!("cannot parse requirement '{}'", text))?;
    let name = &caps["name"];

    let extras = caps
        .name("extras")
        .map(|m| {
            m.as_str()
                .split(',')
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let (rest, marker) = split_marker(caps["rest"].trim());
    let mut entry = RequirementEntry::new(name, location).with_extras(extras);
    entry.hashes = hashes;
    entry.marker = marker;

    if let Some(url) = rest.strip_prefix('@') {
        let url = url.trim();
        if url.is_empty() {
            return Err(format!("'{}' has '@' but no URL", name));
        }
        entry.url = Some(url.to_string());
    } else if !rest.is_empty() {
        let spec = rest
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .unwrap_or(rest)
            .trim();
        if !spec.starts_with(['=', '<', '>', '!', '~']) {
            return Err(format!(
                "unexpected '{}' after package name '{}'",
                rest, name
            ));
        }
        entry.specifier = Some(spec.split_whitespace().collect::<String>());
    }

    match Requirement::from_str(text) {
        Ok(requirement) => entry.requirement = Some(requirement),
        Err(e) => tracing::debug!("{}: falling back to raw fields: {}", entry.location, e),
    }

    Ok(entry)
}

/// Splits the text after the name and extras at the marker `;`
///
/// In the `@ url` form the `;` must follow whitespace, since URLs may contain `;`.
fn split_marker(rest: &str) -> (&str, Option<String>) {
    let index = if rest.starts_with('@') {
        rest.find(" ;").map(|i| i + 1)
    } else {
        rest.find(';')
    };
    match index {
        Some(i) => {
            let marker = rest[i + 1..].trim();
            let marker = (!marker.is_empty()).then(|| marker.to_string());
            (rest[..i].trim(), marker)
        }
        None => (rest, None),
    }
}
