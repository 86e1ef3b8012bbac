//! Option line parser
//!
//! Classifies lines that start with `-`: editable installs, includes of
//! other manifests, and global pip options.

use crate::domain::{EditableInstall, Include, IncludeKind, Location, PipOption};

/// Options pip understands at the top level of a requirements file
const KNOWN_OPTIONS: &[&str] = &[
    "-i",
    "--index-url",
    "--extra-index-url",
    "-f",
    "--find-links",
    "--no-index",
    "--pre",
    "--prefer-binary",
    "--only-binary",
    "--no-binary",
    "--trusted-host",
    "--require-hashes",
    "--use-feature",
];

/// Result of classifying an option line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionLine {
    Editable(EditableInstall),
    Include(Include),
    Option(PipOption),
}

/// Parses a line starting with `-`
pub fn parse_option(text: &str, location: Location) -> Result<OptionLine, String> {
    let (name, value) = split_option(text);

    match name {
        "-e" | "--editable" => {
            let value = value.ok_or_else(|| format!("'{}' needs a path or URL", name))?;
            let (path, extras) = split_extras(&value);
            Ok(OptionLine::Editable(EditableInstall {
                path,
                extras,
                location,
                section: None,
            }))
        }
        "-r" | "--requirement" | "-c" | "--constraint" => {
            let target = value.ok_or_else(|| format!("'{}' needs a file path", name))?;
            let kind = if matches!(name, "-r" | "--requirement") {
                IncludeKind::Requirement
            } else {
                IncludeKind::Constraint
            };
            Ok(OptionLine::Include(Include {
                kind,
                target,
                location,
            }))
        }
        _ => Ok(OptionLine::Option(PipOption {
            name: name.to_string(),
            known: KNOWN_OPTIONS.contains(&name),
            value,
            location,
        })),
    }
}

/// Splits `--name=value`, `--name value`, `-x value` and `-xvalue`
fn split_option(text: &str) -> (&str, Option<String>) {
    let text = text.trim();
    if let Some((name, value)) = text.split_once('=') {
        if name.starts_with("--") && !name.contains(char::is_whitespace) {
            return (name, non_empty(value));
        }
    }
    if let Some((name, value)) = text.split_once(char::is_whitespace) {
        return (name, non_empty(value));
    }
    if !text.starts_with("--") && text.len() > 2 && text.is_char_boundary(2) {
        return (&text[..2], non_empty(&text[2..]));
    }
    (text, None)
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Splits `.[full,dev]` into `(".", ["full", "dev"])`
fn split_extras(value: &str) -> (String, Vec<String>) {
    if let Some(open) = value.rfind('[') {
        if let Some(body) = value[open + 1..].strip_suffix(']') {
            let extras = body
                .split(',')
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect();
            return (value[..open].trim().to_string(), extras);
        }
    }
    (value.to_string(), Vec::new())
}
