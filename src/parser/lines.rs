//! Physical-to-logical line assembly
//!
//! Joins `\` continuations and strips inline comments, keeping the
//! 1-based number of the first physical line of each logical line.

use regex::Regex;
use std::sync::LazyLock;

static INLINE_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s+)#.*$").unwrap());

/// A logical line before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawLine {
    /// Empty after stripping comments and whitespace
    Blank { line: usize },
    /// Line that starts with `#`
    Comment { line: usize, text: String },
    /// Anything else, comments removed and whitespace trimmed
    Content { line: usize, text: String },
}

/// Splits manifest content into logical lines
pub fn logical_lines(content: &str) -> Vec<RawLine> {
    let mut out = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (index, physical) in content.lines().enumerate() {
        let number = index + 1;
        let trimmed = physical.trim();

        if trimmed.starts_with('#') {
            // A comment ends any continuation in progress
            if let Some((start, text)) = pending.take() {
                out.push(finish(start, &text));
            }
            out.push(RawLine::Comment {
                line: number,
                text: trimmed.trim_start_matches('#').trim().to_string(),
            });
            continue;
        }

        let (start, mut text) = pending.take().unwrap_or((number, String::new()));
        if let Some(body) = physical.trim_end().strip_suffix('\\') {
            text.push_str(body);
            pending = Some((start, text));
            continue;
        }
        text.push_str(physical);
        out.push(finish(start, &text));
    }

    if let Some((start, text)) = pending {
        out.push(finish(start, &text));
    }

    out
}

fn finish(line: usize, text: &str) -> RawLine {
    let stripped = INLINE_COMMENT_RE.replace(text, "");
    let stripped = stripped.trim();
    if stripped.is_empty() {
        RawLine::Blank { line }
    } else {
        RawLine::Content {
            line,
            text: stripped.to_string(),
        }
    }
}
