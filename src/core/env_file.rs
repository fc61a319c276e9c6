//! Single-key merge into a dotenv-style file.

use std::path::Path;

use crate::error::Result;
use crate::utils::io;

/// Merge `key=value` into existing dotenv content.
///
/// The first line defining `key` is replaced in place and later duplicate
/// definitions are dropped. Other lines keep their content, order and line
/// terminator (`\n` or `\r\n`). When the key is absent it is appended using
/// the file's first terminator. The result always ends in exactly one
/// line break.
pub fn merge_line(existing: Option<&str>, key: &str, value: &str) -> String {
    let assignment = format!("{}={}", key, value);
    let prefix = format!("{}=", key);
    let existing = existing.unwrap_or("");

    let mut lines: Vec<(&str, &str)> = existing.split_inclusive('\n').map(split_terminator).collect();
    let eol = lines
        .iter()
        .map(|(_, terminator)| *terminator)
        .find(|terminator| !terminator.is_empty())
        .unwrap_or("\n");

    let mut replaced = false;
    lines.retain_mut(|(body, _)| {
        if !body.trim_start().starts_with(&prefix) {
            return true;
        }
        if replaced {
            return false;
        }
        *body = assignment.as_str();
        replaced = true;
        true
    });

    while lines.last().is_some_and(|(body, _)| body.trim().is_empty()) {
        lines.pop();
    }

    if !replaced {
        lines.push((assignment.as_str(), eol));
    }

    let mut merged = String::with_capacity(existing.len() + assignment.len() + 2);
    for (body, terminator) in &lines {
        merged.push_str(body);
        merged.push_str(if terminator.is_empty() { eol } else { terminator });
    }
    merged
}

fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// Merge `key=value` into the file at `path`, creating it when missing.
pub fn merge_into_file(path: &Path, key: &str, value: &str) -> Result<()> {
    let existing = io::read_optional(path, "read env file")?;
    let merged = merge_line(existing.as_deref(), key, value);
    if existing.as_deref() != Some(merged.as_str()) {
        io::write_file(path, &merged, "write env file")?;
    }
    Ok(())
}
