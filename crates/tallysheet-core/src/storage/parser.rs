//! Parser for the line snapshot format.
//!
//! ```text
//! # comment
//! @version: ps6
//! A1: 5
//! B1: =A1+1
//! C1: Total
//! ```
//!
//! Exactly one space after the colon is a separator; anything after it is
//! the content string. In contents and the version, `\\`, `\n` and `\r`
//! stand for a backslash, newline and carriage return.

use super::{Record, Snapshot};
use crate::error::PersistenceError;

const VERSION_PREFIX: &str = "@version:";

/// Parse line-format snapshot text.
pub fn parse_snapshot(content: &str) -> Result<Snapshot, PersistenceError> {
    let mut version = VersionLine::default();
    let mut records = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        if is_blank_or_comment(line) || version.accept(line, line_num + 1)? {
            continue;
        }

        let Some((name, value)) = line.split_once(':') else {
            return Err(PersistenceError::Parse {
                line: line_num + 1,
                message: "Expected 'NAME: CONTENTS' format".to_string(),
            });
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(PersistenceError::Parse {
                line: line_num + 1,
                message: "Missing cell name".to_string(),
            });
        }
        records.push(Record::new(name, unescape(field_value(value))));
    }

    Ok(Snapshot {
        version: version.finish()?,
        records,
    })
}

/// Read only the version tag. Header rules match [`parse_snapshot`].
pub fn parse_version(content: &str) -> Result<String, PersistenceError> {
    let mut version = VersionLine::default();
    for (line_num, line) in content.lines().enumerate() {
        version.accept(line, line_num + 1)?;
    }
    version.finish()
}

/// Tracks the single `@version:` line of a snapshot.
#[derive(Default)]
struct VersionLine(Option<String>);

impl VersionLine {
    /// Consume `line` if it is a version line.
    fn accept(&mut self, line: &str, line_num: usize) -> Result<bool, PersistenceError> {
        let Some(rest) = line.strip_prefix(VERSION_PREFIX) else {
            return Ok(false);
        };
        if self.0.is_some() {
            return Err(PersistenceError::Parse {
                line: line_num,
                message: "Duplicate @version line".to_string(),
            });
        }
        self.0 = Some(unescape(field_value(rest)));
        Ok(true)
    }

    fn finish(self) -> Result<String, PersistenceError> {
        self.0.ok_or(PersistenceError::MissingVersion)
    }
}

fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

fn field_value(rest: &str) -> &str {
    rest.strip_prefix(' ').unwrap_or(rest)
}

fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
