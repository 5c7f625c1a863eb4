//! Writer for the line snapshot format.

use super::Snapshot;

/// Encode a snapshot as line-format text.
pub fn write_snapshot_content(snapshot: &Snapshot) -> String {
    let mut lines = vec![
        "# Tallysheet snapshot".to_string(),
        format!("@version: {}", escape(&snapshot.version)),
    ];
    for record in &snapshot.records {
        lines.push(format!("{}: {}", record.name, escape(&record.contents)));
    }
    lines.join("\n") + "\n"
}

fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}
