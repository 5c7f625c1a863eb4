//! Snapshot storage.
//!
//! A snapshot is a version tag plus the non-empty cells in order, each as a
//! name and the content string `set_contents` accepts. Two encodings exist,
//! picked by file extension:
//!
//! - `.xml` - `<spreadsheet version="..">` with `<cell>` records
//! - anything else - the line format (`NAME: CONTENTS`)

pub mod parser;
pub mod writer;
pub mod xml;

pub use parser::{parse_snapshot, parse_version};
pub use writer::write_snapshot_content;
pub use xml::{parse_xml, parse_xml_version, write_xml_content};

use crate::error::PersistenceError;
use std::fs;
use std::path::Path;

/// One persisted cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub contents: String,
}

impl Record {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Record {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub version: String,
    pub records: Vec<Record>,
}

/// On-disk encoding of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Lines,
    Xml,
}

impl SnapshotFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xml") => SnapshotFormat::Xml,
            _ => SnapshotFormat::Lines,
        }
    }
}

/// Read and decode a snapshot file.
pub fn read_snapshot(path: &Path) -> Result<Snapshot, PersistenceError> {
    let content = fs::read_to_string(path)?;
    match SnapshotFormat::from_path(path) {
        SnapshotFormat::Lines => parse_snapshot(&content),
        SnapshotFormat::Xml => parse_xml(&content),
    }
}

/// Read only the version tag of a snapshot file.
pub fn read_version(path: &Path) -> Result<String, PersistenceError> {
    let content = fs::read_to_string(path)?;
    match SnapshotFormat::from_path(path) {
        SnapshotFormat::Lines => parse_version(&content),
        SnapshotFormat::Xml => parse_xml_version(&content),
    }
}

/// Encode and write a snapshot file.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), PersistenceError> {
    let content = match SnapshotFormat::from_path(path) {
        SnapshotFormat::Lines => write_snapshot_content(snapshot),
        SnapshotFormat::Xml => write_xml_content(snapshot),
    };
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Snapshot {
        Snapshot {
            version: "v1".to_string(),
            records: vec![
                Record::new("A1", "5"),
                Record::new("B1", "=A1+1"),
                Record::new("C1", "two\nlines & <tags>"),
            ],
        }
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SnapshotFormat::from_path(Path::new("a.xml")), SnapshotFormat::Xml);
        assert_eq!(SnapshotFormat::from_path(Path::new("a.XML")), SnapshotFormat::Xml);
        assert_eq!(SnapshotFormat::from_path(Path::new("a.tally")), SnapshotFormat::Lines);
        assert_eq!(SnapshotFormat::from_path(Path::new("noext")), SnapshotFormat::Lines);
    }

    #[test]
    fn test_file_round_trip_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        for file in ["sheet.tally", "sheet.xml"] {
            let path = dir.path().join(file);
            write_snapshot(&path, &sample()).unwrap();
            assert_eq!(read_snapshot(&path).unwrap(), sample());
            assert_eq!(read_version(&path).unwrap(), "v1");
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_snapshot(&dir.path().join("missing.tally")).unwrap_err();
        assert!(matches!(err, PersistenceError::Io(_)));
    }
}
