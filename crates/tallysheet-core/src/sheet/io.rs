use super::Spreadsheet;
use crate::config::SheetRules;
use crate::error::{PersistenceError, Result, SheetError};
use crate::storage::{Record, Snapshot, read_snapshot, read_version, write_snapshot};
use std::path::Path;

/// Version tag stored in a snapshot file, without loading its cells.
pub fn saved_version(path: &Path) -> Result<String> {
    Ok(read_version(path)?)
}

impl Spreadsheet {
    /// Load a snapshot file into a new store built with `rules`.
    ///
    /// The snapshot's version must equal `rules.version()`. Every record is
    /// replayed through [`set_contents`](Self::set_contents) in file order;
    /// the first one that fails aborts the load.
    pub fn open(path: &Path, rules: SheetRules) -> Result<Self> {
        let snapshot = read_snapshot(path)?;
        let sheet = Self::from_snapshot(snapshot, rules)?;
        log::info!(
            "loaded {} cell(s) from {}",
            sheet.len(),
            path.display()
        );
        Ok(sheet)
    }

    /// Rebuild a store from a decoded snapshot.
    pub fn from_snapshot(snapshot: Snapshot, rules: SheetRules) -> Result<Self> {
        if snapshot.version != rules.version() {
            return Err(PersistenceError::VersionMismatch {
                expected: rules.version().to_string(),
                found: snapshot.version,
            }
            .into());
        }

        let mut sheet = Spreadsheet::with_rules(rules);
        for Record { name, contents } in snapshot.records {
            if let Err(err) = sheet.set_contents(&name, &contents) {
                return Err(PersistenceError::InvalidRecord {
                    name,
                    contents,
                    source: Box::new(err),
                }
                .into());
            }
        }
        sheet.changed = false;
        Ok(sheet)
    }

    /// Every non-empty cell in sheet order, with this store's version.
    pub fn to_snapshot(&self) -> Snapshot {
        let records = self
            .names_of_nonempty_cells()
            .into_iter()
            .filter_map(|name| {
                let contents = self.cells.get(&name)?.content.to_input_string();
                Some(Record { name, contents })
            })
            .collect();
        Snapshot {
            version: self.version().to_string(),
            records,
        }
    }

    /// Write the store to `path` and clear the changed flag.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        let snapshot = self.to_snapshot();
        write_snapshot(path, &snapshot).map_err(SheetError::from)?;
        self.changed = false;
        log::info!(
            "saved {} cell(s) to {}",
            snapshot.records.len(),
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{Content, Value};
    use pretty_assertions::assert_eq;

    fn upper_rules(version: &str) -> SheetRules {
        SheetRules::new(|_: &str| true, |s: &str| s.to_ascii_uppercase(), version)
    }

    fn populated() -> Spreadsheet {
        let mut sheet = Spreadsheet::with_rules(upper_rules("v1"));
        sheet.set_contents("a1", "5").unwrap();
        sheet.set_contents("b1", "=a1 + 1").unwrap();
        sheet.set_contents("c1", "=B1 / (A1 - 5)").unwrap();
        sheet.set_contents("d2", "note: two\nlines").unwrap();
        sheet.set_contents("e3", " ").unwrap();
        sheet
    }

    fn assert_same_cells(a: &Spreadsheet, b: &Spreadsheet) {
        assert_eq!(a.names_of_nonempty_cells(), b.names_of_nonempty_cells());
        for name in a.names_of_nonempty_cells() {
            assert_eq!(a.contents(&name).unwrap(), b.contents(&name).unwrap());
            assert_eq!(a.value(&name).unwrap(), b.value(&name).unwrap());
        }
    }

    #[test]
    fn test_save_and_open_round_trip_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        for file in ["sheet.tally", "sheet.xml"] {
            let path = dir.path().join(file);
            let mut sheet = populated();
            assert!(sheet.changed());
            sheet.save(&path).unwrap();
            assert!(!sheet.changed());

            let loaded = Spreadsheet::open(&path, upper_rules("v1")).unwrap();
            assert!(!loaded.changed());
            assert_same_cells(&sheet, &loaded);
            assert_eq!(saved_version(&path).unwrap(), "v1");
        }
    }

    #[test]
    fn test_open_with_wrong_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.tally");
        populated().save(&path).unwrap();

        let err = Spreadsheet::open(&path, upper_rules("v2")).unwrap_err();
        assert!(matches!(
            err,
            SheetError::Persistence(PersistenceError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_snapshot_records_use_canonical_form() {
        let snapshot = populated().to_snapshot();
        assert_eq!(
            snapshot.records,
            vec![
                Record::new("A1", "5"),
                Record::new("B1", "=A1+1"),
                Record::new("C1", "=B1/(A1-5)"),
                Record::new("D2", "note: two\nlines"),
                Record::new("E3", " "),
            ]
        );
    }

    #[test]
    fn test_forward_references_replay() {
        let snapshot = Snapshot {
            version: "default".to_string(),
            records: vec![Record::new("B1", "=A1*2"), Record::new("A1", "4")],
        };
        let sheet = Spreadsheet::from_snapshot(snapshot, SheetRules::default()).unwrap();
        assert_eq!(sheet.value("B1").unwrap(), Value::Number(8.0));
    }

    #[test]
    fn test_bad_records_fail_the_load() {
        let cases = [
            (Record::new("1A", "5"), "invalid name"),
            (Record::new("A1", "=1 +"), "invalid formula"),
        ];
        for (record, label) in cases {
            let snapshot = Snapshot {
                version: "default".to_string(),
                records: vec![record],
            };
            let err = Spreadsheet::from_snapshot(snapshot, SheetRules::default()).unwrap_err();
            assert!(
                matches!(
                    err,
                    SheetError::Persistence(PersistenceError::InvalidRecord { .. })
                ),
                "{label}"
            );
        }
    }

    #[test]
    fn test_cycle_in_file_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loop.tally");
        std::fs::write(&path, "@version: default\nA1: =B1\nB1: =A1\n").unwrap();

        match Spreadsheet::open(&path, SheetRules::default()) {
            Err(SheetError::Persistence(PersistenceError::InvalidRecord { name, source, .. })) => {
                assert_eq!(name, "B1");
                assert!(matches!(*source, SheetError::CircularDependency { .. }));
            }
            other => panic!("expected invalid record, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_load_leaves_existing_store_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.xml");
        std::fs::write(&path, "<spreadsheet version=\"default\"><cell></spreadsheet>").unwrap();

        let mut sheet = Spreadsheet::new();
        sheet.set_contents("A1", "1").unwrap();
        let result = Spreadsheet::open(&path, SheetRules::default());
        assert!(matches!(result, Err(SheetError::Persistence(_))));
        assert_eq!(sheet.contents("A1").unwrap(), Content::Number(1.0));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Spreadsheet::open(&dir.path().join("nope.tally"), SheetRules::default());
        assert!(matches!(
            err,
            Err(SheetError::Persistence(PersistenceError::Io(_)))
        ));
    }
}
