//! A cell store shared between threads.
//!
//! The whole store sits behind one mutex. Each edit holds the lock for its
//! full validate, cycle-check, commit and recalculate sequence, so other
//! threads never observe a half-applied edit.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::Result;
use crate::sheet::{Content, Spreadsheet, Value};

#[derive(Clone, Default)]
pub struct SharedSpreadsheet {
    inner: Arc<Mutex<Spreadsheet>>,
}

impl SharedSpreadsheet {
    pub fn new(sheet: Spreadsheet) -> Self {
        SharedSpreadsheet {
            inner: Arc::new(Mutex::new(sheet)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Spreadsheet> {
        // Every edit is all-or-nothing; a poisoned store is still consistent.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` with shared access under the lock.
    pub fn with<R>(&self, f: impl FnOnce(&Spreadsheet) -> R) -> R {
        f(&self.lock())
    }

    /// Run `f` with exclusive access under the lock.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Spreadsheet) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn set_contents(&self, name: &str, raw: &str) -> Result<Vec<String>> {
        self.with_mut(|sheet| sheet.set_contents(name, raw))
    }

    pub fn contents(&self, name: &str) -> Result<Content> {
        self.with(|sheet| sheet.contents(name))
    }

    pub fn value(&self, name: &str) -> Result<Value> {
        self.with(|sheet| sheet.value(name))
    }
}

impl From<Spreadsheet> for SharedSpreadsheet {
    fn from(sheet: Spreadsheet) -> Self {
        Self::new(sheet)
    }
}

impl std::fmt::Debug for SharedSpreadsheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with(|sheet| f.debug_tuple("SharedSpreadsheet").field(sheet).finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SheetError;
    use std::thread;

    #[test]
    fn test_edits_from_many_threads() {
        let shared = SharedSpreadsheet::default();
        shared.set_contents("Z1", "=A1+A2+A3+A4+A5+A6+A7+A8").unwrap();

        let handles: Vec<_> = (1..=8)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    shared.set_contents(&format!("A{i}"), &i.to_string()).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.value("Z1").unwrap(), Value::Number(36.0));
    }

    #[test]
    fn test_competing_cycle_edits_leave_graph_acyclic() {
        let shared = SharedSpreadsheet::default();
        let a = {
            let shared = shared.clone();
            thread::spawn(move || shared.set_contents("A1", "=B1"))
        };
        let b = {
            let shared = shared.clone();
            thread::spawn(move || shared.set_contents("B1", "=A1"))
        };
        let results = [a.join().unwrap(), b.join().unwrap()];

        let rejected = results
            .iter()
            .filter(|r| matches!(r, Err(SheetError::CircularDependency { .. })))
            .count();
        assert_eq!(rejected, 1);
        shared.with(|sheet| {
            assert_eq!(sheet.len(), 1);
            for name in sheet.names_of_nonempty_cells() {
                assert!(sheet.cells_to_recalculate(&name).is_ok());
            }
        });
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let shared = SharedSpreadsheet::default();
        shared.set_contents("A1", "1").unwrap();
        let poisoner = shared.clone();
        let _ = thread::spawn(move || {
            poisoner.with_mut(|_| panic!("boom"));
        })
        .join();

        assert_eq!(shared.value("A1").unwrap(), Value::Number(1.0));
        shared.set_contents("A1", "2").unwrap();
        assert_eq!(shared.contents("A1").unwrap(), Content::Number(2.0));
    }
}
