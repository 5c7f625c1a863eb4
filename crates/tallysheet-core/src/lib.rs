//! tallysheet-core - Cell store, recalculation and snapshot storage.

pub mod config;
pub mod error;
pub mod sheet;
pub mod storage;
pub mod sync;

pub use config::{NameCase, SheetConfig, SheetRules};
pub use error::{PersistenceError, Result, SheetError};
pub use sheet::{Content, Spreadsheet, Value, is_cell_name, saved_version};
pub use sync::SharedSpreadsheet;

pub use tallysheet_engine::engine::{EvalError, Expression, FormatError};
