//! The cell store: contents, values, dependencies and recalculation.

mod cell;
mod io;
mod ops;
mod state;

pub use cell::{Content, Value, is_cell_name};
pub use io::saved_version;
pub use state::Spreadsheet;
