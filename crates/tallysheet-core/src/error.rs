//! Error types for Tallysheet core.

use thiserror::Error;

use tallysheet_engine::engine::FormatError;

/// Errors raised by cell store edits and reads.
///
/// Every variant is raised before any state is touched, so a failed call
/// leaves the store exactly as it was.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Invalid cell name: {0:?}")]
    InvalidName(String),

    #[error("Invalid formula: {0}")]
    Format(#[from] FormatError),

    #[error("Circular dependency detected at {cell}: {}", .path.join(" -> "))]
    CircularDependency { cell: String, path: Vec<String> },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Errors raised while reading or writing snapshots and configuration.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Snapshot has no version tag")]
    MissingVersion,

    #[error("Version of the saved spreadsheet, {found:?}, does not match {expected:?}")]
    VersionMismatch { expected: String, found: String },

    #[error("Cannot restore {name} = {contents:?}: {source}")]
    InvalidRecord {
        name: String,
        contents: String,
        #[source]
        source: Box<SheetError>,
    },

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SheetError>;
