//! tallysheet_engine - Formula engine + dependency graph.

pub mod engine;
