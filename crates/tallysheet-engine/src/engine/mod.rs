//! Formula engine API.
//!
//! This module provides the computation pieces the cell store is built on:
//!
//! - [`Token`], [`tokenize`], [`is_variable`] - Formula lexing
//! - [`Expression`] - Validated formulas with canonical form and evaluation
//! - [`FormatError`], [`EvalError`] - Construction and evaluation failures
//! - [`DependencyGraph`] - Bidirectional dependency relation
//! - [`recalculation_order`], [`cells_to_recalculate`], [`detect_cycle`] -
//!   Dependents traversal for ordering and circular dependency detection

mod cycle;
mod error;
mod eval;
mod expr;
mod graph;
mod token;

pub use cycle::{Cycle, cells_to_recalculate, detect_cycle, recalculation_order};
pub use error::{EvalError, FormatError};
pub use expr::Expression;
pub use graph::DependencyGraph;
pub use token::{Op, Token, is_variable, tokenize};
