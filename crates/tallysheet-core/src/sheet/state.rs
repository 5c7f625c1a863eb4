use crate::config::SheetRules;
use crate::error::{Result, SheetError};
use std::collections::{HashMap, HashSet};
use tallysheet_engine::engine::{DependencyGraph, Expression, FormatError};

use super::cell::{Cell, Content, Value, compare_names, is_cell_name};

/// The cell store.
///
/// Owns the cells, their computed values and the dependency graph linking
/// formula cells to the cells they reference. An edge `(v, name)` in the
/// graph means the formula in `name` references `v`.
pub struct Spreadsheet {
    /// Non-empty cells by normalized name
    pub(crate) cells: HashMap<String, Cell>,
    pub(crate) graph: DependencyGraph<String>,
    pub(crate) rules: SheetRules,
    /// Whether the store has been modified since it was created, loaded or saved
    pub(crate) changed: bool,
}

impl Spreadsheet {
    /// Create an empty store with the default rules.
    pub fn new() -> Self {
        Self::with_rules(SheetRules::default())
    }

    pub fn with_rules(rules: SheetRules) -> Self {
        Spreadsheet {
            cells: HashMap::new(),
            graph: DependencyGraph::new(),
            rules,
            changed: false,
        }
    }

    pub fn rules(&self) -> &SheetRules {
        &self.rules
    }

    pub fn version(&self) -> &str {
        self.rules.version()
    }

    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Normalize `name` and check it against the naming grammar and the
    /// configured validator.
    pub fn normalize_name(&self, name: &str) -> Result<String> {
        let normalized = self.rules.normalize(name);
        if is_cell_name(&normalized) && self.rules.is_valid(&normalized) {
            Ok(normalized)
        } else {
            Err(SheetError::InvalidName(name.to_string()))
        }
    }

    /// Build a formula whose variables are all valid cell names under this
    /// store's rules.
    pub(crate) fn parse_formula(&self, text: &str) -> std::result::Result<Expression, FormatError> {
        Expression::with_rules(
            text,
            |name: &str| self.rules.normalize(name),
            |name: &str| is_cell_name(name) && self.rules.is_valid(name),
        )
    }

    /// Content of a cell; empty text for a valid name that was never set.
    pub fn contents(&self, name: &str) -> Result<Content> {
        let name = self.normalize_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map_or_else(Content::empty, |cell| cell.content.clone()))
    }

    /// Content of a cell in the textual form accepted by
    /// [`set_contents`](Self::set_contents).
    pub fn contents_string(&self, name: &str) -> Result<String> {
        Ok(self.contents(name)?.to_input_string())
    }

    /// Value of a cell; empty text for a valid name that was never set.
    pub fn value(&self, name: &str) -> Result<Value> {
        let name = self.normalize_name(name)?;
        Ok(self.value_of(&name))
    }

    /// Value lookup for an already-normalized name.
    pub(crate) fn value_of(&self, name: &str) -> Value {
        self.cells
            .get(name)
            .map_or_else(Value::empty, |cell| cell.value.clone())
    }

    /// Names of every non-empty cell, in sheet order.
    pub fn names_of_nonempty_cells(&self) -> Vec<String> {
        let mut names: Vec<String> = self.cells.keys().cloned().collect();
        names.sort_by(|a, b| compare_names(a, b));
        names
    }

    /// Cells whose formulas reference `name` directly.
    pub fn direct_dependents(&self, name: &str) -> Result<HashSet<String>> {
        let name = self.normalize_name(name)?;
        Ok(self.graph.get_dependents(&name))
    }

    /// Cells referenced directly by the formula in `name`.
    pub fn direct_dependees(&self, name: &str) -> Result<HashSet<String>> {
        let name = self.normalize_name(name)?;
        Ok(self.graph.get_dependees(&name))
    }

    pub fn has_dependees(&self, name: &str) -> Result<bool> {
        let name = self.normalize_name(name)?;
        Ok(self.graph.has_dependees(&name))
    }

    pub fn has_dependents(&self, name: &str) -> Result<bool> {
        let name = self.normalize_name(name)?;
        Ok(self.graph.has_dependents(&name))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Default for Spreadsheet {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Spreadsheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spreadsheet")
            .field("version", &self.version())
            .field("cells", &self.cells.len())
            .field("edges", &self.graph.size())
            .field("changed", &self.changed)
            .finish()
    }
}
