use super::Spreadsheet;
use super::cell::{Cell, Content, Value};
use crate::error::{Result, SheetError};
use std::collections::HashSet;
use tallysheet_engine::engine::{Cycle, Expression, cells_to_recalculate, recalculation_order};

impl Spreadsheet {
    /// Assign raw content to a cell.
    ///
    /// Returns the cell and everything that transitively depends on it, in
    /// recalculation order (dependees before dependents). Assigning the empty
    /// string deletes the cell.
    ///
    /// Fails without touching the store if the name is invalid, the formula
    /// is malformed, or the edit would create a circular dependency.
    pub fn set_contents(&mut self, name: &str, raw: &str) -> Result<Vec<String>> {
        let name = self.normalize_name(name)?;
        let content = Content::classify(raw, |text: &str| self.parse_formula(text))?;
        let variables: HashSet<String> = content
            .as_formula()
            .map(Expression::variable_set)
            .unwrap_or_default();

        let order = self
            .prospective_order(&name, &variables)
            .map_err(|cycle| {
                log::warn!(
                    "rejected {} = {:?}: circular dependency {}",
                    name,
                    raw,
                    cycle.path.join(" -> ")
                );
                SheetError::CircularDependency {
                    cell: name.clone(),
                    path: cycle.path,
                }
            })?;

        // Commit. The edge set the order was computed on is now the real one.
        self.graph.replace_dependees(&name, variables);
        if content.is_empty() {
            self.cells.remove(&name);
        } else {
            self.cells.insert(
                name.clone(),
                Cell {
                    content,
                    value: Value::empty(),
                },
            );
        }
        self.changed = true;
        self.recalculate(&order);

        log::debug!("set {}: {} cell(s) recalculated", name, order.len());
        Ok(order)
    }

    /// Recalculation order from `name` over the committed graph.
    pub fn cells_to_recalculate(&self, name: &str) -> Result<Vec<String>> {
        let name = self.normalize_name(name)?;
        cells_to_recalculate(&self.graph, &name).map_err(|cycle| SheetError::CircularDependency {
            cell: name.clone(),
            path: cycle.path,
        })
    }

    /// Order from `name` as if its dependees were replaced by `variables`.
    fn prospective_order(
        &self,
        name: &String,
        variables: &HashSet<String>,
    ) -> std::result::Result<Vec<String>, Cycle<String>> {
        recalculation_order(name, |key: &String| {
            let mut dependents = self.graph.get_dependents(key);
            if variables.contains(key) {
                dependents.insert(name.clone());
            } else {
                dependents.remove(name);
            }
            dependents
        })
    }

    /// Recompute the value of every listed cell, in order.
    pub(crate) fn recalculate(&mut self, order: &[String]) {
        for name in order {
            let value = match self.cells.get(name).map(|cell| &cell.content) {
                None => continue,
                Some(Content::Number(n)) => Value::Number(*n),
                Some(Content::Text(s)) => Value::Text(s.clone()),
                Some(Content::Formula(expr)) => {
                    // Only numbers resolve; text, errors and empty cells are undefined.
                    match expr.evaluate(|var| self.value_of(var).as_number()) {
                        Ok(n) => Value::Number(n),
                        Err(err) => Value::Error(err),
                    }
                }
            };
            if let Some(cell) = self.cells.get_mut(name) {
                cell.value = value;
            }
        }
    }
}
