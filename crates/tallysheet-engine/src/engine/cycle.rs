//! Recalculation ordering and circular dependency detection.
//!
//! Both come from one depth-first walk over the "depends on me" direction.
//! Starting from an edited key, every key reachable through dependents is
//! visited once and emitted after all of its own dependents, and the
//! reversed emission order puts dependees before dependents. Reaching the
//! start key again means the edit closes a loop.
//!
//! The walk takes the dependents relation as a function so the same code
//! can run against a prospective edge set (before an edit is committed) and
//! against the committed graph.

use std::collections::HashSet;
use std::hash::Hash;

use super::graph::DependencyGraph;

/// A loop found while ordering, listed from the start key back to itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle<K> {
    pub path: Vec<K>,
}

/// Order every key reachable from `start` through `dependents` so that each
/// key comes after everything it depends on. `start` is always first.
///
/// Fails with the offending path when `start` is reachable from itself.
pub fn recalculation_order<K, F, I>(start: &K, dependents: F) -> Result<Vec<K>, Cycle<K>>
where
    K: Eq + Hash + Clone,
    F: Fn(&K) -> I,
    I: IntoIterator<Item = K>,
{
    let mut visited: HashSet<K> = HashSet::new();
    let mut finished: Vec<K> = Vec::new();
    // Each frame is a key on the current path plus the dependents still to visit.
    let mut stack: Vec<(K, std::vec::IntoIter<K>)> = Vec::new();

    visited.insert(start.clone());
    stack.push((start.clone(), collect(&dependents, start)));

    loop {
        let next = match stack.last_mut() {
            Some((_, pending)) => pending.next(),
            None => break,
        };
        match next {
            Some(next) if next == *start => {
                let mut path: Vec<K> = stack.iter().map(|(key, _)| key.clone()).collect();
                path.push(next);
                return Err(Cycle { path });
            }
            Some(next) => {
                if visited.insert(next.clone()) {
                    let children = collect(&dependents, &next);
                    stack.push((next, children));
                }
            }
            None => {
                if let Some((key, _)) = stack.pop() {
                    finished.push(key);
                }
            }
        }
    }

    finished.reverse();
    Ok(finished)
}

fn collect<K, F, I>(dependents: &F, key: &K) -> std::vec::IntoIter<K>
where
    F: Fn(&K) -> I,
    I: IntoIterator<Item = K>,
{
    dependents(key).into_iter().collect::<Vec<_>>().into_iter()
}

/// Order the committed graph from `start`; see [`recalculation_order`].
pub fn cells_to_recalculate<K>(graph: &DependencyGraph<K>, start: &K) -> Result<Vec<K>, Cycle<K>>
where
    K: Eq + Hash + Clone,
{
    recalculation_order(start, |key: &K| graph.get_dependents(key))
}

/// Detect whether `start` sits on a loop in the committed graph.
/// Returns the loop path if one is found.
pub fn detect_cycle<K>(graph: &DependencyGraph<K>, start: &K) -> Option<Vec<K>>
where
    K: Eq + Hash + Clone,
{
    cells_to_recalculate(graph, start).err().map(|cycle| cycle.path)
}
