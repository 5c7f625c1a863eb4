//! Bidirectional dependency graph.
//!
//! Stores ordered pairs `(s, t)` meaning "t depends on s" (s must be
//! evaluated before t). Two adjacency maps are kept in step so both
//! directions enumerate cheaply:
//!
//! - `dependents[s]` holds every `t` with `(s, t)` in the graph
//! - `dependees[t]` holds every `s` with `(s, t)` in the graph
//!
//! For example, after adding `("a", "b")`, `("a", "c")`, `("b", "d")` and
//! `("d", "d")`:
//!
//! ```
//! use tallysheet_engine::engine::DependencyGraph;
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_dependency("a", "b");
//! graph.add_dependency("a", "c");
//! graph.add_dependency("b", "d");
//! graph.add_dependency("d", "d");
//!
//! assert_eq!(graph.size(), 4);
//! assert_eq!(graph.dependees_count(&"d"), 2);
//! assert!(graph.has_dependents(&"a"));
//! assert!(!graph.has_dependees(&"a"));
//! ```
//!
//! The graph knows nothing about cells, formulas or cycles.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// A many-to-many relation over opaque keys.
#[derive(Debug, Clone)]
pub struct DependencyGraph<K = String>
where
    K: Eq + Hash + Clone,
{
    /// s -> keys that depend on s
    dependents: HashMap<K, HashSet<K>>,
    /// t -> keys that t depends on
    dependees: HashMap<K, HashSet<K>>,
    size: usize,
}

impl<K> Default for DependencyGraph<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        DependencyGraph {
            dependents: HashMap::new(),
            dependees: HashMap::new(),
            size: 0,
        }
    }
}

impl<K> DependencyGraph<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ordered pairs in the graph.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of dependees of `s` (how many keys `s` depends on).
    pub fn dependees_count(&self, s: &K) -> usize {
        self.dependees.get(s).map_or(0, HashSet::len)
    }

    pub fn has_dependents(&self, s: &K) -> bool {
        self.dependents.get(s).is_some_and(|set| !set.is_empty())
    }

    pub fn has_dependees(&self, s: &K) -> bool {
        self.dependees.get(s).is_some_and(|set| !set.is_empty())
    }

    /// Keys that depend on `s`.
    pub fn dependents(&self, s: &K) -> impl Iterator<Item = &K> + '_ {
        self.dependents.get(s).into_iter().flatten()
    }

    /// Keys that `s` depends on.
    pub fn dependees(&self, s: &K) -> impl Iterator<Item = &K> + '_ {
        self.dependees.get(s).into_iter().flatten()
    }

    /// Owned copy of the dependents of `s`.
    pub fn get_dependents(&self, s: &K) -> HashSet<K> {
        self.dependents(s).cloned().collect()
    }

    /// Owned copy of the dependees of `s`.
    pub fn get_dependees(&self, s: &K) -> HashSet<K> {
        self.dependees(s).cloned().collect()
    }

    pub fn contains(&self, s: &K, t: &K) -> bool {
        self.dependents.get(s).is_some_and(|set| set.contains(t))
    }

    /// Add `(s, t)`. No-op when already present.
    pub fn add_dependency(&mut self, s: K, t: K) {
        if self.contains(&s, &t) {
            return;
        }
        self.dependees.entry(t.clone()).or_default().insert(s.clone());
        self.dependents.entry(s).or_default().insert(t);
        self.size += 1;
    }

    /// Remove `(s, t)`. No-op when absent.
    pub fn remove_dependency(&mut self, s: &K, t: &K) {
        let removed = match self.dependents.get_mut(s) {
            Some(set) => set.remove(t),
            None => false,
        };
        if !removed {
            return;
        }
        Self::prune(&mut self.dependents, s);
        if let Some(set) = self.dependees.get_mut(t) {
            set.remove(s);
        }
        Self::prune(&mut self.dependees, t);
        self.size -= 1;
    }

    /// Remove every `(s, *)`, then add `(s, t)` for each `t` in `new_dependents`.
    pub fn replace_dependents<I>(&mut self, s: &K, new_dependents: I)
    where
        I: IntoIterator<Item = K>,
    {
        for t in self.get_dependents(s) {
            self.remove_dependency(s, &t);
        }
        for t in new_dependents {
            self.add_dependency(s.clone(), t);
        }
    }

    /// Remove every `(*, s)`, then add `(t, s)` for each `t` in `new_dependees`.
    pub fn replace_dependees<I>(&mut self, s: &K, new_dependees: I)
    where
        I: IntoIterator<Item = K>,
    {
        for t in self.get_dependees(s) {
            self.remove_dependency(&t, s);
        }
        for t in new_dependees {
            self.add_dependency(t, s.clone());
        }
    }

    /// Drop empty adjacency sets so the maps only hold live keys.
    fn prune(map: &mut HashMap<K, HashSet<K>>, key: &K) {
        if map.get(key).is_some_and(HashSet::is_empty) {
            map.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&'static str]) -> HashSet<&'static str> {
        items.iter().copied().collect()
    }

    #[test]
    fn test_empty_graph() {
        let graph: DependencyGraph<&str> = DependencyGraph::new();
        assert_eq!(graph.size(), 0);
        assert!(graph.is_empty());
        assert_eq!(graph.dependees_count(&"a"), 0);
        assert!(!graph.has_dependents(&"a"));
        assert!(!graph.has_dependees(&"a"));
        assert!(graph.get_dependents(&"a").is_empty());
        assert!(graph.get_dependees(&"a").is_empty());
    }

    #[test]
    fn test_add_dependency_updates_both_views() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("a", "b");
        assert_eq!(graph.size(), 1);
        assert_eq!(graph.get_dependents(&"a"), set(&["b"]));
        assert_eq!(graph.get_dependees(&"b"), set(&["a"]));
        assert!(graph.get_dependees(&"a").is_empty());
        assert!(graph.get_dependents(&"b").is_empty());
    }

    #[test]
    fn test_add_duplicate_is_noop() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("a", "b");
        graph.add_dependency("a", "b");
        assert_eq!(graph.size(), 1);
        assert_eq!(graph.dependees_count(&"b"), 1);
    }

    #[test]
    fn test_add_then_remove_restores_size() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("x", "y");
        let before = graph.size();
        graph.add_dependency("s", "t");
        graph.remove_dependency(&"s", &"t");
        assert_eq!(graph.size(), before);
        assert!(!graph.get_dependents(&"s").contains("t"));
        assert!(!graph.get_dependees(&"t").contains("s"));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("a", "b");
        graph.remove_dependency(&"a", &"c");
        graph.remove_dependency(&"z", &"b");
        assert_eq!(graph.size(), 1);
    }

    #[test]
    fn test_self_dependency() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("d", "d");
        assert_eq!(graph.get_dependents(&"d"), set(&["d"]));
        assert_eq!(graph.get_dependees(&"d"), set(&["d"]));
        graph.remove_dependency(&"d", &"d");
        assert!(graph.is_empty());
    }

    #[test]
    fn test_replace_dependents() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("a", "b");
        graph.add_dependency("a", "c");
        graph.add_dependency("x", "b");

        graph.replace_dependents(&"a", ["c", "d", "e"]);
        assert_eq!(graph.get_dependents(&"a"), set(&["c", "d", "e"]));
        assert_eq!(graph.get_dependees(&"b"), set(&["x"]));
        assert_eq!(graph.get_dependees(&"d"), set(&["a"]));
        assert_eq!(graph.size(), 4);
    }

    #[test]
    fn test_replace_dependees() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("a", "t");
        graph.add_dependency("b", "t");
        graph.add_dependency("b", "u");

        graph.replace_dependees(&"t", ["c"]);
        assert_eq!(graph.get_dependees(&"t"), set(&["c"]));
        assert!(!graph.get_dependents(&"a").contains("t"));
        assert_eq!(graph.get_dependents(&"b"), set(&["u"]));
        assert_eq!(graph.size(), 2);

        graph.replace_dependees(&"t", []);
        assert!(!graph.has_dependees(&"t"));
        assert_eq!(graph.size(), 1);
    }

    #[test]
    fn test_replace_on_unknown_key_only_adds() {
        let mut graph = DependencyGraph::new();
        graph.replace_dependents(&"new", ["a", "b"]);
        graph.replace_dependees(&"other", ["a"]);
        assert_eq!(graph.size(), 3);
    }

    #[test]
    fn test_views_stay_synchronized() {
        let mut graph = DependencyGraph::new();
        let keys = ["a", "b", "c", "d", "e"];
        for (i, s) in keys.iter().enumerate() {
            for t in keys.iter().skip(i) {
                graph.add_dependency(*s, *t);
            }
        }
        graph.remove_dependency(&"a", &"c");
        graph.replace_dependents(&"b", ["a"]);
        graph.replace_dependees(&"e", ["a", "c"]);

        let mut forward = 0;
        for s in keys {
            for t in graph.dependents(&s) {
                assert!(graph.get_dependees(t).contains(s));
                forward += 1;
            }
        }
        let backward: usize = keys.iter().map(|t| graph.dependees_count(t)).sum();
        assert_eq!(forward, graph.size());
        assert_eq!(backward, graph.size());
    }
}
