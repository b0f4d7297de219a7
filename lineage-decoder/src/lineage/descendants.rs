//! Descendant lookup
//!
//! [`collect`] is a pure depth-first walk over the forest. [`DescendantIndex`]
//! memoizes its results outside the forest, so the forest itself stays
//! immutable and can be shared across threads.

use crate::lineage::forest::LineageForest;
use crate::types::CellId;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Transitive children of a cell, keyed by generic name
pub type Descendants = BTreeMap<String, CellId>;

/// Collect every transitive child of `id`
///
/// Each node is visited at most once, so a malformed link structure cannot
/// make the walk loop forever. The start node is never part of the result.
pub fn collect(forest: &LineageForest, id: CellId) -> Descendants {
    let mut descendants = Descendants::new();
    let mut visited = HashSet::from([id]);
    let mut stack: Vec<CellId> = forest.children(id).iter().rev().copied().collect();

    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        descendants.insert(forest.cell(current).generic_name.clone(), current);
        stack.extend(forest.children(current).iter().rev().copied());
    }

    descendants
}

/// Memo cache for [`collect`]
#[derive(Debug, Default)]
pub struct DescendantIndex {
    cache: HashMap<CellId, Arc<Descendants>>,
}

impl DescendantIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descendants of `id`, computed on first request
    pub fn get(&mut self, forest: &LineageForest, id: CellId) -> Arc<Descendants> {
        self.cache
            .entry(id)
            .or_insert_with(|| Arc::new(collect(forest, id)))
            .clone()
    }

    /// Drop every cached result (needed when switching to another forest)
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineage::forest::CellNode;
    use crate::types::{Cell, DaughterFlag};

    fn chain() -> LineageForest {
        let named = |name: &str, left| Cell {
            generic_name: name.to_string(),
            cells_left: left,
            ..Cell::default()
        };
        LineageForest::from_cells(vec![
            named("P", DaughterFlag::Present),
            named("C", DaughterFlag::Present),
            named("G", DaughterFlag::Absent),
        ])
    }

    #[test]
    fn test_three_level_chain() {
        let forest = chain();
        let p = forest.get("P").unwrap();
        let c = forest.get("C").unwrap();
        let g = forest.get("G").unwrap();

        let from_p = collect(&forest, p);
        assert_eq!(from_p.keys().collect::<Vec<_>>(), vec!["C", "G"]);
        assert_eq!(from_p["G"], g);

        let from_c = collect(&forest, c);
        assert_eq!(from_c.len(), 1);
        assert_eq!(from_c["G"], g);

        assert!(collect(&forest, g).is_empty());
    }

    #[test]
    fn test_cycle_is_walked_once() {
        let mut forest = chain();
        // Corrupt the tree on purpose: G -> P
        let p = forest.get("P").unwrap();
        let g = forest.get("G").unwrap();
        let g_node: &mut CellNode = &mut forest.nodes[g.index()];
        g_node.children.push(p);

        let from_p = collect(&forest, p);
        assert_eq!(from_p.len(), 2);
        assert!(!from_p.contains_key("P"));

        let from_g = collect(&forest, g);
        assert_eq!(from_g.keys().collect::<Vec<_>>(), vec!["C", "P"]);
    }

    #[test]
    fn test_index_caches_until_invalidated() {
        let forest = chain();
        let p = forest.get("P").unwrap();
        let mut index = DescendantIndex::new();

        let first = index.get(&forest, p);
        let second = index.get(&forest, p);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, forest.descendants(p));
        assert_eq!(index.len(), 1);

        index.invalidate();
        assert!(index.is_empty());
    }
}
