//! The reconstructed lineage forest
//!
//! Cells live in an arena indexed by [`CellId`]. Parent links are plain ids
//! pointing backwards into the arena, so the reverse edge never owns anything.
//! Three insertion-ordered name indices mirror how the export is usually
//! consumed: all cells, valid cells and rejected cells.

use crate::classify::{self, Quadrant};
use crate::interpolate;
use crate::lineage::builder::{SiblingAmbiguity, TreeBuilder};
use crate::lineage::descendants::{self, Descendants};
use crate::types::{Cell, CellId, RecordDiagnostic, Spot};
use std::collections::HashMap;

/// A cell together with its resolved links
#[derive(Debug, Clone)]
pub struct CellNode {
    pub cell: Cell,
    pub parent: Option<CellId>,
    /// Daughters in the order they were linked
    pub children: Vec<CellId>,
}

/// Insertion-ordered map from generic name to cell id
///
/// Re-inserting a name replaces the id but keeps the original position.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    order: Vec<String>,
    ids: HashMap<String, CellId>,
}

impl NameIndex {
    pub fn insert(&mut self, name: &str, id: CellId) -> Option<CellId> {
        let previous = self.ids.insert(name.to_string(), id);
        if previous.is_none() {
            self.order.push(name.to_string());
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<CellId> {
        self.ids.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate `(name, id)` pairs in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, CellId)> + '_ {
        self.order
            .iter()
            .map(move |name| (name.as_str(), self.ids[name]))
    }

    pub fn ids(&self) -> impl Iterator<Item = CellId> + '_ {
        self.iter().map(|(_, id)| id)
    }
}

/// Summary counts of a parsed forest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForestStats {
    pub num_cells: usize,
    pub num_valid: usize,
    pub num_invalid: usize,
    /// Rejected records, counting ones whose name was reused
    pub num_rejected: usize,
    pub num_roots: usize,
    pub num_ambiguities: usize,
    pub last_frame: u32,
}

/// The root aggregate produced by one parse pass
#[derive(Debug, Clone, Default)]
pub struct LineageForest {
    pub(crate) nodes: Vec<CellNode>,
    pub(crate) cells: NameIndex,
    pub(crate) valid_cells: NameIndex,
    pub(crate) invalid_cells: NameIndex,
    pub(crate) rejected: Vec<CellId>,
    pub(crate) last_frame: u32,
    pub(crate) ambiguities: Vec<SiblingAmbiguity>,
}

impl LineageForest {
    /// Link a sequence of parsed cells in order
    pub fn from_cells<I: IntoIterator<Item = Cell>>(cells: I) -> Self {
        let mut builder = TreeBuilder::new();
        for cell in cells {
            builder.push(cell);
        }
        builder.finish()
    }

    pub fn node(&self, id: CellId) -> &CellNode {
        &self.nodes[id.index()]
    }

    pub fn cell(&self, id: CellId) -> &Cell {
        &self.node(id).cell
    }

    pub fn parent(&self, id: CellId) -> Option<CellId> {
        self.node(id).parent
    }

    pub fn children(&self, id: CellId) -> &[CellId] {
        &self.node(id).children
    }

    /// Spots of a cell as parsed (empty for invalid cells)
    pub fn trajectory(&self, id: CellId) -> &[Spot] {
        &self.cell(id).spots
    }

    /// Look up the current cell for a generic name
    pub fn get(&self, name: &str) -> Option<CellId> {
        self.cells.get(name)
    }

    pub fn get_cell(&self, name: &str) -> Option<&Cell> {
        self.get(name).map(|id| self.cell(id))
    }

    /// Every named cell, in file order of first appearance
    pub fn cells(&self) -> &NameIndex {
        &self.cells
    }

    pub fn valid_cells(&self) -> &NameIndex {
        &self.valid_cells
    }

    pub fn invalid_cells(&self) -> &NameIndex {
        &self.invalid_cells
    }

    /// Every rejected record in file order, including unnamed or renamed ones
    pub fn rejected_ids(&self) -> &[CellId] {
        &self.rejected
    }

    /// Diagnostics of every rejected record
    pub fn rejected(&self) -> impl Iterator<Item = &RecordDiagnostic> + '_ {
        self.rejected
            .iter()
            .filter_map(move |&id| self.cell(id).diagnostic.as_ref())
    }

    /// Highest frame over all valid cells
    pub fn last_frame(&self) -> u32 {
        self.last_frame
    }

    /// Sibling matches that had more than one plausible candidate
    pub fn ambiguities(&self) -> &[SiblingAmbiguity] {
        &self.ambiguities
    }

    /// Total number of records linked, including overwritten names
    pub fn num_records(&self) -> usize {
        self.nodes.len()
    }

    /// Cells without a resolved parent
    pub fn roots(&self) -> Vec<CellId> {
        self.cells
            .ids()
            .filter(|&id| self.parent(id).is_none())
            .collect()
    }

    /// Valid cells without a resolved parent
    pub fn roots_valid(&self) -> Vec<CellId> {
        self.valid_cells
            .ids()
            .filter(|&id| self.parent(id).is_none())
            .collect()
    }

    pub fn stats(&self) -> ForestStats {
        ForestStats {
            num_cells: self.cells.len(),
            num_valid: self.valid_cells.len(),
            num_invalid: self.invalid_cells.len(),
            num_rejected: self.rejected.len(),
            num_roots: self.roots().len(),
            num_ambiguities: self.ambiguities.len(),
            last_frame: self.last_frame,
        }
    }

    /// All transitive children of a cell, keyed by generic name
    ///
    /// Recomputed on every call. Use a
    /// [`DescendantIndex`](crate::lineage::DescendantIndex) to memoize
    /// repeated lookups.
    pub fn descendants(&self, id: CellId) -> Descendants {
        descendants::collect(self, id)
    }

    pub fn quadrant(&self, id: CellId) -> Option<Quadrant> {
        classify::quadrant(&self.cell(id).generic_name)
    }

    pub fn quartet(&self, id: CellId) -> String {
        classify::quartet(&self.cell(id).generic_name)
    }

    /// Dense per-frame trajectory, see [`interpolate::interpolate`]
    pub fn interpolate(&self, id: CellId, fraction: f64) -> Vec<Spot> {
        interpolate::interpolate(self, id, fraction)
    }
}
