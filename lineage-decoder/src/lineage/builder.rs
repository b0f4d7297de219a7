//! Lineage tree reconstruction
//!
//! The export does not store parent pointers. Cells are written depth-first,
//! and parenthood has to be recovered from record order plus the two division
//! flags of each record:
//!
//! - A cell with `cells_left == 1` is immediately followed by its left
//!   daughter, so it becomes the *open parent* of the next record.
//!   `cells_left == 0` closes the slot; `-1` leaves it untouched.
//! - A cell with `cells_right == 1` is registered under its generation birth
//!   time. A later record without an open parent whose birth time matches is
//!   the right daughter, and its parent is the parent of the registered cell.
//!
//! Matching by birth time is a heuristic: unrelated cells that share a birth
//! time get linked together. Every candidate is kept per birth time so that
//! such ties are reported as [`SiblingAmbiguity`] instead of passing silently.
//! The most recent candidate still decides the link.
//!
//! Parents are always linked before their children, so parent ids are
//! strictly smaller than child ids and the forest cannot contain cycles.

use crate::lineage::forest::{CellNode, LineageForest, NameIndex};
use crate::types::{Cell, CellId, DaughterFlag};
use std::collections::HashMap;

/// How a record's parent was determined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Daughter of the open parent slot
    OpenParent,
    /// Right daughter matched through a sibling's birth time
    SiblingBirthTime,
    /// No parent could be determined
    Root,
}

/// A birth-time match with more than one plausible sibling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingAmbiguity {
    /// The record being linked
    pub cell: CellId,
    pub birth_time: i64,
    /// Every cell registered under this birth time, oldest first
    pub candidates: Vec<CellId>,
    /// The candidate whose parent was used
    pub chosen: CellId,
    /// Earlier records already linked through this birth time
    pub previous_matches: usize,
}

/// Outcome of linking one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub parent: Option<CellId>,
    pub kind: LinkKind,
    pub ambiguity: Option<SiblingAmbiguity>,
}

#[derive(Debug, Clone, Default)]
struct PendingSiblings {
    candidates: Vec<CellId>,
    matches: usize,
}

/// The two bookkeeping slots carried across the sequential scan
#[derive(Debug, Clone, Default)]
pub struct LinkState {
    open_parent: Option<CellId>,
    pending_siblings: HashMap<i64, PendingSiblings>,
}

impl LinkState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell currently expecting its left daughter next
    pub fn open_parent(&self) -> Option<CellId> {
        self.open_parent
    }

    /// Resolve the parent of record `id` and update the state from its flags
    ///
    /// `nodes` holds every record linked so far; it is only read to find the
    /// parent of a matched sibling.
    pub fn link(&mut self, id: CellId, cell: &Cell, nodes: &[CellNode]) -> Link {
        let link = self.resolve(id, cell, nodes);

        match cell.cells_left {
            DaughterFlag::Present => self.open_parent = Some(id),
            DaughterFlag::Absent => self.open_parent = None,
            DaughterFlag::Unknown => {}
        }

        if cell.cells_right == DaughterFlag::Present {
            if let Some(birth_time) = cell.generation_birth_time {
                self.pending_siblings
                    .entry(birth_time)
                    .or_default()
                    .candidates
                    .push(id);
            }
        }

        link
    }

    fn resolve(&mut self, id: CellId, cell: &Cell, nodes: &[CellNode]) -> Link {
        if let Some(parent) = self.open_parent {
            return Link {
                parent: Some(parent),
                kind: LinkKind::OpenParent,
                ambiguity: None,
            };
        }

        let root = Link {
            parent: None,
            kind: LinkKind::Root,
            ambiguity: None,
        };

        let Some(birth_time) = cell.generation_birth_time else {
            return root;
        };
        let Some(pending) = self.pending_siblings.get_mut(&birth_time) else {
            return root;
        };
        let Some(&sibling) = pending.candidates.last() else {
            return root;
        };

        let ambiguity = if pending.candidates.len() > 1 || pending.matches > 0 {
            Some(SiblingAmbiguity {
                cell: id,
                birth_time,
                candidates: pending.candidates.clone(),
                chosen: sibling,
                previous_matches: pending.matches,
            })
        } else {
            None
        };
        pending.matches += 1;

        match nodes.get(sibling.index()).and_then(|node| node.parent) {
            Some(parent) => Link {
                parent: Some(parent),
                kind: LinkKind::SiblingBirthTime,
                ambiguity,
            },
            None => {
                log::trace!(
                    "Sibling {} of {} has no parent, leaving it as a root",
                    sibling,
                    cell
                );
                Link { ambiguity, ..root }
            }
        }
    }
}

/// Incrementally links parsed cells into a [`LineageForest`]
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<CellNode>,
    cells: NameIndex,
    valid_cells: NameIndex,
    invalid_cells: NameIndex,
    rejected: Vec<CellId>,
    last_frame: u32,
    ambiguities: Vec<SiblingAmbiguity>,
    state: LinkState,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link the next record in file order and store it
    pub fn push(&mut self, cell: Cell) -> CellId {
        let id = CellId(self.nodes.len());
        let link = self.state.link(id, &cell, &self.nodes);

        log::trace!("{} ({}) linked as {:?} to {:?}", cell, id, link.kind, link.parent);

        if let Some(ambiguity) = link.ambiguity {
            log::warn!(
                "Ambiguous sibling match for {}: {} cells share birth time {}, using {}",
                cell,
                ambiguity.candidates.len(),
                ambiguity.birth_time,
                self.nodes[ambiguity.chosen.index()].cell
            );
            self.ambiguities.push(ambiguity);
        }

        if let Some(parent) = link.parent {
            let parent_node = &mut self.nodes[parent.index()];
            if cell.valid
                && parent_node.cell.valid
                && cell.birth_frame < parent_node.cell.birth_frame
            {
                log::warn!(
                    "{} is born at frame {} before its parent {} (frame {})",
                    cell,
                    cell.birth_frame,
                    parent_node.cell,
                    parent_node.cell.birth_frame
                );
            }
            parent_node.children.push(id);
        }

        if self.cells.insert(&cell.generic_name, id).is_some() {
            log::debug!("Duplicate generic name {:?}, later record wins", cell.generic_name);
        }

        if cell.valid {
            self.valid_cells.insert(&cell.generic_name, id);
            self.last_frame = self.last_frame.max(cell.last_frame);
        } else {
            if let Some(diagnostic) = &cell.diagnostic {
                log::warn!("Rejected {}", diagnostic);
            }
            self.invalid_cells.insert(&cell.generic_name, id);
            self.rejected.push(id);
        }

        self.nodes.push(CellNode {
            cell,
            parent: link.parent,
            children: Vec::new(),
        });
        id
    }

    pub fn finish(self) -> LineageForest {
        log::debug!(
            "Linked {} records ({} ambiguous sibling matches)",
            self.nodes.len(),
            self.ambiguities.len()
        );
        LineageForest {
            nodes: self.nodes,
            cells: self.cells,
            valid_cells: self.valid_cells,
            invalid_cells: self.invalid_cells,
            rejected: self.rejected,
            last_frame: self.last_frame,
            ambiguities: self.ambiguities,
        }
    }
}
