//! Per-player token marks.

use crate::game::SlotId;

/// One player's row of the token matrix: `combo_size` cells, each holding
/// the slot the mark sits on. A claim is ready when every cell is occupied.
#[derive(Debug, Clone)]
pub struct MarkSet {
    cells: Vec<Option<SlotId>>,
}

impl MarkSet {
    pub fn new(combo_size: usize) -> Self {
        Self {
            cells: vec![None; combo_size],
        }
    }

    /// Index of the first free cell, or `None` when all marks are placed.
    pub fn free_cell(&self) -> Option<usize> {
        self.cells.iter().position(Option::is_none)
    }

    /// Whether this player marks `slot`.
    pub fn contains(&self, slot: SlotId) -> bool {
        self.cells.contains(&Some(slot))
    }

    /// Put a mark on `slot` in the first free cell. No-op when the slot is
    /// already marked or no cell is free; returns whether a mark was added.
    pub fn place(&mut self, slot: SlotId) -> bool {
        if self.contains(slot) {
            return false;
        }
        match self.free_cell() {
            Some(cell) => {
                self.cells[cell] = Some(slot);
                true
            }
            None => false,
        }
    }

    /// Remove the mark on `slot` if present; returns whether it existed.
    pub fn remove(&mut self, slot: SlotId) -> bool {
        match self.cells.iter().position(|c| *c == Some(slot)) {
            Some(cell) => {
                self.cells[cell] = None;
                true
            }
            None => false,
        }
    }

    /// Drop every mark.
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// All cells occupied: the K-th mark is down.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Number of marks currently placed.
    pub fn count(&self) -> usize {
        self.cells.iter().flatten().count()
    }

    /// The marked slots, in cell order.
    pub fn slots(&self) -> Vec<SlotId> {
        self.cells.iter().copied().flatten().collect()
    }
}
