//! Grid index.
//!
//! A fixed `N×N` array of optional entity ids: the sole routing structure
//! between coordinates and entities.

use serde::{Deserialize, Serialize};

use crate::game::entities::EntityId;
use crate::game::types::{Position, Size};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    size: i32,
    cells: Vec<Option<EntityId>>,
}

impl Grid {
    pub fn new(size: usize) -> Self {
        Self {
            size: size as i32,
            cells: vec![None; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size as usize
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.size && pos.y < self.size
    }

    pub fn footprint_in_bounds(&self, anchor: Position, size: Size) -> bool {
        size.cells(anchor).all(|c| self.in_bounds(c))
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos).then(|| (pos.y * self.size + pos.x) as usize)
    }

    pub fn position_of(&self, index: usize) -> Position {
        let i = index as i32;
        Position::new(i % self.size, i / self.size)
    }

    /// Occupant of `pos`; `None` for empty or out-of-bounds cells.
    pub fn get(&self, pos: Position) -> Option<EntityId> {
        self.index(pos).and_then(|i| self.cells[i])
    }

    pub fn is_free(&self, pos: Position) -> bool {
        self.in_bounds(pos) && self.get(pos).is_none()
    }

    pub(crate) fn set(&mut self, pos: Position, id: EntityId) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = Some(id);
        }
    }

    /// Clears `pos` only if it still points at `id`.
    pub(crate) fn clear_if(&mut self, pos: Position, id: EntityId) -> bool {
        match self.index(pos) {
            Some(i) if self.cells[i] == Some(id) => {
                self.cells[i] = None;
                true
            }
            _ => false,
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// All in-bounds positions, row by row.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.cells.len()).map(|i| self.position_of(i))
    }

    pub fn free_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions().filter(|p| self.get(*p).is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_generation_size() {
        let grid = Grid::new(10);
        assert_eq!(grid.cell_count(), 100);
        assert_eq!(grid.positions().count(), 100);
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_clear_if_leaves_reassigned_cells_alone() {
        let mut grid = Grid::new(4);
        let pos = Position::new(1, 2);
        grid.set(pos, EntityId(1));
        grid.set(pos, EntityId(2));
        assert!(!grid.clear_if(pos, EntityId(1)));
        assert_eq!(grid.get(pos), Some(EntityId(2)));
        assert!(grid.clear_if(pos, EntityId(2)));
        assert!(grid.is_free(pos));
    }

    #[test]
    fn test_out_of_bounds_reads_are_empty() {
        let grid = Grid::new(3);
        assert_eq!(grid.get(Position::new(-1, 0)), None);
        assert!(!grid.is_free(Position::new(3, 0)));
        assert!(!grid.footprint_in_bounds(Position::new(2, 0), Size::WIDE));
    }
}
