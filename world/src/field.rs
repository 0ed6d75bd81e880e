//! Dense cell grid backing the playing field.
//!
//! The field is deliberately dumb: cell storage plus bounds-checked
//! accessors. Movement and collision policy live in the world's tick
//! algorithm so the field never has to know what a snake is.

use snake_arena_core::{CellCoord, FoodId, GridSize, SnakeId};

/// Exclusive state of a single cell at a tick boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellState {
    /// Nothing occupies the cell.
    Empty,
    /// A segment of the identified snake occupies the cell.
    Snake(SnakeId),
    /// The identified food occupies the cell.
    Food(FoodId),
}

/// Fixed-size grid of [`CellState`] values, addressed by column and row.
#[derive(Clone, Debug)]
pub struct Field {
    grid: GridSize,
    cells: Vec<CellState>,
}

impl Field {
    pub(crate) fn new(grid: GridSize) -> Self {
        let cells = vec![CellState::Empty; grid.columns() as usize * grid.rows() as usize];
        Self { grid, cells }
    }

    /// Dimensions of the field.
    #[must_use]
    pub const fn grid(&self) -> GridSize {
        self.grid
    }

    /// State of the cell at the given coordinate.
    ///
    /// Returns `None` for coordinates outside the field, letting callers use
    /// the bounds check as part of wall-collision resolution.
    #[must_use]
    pub fn state(&self, cell: CellCoord) -> Option<CellState> {
        self.grid
            .contains(cell)
            .then(|| self.cells[self.index(cell)])
    }

    /// Overwrites the state of an in-bounds cell.
    ///
    /// Writing outside the field is a contract violation on the caller's
    /// side, not a simulation outcome, and aborts with a panic.
    pub(crate) fn set_state(&mut self, cell: CellCoord, state: CellState) {
        assert!(
            self.grid.contains(cell),
            "cell ({}, {}) lies outside the {}x{} field",
            cell.column(),
            cell.row(),
            self.grid.columns(),
            self.grid.rows()
        );
        let index = self.index(cell);
        self.cells[index] = state;
    }

    fn index(&self, cell: CellCoord) -> usize {
        cell.row() as usize * self.grid.columns() as usize + cell.column() as usize
    }
}
