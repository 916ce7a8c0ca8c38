//! Grid module - the board's cell matrix
//!
//! The grid is a `cols x rows` matrix of color ids stored as a flat, row-major
//! vector. Coordinates: `(x, y)` where `x` is the column and `y` the row, both
//! 0-based from the top-left.
//!
//! Pieces are anchored on their 3x3 matrix centre: matrix cell `(i, j)` lands on
//! grid cell `(anchor_x - 1 + i, anchor_y - 1 + j)`.

use std::collections::{BTreeSet, HashMap};

use crate::pieces::Piece;
use crate::types::{Cell, Coord, CURSOR_SENTINEL, EMPTY, N_COLORS, OUT_OF_BOUNDS};

/// The game grid
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cols: usize,
    rows: usize,
    /// Flat array of cells, row-major order (y * cols + x)
    cells: Vec<Cell>,
    /// Real values hidden under cursor overlays
    overlays: HashMap<(usize, usize), Cell>,
}

impl Grid {
    /// Create an empty grid
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![EMPTY; cols * rows],
            overlays: HashMap::new(),
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.cols || y as usize >= self.rows {
            return None;
        }
        Some(y as usize * self.cols + x as usize)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Value at `(x, y)`, or [`OUT_OF_BOUNDS`] (`-1`) off the board.
    ///
    /// Negative results are never colors.
    pub fn get(&self, x: i32, y: i32) -> i32 {
        self.cell(x, y).map(i32::from).unwrap_or(OUT_OF_BOUNDS)
    }

    /// Value at `(x, y)`, `None` off the board
    pub fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Write a cell.
    ///
    /// Returns false, leaving the grid untouched, if the coordinate is off the
    /// board or the value is not a valid color id.
    pub fn set(&mut self, x: i32, y: i32, value: Cell) -> bool {
        if value >= N_COLORS {
            return false;
        }
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = value;
                true
            }
            None => false,
        }
    }

    /// In range and empty
    pub fn is_empty_at(&self, x: i32, y: i32) -> bool {
        self.get(x, y) == EMPTY as i32
    }

    /// Check whether every shape cell of `piece`, centred on the anchor,
    /// lands on an in-range empty cell
    pub fn can_place(&self, piece: &Piece, anchor_x: i32, anchor_y: i32) -> bool {
        piece
            .cells()
            .iter()
            .all(|&(i, j)| self.is_empty_at(anchor_x - 1 + i, anchor_y - 1 + j))
    }

    /// Write the piece's color into every shape cell.
    ///
    /// Re-validates first; returns false and leaves the grid untouched when the
    /// piece does not fit.
    pub fn place(&mut self, piece: &Piece, anchor_x: i32, anchor_y: i32) -> bool {
        if !self.can_place(piece, anchor_x, anchor_y) {
            return false;
        }

        let color = piece.value();
        for &(i, j) in piece.cells().iter() {
            self.set(anchor_x - 1 + i, anchor_y - 1 + j, color);
        }
        true
    }

    /// Clear every cell (and forget any overlays)
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            *cell = EMPTY;
        }
        self.overlays.clear();
    }

    /// Draw the cursor sentinel at `(x, y)`, remembering the real value.
    ///
    /// Overlaying a cell that already carries an overlay keeps the first saved
    /// value. Returns false off the board.
    pub fn overlay(&mut self, x: i32, y: i32) -> bool {
        let Some(idx) = self.index(x, y) else {
            return false;
        };
        let current = self.cells[idx];
        self.overlays
            .entry((x as usize, y as usize))
            .or_insert(current);
        self.cells[idx] = CURSOR_SENTINEL;
        true
    }

    /// Restore the value saved by [`Grid::overlay`] at `(x, y)`.
    ///
    /// No-op (returns false) when that cell carries no overlay.
    pub fn clear_overlay(&mut self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        let Some(saved) = self.overlays.remove(&(x as usize, y as usize)) else {
            return false;
        };
        self.set(x, y, saved)
    }

    pub fn has_overlay(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && self.overlays.contains_key(&(x as usize, y as usize))
    }

    /// Every cell in row `y` is nonzero
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= self.rows {
            return false;
        }
        let start = y * self.cols;
        self.cells[start..start + self.cols]
            .iter()
            .all(|&cell| cell != EMPTY)
    }

    /// Every cell in column `x` is nonzero
    pub fn is_column_full(&self, x: usize) -> bool {
        if x >= self.cols {
            return false;
        }
        (0..self.rows).all(|y| self.cells[y * self.cols + x] != EMPTY)
    }

    /// Union of all cells lying on a full row or full column.
    ///
    /// A cell on both a full row and a full column appears once.
    pub fn full_line_cells(&self) -> BTreeSet<Coord> {
        let mut collected = BTreeSet::new();

        for y in (0..self.rows).filter(|&y| self.is_row_full(y)) {
            for x in 0..self.cols {
                collected.insert((x as i32, y as i32));
            }
        }

        for x in (0..self.cols).filter(|&x| self.is_column_full(x)) {
            for y in 0..self.rows {
                collected.insert((x as i32, y as i32));
            }
        }

        collected
    }

    /// Clear every full row and column at once.
    ///
    /// Returns the cleared cells in `(x, y)` order.
    pub fn clear_full_lines(&mut self) -> Vec<Coord> {
        let collected = self.full_line_cells();
        for &(x, y) in &collected {
            self.set(x, y, EMPTY);
        }
        collected.into_iter().collect()
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Count of nonzero cells
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell != EMPTY).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceKind;

    #[test]
    fn test_grid_index_calculation() {
        let grid = Grid::new(5, 4);
        assert_eq!(grid.index(0, 0), Some(0));
        assert_eq!(grid.index(4, 0), Some(4));
        assert_eq!(grid.index(0, 1), Some(5));
        assert_eq!(grid.index(4, 3), Some(19));
        assert_eq!(grid.index(-1, 0), None);
        assert_eq!(grid.index(5, 0), None);
        assert_eq!(grid.index(0, 4), None);
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut grid = Grid::new(5, 5);
        assert!(!grid.set(1, 1, N_COLORS));
        assert_eq!(grid.get(1, 1), 0);
        assert!(grid.set(1, 1, CURSOR_SENTINEL));
        assert_eq!(grid.get(1, 1), CURSOR_SENTINEL as i32);
    }

    #[test]
    fn test_overlay_keeps_first_saved_value() {
        let mut grid = Grid::new(5, 5);
        grid.set(3, 3, 7);

        assert!(grid.overlay(3, 3));
        assert!(grid.overlay(3, 3));
        assert_eq!(grid.get(3, 3), CURSOR_SENTINEL as i32);

        assert!(grid.clear_overlay(3, 3));
        assert_eq!(grid.get(3, 3), 7);
        assert!(!grid.has_overlay(3, 3));
    }

    #[test]
    fn test_independent_overlays_restore_their_own_cells() {
        let mut grid = Grid::new(5, 5);
        grid.set(0, 0, 2);
        grid.set(4, 4, 9);

        grid.overlay(0, 0);
        grid.overlay(4, 4);
        grid.clear_overlay(0, 0);
        grid.clear_overlay(4, 4);

        assert_eq!(grid.get(0, 0), 2);
        assert_eq!(grid.get(4, 4), 9);
    }

    #[test]
    fn test_corner_cell_counted_once() {
        let mut grid = Grid::new(5, 5);
        for i in 0..5 {
            grid.set(i, 0, 1);
            grid.set(0, i, 1);
        }

        let cells = grid.full_line_cells();
        assert_eq!(cells.len(), 9);
        assert!(cells.contains(&(0, 0)));
    }

    #[test]
    fn test_place_uses_piece_color() {
        let mut grid = Grid::new(5, 5);
        let piece = Piece::new(PieceKind::Plus);
        assert!(grid.place(&piece, 2, 2));
        assert_eq!(grid.get(2, 1), PieceKind::Plus.value() as i32);
        assert_eq!(grid.get(1, 1), 0);
        assert_eq!(grid.filled(), 5);
    }
}
