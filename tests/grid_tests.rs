//! Grid tests - placement, line clearing and the cursor overlay

use tetrecs::core::{Grid, Piece};
use tetrecs::types::{PieceKind, CURSOR_SENTINEL, EMPTY, GRID_COLS, GRID_ROWS};

fn all_orientations() -> Vec<Piece> {
    let mut pieces = Vec::new();
    for kind in PieceKind::ALL {
        let mut piece = Piece::new(kind);
        for _ in 0..4 {
            pieces.push(piece);
            piece = piece.rotated_cw();
        }
    }
    pieces
}

/// A few cells filled so that some placements collide
fn cluttered() -> Grid {
    let mut grid = Grid::new(GRID_COLS, GRID_ROWS);
    for (x, y) in [(0, 0), (2, 1), (4, 4), (1, 3)] {
        assert!(grid.set(x, y, 7));
    }
    grid
}

#[test]
fn test_can_place_iff_every_cell_in_range_and_empty() {
    let grid = cluttered();

    for piece in all_orientations() {
        for ay in -2..=(GRID_ROWS as i32 + 1) {
            for ax in -2..=(GRID_COLS as i32 + 1) {
                let expected = piece
                    .cells()
                    .iter()
                    .all(|&(dx, dy)| grid.get(ax - 1 + dx, ay - 1 + dy) == EMPTY as i32);
                assert_eq!(
                    grid.can_place(&piece, ax, ay),
                    expected,
                    "{} at ({}, {})",
                    piece,
                    ax,
                    ay
                );
            }
        }
    }
}

#[test]
fn test_failed_place_leaves_grid_untouched() {
    let mut grid = cluttered();
    let before = grid.clone();

    let plus = Piece::new(PieceKind::Plus);
    assert!(!grid.can_place(&plus, 2, 1));
    assert!(!grid.place(&plus, 2, 1));
    assert!(!grid.place(&plus, 0, 2));
    assert_eq!(grid, before);
}

#[test]
fn test_place_writes_piece_value() {
    let mut grid = Grid::new(GRID_COLS, GRID_ROWS);
    let line = Piece::new(PieceKind::Line);
    assert!(grid.place(&line, 2, 2));

    // Line is the middle column of its matrix: x = 2, rows 1..=3
    let value = line.value();
    for y in 1..=3 {
        assert_eq!(grid.get(2, y), value as i32);
    }
    assert_eq!(grid.filled(), 3);
}

#[test]
fn test_single_row_clear() {
    let mut grid = Grid::new(GRID_COLS, GRID_ROWS);
    for x in 0..GRID_COLS as i32 {
        grid.set(x, 3, 2);
    }
    grid.set(1, 0, 2);

    let cleared = grid.clear_full_lines();
    assert_eq!(cleared.len(), GRID_COLS);
    assert!(cleared.iter().all(|&(_, y)| y == 3));
    assert_eq!(grid.filled(), 1);
    assert_eq!(grid.get(1, 0), 2);
}

#[test]
fn test_row_and_column_share_corner() {
    let mut grid = Grid::new(GRID_COLS, GRID_ROWS);
    for i in 0..5 {
        if i != 2 {
            grid.set(i, 2, 1);
            grid.set(2, i, 1);
        }
    }
    assert!(grid.place(&Piece::new(PieceKind::Dot), 2, 2));

    let cleared = grid.clear_full_lines();
    assert_eq!(cleared.len(), 9);
    assert_eq!(grid.filled(), 0);
}

#[test]
fn test_overlay_round_trip() {
    let mut grid = cluttered();

    assert!(grid.overlay(0, 0));
    assert_eq!(grid.get(0, 0), CURSOR_SENTINEL as i32);
    assert!(grid.clear_overlay(0, 0));
    assert_eq!(grid.get(0, 0), 7);

    assert!(grid.overlay(3, 3));
    assert!(grid.clear_overlay(3, 3));
    assert_eq!(grid.get(3, 3), EMPTY as i32);
}

#[test]
fn test_overlapping_overlays_restore_their_own_cells() {
    let mut grid = cluttered();
    grid.overlay(0, 0);
    grid.overlay(3, 3);

    grid.clear_overlay(0, 0);
    grid.clear_overlay(3, 3);
    assert_eq!(grid.get(0, 0), 7);
    assert_eq!(grid.get(3, 3), EMPTY as i32);

    // Nothing outstanding: a second clear does nothing.
    assert!(!grid.clear_overlay(0, 0));
    assert_eq!(grid.get(0, 0), 7);
}

#[test]
fn test_out_of_range_reads_negative() {
    let grid = Grid::new(GRID_COLS, GRID_ROWS);
    assert_eq!(grid.get(-1, 0), -1);
    assert_eq!(grid.get(0, GRID_ROWS as i32), -1);
    assert_eq!(grid.cell(5, 5), None);
}
