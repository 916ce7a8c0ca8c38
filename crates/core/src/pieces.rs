//! Pieces module - the catalog of 3x3 piece shapes
//!
//! Every piece is a 3x3 matrix indexed `blocks[x][y]`. A piece value is
//! immutable: rotating yields a new [`Piece`].

use std::fmt;

use arrayvec::ArrayVec;

use crate::error::{GameError, Result};
use crate::types::{Cell, PieceKind, Rotation};

/// 3x3 shape matrix, `1` where the piece has a block
pub type Blocks = [[u8; 3]; 3];

/// Catalog shape for a kind, in its unrotated orientation
pub fn catalog_shape(kind: PieceKind) -> Blocks {
    match kind {
        PieceKind::Line => [[0, 0, 0], [1, 1, 1], [0, 0, 0]],
        PieceKind::C => [[0, 0, 0], [1, 1, 1], [1, 0, 1]],
        PieceKind::Plus => [[0, 1, 0], [1, 1, 1], [0, 1, 0]],
        PieceKind::Dot => [[0, 0, 0], [0, 1, 0], [0, 0, 0]],
        PieceKind::Square => [[1, 1, 0], [1, 1, 0], [0, 0, 0]],
        PieceKind::L => [[0, 0, 0], [1, 1, 1], [0, 0, 1]],
        PieceKind::J => [[0, 0, 1], [1, 1, 1], [0, 0, 0]],
        PieceKind::S => [[0, 0, 0], [1, 1, 0], [0, 1, 1]],
        PieceKind::Z => [[0, 1, 1], [1, 1, 0], [0, 0, 0]],
        PieceKind::T => [[1, 0, 0], [1, 1, 0], [1, 0, 0]],
        PieceKind::X => [[1, 0, 1], [0, 1, 0], [1, 0, 1]],
        PieceKind::Corner => [[0, 0, 0], [1, 1, 0], [1, 0, 0]],
        PieceKind::InverseCorner => [[1, 0, 0], [1, 1, 0], [0, 0, 0]],
        PieceKind::Double => [[0, 1, 0], [0, 1, 0], [0, 0, 0]],
        PieceKind::Triple => [[0, 1, 0], [0, 1, 0], [0, 1, 0]],
    }
}

/// One clockwise quarter turn: `blocks[x][y]` moves to `rotated[2 - y][x]`
pub fn rotate_blocks_cw(blocks: &Blocks) -> Blocks {
    let mut rotated = [[0u8; 3]; 3];
    for (x, column) in blocks.iter().enumerate() {
        for (y, &block) in column.iter().enumerate() {
            rotated[2 - y][x] = block;
        }
    }
    rotated
}

/// A catalog piece in some orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub rotation: Rotation,
}

impl Piece {
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            rotation: Rotation::North,
        }
    }

    /// Create by catalog index
    pub fn from_index(index: usize) -> Result<Self> {
        PieceKind::from_index(index)
            .map(Self::new)
            .ok_or(GameError::UnknownPiece(index))
    }

    /// Color id written into the grid
    pub fn value(&self) -> Cell {
        self.kind.value()
    }

    /// Shape matrix for the current orientation
    pub fn blocks(&self) -> Blocks {
        let mut blocks = catalog_shape(self.kind);
        for _ in 0..self.rotation.quarter_turns() {
            blocks = rotate_blocks_cw(&blocks);
        }
        blocks
    }

    /// Matrix coordinates `(x, y)` of every block
    pub fn cells(&self) -> ArrayVec<(i32, i32), 9> {
        let blocks = self.blocks();
        let mut cells = ArrayVec::new();
        for (x, column) in blocks.iter().enumerate() {
            for (y, &block) in column.iter().enumerate() {
                if block > 0 {
                    cells.push((x as i32, y as i32));
                }
            }
        }
        cells
    }

    /// The same piece turned 90° clockwise
    pub fn rotated_cw(&self) -> Self {
        Self {
            rotation: self.rotation.rotate_cw(),
            ..*self
        }
    }

    /// The same piece turned 90° counter-clockwise
    pub fn rotated_ccw(&self) -> Self {
        Self {
            rotation: self.rotation.rotate_ccw(),
            ..*self
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind.name(), self.rotation.as_str())
    }
}
