use serde::Serialize;

use crate::pieces::{Blocks, Piece};
use crate::types::{Cell, Coord, CURSOR_START, GRID_COLS, GRID_ROWS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PieceSnapshot {
    pub name: &'static str,
    pub index: usize,
    pub value: Cell,
    pub rotation: &'static str,
    pub blocks: Blocks,
}

impl From<Piece> for PieceSnapshot {
    fn from(value: Piece) -> Self {
        Self {
            name: value.kind.name(),
            index: value.kind.index(),
            value: value.value(),
            rotation: value.rotation.as_str(),
            blocks: value.blocks(),
        }
    }
}

/// Read-only copy of everything a presentation layer needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub cols: usize,
    pub rows: usize,
    /// Row-major, `cells[y * cols + x]`, cursor overlay included
    pub cells: Vec<Cell>,
    pub current: Option<PieceSnapshot>,
    pub following: Option<PieceSnapshot>,
    pub phase: &'static str,
    pub score: u32,
    pub level: u32,
    pub lives: i32,
    pub multiplier: u32,
    pub high_score: u32,
    pub cursor: Coord,
    pub cursor_visible: bool,
    pub timer_delay_ms: u32,
}

impl GameSnapshot {
    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        if x >= self.cols || y >= self.rows {
            return None;
        }
        self.cells.get(y * self.cols + x).copied()
    }

    pub fn is_ended(&self) -> bool {
        self.phase == "ended"
    }

    pub fn playable(&self) -> bool {
        self.phase == "playing" && self.current.is_some()
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            cols: GRID_COLS,
            rows: GRID_ROWS,
            cells: vec![0; GRID_COLS * GRID_ROWS],
            current: None,
            following: None,
            phase: "setup",
            score: 0,
            level: 0,
            lives: 0,
            multiplier: 0,
            high_score: 0,
            cursor: CURSOR_START,
            cursor_visible: false,
            timer_delay_ms: 0,
        }
    }
}
