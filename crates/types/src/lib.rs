//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data with no external dependencies, making them usable
//! from the game logic, the engine runtime, and the peer protocol alike.
//!
//! # Board
//!
//! The default board is a 5x5 grid. Coordinates are `(x, y)` with `x` the
//! column and `y` the row, both 0-based with the origin at the top-left.
//!
//! # Cell values
//!
//! | Value | Meaning |
//! |-------|---------|
//! | `0` | empty |
//! | `1..=15` | color id of a placed piece |
//! | `16` | cursor overlay (never a real placement) |
//!
//! # Timing
//!
//! Each turn runs on a countdown whose length shrinks with level:
//!
//! | Level | Delay |
//! |-------|-------|
//! | 0 | 12000ms |
//! | 1 | 11500ms |
//! | 10 | 7000ms |
//! | 22+ | 1000ms (floor) |
//!
//! # Examples
//!
//! ```
//! use tetrecs_types::{GameAction, PieceKind, Rotation, GRID_COLS, GRID_ROWS};
//!
//! let piece = PieceKind::from_index(2).unwrap();
//! assert_eq!(piece, PieceKind::Plus);
//! assert_eq!(piece.value(), 3);
//!
//! assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
//! assert_eq!(GameAction::from_str("swap"), Some(GameAction::Swap));
//!
//! assert_eq!(GRID_COLS, 5);
//! assert_eq!(GRID_ROWS, 5);
//! ```

/// Default board width in cells
pub const GRID_COLS: usize = 5;

/// Default board height in cells
pub const GRID_ROWS: usize = 5;

/// Number of distinct cell values (empty, fifteen piece colors, cursor)
pub const N_COLORS: u8 = 17;

/// Empty cell value
pub const EMPTY: Cell = 0;

/// Reserved value drawn under the keyboard cursor
pub const CURSOR_SENTINEL: Cell = 16;

/// Value returned by `Grid::get` for coordinates outside the board
pub const OUT_OF_BOUNDS: i32 = -1;

/// Number of pieces in the catalog
pub const PIECE_COUNT: usize = 15;

/// Lives at the start of a session
pub const STARTING_LIVES: i32 = 3;

/// Multiplier at the start of a session and after any turn without a clear
pub const BASE_MULTIPLIER: u32 = 1;

/// Points per cleared block, before the line count and multiplier
pub const POINTS_PER_BLOCK: u32 = 10;

/// Score needed per level
pub const LEVEL_SCORE_STEP: u32 = 1000;

/// Countdown at level 0
pub const BASE_TIMER_MS: u32 = 12000;

/// Countdown reduction per level
pub const TIMER_STEP_MS: u32 = 500;

/// Shortest countdown regardless of level
pub const TIMER_FLOOR_MS: u32 = 1000;

/// Side of the square window the keyboard cursor wraps within
pub const CONTROL_WINDOW: i32 = 5;

/// Cursor position at session start
pub const CURSOR_START: (i32, i32) = (2, 2);

/// Pieces requested from the peer at start and per top-up
pub const PIECE_REQUEST_BATCH: u32 = 10;

/// Queue size that must be exceeded before the first deal in multiplayer
pub const BOOTSTRAP_THRESHOLD: usize = 9;

/// Buffered plus outstanding pieces below which a top-up is requested
pub const PIECE_LOW_WATERMARK: usize = 5;

/// Leaderboard poll cadence
pub const LEADERBOARD_POLL_MS: u64 = 1000;

/// A cell on the board
///
/// `0` is empty, `1..=15` are piece colors, [`CURSOR_SENTINEL`] marks the cursor.
pub type Cell = u8;

/// Board coordinate `(x, y)`
pub type Coord = (i32, i32);

/// Orientation of a piece, in 90° clockwise steps from its catalog shape
///
/// The rotation cycle goes: North → East → South → West → North
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise (90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrecs_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
    /// assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Rotate counter-clockwise (-90° or 270°)
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }

    /// Number of clockwise quarter turns from North
    pub fn quarter_turns(&self) -> usize {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::North => "north",
            Rotation::East => "east",
            Rotation::South => "south",
            Rotation::West => "west",
        }
    }
}

/// The fifteen catalog pieces, in catalog index order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Line,
    C,
    Plus,
    Dot,
    Square,
    L,
    J,
    S,
    Z,
    T,
    X,
    Corner,
    InverseCorner,
    Double,
    Triple,
}

impl PieceKind {
    /// All kinds, indexed by catalog index
    pub const ALL: [PieceKind; PIECE_COUNT] = [
        PieceKind::Line,
        PieceKind::C,
        PieceKind::Plus,
        PieceKind::Dot,
        PieceKind::Square,
        PieceKind::L,
        PieceKind::J,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::T,
        PieceKind::X,
        PieceKind::Corner,
        PieceKind::InverseCorner,
        PieceKind::Double,
        PieceKind::Triple,
    ];

    /// Look up a kind by catalog index
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrecs_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_index(0), Some(PieceKind::Line));
    /// assert_eq!(PieceKind::from_index(14), Some(PieceKind::Triple));
    /// assert_eq!(PieceKind::from_index(15), None);
    /// ```
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Catalog index
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Color id written into the grid for this piece (`index + 1`)
    pub fn value(&self) -> Cell {
        self.index() as Cell + 1
    }

    pub fn name(&self) -> &'static str {
        match self {
            PieceKind::Line => "Line",
            PieceKind::C => "C",
            PieceKind::Plus => "Plus",
            PieceKind::Dot => "Dot",
            PieceKind::Square => "Square",
            PieceKind::L => "L",
            PieceKind::J => "J",
            PieceKind::S => "S",
            PieceKind::Z => "Z",
            PieceKind::T => "T",
            PieceKind::X => "X",
            PieceKind::Corner => "Corner",
            PieceKind::InverseCorner => "Inverse Corner",
            PieceKind::Double => "Double",
            PieceKind::Triple => "Triple",
        }
    }
}

/// Player-facing actions
///
/// Placement at an arbitrary cell carries coordinates and is issued
/// separately; everything here is a single keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Rotate the current piece 90° clockwise
    RotateCw,
    /// Rotate the current piece 90° counter-clockwise
    RotateCcw,
    /// Exchange the current and following piece
    Swap,
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    /// Place the current piece centred on the cursor
    PlaceAtCursor,
}

impl GameAction {
    /// Parse action from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrecs_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("rotateCw"), Some(GameAction::RotateCw));
    /// assert_eq!(GameAction::from_str("placeatcursor"), Some(GameAction::PlaceAtCursor));
    /// assert_eq!(GameAction::from_str("hardDrop"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rotatecw" => Some(GameAction::RotateCw),
            "rotateccw" => Some(GameAction::RotateCcw),
            "swap" => Some(GameAction::Swap),
            "cursorleft" => Some(GameAction::CursorLeft),
            "cursorright" => Some(GameAction::CursorRight),
            "cursorup" => Some(GameAction::CursorUp),
            "cursordown" => Some(GameAction::CursorDown),
            "placeatcursor" => Some(GameAction::PlaceAtCursor),
            _ => None,
        }
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::RotateCw => "rotateCw",
            GameAction::RotateCcw => "rotateCcw",
            GameAction::Swap => "swap",
            GameAction::CursorLeft => "cursorLeft",
            GameAction::CursorRight => "cursorRight",
            GameAction::CursorUp => "cursorUp",
            GameAction::CursorDown => "cursorDown",
            GameAction::PlaceAtCursor => "placeAtCursor",
        }
    }

    /// Cursor displacement for the four cursor actions
    pub fn cursor_delta(&self) -> Option<(i32, i32)> {
        match self {
            GameAction::CursorLeft => Some((-1, 0)),
            GameAction::CursorRight => Some((1, 0)),
            GameAction::CursorUp => Some((0, -1)),
            GameAction::CursorDown => Some((0, 1)),
            _ => None,
        }
    }
}

/// Remote player's life state on the leaderboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerStatus {
    Lives(i32),
    /// Dead marker, or any non-numeric lives field, kept verbatim
    Dead(String),
}

impl PlayerStatus {
    /// Parse a lives field: a number, or anything else as a dead marker
    pub fn parse(field: &str) -> Self {
        let field = field.trim();
        match field.parse::<i32>() {
            Ok(lives) => PlayerStatus::Lives(lives),
            Err(_) => PlayerStatus::Dead(field.to_string()),
        }
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, PlayerStatus::Dead(_))
    }
}

impl std::fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerStatus::Lives(lives) => write!(f, "{}", lives),
            PlayerStatus::Dead(marker) => f.write_str(marker),
        }
    }
}

/// Event emitted by the game state, drained by the engine after each mutation
///
/// The engine turns these into timer scheduling, peer reports, and
/// notifications for whatever is presenting the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Current and following slots were refilled
    PiecesAdvanced {
        current: Option<PieceKind>,
        following: Option<PieceKind>,
    },
    PiecePlaced {
        kind: PieceKind,
        x: i32,
        y: i32,
    },
    PieceRejected {
        x: i32,
        y: i32,
    },
    /// Cells cleared by this turn, deduplicated
    LinesCleared {
        cells: Vec<Coord>,
        blocks: usize,
        lines: u32,
    },
    ScoreChanged {
        score: u32,
    },
    HighScoreChanged {
        high_score: u32,
    },
    MultiplierChanged {
        multiplier: u32,
    },
    LevelChanged {
        level: u32,
    },
    /// A life was forfeited on countdown expiry; `lives` may be `-1`
    LifeLost {
        lives: i32,
    },
    /// Lives crossed below zero
    Died,
    /// Terminal notification, emitted exactly once
    GameEnded,
    /// A fresh countdown must be scheduled; older generations are stale
    TimerRestarted {
        generation: u64,
        delay_ms: u32,
    },
    TimerStopped,
    /// Ask the peer for this many more pieces
    PiecesRequested {
        count: u32,
    },
    CursorMoved {
        x: i32,
        y: i32,
    },
    PieceRotated {
        kind: PieceKind,
        rotation: Rotation,
    },
    PiecesSwapped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_and_scoring_defaults() {
        assert_eq!(BASE_TIMER_MS, 12000);
        assert_eq!(TIMER_STEP_MS, 500);
        assert_eq!(LEVEL_SCORE_STEP, 1000);
        assert_eq!(POINTS_PER_BLOCK, 10);
        assert_eq!(STARTING_LIVES, 3);
        assert!(TIMER_FLOOR_MS > 0);
    }

    #[test]
    fn piece_values_fit_color_range() {
        for (i, kind) in PieceKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert!(kind.value() >= 1);
            assert!(kind.value() < CURSOR_SENTINEL);
        }
        assert_eq!(CURSOR_SENTINEL, N_COLORS - 1);
    }

    #[test]
    fn rotation_cycle_is_closed() {
        let mut r = Rotation::North;
        for _ in 0..4 {
            assert_eq!(r.rotate_cw().rotate_ccw(), r);
            r = r.rotate_cw();
        }
        assert_eq!(r, Rotation::North);
        assert_eq!(Rotation::South.quarter_turns(), 2);
    }

    #[test]
    fn cursor_actions_have_deltas() {
        assert_eq!(GameAction::CursorLeft.cursor_delta(), Some((-1, 0)));
        assert_eq!(GameAction::CursorDown.cursor_delta(), Some((0, 1)));
        assert_eq!(GameAction::Swap.cursor_delta(), None);
    }
}
