//! Core game logic - pure, deterministic, and testable
//!
//! Everything here runs without a clock, a terminal or a socket. The state
//! machine in [`game_state`] reports what happened as [`types::GameEvent`]s;
//! scheduling the countdown and talking to a peer is the engine's job.
//!
//! # Module Structure
//!
//! - [`grid`]: the board, placement validation, line clearing, cursor overlay
//! - [`pieces`]: the fifteen-piece catalog and rotation
//! - [`source`]: where pieces come from, and the peer-fed queue
//! - [`rng`]: seeded local piece generation
//! - [`scoring`]: points, multiplier, level and countdown length
//! - [`game_state`]: turns, lives and the game lifecycle
//! - [`leaderboard`]: multiplayer score table
//! - [`highscore`]: the local score file
//!
//! # Example
//!
//! ```
//! use tetrecs_core::{GameState, LocalPieces};
//! use tetrecs_core::types::{GameEvent, GRID_COLS, GRID_ROWS};
//!
//! let mut game = GameState::new(GRID_COLS, GRID_ROWS, LocalPieces::new(12345));
//! game.initialise();
//! assert!(game.current().is_some());
//!
//! // Any piece fits centred on an empty 5x5 board.
//! game.place_at(2, 2).unwrap();
//! assert!(game
//!     .drain_events()
//!     .iter()
//!     .any(|e| matches!(e, GameEvent::PiecePlaced { x: 2, y: 2, .. })));
//! ```

pub mod error;
pub mod game_state;
pub mod grid;
pub mod highscore;
pub mod leaderboard;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;
pub mod source;

pub use tetrecs_types as types;

pub use error::{GameError, ScoreFileError};
pub use game_state::{GameState, Phase, TurnOutcome};
pub use grid::Grid;
pub use highscore::{high_score_from, insert_score, load_scores, save_scores, ScoreEntry};
pub use leaderboard::{parse_records, Leaderboard, LeaderboardEntry};
pub use pieces::Piece;
pub use rng::{LocalPieces, SimpleRng};
pub use scoring::{level_for_score, score_turn, timer_delay_ms, ScoreResult};
pub use snapshot::{GameSnapshot, PieceSnapshot};
pub use source::{PieceSource, RemotePieces};
