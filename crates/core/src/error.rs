use std::path::PathBuf;

use thiserror::Error;

/// Why an operation on the game state was refused.
///
/// A refused operation never changes state.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Piece index {0} is not in the catalog")]
    UnknownPiece(usize),
    #[error("Piece does not fit at ({x}, {y})")]
    Blocked { x: i32, y: i32 },
    #[error("No piece has been dealt yet")]
    NoActivePiece,
    #[error("Game is not in play")]
    NotPlaying,
}

pub type Result<T> = core::result::Result<T, GameError>;

#[derive(Error, Debug)]
pub enum ScoreFileError {
    #[error("Could not access score file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed score record on line {line}: {text:?}")]
    Malformed { line: usize, text: String },
}
