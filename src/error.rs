use thiserror::Error;

use crate::board::Stone;

/// Errors raised by the board, the searches and the agents.
#[derive(Error, Debug)]
pub enum ReversiError {
    #[error("Invalid board size {0}: must be even and between 4 and 16")]
    InvalidBoardSize(usize),

    #[error("Position ({row}, {col}) is off the board")]
    OutOfBounds { row: i32, col: i32 },

    #[error("{got:?} tried to move but it is {expected:?}'s turn")]
    WrongSide { expected: Stone, got: Stone },

    #[error("Illegal move for {side:?} at ({row}, {col})")]
    IllegalMove { side: Stone, row: i32, col: i32 },

    #[error("Cannot undo: move history is empty")]
    EmptyHistory,

    #[error("Game is over: no move to choose")]
    GameOver,

    #[error("Search tree does not match the position it was asked to search")]
    TreeDesync,

    #[error("Agent's local board no longer follows the game")]
    Desync,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Convenience Result type for engine operations
pub type Result<T> = std::result::Result<T, ReversiError>;
