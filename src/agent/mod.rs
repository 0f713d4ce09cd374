//! Players that can be plugged into the match loop.
//!
//! Every agent keeps its own copy of the game (a [`Shadow`]) updated from
//! its own moves and the moves reported through
//! [`Agent::opponent_played`], the way a remote player would. The referee
//! board passed to [`Agent::choose_move`] is only used to detect and repair
//! a drifted copy.

mod alphabeta;
mod mcts;
mod random;

pub use alphabeta::AlphaBetaAgent;
pub use mcts::MctsAgent;
pub use random::{FirstMoveAgent, RandomAgent};

use tracing::warn;

use crate::board::{Board, Move, Stone};
use crate::error::{ReversiError, Result};
use crate::rules::Outcome;

/// A Reversi player.
pub trait Agent {
    /// Name shown in match logs
    fn name(&self) -> &str;

    /// Prepare for a new game played as `side` on a `board_size` board.
    fn start_game(&mut self, side: Stone, board_size: usize) -> Result<()>;

    /// Pick a move for the side to move on `board`. A pass is returned as
    /// [`Move::Pass`] when no disc can be placed.
    fn choose_move(&mut self, board: &Board) -> Result<Move>;

    /// The opponent played `mv`.
    fn opponent_played(&mut self, mv: Move) -> Result<()>;

    /// The game ended with `outcome`.
    fn end_game(&mut self, _outcome: Outcome) {}
}

/// An agent's own view of the game in progress.
#[derive(Debug, Clone)]
pub struct Shadow {
    side: Stone,
    board: Board,
}

impl Shadow {
    pub fn new(side: Stone, board_size: usize) -> Result<Self> {
        Ok(Self {
            side,
            board: Board::new(board_size)?,
        })
    }

    #[inline]
    pub fn side(&self) -> Stone {
        self.side
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Replace the copy with `referee` if they differ. Returns false when a
    /// resync was needed.
    pub fn sync(&mut self, referee: &Board) -> bool {
        if self.board.same_position(referee) {
            return true;
        }
        warn!(
            side = ?self.side,
            "local board drifted from the referee's, resynchronising"
        );
        self.board = referee.clone();
        false
    }

    /// Play `mv` on the copy. A move the copy rejects means the copy no
    /// longer follows the game.
    pub fn record(&mut self, mv: Move) -> Result<()> {
        self.board.apply_move(mv).map_err(|err| {
            warn!(%mv, %err, "move rejected by the local board");
            ReversiError::Desync
        })
    }
}
