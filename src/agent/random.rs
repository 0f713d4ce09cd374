//! Baseline players: uniformly random and first legal move.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{Agent, Shadow};
use crate::board::{Board, Move, Stone};
use crate::error::{ReversiError, Result};

/// Plays a uniformly random legal move.
#[derive(Debug)]
pub struct RandomAgent {
    rng: ChaCha8Rng,
    shadow: Option<Shadow>,
}

impl RandomAgent {
    pub fn new() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
            shadow: None,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            shadow: None,
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        "random"
    }

    fn start_game(&mut self, side: Stone, board_size: usize) -> Result<()> {
        self.shadow = Some(Shadow::new(side, board_size)?);
        Ok(())
    }

    fn choose_move(&mut self, board: &Board) -> Result<Move> {
        let shadow = self.shadow.as_mut().ok_or(ReversiError::Desync)?;
        shadow.sync(board);
        if shadow.board().is_game_over() {
            return Err(ReversiError::GameOver);
        }
        let moves = shadow.board().legal_moves_to_play();
        let mv = moves[self.rng.gen_range(0..moves.len())];
        shadow.record(mv)?;
        Ok(mv)
    }

    fn opponent_played(&mut self, mv: Move) -> Result<()> {
        self.shadow.as_mut().ok_or(ReversiError::Desync)?.record(mv)
    }
}

/// Always plays the first legal move in row-major order. Deterministic,
/// which makes it handy for driving reproducible games.
#[derive(Debug, Default)]
pub struct FirstMoveAgent {
    shadow: Option<Shadow>,
}

impl FirstMoveAgent {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Agent for FirstMoveAgent {
    fn name(&self) -> &str {
        "first-move"
    }

    fn start_game(&mut self, side: Stone, board_size: usize) -> Result<()> {
        self.shadow = Some(Shadow::new(side, board_size)?);
        Ok(())
    }

    fn choose_move(&mut self, board: &Board) -> Result<Move> {
        let shadow = self.shadow.as_mut().ok_or(ReversiError::Desync)?;
        shadow.sync(board);
        if shadow.board().is_game_over() {
            return Err(ReversiError::GameOver);
        }
        let mv = shadow.board().legal_moves_to_play()[0];
        shadow.record(mv)?;
        Ok(mv)
    }

    fn opponent_played(&mut self, mv: Move) -> Result<()> {
        self.shadow.as_mut().ok_or(ReversiError::Desync)?.record(mv)
    }
}
