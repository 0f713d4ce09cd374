//! Iterative-deepening alpha-beta player on a game clock.

use std::time::{Duration, Instant};

use tracing::debug;

use super::{Agent, Shadow};
use crate::board::{Board, Move, Stone};
use crate::error::{ReversiError, Result};
use crate::search::{SearchConfig, Searcher, TurnClock};

/// Alpha-beta player. Each turn gets a slice of the game budget from a
/// [`TurnClock`]; the transposition table is kept for the whole game.
pub struct AlphaBetaAgent {
    searcher: Searcher,
    total_time: Duration,
    clock: TurnClock,
    shadow: Option<Shadow>,
}

impl AlphaBetaAgent {
    pub fn new(config: SearchConfig, total_time: Duration) -> Self {
        Self {
            searcher: Searcher::new(config),
            total_time,
            clock: TurnClock::new(total_time, crate::board::DEFAULT_BOARD_SIZE),
            shadow: None,
        }
    }

    pub fn clock(&self) -> &TurnClock {
        &self.clock
    }

    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }
}

impl Agent for AlphaBetaAgent {
    fn name(&self) -> &str {
        "alphabeta"
    }

    fn start_game(&mut self, side: Stone, board_size: usize) -> Result<()> {
        self.shadow = Some(Shadow::new(side, board_size)?);
        self.clock = TurnClock::new(self.total_time, board_size);
        self.searcher.clear_tt();
        Ok(())
    }

    fn choose_move(&mut self, board: &Board) -> Result<Move> {
        let shadow = self.shadow.as_mut().ok_or(ReversiError::Desync)?;
        shadow.sync(board);
        if shadow.board().is_game_over() {
            return Err(ReversiError::GameOver);
        }

        let moves = shadow.board().legal_moves_to_play();
        if moves.len() == 1 {
            shadow.record(moves[0])?;
            return Ok(moves[0]);
        }

        let allocated = self.clock.start_turn();
        let deadline = self.clock.deadline().unwrap_or_else(Instant::now);
        let result = self.searcher.search_until(shadow.board(), deadline);
        let elapsed = self.clock.stop_turn();
        let result = result?;

        debug!(
            mv = %result.best_move,
            score = result.score,
            depth = result.depth,
            nodes = result.nodes,
            first_move_cut_pct = result.stats.first_move_rate(),
            tt_hit_pct = result.stats.tt_score_rate(),
            allocated_ms = allocated.as_millis() as u64,
            elapsed_ms = elapsed.as_millis() as u64,
            "alphabeta move"
        );
        shadow.record(result.best_move)?;
        Ok(result.best_move)
    }

    fn opponent_played(&mut self, mv: Move) -> Result<()> {
        self.shadow.as_mut().ok_or(ReversiError::Desync)?.record(mv)
    }
}
