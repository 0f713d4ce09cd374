//! Monte Carlo player with tree reuse across turns.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::{Agent, Shadow};
use crate::board::{Board, Move, Stone, DEFAULT_BOARD_SIZE};
use crate::error::{ReversiError, Result};
use crate::mcts::{MctsConfig, MctsSearcher, Tree};
use crate::search::TurnClock;

/// MCTS player.
///
/// The search tree follows the game: both its own moves and the opponent's
/// re-root it, so statistics gathered on earlier turns keep paying off.
/// An optional trained tree seeds every game it starts from.
pub struct MctsAgent {
    searcher: MctsSearcher,
    opening: Option<Tree>,
    total_time: Duration,
    clock: TurnClock,
    shadow: Option<Shadow>,
}

impl MctsAgent {
    pub fn new(config: MctsConfig, total_time: Duration) -> Self {
        Self {
            searcher: MctsSearcher::new(config),
            opening: None,
            total_time,
            clock: TurnClock::new(total_time, DEFAULT_BOARD_SIZE),
            shadow: None,
        }
    }

    /// Start every game from a copy of `tree` (typically loaded from disk
    /// after offline training).
    pub fn with_opening_tree(mut self, tree: Tree) -> Self {
        self.opening = Some(tree);
        self
    }

    pub fn searcher(&self) -> &MctsSearcher {
        &self.searcher
    }

    pub fn clock(&self) -> &TurnClock {
        &self.clock
    }
}

impl Agent for MctsAgent {
    fn name(&self) -> &str {
        "mcts"
    }

    fn start_game(&mut self, side: Stone, board_size: usize) -> Result<()> {
        let shadow = Shadow::new(side, board_size)?;
        match &self.opening {
            Some(tree) => {
                self.searcher.set_tree(tree.clone());
                if self.searcher.sync_root(shadow.board()) {
                    info!(
                        nodes = self.searcher.tree().len(),
                        simulations = self.searcher.tree().simulations(),
                        "starting from trained tree"
                    );
                }
            }
            None => self.searcher.reset(shadow.board()),
        }
        self.clock = TurnClock::new(self.total_time, board_size);
        self.shadow = Some(shadow);
        Ok(())
    }

    fn choose_move(&mut self, board: &Board) -> Result<Move> {
        let shadow = self.shadow.as_mut().ok_or(ReversiError::Desync)?;
        shadow.sync(board);
        if shadow.board().is_game_over() {
            return Err(ReversiError::GameOver);
        }

        let allocated = self.clock.start_turn();
        let deadline = self.clock.deadline().unwrap_or_else(Instant::now);
        let chosen = self.searcher.search_until(shadow.board(), deadline);
        let elapsed = self.clock.stop_turn();
        let mv = chosen?;

        debug!(
            %mv,
            nodes = self.searcher.tree().len(),
            allocated_ms = allocated.as_millis() as u64,
            elapsed_ms = elapsed.as_millis() as u64,
            "mcts move"
        );
        self.searcher.advance(shadow.board(), mv)?;
        shadow.record(mv)?;
        Ok(mv)
    }

    fn opponent_played(&mut self, mv: Move) -> Result<()> {
        let shadow = self.shadow.as_mut().ok_or(ReversiError::Desync)?;
        self.searcher
            .advance(shadow.board(), mv)
            .map_err(|_| ReversiError::Desync)?;
        shadow.record(mv)
    }
}
