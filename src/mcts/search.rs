//! Monte Carlo Tree Search with UCB1 selection and random rollouts.
//!
//! Each simulation walks the tree by UCB1, expands the leaf with every
//! legal move, steps into one of the new children at random, plays the game
//! out with uniformly random moves and backs the result up the path. The
//! tree survives between turns: after each real move the searcher re-roots
//! it at the matching child.

use std::path::Path;
use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace, warn};

use crate::board::{Board, Move};
use crate::error::{ReversiError, Result};
use crate::search::ZobristTable;

use super::node::NodeId;
use super::tree::Tree;

/// Simulations between two deadline checks
const BATCH: u32 = 16;

/// MCTS configuration parameters.
#[derive(Clone, Debug)]
pub struct MctsConfig {
    /// `c` in the UCB1 exploration term `sqrt(c · ln N / (n + 1))`
    pub exploration: f64,

    /// Seed of the expansion and rollout RNG
    pub seed: u64,

    /// Cap on simulations per search call (None = until the deadline)
    pub max_simulations: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            exploration: 2.0,
            seed: 42,
            max_simulations: None,
        }
    }
}

impl MctsConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_simulations(mut self, max_simulations: u64) -> Self {
        self.max_simulations = Some(max_simulations);
        self
    }
}

/// Monte Carlo Tree Search over a persistent tree.
pub struct MctsSearcher {
    config: MctsConfig,
    tree: Tree,
    zobrist: ZobristTable,
    rng: ChaCha8Rng,
}

impl MctsSearcher {
    pub fn new(config: MctsConfig) -> Self {
        let zobrist = ZobristTable::new();
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            tree: Tree::new(0),
            zobrist,
            rng,
            config,
        }
    }

    /// Resume from a previously trained tree.
    pub fn with_tree(config: MctsConfig, tree: Tree) -> Self {
        let mut searcher = Self::new(config);
        searcher.tree = tree;
        searcher
    }

    /// Resume from a tree saved with [`MctsSearcher::save`].
    pub fn load(config: MctsConfig, path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_tree(config, Tree::load(path)?))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.tree.save(path)
    }

    #[inline]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Swap in another tree, e.g. a trained one, keeping the RNG state.
    pub fn set_tree(&mut self, tree: Tree) {
        self.tree = tree;
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    #[inline]
    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Run simulations from `board` until `deadline` (or the configured
    /// cap) and return the move to play.
    ///
    /// At least one batch of simulations runs even if the deadline has
    /// already passed.
    pub fn search_until(&mut self, board: &Board, deadline: Instant) -> Result<Move> {
        self.prepare(board)?;
        let cap = self.config.max_simulations.unwrap_or(u64::MAX);
        let mut run = 0u64;

        loop {
            for _ in 0..BATCH {
                if run >= cap {
                    break;
                }
                self.simulate(board)?;
                run += 1;
            }
            trace!(run, total = self.tree.simulations(), "mcts batch");
            if run >= cap || Instant::now() >= deadline {
                break;
            }
        }

        self.decide(run)
    }

    /// Run exactly `simulations` simulations from `board` and return the
    /// move to play.
    pub fn search_n(&mut self, board: &Board, simulations: u64) -> Result<Move> {
        self.train(board, simulations)?;
        self.decide(simulations)
    }

    /// Accumulate `simulations` simulations from `board` without choosing a
    /// move (offline training of a tree to be saved).
    pub fn train(&mut self, board: &Board, simulations: u64) -> Result<()> {
        self.prepare(board)?;
        for _ in 0..simulations {
            self.simulate(board)?;
        }
        Ok(())
    }

    /// Re-root the tree after `mv` was played from `before`.
    ///
    /// Works for either side's moves; a move the tree never expanded starts
    /// a fresh subtree.
    pub fn advance(&mut self, before: &Board, mv: Move) -> Result<()> {
        self.sync_root(before);
        let mut after = before.clone();
        after.apply_move(mv)?;
        let hash = self.zobrist.hash(&after);
        self.tree.advance_root(mv, hash);
        Ok(())
    }

    /// Make sure the tree is rooted at `board`, discarding it otherwise.
    /// Returns false if the tree had to be replaced.
    pub fn sync_root(&mut self, board: &Board) -> bool {
        let hash = self.zobrist.hash(board);
        if self.tree.root_hash() == hash {
            return true;
        }
        if self.tree.len() > 1 {
            warn!(
                nodes = self.tree.len(),
                "search tree rooted at another position, discarding it"
            );
        }
        self.tree = Tree::new(hash);
        false
    }

    /// Start over with an empty tree for `board`.
    pub fn reset(&mut self, board: &Board) {
        self.tree = Tree::new(self.zobrist.hash(board));
    }

    fn prepare(&mut self, board: &Board) -> Result<()> {
        if board.is_game_over() {
            return Err(ReversiError::GameOver);
        }
        self.sync_root(board);
        Ok(())
    }

    fn decide(&self, run: u64) -> Result<Move> {
        let mv = self.tree.best_move().ok_or(ReversiError::TreeDesync)?;
        debug!(
            %mv,
            run,
            total = self.tree.simulations(),
            nodes = self.tree.len(),
            "mcts decision"
        );
        Ok(mv)
    }

    /// One selection / expansion / rollout / backpropagation pass.
    fn simulate(&mut self, board: &Board) -> Result<()> {
        let mut sim = board.clone();
        let mut node = NodeId::ROOT;

        // Selection
        while let Some(child) = self.tree.select_child(node, self.config.exploration) {
            let mv = self.tree.get(child).mv.ok_or(ReversiError::TreeDesync)?;
            sim.apply_move(mv).map_err(|_| ReversiError::TreeDesync)?;
            node = child;
        }

        // Expansion
        if !sim.is_game_over() {
            let moves = sim.legal_moves_to_play();
            for &mv in &moves {
                self.tree.add_child(node, mv);
            }
            let pick = moves[self.rng.gen_range(0..moves.len())];
            sim.apply_move(pick)?;
            node = self
                .tree
                .child(node, pick)
                .ok_or(ReversiError::TreeDesync)?;
        }

        // Simulation
        let side = sim.side_to_move();
        let outcome = rollout(&mut sim, &mut self.rng)?;

        // Backpropagation
        self.tree.backpropagate(node, outcome.reward_for(side));
        Ok(())
    }
}

/// Play uniformly random moves (forced passes included) until the game ends.
fn rollout<R: Rng>(board: &mut Board, rng: &mut R) -> Result<crate::rules::Outcome> {
    loop {
        let side = board.side_to_move();
        let moves = board.legal_moves(side);
        if moves[0].is_pass() && !board.has_legal_move(side.opponent()) {
            return Ok(board.count_outcome());
        }
        let mv = moves[rng.gen_range(0..moves.len())];
        board.apply_move(mv)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Pos, Stone};
    use std::time::Duration;

    #[test]
    fn test_rollout_reaches_game_end() {
        let mut board = Board::new(6).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let outcome = rollout(&mut board, &mut rng).unwrap();
        assert!(board.is_game_over());
        assert_eq!(outcome, board.count_outcome());
    }

    #[test]
    fn test_search_n_returns_legal_move() {
        let mut searcher = MctsSearcher::new(MctsConfig::default());
        let board = Board::new(8).unwrap();

        let mv = searcher.search_n(&board, 200).unwrap();
        assert!(board.is_legal(mv));
        assert_eq!(searcher.tree().simulations(), 200);
        assert_eq!(searcher.tree().root().visits, 200);
        assert_eq!(searcher.tree().root().children.len(), 4);
    }

    #[test]
    fn test_same_seed_same_move() {
        let board = Board::new(6).unwrap();
        let mut a = MctsSearcher::new(MctsConfig::default().with_seed(9));
        let mut b = MctsSearcher::new(MctsConfig::default().with_seed(9));
        assert_eq!(a.search_n(&board, 150).unwrap(), b.search_n(&board, 150).unwrap());
    }

    #[test]
    fn test_search_until_respects_cap() {
        let mut searcher =
            MctsSearcher::new(MctsConfig::default().with_max_simulations(40));
        let board = Board::new(8).unwrap();
        let deadline = Instant::now() + Duration::from_secs(30);

        let mv = searcher.search_until(&board, deadline).unwrap();
        assert!(board.is_legal(mv));
        assert_eq!(searcher.tree().simulations(), 40);
    }

    #[test]
    fn test_expired_deadline_runs_one_batch() {
        let mut searcher = MctsSearcher::new(MctsConfig::default());
        let board = Board::new(8).unwrap();
        let mv = searcher.search_until(&board, Instant::now()).unwrap();
        assert!(board.is_legal(mv));
        assert_eq!(searcher.tree().simulations(), BATCH as u64);
    }

    #[test]
    fn test_tree_reused_after_advance() {
        let mut searcher = MctsSearcher::new(MctsConfig::default());
        let mut board = Board::new(8).unwrap();
        let mv = searcher.search_n(&board, 300).unwrap();

        let kept_visits = searcher
            .tree()
            .root_stats()
            .into_iter()
            .find(|s| s.mv == mv)
            .map(|s| s.visits)
            .unwrap();

        searcher.advance(&board, mv).unwrap();
        board.apply_move(mv).unwrap();
        assert_eq!(searcher.tree().root().visits, kept_visits);

        // Searching on continues from the kept statistics
        searcher.train(&board, 10).unwrap();
        assert_eq!(searcher.tree().root().visits, kept_visits + 10);
    }

    #[test]
    fn test_desynchronised_tree_is_discarded() {
        let mut searcher = MctsSearcher::new(MctsConfig::default());
        let board = Board::new(8).unwrap();
        searcher.train(&board, 50).unwrap();

        let mut other = Board::new(8).unwrap();
        other.apply_move(Move::place(Stone::Black, 3, 2)).unwrap();
        searcher.train(&other, 5).unwrap();
        assert_eq!(searcher.tree().simulations(), 5);
    }

    #[test]
    fn test_advance_through_unexplored_move() {
        let mut searcher = MctsSearcher::new(MctsConfig::default());
        let mut board = Board::new(8).unwrap();
        searcher.reset(&board);

        let mv = Move::place(Stone::Black, 5, 4);
        searcher.advance(&board, mv).unwrap();
        board.apply_move(mv).unwrap();
        assert!(searcher.sync_root(&board));
        assert_eq!(searcher.tree().len(), 1);
    }

    #[test]
    fn test_game_over_is_error() {
        let mut searcher = MctsSearcher::new(MctsConfig::default());
        let mut board = Board::empty(4).unwrap();
        board.place_stone(Pos::new(0, 0), Stone::Black);
        assert!(matches!(
            searcher.search_n(&board, 10),
            Err(ReversiError::GameOver)
        ));
    }

    #[test]
    fn test_winning_move_gets_most_visits() {
        // (2,4) flips both white discs and ends the game; (3,1) and (3,3)
        // each flip one and play on
        let mut board = Board::empty(6).unwrap();
        board.place_stone(Pos::new(2, 1), Stone::Black);
        board.place_stone(Pos::new(1, 3), Stone::Black);
        board.place_stone(Pos::new(2, 2), Stone::White);
        board.place_stone(Pos::new(2, 3), Stone::White);
        assert_eq!(board.legal_moves(Stone::Black).len(), 3);

        let mut searcher = MctsSearcher::new(MctsConfig::default());
        let mv = searcher.search_n(&board, 500).unwrap();
        let winning = Move::place(Stone::Black, 2, 4);
        assert_eq!(mv, winning);

        let stats = searcher.tree().root_stats();
        let best = stats.iter().max_by_key(|s| s.visits).unwrap();
        assert_eq!(best.mv, winning);
    }
}
