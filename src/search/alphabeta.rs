//! Alpha-Beta search with iterative deepening and transposition table
//!
//! This module implements negamax with alpha-beta pruning over a single
//! board that is mutated in place: every child is entered through a
//! [`ScopedMove`](crate::board::ScopedMove) guard, so cutoffs and timeouts
//! unwind without leaving moves on the board.
//!
//! # Features
//!
//! - Iterative deepening for anytime results under a deadline
//! - Transposition table keyed by incremental Zobrist hashes
//! - Moves tried in generation (row-major) order, so results are
//!   reproducible and identical with or without the cache
//!
//! # Example
//!
//! ```
//! use reversi::board::Board;
//! use reversi::search::{SearchConfig, Searcher};
//!
//! let mut searcher = Searcher::new(SearchConfig::default().with_tt_size(1));
//! let board = Board::new(8).unwrap();
//!
//! let result = searcher.search(&board, 3).unwrap();
//! println!("Best move: {} (score {})", result.best_move, result.score);
//! ```

use std::time::Instant;

use tracing::debug;

use crate::board::{Board, Move};
use crate::error::{ReversiError, Result};
use crate::eval::evaluate;

use super::{EntryType, TTStats, TranspositionTable, ZobristTable};

/// Infinity score for alpha-beta bounds
const INF: f64 = f64::INFINITY;

/// Configuration of the alpha-beta searcher
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Deepest horizon iterative deepening may reach
    pub max_depth: i8,
    /// Consult and fill the transposition table
    pub use_tt: bool,
    /// Cut off siblings once alpha reaches beta (off = plain negamax)
    pub pruning: bool,
    /// Transposition table size in megabytes
    pub tt_size_mb: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 32,
            use_tt: true,
            pruning: true,
            tt_size_mb: 16,
        }
    }
}

impl SearchConfig {
    pub fn with_depth(mut self, max_depth: i8) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn with_tt(mut self, use_tt: bool) -> Self {
        self.use_tt = use_tt;
        self
    }

    pub fn with_pruning(mut self, pruning: bool) -> Self {
        self.pruning = pruning;
        self
    }

    pub fn with_tt_size(mut self, tt_size_mb: usize) -> Self {
        self.tt_size_mb = tt_size_mb;
        self
    }
}

/// Search statistics for diagnostics and tuning.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Total beta cutoffs (fail-high)
    pub beta_cutoffs: u64,
    /// Beta cutoffs on the first move tried
    pub first_move_cutoffs: u64,
    /// Total TT probes
    pub tt_probes: u64,
    /// TT probes that returned a usable score
    pub tt_score_hits: u64,
}

impl SearchStats {
    /// Share of cutoffs produced by the first move, in percent
    pub fn first_move_rate(&self) -> f64 {
        if self.beta_cutoffs == 0 {
            0.0
        } else {
            self.first_move_cutoffs as f64 / self.beta_cutoffs as f64 * 100.0
        }
    }

    /// TT score hit rate, in percent
    pub fn tt_score_rate(&self) -> f64 {
        if self.tt_probes == 0 {
            0.0
        } else {
            self.tt_score_hits as f64 / self.tt_probes as f64 * 100.0
        }
    }
}

/// Search result containing the best move found and associated statistics.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best move of the deepest completed iteration
    pub best_move: Move,
    /// Negamax score of that move for the side to move
    pub score: f64,
    /// Deepest horizon completed
    pub depth: i8,
    /// Total nodes visited, including abandoned iterations
    pub nodes: u64,
    /// True if the deadline interrupted a deeper iteration
    pub timed_out: bool,
    /// Search diagnostics
    pub stats: SearchStats,
}

/// Negamax alpha-beta searcher.
///
/// The transposition table lives as long as the searcher: it is reused
/// across the turns of a game and only cleared by [`Searcher::clear_tt`].
pub struct Searcher {
    config: SearchConfig,
    zobrist: ZobristTable,
    tt: TranspositionTable,
    deadline: Option<Instant>,
    nodes: u64,
    /// Set when the current subtree evaluates a node at the horizon; if a
    /// whole iteration never does, deeper ones cannot change the result.
    horizon_reached: bool,
    stats: SearchStats,
}

impl Searcher {
    #[must_use]
    pub fn new(config: SearchConfig) -> Self {
        Self {
            zobrist: ZobristTable::new(),
            tt: TranspositionTable::new(config.tt_size_mb),
            config,
            deadline: None,
            nodes: 0,
            horizon_reached: false,
            stats: SearchStats::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Iterative deepening up to `max_depth` with no deadline.
    pub fn search(&mut self, board: &Board, max_depth: i8) -> Result<SearchResult> {
        self.iterative_deepening(board, max_depth.max(1), None)
    }

    /// Iterative deepening until `deadline` (or the configured maximum depth).
    ///
    /// The first iteration always completes, so a legal move is returned
    /// even when the deadline has already passed.
    pub fn search_until(&mut self, board: &Board, deadline: Instant) -> Result<SearchResult> {
        self.iterative_deepening(board, self.config.max_depth, Some(deadline))
    }

    /// A single search at a fixed horizon, without a deadline.
    pub fn search_depth(&mut self, board: &Board, depth: i8) -> Result<SearchResult> {
        if board.is_game_over() {
            return Err(ReversiError::GameOver);
        }
        self.reset();
        let mut work_board = board.clone();
        let depth = depth.max(1);
        let (best_move, score) = self.root_or_first(&mut work_board, depth)?;
        Ok(self.result(best_move, score, depth, false))
    }

    fn iterative_deepening(
        &mut self,
        board: &Board,
        max_depth: i8,
        deadline: Option<Instant>,
    ) -> Result<SearchResult> {
        if board.is_game_over() {
            return Err(ReversiError::GameOver);
        }
        self.reset();
        let mut work_board = board.clone();

        // Depth 1 runs without a deadline so there is always a move
        let (mut best_move, mut score) = self.root_or_first(&mut work_board, 1)?;
        let mut depth = 1;
        let mut timed_out = false;
        debug!(depth, %best_move, score, nodes = self.nodes, "depth complete");

        while depth < max_depth && self.horizon_reached {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                timed_out = true;
                break;
            }
            self.deadline = deadline;
            self.horizon_reached = false;

            match self.search_root(&mut work_board, depth + 1)? {
                Some((mv, s)) => {
                    depth += 1;
                    best_move = mv;
                    score = s;
                    debug!(depth, %best_move, score, nodes = self.nodes, "depth complete");
                }
                None => {
                    debug!(depth = depth + 1, nodes = self.nodes, "deadline reached, iteration discarded");
                    timed_out = true;
                    break;
                }
            }
        }
        self.deadline = None;

        Ok(self.result(best_move, score, depth, timed_out))
    }

    fn reset(&mut self) {
        self.nodes = 0;
        self.stats = SearchStats::default();
        self.deadline = None;
        self.horizon_reached = false;
    }

    fn result(&self, best_move: Move, score: f64, depth: i8, timed_out: bool) -> SearchResult {
        SearchResult {
            best_move,
            score,
            depth,
            nodes: self.nodes,
            timed_out,
            stats: self.stats.clone(),
        }
    }

    /// Root search with no deadline; falls back to the first legal move.
    fn root_or_first(&mut self, board: &mut Board, depth: i8) -> Result<(Move, f64)> {
        self.deadline = None;
        match self.search_root(board, depth)? {
            Some(found) => Ok(found),
            None => Ok((board.legal_moves_to_play()[0], 0.0)),
        }
    }

    #[inline]
    fn out_of_time(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Root-level search with full alpha-beta window.
    ///
    /// Returns the first move with the strictly highest score, or `None`
    /// if the deadline interrupted the iteration.
    fn search_root(&mut self, board: &mut Board, depth: i8) -> Result<Option<(Move, f64)>> {
        let hash = self.zobrist.hash(board);
        let moves = board.legal_moves_to_play();

        let mut alpha = -INF;
        let beta = INF;
        let mut best_score = -INF;
        let mut best_move = moves[0];

        for mv in moves {
            let mut child = board.scoped(mv)?;
            let child_hash = self.zobrist.update_move(hash, mv, child.last_flips());
            let Some(value) = self.negamax(&mut child, child_hash, depth - 1, -beta, -alpha)? else {
                return Ok(None);
            };
            let score = -value;

            if score > best_score {
                best_score = score;
                best_move = mv;
            }
            if score > alpha {
                alpha = score;
            }
        }

        if self.config.use_tt {
            let exhaustive = !self.horizon_reached;
            self.tt.store(
                hash,
                depth,
                best_score,
                EntryType::Exact,
                Some(best_move),
                exhaustive,
            );
        }

        Ok(Some((best_move, best_score)))
    }

    /// Negamax with alpha-beta pruning.
    ///
    /// Returns the value of the position for its side to move, or `None`
    /// once the deadline has passed (the caller abandons the iteration).
    fn negamax(
        &mut self,
        board: &mut Board,
        hash: u64,
        depth: i8,
        mut alpha: f64,
        beta: f64,
    ) -> Result<Option<f64>> {
        if self.out_of_time() {
            return Ok(None);
        }
        self.nodes += 1;

        let side = board.side_to_move();
        if depth <= 0 {
            self.horizon_reached = true;
            return Ok(Some(evaluate(board, side)));
        }

        let moves = board.legal_moves(side);
        if moves[0].is_pass() && !board.has_legal_move(side.opponent()) {
            return Ok(Some(evaluate(board, side)));
        }

        let alpha_orig = alpha;
        if self.config.use_tt {
            self.stats.tt_probes += 1;
            if let Some((score, exhaustive)) = self.tt.probe(hash, depth, alpha, beta) {
                self.stats.tt_score_hits += 1;
                self.horizon_reached |= !exhaustive;
                return Ok(Some(score));
            }
        }

        // Track the horizon for this subtree alone, then merge it back
        let outer_horizon = std::mem::replace(&mut self.horizon_reached, false);
        let mut best_score = -INF;
        let mut best_move = None;

        for (i, mv) in moves.into_iter().enumerate() {
            let mut child = board.scoped(mv)?;
            let child_hash = self.zobrist.update_move(hash, mv, child.last_flips());
            let Some(value) = self.negamax(&mut child, child_hash, depth - 1, -beta, -alpha)? else {
                return Ok(None);
            };
            let score = -value;

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            if score > alpha {
                alpha = score;
            }
            if self.config.pruning && alpha >= beta {
                self.stats.beta_cutoffs += 1;
                if i == 0 {
                    self.stats.first_move_cutoffs += 1;
                }
                break;
            }
        }

        if self.config.use_tt {
            let entry_type = if best_score <= alpha_orig {
                EntryType::UpperBound
            } else if best_score >= beta {
                EntryType::LowerBound
            } else {
                EntryType::Exact
            };
            let exhaustive = !self.horizon_reached;
            self.tt
                .store(hash, depth, best_score, entry_type, best_move, exhaustive);
        }
        self.horizon_reached |= outer_horizon;

        Ok(Some(best_score))
    }

    /// Best move the table remembers for `board`, if any
    #[must_use]
    pub fn cached_best_move(&self, board: &Board) -> Option<Move> {
        self.tt.get_best_move(self.zobrist.hash(board))
    }

    /// Get statistics about the transposition table.
    #[must_use]
    pub fn tt_stats(&self) -> TTStats {
        self.tt.stats()
    }

    /// Clear the transposition table (between games).
    pub fn clear_tt(&mut self) {
        self.tt.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Pos, Stone};
    use std::time::Duration;

    fn small_config() -> SearchConfig {
        SearchConfig::default().with_tt_size(1)
    }

    /// Black can take the (0,0) corner or play quietly at (5,4)
    fn corner_board() -> Board {
        let mut board = Board::empty(8).unwrap();
        board.place_stone(Pos::new(0, 1), Stone::White);
        board.place_stone(Pos::new(0, 2), Stone::Black);
        board.place_stone(Pos::new(5, 5), Stone::White);
        board.place_stone(Pos::new(5, 6), Stone::Black);
        board
    }

    #[test]
    fn test_search_opening_returns_legal_move() {
        let mut searcher = Searcher::new(small_config());
        let board = Board::new(8).unwrap();

        let result = searcher.search(&board, 3).unwrap();
        assert!(board.is_legal(result.best_move));
        assert_eq!(result.depth, 3);
        assert!(result.nodes > 0);
        assert!(!result.timed_out);
    }

    #[test]
    fn test_search_takes_corner() {
        let board = corner_board();
        for depth in 1..=3 {
            let mut searcher = Searcher::new(small_config());
            let result = searcher.search(&board, depth).unwrap();
            assert_eq!(result.best_move, Move::place(Stone::Black, 0, 0));
        }
    }

    #[test]
    fn test_search_leaves_board_untouched() {
        let mut searcher = Searcher::new(small_config());
        let mut board = Board::new(8).unwrap();
        board.apply_move(Move::place(Stone::Black, 2, 3)).unwrap();
        let before = board.clone();

        let _ = searcher.search(&board, 4).unwrap();
        assert!(board.same_position(&before));
        assert_eq!(board.history_len(), 1);
    }

    #[test]
    fn test_search_game_over_is_error() {
        let mut searcher = Searcher::new(small_config());
        let mut board = Board::empty(4).unwrap();
        board.place_stone(Pos::new(0, 0), Stone::Black);

        assert!(matches!(
            searcher.search(&board, 2),
            Err(ReversiError::GameOver)
        ));
    }

    #[test]
    fn test_forced_pass_is_returned() {
        let mut searcher = Searcher::new(small_config());
        let mut board = Board::empty(4).unwrap();
        board.place_stone(Pos::new(0, 0), Stone::Black);
        board.place_stone(Pos::new(0, 1), Stone::White);
        board.set_side_to_move(Stone::White);

        let result = searcher.search(&board, 3).unwrap();
        assert_eq!(result.best_move, Move::pass(Stone::White));
    }

    #[test]
    fn test_pruning_matches_plain_negamax() {
        let mut board = Board::new(6).unwrap();
        for mv in [
            Move::place(Stone::Black, 1, 2),
            Move::place(Stone::White, 1, 1),
        ] {
            board.apply_move(mv).unwrap();
        }

        for depth in 1..=4 {
            let mut pruned = Searcher::new(small_config().with_tt(false));
            let mut plain = Searcher::new(small_config().with_tt(false).with_pruning(false));
            let a = pruned.search_depth(&board, depth).unwrap();
            let b = plain.search_depth(&board, depth).unwrap();
            assert_eq!(a.best_move, b.best_move, "depth {depth}");
            assert_eq!(a.score, b.score, "depth {depth}");
            assert!(a.nodes <= b.nodes);
        }
    }

    #[test]
    fn test_stats_rates() {
        let empty = SearchStats::default();
        assert_eq!(empty.first_move_rate(), 0.0);
        assert_eq!(empty.tt_score_rate(), 0.0);

        let stats = SearchStats {
            beta_cutoffs: 8,
            first_move_cutoffs: 6,
            tt_probes: 20,
            tt_score_hits: 5,
        };
        assert_eq!(stats.first_move_rate(), 75.0);
        assert_eq!(stats.tt_score_rate(), 25.0);

        let mut searcher = Searcher::new(small_config());
        let result = searcher.search(&Board::new(6).unwrap(), 4).unwrap();
        assert!((0.0..=100.0).contains(&result.stats.first_move_rate()));
        assert!((0.0..=100.0).contains(&result.stats.tt_score_rate()));
    }

    #[test]
    fn test_cache_is_transparent() {
        let board = Board::new(6).unwrap();
        let mut cached = Searcher::new(small_config());
        let mut uncached = Searcher::new(small_config().with_tt(false));

        let a = cached.search(&board, 5).unwrap();
        let b = uncached.search(&board, 5).unwrap();
        assert_eq!(a.best_move, b.best_move);
        assert_eq!(a.score, b.score);

        // A second search on the warm table agrees too
        let c = cached.search(&board, 5).unwrap();
        assert_eq!(c.best_move, b.best_move);
        assert_eq!(c.score, b.score);
        assert!(c.stats.tt_score_hits > 0);
    }

    #[test]
    fn test_expired_deadline_still_returns_depth_one() {
        let mut searcher = Searcher::new(small_config());
        let board = Board::new(8).unwrap();
        let deadline = Instant::now();

        let result = searcher.search_until(&board, deadline).unwrap();
        assert_eq!(result.depth, 1);
        assert!(result.timed_out);
        assert!(board.is_legal(result.best_move));
    }

    #[test]
    fn test_deadline_interrupts_deep_search() {
        let mut searcher = Searcher::new(small_config());
        let board = Board::new(8).unwrap();
        let deadline = Instant::now() + Duration::from_millis(50);

        let result = searcher.search_until(&board, deadline).unwrap();
        assert!(result.timed_out);
        assert!(result.depth < 32);
        assert!(board.is_legal(result.best_move));
    }

    #[test]
    fn test_small_board_solved_before_max_depth() {
        // 4x4 games last at most a few dozen plies: deepening stops once
        // no horizon node remains
        let mut searcher = Searcher::new(small_config());
        let mut board = Board::new(4).unwrap();
        board.apply_move(Move::place(Stone::Black, 0, 1)).unwrap();

        let result = searcher.search(&board, 32).unwrap();
        assert!(result.depth < 32);
        assert!(!result.timed_out);
    }

    #[test]
    fn test_cached_best_move_after_search() {
        let mut searcher = Searcher::new(small_config());
        let board = Board::new(8).unwrap();
        let result = searcher.search(&board, 2).unwrap();
        assert_eq!(searcher.cached_best_move(&board), Some(result.best_move));

        searcher.clear_tt();
        assert_eq!(searcher.cached_best_move(&board), None);
        assert_eq!(searcher.tt_stats().used, 0);
    }
}
