//! Reversi (Othello) engine
//!
//! Game state, move generation and two decision procedures for the
//! two-player disc-flipping game on even square boards from 4×4 to 16×16:
//! - Standard 8×8 board by default, Black moves first
//! - A move must flip at least one opposing line; otherwise the player passes
//! - The game ends when neither side can place a disc; most discs wins
//!
//! # Architecture
//!
//! - [`board`]: Board representation with bitboards, move generation, undo
//! - [`rules`]: Flip detection and outcome scoring
//! - [`eval`]: Phase-weighted static evaluation
//! - [`search`]: Negamax alpha-beta with iterative deepening, transposition
//!   table and per-turn time allocation
//! - [`mcts`]: Monte Carlo Tree Search with a persistent, reusable tree
//! - [`agent`]: Players built on the searches
//! - [`game`]: Referee loop for matches and series
//!
//! # Quick Start
//!
//! ```
//! use reversi::{Board, SearchConfig, Searcher};
//!
//! let mut board = Board::new(8).unwrap();
//! let mut searcher = Searcher::new(SearchConfig::default());
//!
//! let result = searcher.search(&board, 3).unwrap();
//! board.apply_move(result.best_move).unwrap();
//! println!("{board}");
//! ```

pub mod agent;
pub mod board;
pub mod error;
pub mod eval;
pub mod game;
pub mod mcts;
pub mod rules;
pub mod search;

// Re-export commonly used types for convenience
pub use agent::{Agent, AlphaBetaAgent, FirstMoveAgent, MctsAgent, RandomAgent};
pub use board::{Board, Move, Pos, Stone, DEFAULT_BOARD_SIZE};
pub use error::{ReversiError, Result};
pub use game::{play_match, play_series, GameRecord, MatchConfig, SeriesResult};
pub use mcts::{MctsConfig, MctsSearcher};
pub use rules::Outcome;
pub use search::{SearchConfig, SearchResult, Searcher, TimeAllocator};
