//! Search module for the Reversi engine
//!
//! Contains:
//! - Zobrist hashing for position identification
//! - Transposition table for caching search results
//! - Turn-based time allocation
//! - Alpha-Beta search with iterative deepening

pub mod alphabeta;
pub mod time;
pub mod tt;
pub mod zobrist;

pub use alphabeta::{SearchConfig, SearchResult, SearchStats, Searcher};
pub use time::{TimeAllocator, TurnClock};
pub use tt::{EntryType, TTEntry, TTStats, TranspositionTable};
pub use zobrist::ZobristTable;
