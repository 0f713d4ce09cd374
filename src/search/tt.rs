//! Transposition Table for caching search results
//!
//! The transposition table stores search results indexed by board hash,
//! so a position reached again through a different move order is not
//! searched twice.
//!
//! Entries are only used when they were computed at exactly the requested
//! horizon, which keeps the cache value-transparent: a probe hit returns
//! what a fresh search of that subtree would return. Two distinct positions
//! sharing a 64-bit hash would break this; such collisions are accepted and
//! not detected.
//!
//! # Example
//!
//! ```
//! use reversi::board::{Move, Stone};
//! use reversi::search::{TranspositionTable, EntryType};
//!
//! let mut tt = TranspositionTable::new(1); // 1 MB
//!
//! let hash = 0x123456789ABCDEF0;
//! tt.store(hash, 5, 100.0, EntryType::Exact, Some(Move::place(Stone::Black, 2, 3)), false);
//!
//! assert_eq!(tt.probe(hash, 5, -1000.0, 1000.0), Some((100.0, false)));
//! assert_eq!(tt.probe(hash, 4, -1000.0, 1000.0), None);
//! ```

use crate::board::Move;

/// Entry type for score interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// Exact score - the search completed inside its window
    Exact,
    /// Lower bound - score >= stored value (beta cutoff)
    LowerBound,
    /// Upper bound - score <= stored value (alpha fail-low)
    UpperBound,
}

/// Transposition table entry
#[derive(Debug, Clone, Copy)]
pub struct TTEntry {
    /// Zobrist hash of the position
    pub hash: u64,
    /// Remaining horizon the score was computed with
    pub depth: i8,
    /// Negamax score for the side to move
    pub score: f64,
    /// Type of score (exact, lower bound, upper bound)
    pub entry_type: EntryType,
    /// Best move found for this position
    pub best_move: Option<Move>,
    /// No node below was cut by the horizon: the score holds at any depth
    pub exhaustive: bool,
}

/// Transposition table for caching search results.
///
/// Uses a simple direct-mapped approach where each hash maps to exactly
/// one slot. Collisions are handled by replacement policies based on
/// search depth.
pub struct TranspositionTable {
    entries: Vec<Option<TTEntry>>,
    size: usize,
}

impl TranspositionTable {
    /// Create a new transposition table with the given size in megabytes.
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let entry_size = std::mem::size_of::<Option<TTEntry>>();
        let size = (size_mb * 1024 * 1024) / entry_size;

        // Ensure at least some entries
        let size = size.max(1024);

        Self {
            entries: vec![None; size],
            size,
        }
    }

    #[inline]
    fn slot(&self, hash: u64) -> usize {
        (hash % self.size as u64) as usize
    }

    /// Probe the table for a position.
    ///
    /// Returns the stored score when the entry matches `hash`, was searched
    /// to exactly `depth`, and its bound decides the `(alpha, beta)` window:
    /// exact scores always, lower bounds at or above `beta`, upper bounds at
    /// or below `alpha`. The flag tells whether the stored search was
    /// exhaustive.
    #[must_use]
    pub fn probe(&self, hash: u64, depth: i8, alpha: f64, beta: f64) -> Option<(f64, bool)> {
        let entry = self.entries[self.slot(hash)]?;

        if entry.hash != hash || entry.depth != depth {
            return None;
        }

        let usable = match entry.entry_type {
            EntryType::Exact => true,
            EntryType::LowerBound => entry.score >= beta,
            EntryType::UpperBound => entry.score <= alpha,
        };
        usable.then_some((entry.score, entry.exhaustive))
    }

    /// Best move recorded for a position, whatever its depth.
    #[must_use]
    pub fn get_best_move(&self, hash: u64) -> Option<Move> {
        self.entries[self.slot(hash)].and_then(|e| {
            if e.hash == hash {
                e.best_move
            } else {
                None
            }
        })
    }

    /// Store a position in the table.
    ///
    /// Uses a depth-preferred replacement policy: an entry is replaced if
    /// the slot is empty, contains the same position, or the new search
    /// is at least as deep as the existing entry.
    pub fn store(
        &mut self,
        hash: u64,
        depth: i8,
        score: f64,
        entry_type: EntryType,
        best_move: Option<Move>,
        exhaustive: bool,
    ) {
        let idx = self.slot(hash);

        let should_replace = match &self.entries[idx] {
            None => true,
            Some(e) => e.hash == hash || e.depth <= depth,
        };

        if should_replace {
            self.entries[idx] = Some(TTEntry {
                hash,
                depth,
                score,
                entry_type,
                best_move,
                exhaustive,
            });
        }
    }

    /// Clear all entries in the table.
    ///
    /// Called between games; entries stay valid for the whole of a game.
    pub fn clear(&mut self) {
        self.entries.fill(None);
    }

    /// Get statistics about table usage.
    #[must_use]
    pub fn stats(&self) -> TTStats {
        let used = self.entries.iter().filter(|e| e.is_some()).count();
        TTStats {
            size: self.size,
            used,
            usage_percent: (used as f64 / self.size as f64 * 100.0) as u8,
        }
    }
}

/// Statistics about transposition table usage.
#[derive(Debug, Clone, Copy)]
pub struct TTStats {
    /// Total number of slots in the table
    pub size: usize,
    /// Number of slots currently occupied
    pub used: usize,
    /// Percentage of table in use (0-100)
    pub usage_percent: u8,
}
