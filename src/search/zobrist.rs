//! Zobrist hashing for position identification
//!
//! Zobrist hashing allows O(1) incremental hash updates when a move places a
//! disc and flips a run of opponent discs. It keys the transposition table
//! and lets the MCTS tree check it is still rooted at the position it
//! searches.
//!
//! # Example
//!
//! ```
//! use reversi::board::{Board, Move, Stone};
//! use reversi::search::ZobristTable;
//!
//! let zt = ZobristTable::new();
//! let mut board = Board::new(8).unwrap();
//!
//! let hash1 = zt.hash(&board);
//! let mv = Move::place(Stone::Black, 2, 3);
//! board.apply_move(mv).unwrap();
//!
//! // Incremental update is equivalent to full recomputation
//! let hash_incremental = zt.update_move(hash1, mv, board.last_flips());
//! assert_eq!(hash_incremental, zt.hash(&board));
//! ```

use crate::board::{Board, Move, Pos, Stone, MAX_CELLS};

/// Zobrist hash table for position hashing.
///
/// One random value per (cell, disc colour) plus one for Black to move.
/// Cells are keyed by their fixed-stride index, so the same table serves
/// every board size.
pub struct ZobristTable {
    /// Random values for black discs at each position
    black: [u64; MAX_CELLS],
    /// Random values for white discs at each position
    white: [u64; MAX_CELLS],
    /// Random value XORed when black is to move
    black_to_move: u64,
}

impl ZobristTable {
    /// Create a new Zobrist table with deterministic random values.
    ///
    /// Uses a linear congruential generator (LCG) with a fixed seed
    /// so hashes are reproducible across runs (and across saved trees).
    #[must_use]
    pub fn new() -> Self {
        // Constants from Knuth's MMIX LCG
        let mut seed: u64 = 0x1234_5678_9ABC_DEF0;
        let mut next_rand = || {
            seed = seed
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1);
            seed
        };

        let mut black = [0u64; MAX_CELLS];
        let mut white = [0u64; MAX_CELLS];

        for i in 0..MAX_CELLS {
            black[i] = next_rand();
            white[i] = next_rand();
        }

        Self {
            black,
            white,
            black_to_move: next_rand(),
        }
    }

    /// Compute the full hash for a board position, including the side to move.
    #[must_use]
    pub fn hash(&self, board: &Board) -> u64 {
        let mut h = 0u64;

        if let Some(black) = board.stones(Stone::Black) {
            for pos in black.iter_ones() {
                h ^= self.black[pos.to_index()];
            }
        }
        if let Some(white) = board.stones(Stone::White) {
            for pos in white.iter_ones() {
                h ^= self.white[pos.to_index()];
            }
        }

        if board.side_to_move() == Stone::Black {
            h ^= self.black_to_move;
        }

        h
    }

    #[inline]
    fn key(&self, pos: Pos, stone: Stone) -> u64 {
        match stone {
            Stone::Black => self.black[pos.to_index()],
            Stone::White => self.white[pos.to_index()],
            Stone::Empty => 0,
        }
    }

    /// Incrementally update the hash for a move and the discs it flipped.
    ///
    /// The placed cell gains the mover's key, each flipped cell swaps the
    /// opponent's key for the mover's, and the side to move toggles. A pass
    /// only toggles the side. The same call reverts the update, since XOR
    /// is its own inverse.
    #[inline]
    #[must_use]
    pub fn update_move(&self, hash: u64, mv: Move, flipped: &[Pos]) -> u64 {
        let mut h = hash ^ self.black_to_move;
        if let Move::Place { side, pos } = mv {
            h ^= self.key(pos, side);
            let opponent = side.opponent();
            for &p in flipped {
                h ^= self.key(p, side) ^ self.key(p, opponent);
            }
        }
        h
    }

    /// Toggle the side-to-move component of the hash.
    #[inline]
    #[must_use]
    pub fn toggle_side(&self, hash: u64) -> u64 {
        hash ^ self.black_to_move
    }
}

impl Default for ZobristTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zobrist_side_to_move() {
        let zt = ZobristTable::new();
        let mut board = Board::new(8).unwrap();

        let hash1 = zt.hash(&board);
        board.set_side_to_move(Stone::White);
        let hash2 = zt.hash(&board);

        assert_ne!(hash1, hash2);
        assert_eq!(zt.toggle_side(hash1), hash2);
    }

    #[test]
    fn test_zobrist_empty_board() {
        let zt = ZobristTable::new();
        let board = Board::empty(8).unwrap();
        assert_eq!(zt.hash(&board), zt.black_to_move);
    }

    #[test]
    fn test_zobrist_deterministic() {
        let zt1 = ZobristTable::new();
        let zt2 = ZobristTable::new();
        let board = Board::new(8).unwrap();
        assert_eq!(zt1.hash(&board), zt2.hash(&board));
    }

    #[test]
    fn test_zobrist_incremental_along_a_game() {
        let zt = ZobristTable::new();
        let mut board = Board::new(8).unwrap();
        let mut hash = zt.hash(&board);

        for _ in 0..20 {
            if board.is_game_over() {
                break;
            }
            let moves = board.legal_moves_to_play();
            let mv = moves[moves.len() / 2];
            board.apply_move(mv).unwrap();
            hash = zt.update_move(hash, mv, board.last_flips());
            assert_eq!(hash, zt.hash(&board));
        }
    }

    #[test]
    fn test_zobrist_update_reverts() {
        let zt = ZobristTable::new();
        let mut board = Board::new(8).unwrap();
        let hash = zt.hash(&board);
        let mv = Move::place(Stone::Black, 5, 4);

        board.apply_move(mv).unwrap();
        let flips = board.last_flips().to_vec();
        let after = zt.update_move(hash, mv, &flips);
        board.undo_move().unwrap();

        assert_eq!(zt.update_move(after, mv, &flips), hash);
        assert_eq!(zt.hash(&board), hash);
    }

    #[test]
    fn test_zobrist_pass_toggles_side_only() {
        let zt = ZobristTable::new();
        let mut board = Board::empty(4).unwrap();
        board.place_stone(Pos::new(0, 0), Stone::Black);
        board.place_stone(Pos::new(0, 1), Stone::White);
        board.set_side_to_move(Stone::White);

        let hash = zt.hash(&board);
        let mv = Move::pass(Stone::White);
        board.apply_move(mv).unwrap();
        assert_eq!(zt.update_move(hash, mv, &[]), zt.hash(&board));
    }

    #[test]
    fn test_zobrist_same_position_different_path() {
        let zt = ZobristTable::new();
        let mut board1 = Board::empty(8).unwrap();
        let mut board2 = Board::empty(8).unwrap();

        board1.place_stone(Pos::new(2, 2), Stone::Black);
        board1.place_stone(Pos::new(5, 5), Stone::White);

        board2.place_stone(Pos::new(5, 5), Stone::White);
        board2.place_stone(Pos::new(2, 2), Stone::Black);

        assert_eq!(zt.hash(&board1), zt.hash(&board2));
    }

    #[test]
    fn test_zobrist_different_positions() {
        let zt = ZobristTable::new();
        let mut board1 = Board::new(8).unwrap();
        let mut board2 = Board::new(8).unwrap();

        board1.apply_move(Move::place(Stone::Black, 2, 3)).unwrap();
        board2.apply_move(Move::place(Stone::Black, 3, 2)).unwrap();

        assert_ne!(zt.hash(&board1), zt.hash(&board2));
    }
}
