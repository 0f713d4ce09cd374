//! Board representation for Reversi

pub mod bitboard;
pub mod board;


use serde::{Deserialize, Serialize};

// Re-exports
pub use bitboard::Bitboard;
pub use board::{Board, ScopedMove};

/// Largest supported board edge (16x16)
pub const MAX_BOARD_SIZE: usize = 16;
pub const MAX_CELLS: usize = MAX_BOARD_SIZE * MAX_BOARD_SIZE; // 256

/// Smallest supported board edge
pub const MIN_BOARD_SIZE: usize = 4;

/// Standard Othello board edge
pub const DEFAULT_BOARD_SIZE: usize = 8;

/// The eight compass directions used for flip scanning
pub const DIRECTIONS: [(i32, i32); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Disc colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stone {
    Empty,
    Black,
    White,
}

impl Stone {
    /// Get opponent color
    #[inline]
    pub fn opponent(self) -> Stone {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
            Stone::Empty => Stone::Empty,
        }
    }

    /// Single-character glyph used by the text rendering
    #[inline]
    pub fn glyph(self) -> char {
        match self {
            Stone::Black => 'X',
            Stone::White => 'O',
            Stone::Empty => '.',
        }
    }
}

/// Position on the board.
///
/// Indices use a fixed stride of [`MAX_BOARD_SIZE`] so a position maps to the
/// same bit whatever the edge length of the board it lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    #[inline]
    pub fn new(row: u8, col: u8) -> Self {
        debug_assert!((row as usize) < MAX_BOARD_SIZE && (col as usize) < MAX_BOARD_SIZE);
        Self { row, col }
    }

    #[inline]
    pub fn to_index(self) -> usize {
        self.row as usize * MAX_BOARD_SIZE + self.col as usize
    }

    #[inline]
    pub fn from_index(idx: usize) -> Self {
        Self {
            row: (idx / MAX_BOARD_SIZE) as u8,
            col: (idx % MAX_BOARD_SIZE) as u8,
        }
    }

    /// Check signed coordinates against a board of edge `size`
    #[inline]
    pub fn is_valid(row: i32, col: i32, size: usize) -> bool {
        row >= 0 && row < size as i32 && col >= 0 && col < size as i32
    }

    /// Step `(dr, dc)` away from this position, staying on a board of edge `size`
    #[inline]
    pub fn offset(self, dr: i32, dc: i32, size: usize) -> Option<Pos> {
        let r = self.row as i32 + dr;
        let c = self.col as i32 + dc;
        if Pos::is_valid(r, c, size) {
            Some(Pos::new(r as u8, c as u8))
        } else {
            None
        }
    }
}

impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pos {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_index().cmp(&other.to_index())
    }
}

/// A move: a disc placed by `side`, or the forced pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Move {
    Place { side: Stone, pos: Pos },
    Pass { side: Stone },
}

impl Move {
    #[inline]
    pub fn place(side: Stone, row: u8, col: u8) -> Self {
        Move::Place {
            side,
            pos: Pos::new(row, col),
        }
    }

    #[inline]
    pub fn pass(side: Stone) -> Self {
        Move::Pass { side }
    }

    /// Build a move from wire coordinates, where `(-1, -1)` means pass.
    /// Coordinates must already be on the board; see
    /// [`Board::move_from_coords`] for the checked version.
    pub(crate) fn from_coords(side: Stone, x: i32, y: i32) -> Self {
        if x == -1 && y == -1 {
            Move::Pass { side }
        } else {
            Move::Place {
                side,
                pos: Pos::new(x as u8, y as u8),
            }
        }
    }

    #[inline]
    pub fn side(self) -> Stone {
        match self {
            Move::Place { side, .. } | Move::Pass { side } => side,
        }
    }

    #[inline]
    pub fn pos(self) -> Option<Pos> {
        match self {
            Move::Place { pos, .. } => Some(pos),
            Move::Pass { .. } => None,
        }
    }

    #[inline]
    pub fn is_pass(self) -> bool {
        matches!(self, Move::Pass { .. })
    }

    /// Wire coordinates; a pass is `(-1, -1)`
    #[inline]
    pub fn coords(self) -> (i32, i32) {
        match self {
            Move::Place { pos, .. } => (pos.row as i32, pos.col as i32),
            Move::Pass { .. } => (-1, -1),
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Move::Place { side, pos } => write!(f, "{:?}({}, {})", side, pos.row, pos.col),
            Move::Pass { side } => write!(f, "{:?}(pass)", side),
        }
    }
}
