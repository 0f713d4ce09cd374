//! Board structure with push/pop move history

use std::fmt;
use std::ops::{Deref, DerefMut};

use super::bitboard::Bitboard;
use super::{Move, Pos, Stone, DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::error::{ReversiError, Result};
use crate::rules::{collect_flips, has_flips, outcome_of, Outcome};

/// Game board with move history for exact undo.
///
/// Disc counts are stored alongside the bitboards and always equal their
/// popcounts. Every mutation goes through [`Board::apply_move`] /
/// [`Board::undo_move`] (or [`Board::place_stone`] when setting up a
/// position), so the two never drift.
#[derive(Debug, Clone)]
pub struct Board {
    size: usize,
    black: Bitboard,
    white: Bitboard,
    black_count: u32,
    white_count: u32,
    side_to_move: Stone,
    consecutive_passes: u8,
    history: Vec<MoveRecord>,
}

/// Record of an applied move, enough to reverse it exactly
#[derive(Debug, Clone)]
struct MoveRecord {
    mv: Move,
    flipped: Vec<Pos>,
    passes_before: u8,
}

impl Board {
    /// Create a board of edge `size` with the four starting discs.
    ///
    /// With `m = size / 2`: White on (m-1, m-1) and (m, m), Black on
    /// (m-1, m) and (m, m-1). Black moves first.
    pub fn new(size: usize) -> Result<Self> {
        let mut board = Self::empty(size)?;
        let m = (size / 2) as u8;
        board.place_stone(Pos::new(m - 1, m - 1), Stone::White);
        board.place_stone(Pos::new(m, m), Stone::White);
        board.place_stone(Pos::new(m - 1, m), Stone::Black);
        board.place_stone(Pos::new(m, m - 1), Stone::Black);
        Ok(board)
    }

    /// Create a board with no discs (for setting up positions).
    pub fn empty(size: usize) -> Result<Self> {
        if size % 2 != 0 || !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(ReversiError::InvalidBoardSize(size));
        }
        Ok(Self {
            size,
            black: Bitboard::new(),
            white: Bitboard::new(),
            black_count: 0,
            white_count: 0,
            side_to_move: Stone::Black,
            consecutive_passes: 0,
            history: Vec::with_capacity(size * size),
        })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get disc at position
    #[inline]
    pub fn get(&self, pos: Pos) -> Stone {
        if self.black.get(pos) {
            Stone::Black
        } else if self.white.get(pos) {
            Stone::White
        } else {
            Stone::Empty
        }
    }

    /// Check if position is empty
    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        !self.black.get(pos) && !self.white.get(pos)
    }

    /// Check if position lies on this board
    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        (pos.row as usize) < self.size && (pos.col as usize) < self.size
    }

    /// Put a disc on a cell outside of the move history, keeping counts in sync.
    /// Use `apply_move` for game moves.
    pub fn place_stone(&mut self, pos: Pos, stone: Stone) {
        debug_assert!(self.contains(pos));
        self.remove_stone(pos);
        match stone {
            Stone::Black => {
                self.black.set(pos);
                self.black_count += 1;
            }
            Stone::White => {
                self.white.set(pos);
                self.white_count += 1;
            }
            Stone::Empty => {}
        }
    }

    /// Remove a disc outside of the move history
    pub fn remove_stone(&mut self, pos: Pos) {
        match self.get(pos) {
            Stone::Black => {
                self.black.clear(pos);
                self.black_count -= 1;
            }
            Stone::White => {
                self.white.clear(pos);
                self.white_count -= 1;
            }
            Stone::Empty => {}
        }
    }

    /// Override the side to move (position setup only)
    pub fn set_side_to_move(&mut self, side: Stone) {
        debug_assert!(side != Stone::Empty);
        self.side_to_move = side;
    }

    /// Get bitboard for a color (returns None for Empty)
    #[inline]
    pub fn stones(&self, stone: Stone) -> Option<&Bitboard> {
        match stone {
            Stone::Black => Some(&self.black),
            Stone::White => Some(&self.white),
            Stone::Empty => None,
        }
    }

    /// Number of discs owned by `stone`
    #[inline]
    pub fn count(&self, stone: Stone) -> u32 {
        match stone {
            Stone::Black => self.black_count,
            Stone::White => self.white_count,
            Stone::Empty => (self.size * self.size) as u32 - self.total_discs(),
        }
    }

    /// Disc counts as `(black, white)`
    #[inline]
    pub fn piece_counts(&self) -> (u32, u32) {
        (self.black_count, self.white_count)
    }

    /// Total discs on board
    #[inline]
    pub fn total_discs(&self) -> u32 {
        self.black_count + self.white_count
    }

    #[inline]
    pub fn side_to_move(&self) -> Stone {
        self.side_to_move
    }

    #[inline]
    pub fn consecutive_passes(&self) -> u8 {
        self.consecutive_passes
    }

    /// Number of moves that can be undone
    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Last applied move, if any
    #[inline]
    pub fn last_move(&self) -> Option<Move> {
        self.history.last().map(|r| r.mv)
    }

    /// Discs flipped by the last applied move (empty for a pass)
    #[inline]
    pub fn last_flips(&self) -> &[Pos] {
        self.history.last().map_or(&[], |r| r.flipped.as_slice())
    }

    /// Iterate over every cell of this board in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Pos> + '_ {
        let size = self.size as u8;
        (0..size).flat_map(move |r| (0..size).map(move |c| Pos::new(r, c)))
    }

    /// The four corner cells
    pub fn corners(&self) -> [Pos; 4] {
        let end = (self.size - 1) as u8;
        [
            Pos::new(0, 0),
            Pos::new(0, end),
            Pos::new(end, 0),
            Pos::new(end, end),
        ]
    }

    /// Check whether `side` may play at wire coordinates `(x, y)`.
    ///
    /// `(-1, -1)` is the pass, legal only when `side` has no placement.
    pub fn is_valid_move(&self, side: Stone, x: i32, y: i32) -> bool {
        if x == -1 && y == -1 {
            return !self.has_legal_move(side);
        }
        if !Pos::is_valid(x, y, self.size) {
            return false;
        }
        has_flips(self, Pos::new(x as u8, y as u8), side)
    }

    /// Check a move against this board, ignoring whose turn it is
    pub fn is_legal(&self, mv: Move) -> bool {
        match mv {
            Move::Place { side, pos } => self.contains(pos) && has_flips(self, pos, side),
            Move::Pass { side } => !self.has_legal_move(side),
        }
    }

    /// Does `side` have at least one placement?
    pub fn has_legal_move(&self, side: Stone) -> bool {
        self.cells().any(|pos| has_flips(self, pos, side))
    }

    /// Number of placements available to `side` (a forced pass counts as zero)
    pub fn mobility(&self, side: Stone) -> usize {
        self.cells().filter(|&pos| has_flips(self, pos, side)).count()
    }

    /// All legal moves for `side` in row-major order, or the single pass.
    pub fn legal_moves(&self, side: Stone) -> Vec<Move> {
        let mut moves: Vec<Move> = self
            .cells()
            .filter(|&pos| has_flips(self, pos, side))
            .map(|pos| Move::Place { side, pos })
            .collect();
        if moves.is_empty() {
            moves.push(Move::Pass { side });
        }
        moves
    }

    /// Legal moves for the side to move
    pub fn legal_moves_to_play(&self) -> Vec<Move> {
        self.legal_moves(self.side_to_move)
    }

    /// Validate wire coordinates for the side to move and build the move.
    pub fn move_from_coords(&self, side: Stone, x: i32, y: i32) -> Result<Move> {
        if !(x == -1 && y == -1) && !Pos::is_valid(x, y, self.size) {
            return Err(ReversiError::OutOfBounds { row: x, col: y });
        }
        let mv = Move::from_coords(side, x, y);
        if !self.is_legal(mv) {
            return Err(ReversiError::IllegalMove { side, row: x, col: y });
        }
        Ok(mv)
    }

    /// Apply a move for the side to move.
    ///
    /// Rejected moves (wrong side, off-board, occupied, no flip, or a pass
    /// while a placement exists) leave the board unchanged.
    pub fn apply_move(&mut self, mv: Move) -> Result<()> {
        let side = mv.side();
        if side != self.side_to_move {
            return Err(ReversiError::WrongSide {
                expected: self.side_to_move,
                got: side,
            });
        }

        match mv {
            Move::Pass { side } => {
                if self.has_legal_move(side) {
                    return Err(ReversiError::IllegalMove { side, row: -1, col: -1 });
                }
                self.history.push(MoveRecord {
                    mv,
                    flipped: Vec::new(),
                    passes_before: self.consecutive_passes,
                });
                self.consecutive_passes = self.consecutive_passes.saturating_add(1);
            }
            Move::Place { side, pos } => {
                if !self.contains(pos) {
                    return Err(ReversiError::OutOfBounds {
                        row: pos.row as i32,
                        col: pos.col as i32,
                    });
                }
                let flipped = collect_flips(self, pos, side);
                if flipped.is_empty() {
                    return Err(ReversiError::IllegalMove {
                        side,
                        row: pos.row as i32,
                        col: pos.col as i32,
                    });
                }

                let n = flipped.len() as u32;
                let (own, other) = self.boards_mut(side);
                own.set(pos);
                for &p in &flipped {
                    other.clear(p);
                    own.set(p);
                }
                self.add_counts(side, n + 1, n);

                self.history.push(MoveRecord {
                    mv,
                    flipped,
                    passes_before: self.consecutive_passes,
                });
                self.consecutive_passes = 0;
            }
        }

        self.side_to_move = side.opponent();
        Ok(())
    }

    /// Undo the last applied move, restoring cells, counts, side to move and
    /// the pass counter. Fails with `EmptyHistory` when nothing was played.
    #[must_use = "an empty history means the caller's push/pop discipline is broken"]
    pub fn undo_move(&mut self) -> Result<Move> {
        let record = self.history.pop().ok_or(ReversiError::EmptyHistory)?;
        let mv = record.mv;
        self.revert(record);
        Ok(mv)
    }

    /// Apply `mv` and return a guard that undoes it when dropped.
    ///
    /// The guard derefs to the board, so a recursive search keeps going
    /// through it; moves applied through the guard must be balanced before
    /// it drops.
    pub fn scoped(&mut self, mv: Move) -> Result<ScopedMove<'_>> {
        self.apply_move(mv)?;
        Ok(ScopedMove { board: self })
    }

    /// True when neither side can place a disc.
    pub fn is_game_over(&self) -> bool {
        !self.has_legal_move(self.side_to_move) && !self.has_legal_move(self.side_to_move.opponent())
    }

    /// Result of the game, `None` while it is still in progress
    pub fn winner(&self) -> Option<Outcome> {
        if self.is_game_over() {
            Some(self.count_outcome())
        } else {
            None
        }
    }

    /// Compare disc counts regardless of whether the game has ended
    #[inline]
    pub fn count_outcome(&self) -> Outcome {
        outcome_of(self.black_count, self.white_count)
    }

    /// Same cells, same side to move (history is ignored)
    pub fn same_position(&self, other: &Board) -> bool {
        self.size == other.size
            && self.black == other.black
            && self.white == other.white
            && self.side_to_move == other.side_to_move
    }

    fn revert(&mut self, record: MoveRecord) {
        let side = record.mv.side();
        if let Move::Place { pos, .. } = record.mv {
            let n = record.flipped.len() as u32;
            let (own, other) = self.boards_mut(side);
            own.clear(pos);
            for &p in &record.flipped {
                own.clear(p);
                other.set(p);
            }
            self.sub_counts(side, n + 1, n);
        }
        self.consecutive_passes = record.passes_before;
        self.side_to_move = side;
    }

    /// Undo used by the scoped guard; the guard's own move is always on top.
    fn revert_last(&mut self) {
        if let Some(record) = self.history.pop() {
            self.revert(record);
        }
    }

    /// (own, opponent) bitboards for `side`
    #[inline]
    fn boards_mut(&mut self, side: Stone) -> (&mut Bitboard, &mut Bitboard) {
        match side {
            Stone::White => (&mut self.white, &mut self.black),
            _ => (&mut self.black, &mut self.white),
        }
    }

    #[inline]
    fn add_counts(&mut self, side: Stone, gained: u32, lost: u32) {
        match side {
            Stone::White => {
                self.white_count += gained;
                self.black_count -= lost;
            }
            _ => {
                self.black_count += gained;
                self.white_count -= lost;
            }
        }
    }

    #[inline]
    fn sub_counts(&mut self, side: Stone, gained: u32, lost: u32) {
        match side {
            Stone::White => {
                self.white_count -= gained;
                self.black_count += lost;
            }
            _ => {
                self.black_count -= gained;
                self.white_count += lost;
            }
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        let mut board = Self {
            size: DEFAULT_BOARD_SIZE,
            black: Bitboard::new(),
            white: Bitboard::new(),
            black_count: 0,
            white_count: 0,
            side_to_move: Stone::Black,
            consecutive_passes: 0,
            history: Vec::with_capacity(DEFAULT_BOARD_SIZE * DEFAULT_BOARD_SIZE),
        };
        board.place_stone(Pos::new(3, 3), Stone::White);
        board.place_stone(Pos::new(4, 4), Stone::White);
        board.place_stone(Pos::new(3, 4), Stone::Black);
        board.place_stone(Pos::new(4, 3), Stone::Black);
        board
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.size as u8 {
            for c in 0..self.size as u8 {
                write!(f, "{}", self.get(Pos::new(r, c)).glyph())?;
            }
            writeln!(f)?;
        }
        let next = if self.side_to_move == Stone::Black { "BLACK" } else { "WHITE" };
        writeln!(f, "Next player: {}", next)?;
        writeln!(
            f,
            "{} blacks and {} whites on board",
            self.black_count, self.white_count
        )?;
        write!(f, "(successive pass: {})", self.consecutive_passes)
    }
}

/// A move applied to a board for the lifetime of the guard.
///
/// Dropping the guard undoes the move, so early returns (cutoffs, timeouts)
/// can never leave the shared board modified.
pub struct ScopedMove<'a> {
    board: &'a mut Board,
}

impl Deref for ScopedMove<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for ScopedMove<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for ScopedMove<'_> {
    fn drop(&mut self) {
        self.board.revert_last();
    }
}
