//! Phase-weighted heuristic evaluation for Reversi positions
//!
//! The game is split into three phases by the number of discs on the board
//! (scaled to the board area; on 8x8 the boundaries are 20 and 58 discs):
//!
//! | Phase | Weights |
//! |---|---|
//! | opening | 1000·corner + 50·mobility |
//! | midgame | 1000·corner + 20·mobility + 10·disc diff + 100·parity + 500·stability |
//! | endgame | 1000·corner + 100·mobility + 500·disc diff + 500·parity |

use crate::board::{Board, Stone};
use crate::rules::Outcome;

use super::features::{coin_parity, corners, disc_difference, mobility, stability};

/// Score of a finished game won by the evaluated side
pub const WIN_SCORE: f64 = 1000.0;

/// Game phase, decided by the disc count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Opening,
    Midgame,
    Endgame,
}

impl Phase {
    /// Phase of `board`, with the 8x8 thresholds scaled to its area
    pub fn of(board: &Board) -> Phase {
        let cells = (board.size() * board.size()) as f64;
        let total = board.total_discs() as f64;
        if total < 20.0 * cells / 64.0 {
            Phase::Opening
        } else if total <= 58.0 * cells / 64.0 {
            Phase::Midgame
        } else {
            Phase::Endgame
        }
    }
}

/// Evaluate the board from the perspective of `side`.
///
/// Finished games score [`WIN_SCORE`], `-WIN_SCORE` or 0. Otherwise the
/// features are combined with the weights of the current [`Phase`]. The
/// result is antisymmetric: `evaluate(b, Black) == -evaluate(b, White)`.
#[must_use]
pub fn evaluate(board: &Board, side: Stone) -> f64 {
    if let Some(outcome) = board.winner() {
        return terminal_score(outcome, side);
    }

    let corner = corners(board, side);
    let mob = mobility(board, side);

    match Phase::of(board) {
        Phase::Opening => 1000.0 * corner + 50.0 * mob,
        Phase::Midgame => {
            1000.0 * corner
                + 20.0 * mob
                + 10.0 * disc_difference(board, side)
                + 100.0 * coin_parity(board, side)
                + 500.0 * stability(board, side)
        }
        Phase::Endgame => {
            1000.0 * corner
                + 100.0 * mob
                + 500.0 * disc_difference(board, side)
                + 500.0 * coin_parity(board, side)
        }
    }
}

/// Score of a finished game for `side`
#[inline]
pub fn terminal_score(outcome: Outcome, side: Stone) -> f64 {
    match outcome {
        Outcome::Win(winner) if winner == side => WIN_SCORE,
        Outcome::Win(_) => -WIN_SCORE,
        Outcome::Tie => 0.0,
    }
}
