//! Outcome scoring for finished games

use serde::{Deserialize, Serialize};

use crate::board::Stone;

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win(Stone),
    Tie,
}

impl Outcome {
    /// Winning side, if any
    #[inline]
    pub fn winner(self) -> Option<Stone> {
        match self {
            Outcome::Win(side) => Some(side),
            Outcome::Tie => None,
        }
    }

    /// Score in `[0, 1]` from `side`'s perspective: 1 win, 0 loss, 0.5 tie.
    #[inline]
    pub fn reward_for(self, side: Stone) -> f64 {
        match self {
            Outcome::Win(winner) if winner == side => 1.0,
            Outcome::Win(_) => 0.0,
            Outcome::Tie => 0.5,
        }
    }
}

/// Compare disc counts. The side with more discs wins.
#[must_use]
pub fn outcome_of(black: u32, white: u32) -> Outcome {
    match black.cmp(&white) {
        std::cmp::Ordering::Greater => Outcome::Win(Stone::Black),
        std::cmp::Ordering::Less => Outcome::Win(Stone::White),
        std::cmp::Ordering::Equal => Outcome::Tie,
    }
}
