//! Sub-heuristics of the evaluation
//!
//! Each feature returns a score in [-100, 100] from `side`'s perspective,
//! except the disc differential which is a raw signed count.

use crate::board::{Board, Pos, Stone, DIRECTIONS};
use crate::rules::collect_flips;

/// `100 * (p - o) / (p + o)`, or 0 when both are zero.
#[inline]
pub fn normalize(p: f64, o: f64) -> f64 {
    if p + o == 0.0 {
        0.0
    } else {
        100.0 * (p - o) / (p + o)
    }
}

/// Normalised difference in disc counts
pub fn coin_parity(board: &Board, side: Stone) -> f64 {
    normalize(
        board.count(side) as f64,
        board.count(side.opponent()) as f64,
    )
}

/// Normalised difference in placements available (passes count as zero)
pub fn mobility(board: &Board, side: Stone) -> f64 {
    normalize(
        board.mobility(side) as f64,
        board.mobility(side.opponent()) as f64,
    )
}

/// Normalised difference in corners owned
pub fn corners(board: &Board, side: Stone) -> f64 {
    let (mut own, mut other) = (0.0, 0.0);
    let opponent = side.opponent();
    for corner in board.corners() {
        match board.get(corner) {
            s if s == side => own += 1.0,
            s if s == opponent => other += 1.0,
            _ => {}
        }
    }
    normalize(own, other)
}

/// Signed disc difference, `count(side) - count(opponent)`
#[inline]
pub fn disc_difference(board: &Board, side: Stone) -> f64 {
    board.count(side) as f64 - board.count(side.opponent()) as f64
}

/// Classification of one side's discs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StabilityCounts {
    pub stable: u32,
    pub semi_stable: u32,
    pub unstable: u32,
}

impl StabilityCounts {
    /// Stable discs count for the side, discs open to capture against it.
    /// Unstable discs that cannot be taken right away are neutral.
    #[inline]
    pub fn score(&self) -> f64 {
        self.stable as f64 - self.semi_stable as f64
    }
}

/// Classify every disc of `side`.
///
/// Seeds are own discs on completely filled rows and own corners. Stability
/// then spreads from disc to disc through the 8-neighbourhood until no
/// more own discs are reached. Non-stable
/// discs the opponent can flip with a single legal placement are
/// semi-stable; the rest are unstable.
pub fn classify_stability(board: &Board, side: Stone) -> StabilityCounts {
    let Some(own) = board.stones(side) else {
        return StabilityCounts::default();
    };
    let size = board.size();

    let mut seeds = [false; crate::board::MAX_CELLS];
    for r in 0..size as u8 {
        let full = (0..size as u8).all(|c| !board.is_empty(Pos::new(r, c)));
        if full {
            for c in 0..size as u8 {
                let p = Pos::new(r, c);
                if board.get(p) == side {
                    seeds[p.to_index()] = true;
                }
            }
        }
    }
    for corner in board.corners() {
        if board.get(corner) == side {
            seeds[corner.to_index()] = true;
        }
    }

    let mut threatened = [false; crate::board::MAX_CELLS];
    let opponent = side.opponent();
    for pos in board.cells() {
        for flipped in collect_flips(board, pos, opponent) {
            threatened[flipped.to_index()] = true;
        }
    }

    let mut stable = seeds;
    let mut frontier: Vec<Pos> = own.iter_ones().filter(|p| seeds[p.to_index()]).collect();
    while let Some(pos) = frontier.pop() {
        for &(dr, dc) in &DIRECTIONS {
            if let Some(n) = pos.offset(dr, dc, size) {
                if !stable[n.to_index()] && board.get(n) == side {
                    stable[n.to_index()] = true;
                    frontier.push(n);
                }
            }
        }
    }

    let mut counts = StabilityCounts::default();
    for pos in own.iter_ones() {
        if stable[pos.to_index()] {
            counts.stable += 1;
        } else if threatened[pos.to_index()] {
            counts.semi_stable += 1;
        } else {
            counts.unstable += 1;
        }
    }
    counts
}

/// Normalised stability: `100 * (p - o) / (|p| + |o|)` over stable-minus-semi-stable scores
pub fn stability(board: &Board, side: Stone) -> f64 {
    let p = classify_stability(board, side).score();
    let o = classify_stability(board, side.opponent()).score();
    let denom = p.abs() + o.abs();
    if denom == 0.0 {
        0.0
    } else {
        100.0 * (p - o) / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(0.0, 0.0), 0.0);
        assert_eq!(normalize(3.0, 1.0), 50.0);
        assert_eq!(normalize(0.0, 4.0), -100.0);
    }

    #[test]
    fn test_opening_features_are_balanced() {
        let board = Board::new(8).unwrap();
        assert_eq!(coin_parity(&board, Stone::Black), 0.0);
        assert_eq!(mobility(&board, Stone::Black), 0.0);
        assert_eq!(corners(&board, Stone::Black), 0.0);
        assert_eq!(disc_difference(&board, Stone::Black), 0.0);
    }

    #[test]
    fn test_corner_ownership() {
        let mut board = Board::empty(8).unwrap();
        board.place_stone(Pos::new(0, 0), Stone::Black);
        board.place_stone(Pos::new(7, 7), Stone::Black);
        board.place_stone(Pos::new(0, 7), Stone::White);
        let expected = 100.0 * (2.0 - 1.0) / 3.0;
        assert!((corners(&board, Stone::Black) - expected).abs() < 1e-9);
        assert!((corners(&board, Stone::White) + expected).abs() < 1e-9);
    }

    #[test]
    fn test_disc_difference_after_first_move() {
        let mut board = Board::new(8).unwrap();
        board.apply_move(crate::board::Move::place(Stone::Black, 2, 3)).unwrap();
        assert_eq!(disc_difference(&board, Stone::Black), 3.0);
        assert_eq!(disc_difference(&board, Stone::White), -3.0);
        assert_eq!(coin_parity(&board, Stone::Black), 60.0);
    }

    #[test]
    fn test_corner_seeds_neighbours() {
        let mut board = Board::empty(8).unwrap();
        board.place_stone(Pos::new(0, 0), Stone::Black);
        board.place_stone(Pos::new(1, 1), Stone::Black);
        board.place_stone(Pos::new(4, 4), Stone::Black);

        let counts = classify_stability(&board, Stone::Black);
        assert_eq!(counts.stable, 2);
        assert_eq!(counts.unstable, 1);
        assert_eq!(counts.semi_stable, 0);
    }

    #[test]
    fn test_full_row_discs_are_stable() {
        let mut board = Board::empty(4).unwrap();
        for c in 0..4 {
            let stone = if c % 2 == 0 { Stone::Black } else { Stone::White };
            board.place_stone(Pos::new(2, c), stone);
        }
        let black = classify_stability(&board, Stone::Black);
        assert_eq!(black.stable, 2);
        assert_eq!(black.unstable + black.semi_stable, 0);
    }

    #[test]
    fn test_threatened_disc_is_semi_stable() {
        // White can play (3,2) and flip (3,3): X disc at (3,3) between O and empty
        let mut board = Board::empty(8).unwrap();
        board.place_stone(Pos::new(3, 3), Stone::Black);
        board.place_stone(Pos::new(3, 4), Stone::White);

        let counts = classify_stability(&board, Stone::Black);
        assert_eq!(counts.semi_stable, 1);
        assert_eq!(counts.stable, 0);
    }

    #[test]
    fn test_stability_spreads_along_chain() {
        let mut board = Board::empty(8).unwrap();
        for c in 0..4 {
            board.place_stone(Pos::new(0, c), Stone::Black);
        }
        board.place_stone(Pos::new(1, 3), Stone::Black);
        board.place_stone(Pos::new(5, 5), Stone::Black);

        let counts = classify_stability(&board, Stone::Black);
        assert_eq!(counts.stable, 5);
        assert_eq!(counts.unstable, 1);
    }

    #[test]
    fn test_capturable_disc_scores_below_safe_disc() {
        let mut threatened = Board::empty(8).unwrap();
        threatened.place_stone(Pos::new(3, 3), Stone::Black);
        threatened.place_stone(Pos::new(3, 4), Stone::White);

        let mut safe = Board::empty(8).unwrap();
        safe.place_stone(Pos::new(3, 3), Stone::Black);
        safe.place_stone(Pos::new(6, 0), Stone::White);

        let t = classify_stability(&threatened, Stone::Black);
        let s = classify_stability(&safe, Stone::Black);
        assert_eq!(t.semi_stable, 1);
        assert_eq!(s.unstable, 1);
        assert!(s.score() > t.score());
    }

    #[test]
    fn test_stability_is_antisymmetric() {
        let mut board = Board::new(8).unwrap();
        board.apply_move(crate::board::Move::place(Stone::Black, 2, 3)).unwrap();
        let b = stability(&board, Stone::Black);
        let w = stability(&board, Stone::White);
        assert!((b + w).abs() < 1e-9);
    }
}
