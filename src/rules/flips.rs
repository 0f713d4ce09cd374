//! Flip (capture) rules for Reversi
//!
//! A placement at `pos` flips every contiguous run of opponent discs that
//! starts next to `pos` and is closed by a disc of the placing side, in any
//! of the eight directions. A placement must flip at least one disc.

use crate::board::{Board, Pos, Stone, DIRECTIONS};

/// Find positions that would be flipped if `stone` is placed at `pos`.
///
/// Returns an empty vector when the cell is occupied or no run is closed.
/// Flips are listed direction by direction (in [`DIRECTIONS`] order), each
/// run ordered from `pos` outward.
pub fn collect_flips(board: &Board, pos: Pos, stone: Stone) -> Vec<Pos> {
    let mut flips = Vec::new();
    if !board.is_empty(pos) || stone == Stone::Empty {
        return flips;
    }

    let opponent = stone.opponent();
    let size = board.size();

    for &(dr, dc) in &DIRECTIONS {
        let run_start = flips.len();
        let mut cursor = pos.offset(dr, dc, size);
        let mut closed = false;

        while let Some(p) = cursor {
            match board.get(p) {
                s if s == opponent => {
                    flips.push(p);
                    cursor = p.offset(dr, dc, size);
                }
                s if s == stone => {
                    closed = true;
                    break;
                }
                _ => break,
            }
        }

        if !closed {
            flips.truncate(run_start);
        }
    }

    flips
}

/// Check if placing `stone` at `pos` flips at least one disc.
///
/// Same scan as [`collect_flips`] but stops at the first closed run.
#[inline]
pub fn has_flips(board: &Board, pos: Pos, stone: Stone) -> bool {
    if !board.is_empty(pos) || stone == Stone::Empty {
        return false;
    }

    let opponent = stone.opponent();
    let size = board.size();

    for &(dr, dc) in &DIRECTIONS {
        let mut cursor = pos.offset(dr, dc, size);
        let mut seen_opponent = false;

        while let Some(p) = cursor {
            let s = board.get(p);
            if s == opponent {
                seen_opponent = true;
                cursor = p.offset(dr, dc, size);
            } else {
                if s == stone && seen_opponent {
                    return true;
                }
                break;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_flip_single_disc() {
        let board = Board::new(8).unwrap();
        // Column 3 below (2,3): White (3,3) closed by Black (4,3)
        let flips = collect_flips(&board, Pos::new(2, 3), Stone::Black);
        assert_eq!(flips, vec![Pos::new(3, 3)]);
    }

    #[test]
    fn test_flip_horizontal_run() {
        let mut board = Board::empty(8).unwrap();
        // B _ W W W B on row 0
        board.place_stone(Pos::new(0, 0), Stone::Black);
        board.place_stone(Pos::new(0, 2), Stone::White);
        board.place_stone(Pos::new(0, 3), Stone::White);
        board.place_stone(Pos::new(0, 4), Stone::White);
        board.place_stone(Pos::new(0, 5), Stone::Black);

        let flips = collect_flips(&board, Pos::new(0, 1), Stone::Black);
        assert_eq!(flips, vec![Pos::new(0, 2), Pos::new(0, 3), Pos::new(0, 4)]);
        assert!(has_flips(&board, Pos::new(0, 1), Stone::Black));
    }

    #[test]
    fn test_run_reaching_edge_does_not_flip() {
        let mut board = Board::empty(4).unwrap();
        board.place_stone(Pos::new(0, 1), Stone::White);
        board.place_stone(Pos::new(0, 2), Stone::White);
        board.place_stone(Pos::new(0, 3), Stone::White);

        assert!(collect_flips(&board, Pos::new(0, 0), Stone::Black).is_empty());
        assert!(!has_flips(&board, Pos::new(0, 0), Stone::Black));
    }

    #[test]
    fn test_run_ending_in_empty_does_not_flip() {
        let mut board = Board::empty(8).unwrap();
        board.place_stone(Pos::new(3, 3), Stone::White);
        board.place_stone(Pos::new(4, 4), Stone::White);

        assert!(!has_flips(&board, Pos::new(2, 2), Stone::Black));
    }

    #[test]
    fn test_multiple_directions() {
        let mut board = Board::empty(8).unwrap();
        // Cross around (3,3): W neighbours closed by B in two directions
        board.place_stone(Pos::new(3, 4), Stone::White);
        board.place_stone(Pos::new(3, 5), Stone::Black);
        board.place_stone(Pos::new(4, 4), Stone::White);
        board.place_stone(Pos::new(5, 5), Stone::Black);
        board.place_stone(Pos::new(2, 3), Stone::White); // open run, not flipped

        let flips = collect_flips(&board, Pos::new(3, 3), Stone::Black);
        assert_eq!(flips.len(), 2);
        assert!(flips.contains(&Pos::new(3, 4)));
        assert!(flips.contains(&Pos::new(4, 4)));
        assert!(!flips.contains(&Pos::new(2, 3)));
    }

    #[test]
    fn test_occupied_cell_never_flips() {
        let board = Board::new(8).unwrap();
        assert!(collect_flips(&board, Pos::new(3, 3), Stone::White).is_empty());
        assert!(!has_flips(&board, Pos::new(3, 3), Stone::White));
    }
}
