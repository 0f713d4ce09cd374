//! Referee: drives agents through games and keeps score.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::agent::Agent;
use crate::board::{Board, Move, Stone, DEFAULT_BOARD_SIZE};
use crate::error::Result;
use crate::rules::Outcome;

/// Settings shared by every game of a match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    pub board_size: usize,
    /// Thinking time budget given to each player for a whole game
    pub time_per_player: Duration,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            time_per_player: Duration::from_secs(120),
        }
    }
}

impl MatchConfig {
    pub fn with_board_size(mut self, board_size: usize) -> Self {
        self.board_size = board_size;
        self
    }

    pub fn with_time_per_player(mut self, time: Duration) -> Self {
        self.time_per_player = time;
        self
    }
}

/// How one game went.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub outcome: Outcome,
    pub black_discs: u32,
    pub white_discs: u32,
    /// Every move in order, passes included
    pub moves: Vec<Move>,
    /// Side that lost by playing an illegal move or failing to move
    pub forfeit: Option<Stone>,
    /// Wall time spent choosing moves, (black, white)
    pub time_used: (Duration, Duration),
}

/// Play one game, `black` moving first.
///
/// Each move is checked on the referee board before being played. An agent
/// that errors or proposes an illegal move loses on the spot.
pub fn play_match(
    black: &mut dyn Agent,
    white: &mut dyn Agent,
    config: &MatchConfig,
) -> Result<GameRecord> {
    let mut board = Board::new(config.board_size)?;
    black.start_game(Stone::Black, config.board_size)?;
    white.start_game(Stone::White, config.board_size)?;

    let mut moves = Vec::new();
    let mut time_used = (Duration::ZERO, Duration::ZERO);
    let mut forfeit = None;

    while !board.is_game_over() {
        let side = board.side_to_move();
        let (mover, other): (&mut dyn Agent, &mut dyn Agent) = match side {
            Stone::Black => (&mut *black, &mut *white),
            _ => (&mut *white, &mut *black),
        };

        let start = Instant::now();
        let chosen = mover.choose_move(&board);
        let spent = start.elapsed();
        match side {
            Stone::Black => time_used.0 += spent,
            _ => time_used.1 += spent,
        }

        let mv = match chosen {
            Ok(mv) => mv,
            Err(err) => {
                warn!(agent = mover.name(), ?side, %err, "agent failed to move");
                forfeit = Some(side);
                break;
            }
        };
        let (x, y) = mv.coords();
        match board.move_from_coords(side, x, y) {
            Ok(checked) if checked == mv => {}
            Ok(_) => {
                warn!(agent = mover.name(), ?side, %mv, "move played for the wrong side");
                forfeit = Some(side);
                break;
            }
            Err(err) => {
                warn!(agent = mover.name(), ?side, %mv, %err, "illegal move");
                forfeit = Some(side);
                break;
            }
        }

        board.apply_move(mv)?;
        moves.push(mv);
        debug!(agent = mover.name(), %mv, ply = moves.len(), "move played");

        if let Err(err) = other.opponent_played(mv) {
            warn!(agent = other.name(), %err, "agent could not follow the move");
        }
    }

    let outcome = match forfeit {
        Some(side) => Outcome::Win(side.opponent()),
        None => board.count_outcome(),
    };
    let (black_discs, white_discs) = board.piece_counts();
    black.end_game(outcome);
    white.end_game(outcome);

    info!(
        black = black.name(),
        white = white.name(),
        ?outcome,
        black_discs,
        white_discs,
        black_ms = time_used.0.as_millis() as u64,
        white_ms = time_used.1.as_millis() as u64,
        "game over"
    );

    Ok(GameRecord {
        outcome,
        black_discs,
        white_discs,
        moves,
        forfeit,
        time_used,
    })
}

/// Tally of a series between two agents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesResult {
    pub first_wins: u32,
    pub second_wins: u32,
    pub ties: u32,
    pub games: Vec<GameRecord>,
}

/// Play `games` games, `first` taking Black in even-numbered games and
/// White in odd ones.
pub fn play_series(
    first: &mut dyn Agent,
    second: &mut dyn Agent,
    games: u32,
    config: &MatchConfig,
) -> Result<SeriesResult> {
    let mut result = SeriesResult::default();

    for game in 0..games {
        let first_side = if game % 2 == 0 { Stone::Black } else { Stone::White };
        let record = if first_side == Stone::Black {
            play_match(first, second, config)?
        } else {
            play_match(second, first, config)?
        };

        match record.outcome {
            Outcome::Win(side) if side == first_side => result.first_wins += 1,
            Outcome::Win(_) => result.second_wins += 1,
            Outcome::Tie => result.ties += 1,
        }
        result.games.push(record);
    }

    info!(
        first = first.name(),
        second = second.name(),
        first_wins = result.first_wins,
        second_wins = result.second_wins,
        ties = result.ties,
        "series finished"
    );
    Ok(result)
}
