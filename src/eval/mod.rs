//! Evaluation module for Reversi positions
//!
//! The evaluation combines corner control, mobility, coin parity, disc
//! differential and stability with weights that depend on the game phase.

pub mod features;
pub mod heuristic;

pub use features::{classify_stability, normalize, StabilityCounts};
pub use heuristic::{evaluate, terminal_score, Phase, WIN_SCORE};
