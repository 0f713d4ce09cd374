//! Game rules for Reversi
//!
//! This module implements the rule set:
//! - Flip rules (bracketing runs of opponent discs in eight directions)
//! - Outcome scoring (majority of discs when neither side can move)

pub mod flips;
pub mod outcome;

// Re-exports for convenient access
pub use flips::{collect_flips, has_flips};
pub use outcome::{outcome_of, Outcome};
