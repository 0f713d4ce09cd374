//! Turn-based time management
//!
//! [`TimeAllocator`] splits the remaining game time between the turns left,
//! giving earlier turns an exponentially larger share. [`TurnClock`] tracks a
//! player's budget over a game and turns each allocation into a deadline for
//! the search.

use std::time::{Duration, Instant};

/// Exponentially decaying time allocation.
///
/// For `k = turns_remaining - current_turn + 1` turns still to play, the
/// current turn receives
///
/// ```text
/// share = exp(λ·k) / Σ_{i=1..k} exp(λ·i)
/// ```
///
/// of the time left. If every turn spends exactly its allocation, each
/// allocation is `exp(-λ)` times the previous one and the allocations over
/// the remaining turns sum to the time that was left.
#[derive(Debug, Clone, Copy)]
pub struct TimeAllocator {
    /// Decay constant λ
    pub lambda: f64,
    /// Subtracted from each allocation when turning it into a deadline
    pub safety_margin: Duration,
}

impl Default for TimeAllocator {
    fn default() -> Self {
        Self {
            lambda: 0.1,
            safety_margin: Duration::from_millis(10),
        }
    }
}

impl TimeAllocator {
    pub fn new(lambda: f64) -> Self {
        Self {
            lambda,
            ..Self::default()
        }
    }

    pub fn with_safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin = margin;
        self
    }

    /// Fraction of the time left granted to `current_turn` (1-based).
    ///
    /// Always in (0, 1]; the last turn (or any turn past the estimate) gets
    /// everything that is left.
    #[must_use]
    pub fn share(&self, turns_remaining: u32, current_turn: u32) -> f64 {
        let k = (turns_remaining + 1).saturating_sub(current_turn).max(1);
        // Divide through by exp(λ·k) to keep the sum bounded for long games
        let denom: f64 = (1..=k)
            .map(|i| (self.lambda * (i as f64 - k as f64)).exp())
            .sum();
        1.0 / denom
    }

    /// Time the current turn may use, never more than `time_left`
    #[must_use]
    pub fn time_for_turn(
        &self,
        time_left: Duration,
        turns_remaining: u32,
        current_turn: u32,
    ) -> Duration {
        let share = self.share(turns_remaining, current_turn);
        Duration::from_secs_f64(time_left.as_secs_f64() * share).min(time_left)
    }
}

/// A player's game clock: total budget, turns played and the current turn's
/// deadline.
#[derive(Debug, Clone)]
pub struct TurnClock {
    allocator: TimeAllocator,
    remaining: Duration,
    expected_turns: u32,
    turn: u32,
    turn_start: Option<Instant>,
    allocated: Duration,
}

impl TurnClock {
    /// Clock for a game on a board of edge `board_size`.
    ///
    /// A player is expected to make about `4 + size²/2` turns, which
    /// overestimates slightly so the budget is not exhausted early.
    pub fn new(total: Duration, board_size: usize) -> Self {
        Self::with_allocator(total, board_size, TimeAllocator::default())
    }

    pub fn with_allocator(total: Duration, board_size: usize, allocator: TimeAllocator) -> Self {
        Self {
            allocator,
            remaining: total,
            expected_turns: Self::expected_turns(board_size),
            turn: 0,
            turn_start: None,
            allocated: Duration::ZERO,
        }
    }

    /// Estimated number of turns one player makes on a board of edge `size`
    #[inline]
    pub fn expected_turns(size: usize) -> u32 {
        (4 + size * size / 2) as u32
    }

    /// Start a turn: allocate its time and start measuring. Returns the
    /// allocation.
    pub fn start_turn(&mut self) -> Duration {
        self.turn += 1;
        self.allocated = self
            .allocator
            .time_for_turn(self.remaining, self.expected_turns, self.turn);
        self.turn_start = Some(Instant::now());
        self.allocated
    }

    /// Deadline of the current turn, `None` outside a turn
    pub fn deadline(&self) -> Option<Instant> {
        self.turn_start
            .map(|start| start + self.allocated.saturating_sub(self.allocator.safety_margin))
    }

    /// End the current turn and charge the elapsed time. Returns the elapsed time.
    pub fn stop_turn(&mut self) -> Duration {
        let elapsed = self
            .turn_start
            .take()
            .map_or(Duration::ZERO, |start| start.elapsed());
        self.remaining = self.remaining.saturating_sub(elapsed);
        elapsed
    }

    #[inline]
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Turns started so far
    #[inline]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    #[inline]
    pub fn allocated(&self) -> Duration {
        self.allocated
    }
}
