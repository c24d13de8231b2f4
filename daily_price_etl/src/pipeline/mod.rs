//! Run orchestration: one symbol at a time, paced, with throttle backoff.
//!
//! The [`Orchestrator`] drives each symbol through fetch → transform → load
//! and stops the whole run at the first hard failure.

pub mod orchestrator;
pub mod state;

pub use orchestrator::Orchestrator;
pub use state::SymbolState;

use std::time::Duration;

use serde::Serialize;

use crate::models::symbol::Symbol;

/// Timing and retry knobs for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPolicy {
    /// Delay before every symbol after the first.
    pub pacing: Duration,
    /// Fetch attempts per symbol, including the first. Always at least 1.
    pub max_attempts: u32,
    /// Delay between a throttled attempt and the next one.
    pub backoff: Duration,
}

impl RunPolicy {
    pub const DEFAULT_PACING: Duration = Duration::from_secs(15);
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(20);
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self {
            pacing: Self::DEFAULT_PACING,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            backoff: Self::DEFAULT_BACKOFF,
        }
    }
}

/// What happened to one symbol that made it to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolOutcome {
    pub symbol: Symbol,
    pub rows_loaded: usize,
    /// Fetch attempts used, 1 when the first attempt succeeded.
    pub attempts: u32,
    /// Every state the symbol passed through, starting with `pending`.
    pub history: Vec<SymbolState>,
}

/// The result of a run where every symbol was loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub outcomes: Vec<SymbolOutcome>,
}

impl RunSummary {
    pub fn symbols_loaded(&self) -> usize {
        self.outcomes.len()
    }

    pub fn total_rows(&self) -> usize {
        self.outcomes.iter().map(|o| o.rows_loaded).sum()
    }

    /// Attempts beyond the first, summed over all symbols.
    pub fn total_retries(&self) -> u32 {
        self.outcomes.iter().map(|o| o.attempts.saturating_sub(1)).sum()
    }
}
