use tokio::time::sleep;
use tracing::{info, warn};

use crate::errors::Error;
use crate::io::{TableWriter, load_rows};
use crate::models::{symbol::Symbol, table::TableRef};
use crate::pipeline::{RunPolicy, RunSummary, SymbolOutcome, SymbolState};
use crate::providers::SeriesProvider;
use crate::transform::to_rows_now;

/// Sequential fetch → transform → load over a symbol list.
///
/// Symbols are processed strictly one after another. Before every symbol but
/// the first the orchestrator sleeps for [`RunPolicy::pacing`]. A throttle
/// signal from the provider is retried after [`RunPolicy::backoff`] until
/// [`RunPolicy::max_attempts`] is used up; every other error ends the run
/// immediately and later symbols are never attempted.
pub struct Orchestrator<'a> {
    provider: &'a dyn SeriesProvider,
    writer: &'a dyn TableWriter,
    table: &'a TableRef,
    policy: RunPolicy,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        provider: &'a dyn SeriesProvider,
        writer: &'a dyn TableWriter,
        table: &'a TableRef,
        policy: RunPolicy,
    ) -> Self {
        Self {
            provider,
            writer,
            table,
            policy,
        }
    }

    pub async fn run(&self, symbols: &[Symbol]) -> Result<RunSummary, Error> {
        let mut summary = RunSummary::default();

        for (idx, symbol) in symbols.iter().enumerate() {
            if idx > 0 && !self.policy.pacing.is_zero() {
                info!(
                    %symbol,
                    pacing_secs = self.policy.pacing.as_secs_f64(),
                    "pacing before next symbol"
                );
                sleep(self.policy.pacing).await;
            }
            summary.outcomes.push(self.run_symbol(symbol).await?);
        }

        Ok(summary)
    }

    async fn run_symbol(&self, symbol: &Symbol) -> Result<SymbolOutcome, Error> {
        let mut tracker = Tracker::new(symbol);

        let series = loop {
            tracker.attempt += 1;
            tracker.advance(SymbolState::Fetching);

            match self.provider.fetch_daily(symbol).await.map_err(Error::from) {
                Ok(series) => break series,
                Err(err) if err.is_throttle() && tracker.attempt < self.policy.max_attempts => {
                    warn!(
                        %symbol,
                        attempt = tracker.attempt,
                        max_attempts = self.policy.max_attempts,
                        backoff_secs = self.policy.backoff.as_secs_f64(),
                        error = %err,
                        "throttled by upstream, backing off"
                    );
                    tracker.advance(SymbolState::Retrying);
                    sleep(self.policy.backoff).await;
                }
                Err(err) => return Err(tracker.fail(err)),
            }
        };

        let rows = match to_rows_now(symbol, &series) {
            Ok(rows) => rows,
            Err(err) => return Err(tracker.fail(err.into())),
        };

        let rows_loaded = match load_rows(self.writer, self.table, symbol, &rows).await {
            Ok(n) => n,
            Err(err) => return Err(tracker.fail(err.into())),
        };

        tracker.advance(SymbolState::Loaded);
        Ok(SymbolOutcome {
            symbol: symbol.clone(),
            rows_loaded,
            attempts: tracker.attempt,
            history: tracker.history,
        })
    }
}

/// Per-symbol state machine bookkeeping.
struct Tracker<'s> {
    symbol: &'s Symbol,
    state: SymbolState,
    attempt: u32,
    history: Vec<SymbolState>,
}

impl<'s> Tracker<'s> {
    fn new(symbol: &'s Symbol) -> Self {
        info!(%symbol, state = %SymbolState::Pending, attempt = 0, "symbol state");
        Self {
            symbol,
            state: SymbolState::Pending,
            attempt: 0,
            history: vec![SymbolState::Pending],
        }
    }

    fn advance(&mut self, next: SymbolState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        self.state = next;
        self.history.push(next);
        info!(symbol = %self.symbol, state = %next, attempt = self.attempt, "symbol state");
    }

    fn fail(&mut self, err: Error) -> Error {
        self.advance(SymbolState::Failed);
        warn!(
            symbol = %self.symbol,
            attempt = self.attempt,
            kind = err.kind(),
            error = %err,
            "symbol failed, stopping run"
        );
        err
    }
}
