//! The poll loop.
//!
//! One cycle visits every configured symbol in order. For each symbol the
//! oracle price is read first, then the pool price; both must be present for
//! a deviation to be computed. Whatever happens to one symbol is reported and
//! the cycle moves on to the next.

use crate::deviation::{evaluate, DeviationError};
use crate::report::{Report, Reporter};
use crate::scheduler::Scheduler;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use watch_chains::ContractReader;
use watch_oracles::{fetch_oracle_price, fetch_pool_price, OracleError};
use watch_types::{
	DeviationResult, OraclePrice, PoolPrice, RuntimeConfig, Status, SymbolConfig, WatchConfig,
};

/// Why a symbol could not be evaluated in a cycle.
#[derive(Debug, Error)]
pub enum SymbolError {
	#[error(transparent)]
	Oracle(#[from] OracleError),
	#[error(transparent)]
	Deviation(#[from] DeviationError),
}

/// Result of evaluating one symbol in one cycle.
#[derive(Debug)]
pub enum SymbolOutcome {
	/// Both prices were read and compared.
	Priced {
		oracle: OraclePrice,
		pool: PoolPrice,
		deviation: DeviationResult,
	},
	/// The pool has an empty reserve, so there is nothing to compare.
	NoReserves,
	/// A remote call or the evaluation failed.
	Failed(SymbolError),
}

/// Drives fetch, evaluate, report and wait for every configured symbol.
pub struct PollLoop<S, R> {
	reader: Arc<dyn ContractReader>,
	symbols: Vec<SymbolConfig>,
	runtime: RuntimeConfig,
	scheduler: S,
	reporter: R,
	max_cycles: Option<u64>,
}

impl<S: Scheduler, R: Reporter> PollLoop<S, R> {
	pub fn new(
		config: &WatchConfig,
		reader: Arc<dyn ContractReader>,
		scheduler: S,
		reporter: R,
	) -> Self {
		Self {
			reader,
			symbols: config.symbols.clone(),
			runtime: config.runtime.clone(),
			scheduler,
			reporter,
			max_cycles: None,
		}
	}

	/// Stops `run` after this many completed cycles.
	pub fn with_max_cycles(mut self, max_cycles: u64) -> Self {
		self.max_cycles = Some(max_cycles);
		self
	}

	pub fn reporter(&self) -> &R {
		&self.reporter
	}

	/// Reports the startup banner.
	pub fn announce(&mut self) {
		self.reporter.report(&Report::Banner {
			threshold_percent: self.runtime.threshold_percent,
		});
	}

	/// Runs cycles until `shutdown` resolves or the cycle limit is reached.
	///
	/// Returns the number of completed cycles. A shutdown arriving mid-cycle
	/// abandons that cycle.
	pub async fn run<F>(&mut self, shutdown: F) -> u64
	where
		F: Future<Output = ()>,
	{
		tokio::pin!(shutdown);
		let mut cycles = 0u64;

		loop {
			tokio::select! {
				biased;
				_ = &mut shutdown => break,
				_ = self.run_cycle() => {}
			}

			cycles += 1;
			if self.max_cycles.is_some_and(|max| cycles >= max) {
				debug!(cycles, "Cycle limit reached");
				return cycles;
			}

			tokio::select! {
				biased;
				_ = &mut shutdown => break,
				_ = self.scheduler.wait(self.runtime.poll_interval) => {}
			}
		}

		info!(cycles, "Shutdown requested, poll loop stopped");
		cycles
	}

	/// Evaluates and reports every symbol once, in configuration order.
	pub async fn run_cycle(&mut self) -> Vec<SymbolOutcome> {
		let mut outcomes = Vec::with_capacity(self.symbols.len());

		for symbol in &self.symbols {
			let outcome = evaluate_symbol(self.reader.as_ref(), symbol, &self.runtime).await;
			report_outcome(&mut self.reporter, symbol, &outcome);
			outcomes.push(outcome);
		}

		self.reporter.report(&Report::CycleEnd);

		let alerts = outcomes
			.iter()
			.filter(|o| {
				matches!(
					o,
					SymbolOutcome::Priced { deviation, .. } if deviation.status == Status::Alert
				)
			})
			.count();
		let failed = outcomes
			.iter()
			.filter(|o| !matches!(o, SymbolOutcome::Priced { .. }))
			.count();
		debug!(symbols = outcomes.len(), alerts, failed, "Poll cycle complete");

		outcomes
	}
}

async fn evaluate_symbol(
	reader: &dyn ContractReader,
	symbol: &SymbolConfig,
	runtime: &RuntimeConfig,
) -> SymbolOutcome {
	match compare_prices(reader, symbol, runtime).await {
		Ok(Some((oracle, pool, deviation))) => SymbolOutcome::Priced {
			oracle,
			pool,
			deviation,
		},
		Ok(None) => SymbolOutcome::NoReserves,
		Err(e) => SymbolOutcome::Failed(e),
	}
}

async fn compare_prices(
	reader: &dyn ContractReader,
	symbol: &SymbolConfig,
	runtime: &RuntimeConfig,
) -> Result<Option<(OraclePrice, PoolPrice, DeviationResult)>, SymbolError> {
	let oracle = fetch_oracle_price(reader, symbol.aggregator).await?;

	let Some(pool) = fetch_pool_price(reader, symbol.pool, symbol.orientation).await? else {
		return Ok(None);
	};

	let deviation = evaluate(oracle, pool, runtime.threshold_percent)?;
	Ok(Some((oracle, pool, deviation)))
}

fn report_outcome<R: Reporter>(reporter: &mut R, symbol: &SymbolConfig, outcome: &SymbolOutcome) {
	let name = symbol.symbol.as_str();

	match outcome {
		SymbolOutcome::Priced {
			oracle,
			pool,
			deviation,
		} => {
			if deviation.status == Status::Alert {
				warn!(
					symbol = name,
					oracle = %oracle.value(),
					pool = %pool.value(),
					deviation_percent = %deviation.deviation_percent,
					"Price deviation at or above threshold"
				);
			}
			reporter.report(&Report::Priced {
				symbol: name,
				oracle: *oracle,
				pool: *pool,
				deviation: *deviation,
			});
		}
		SymbolOutcome::NoReserves => {
			warn!(symbol = name, pool = %symbol.pool, "Pool has an empty reserve");
			reporter.report(&Report::NoReserves { symbol: name });
		}
		SymbolOutcome::Failed(e) => {
			warn!(symbol = name, error = %e, "Failed to evaluate symbol");
			reporter.report(&Report::Failed {
				symbol: name,
				message: e.to_string(),
			});
		}
	}
}
