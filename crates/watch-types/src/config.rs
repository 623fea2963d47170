//! Configuration types shared by the loader and the poll loop.

use alloy::primitives::Address;
use rust_decimal::Decimal;
use std::time::Duration;

/// Default deviation threshold, in percent.
pub const DEFAULT_THRESHOLD_PERCENT: Decimal = Decimal::from_parts(10, 0, 0, false, 1);

/// Default delay between poll cycles, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Complete watch configuration, built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchConfig {
	/// Ledger JSON-RPC endpoint.
	pub rpc_url: String,
	/// Symbols to watch, in reporting order.
	pub symbols: Vec<SymbolConfig>,
	/// Threshold and poll interval.
	pub runtime: RuntimeConfig,
}

/// One watched asset: a display name plus the two contracts priced against each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolConfig {
	/// Display name, only used in report lines.
	pub symbol: String,
	/// Chainlink-style aggregator contract.
	pub aggregator: Address,
	/// Uniswap-V2-style pair contract.
	pub pool: Address,
	/// Which pool reserve holds the priced token.
	pub orientation: PoolOrientation,
}

impl SymbolConfig {
	pub fn new(symbol: impl Into<String>, aggregator: Address, pool: Address) -> Self {
		Self {
			symbol: symbol.into(),
			aggregator,
			pool,
			orientation: PoolOrientation::default(),
		}
	}

	pub fn with_orientation(mut self, orientation: PoolOrientation) -> Self {
		self.orientation = orientation;
		self
	}
}

/// Position of the priced token inside a two-asset pool.
///
/// The default assumes reserve0 is the token and reserve1 the numeraire. This is
/// not checked against the pair's actual `token0()`/`token1()` ordering; getting
/// it right for each configured pool is the operator's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolOrientation {
	/// Price is `reserve1 / reserve0`.
	#[default]
	TokenIsReserve0,
	/// Price is `reserve0 / reserve1`.
	TokenIsReserve1,
}

/// Process-wide runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
	/// Deviation at or above this percentage is reported as an alert.
	pub threshold_percent: Decimal,
	/// Delay between the end of one cycle and the start of the next.
	pub poll_interval: Duration,
}

impl Default for RuntimeConfig {
	fn default() -> Self {
		Self {
			threshold_percent: DEFAULT_THRESHOLD_PERCENT,
			poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
		}
	}
}
