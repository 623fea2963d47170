//! On-disk configuration layout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Config file contents. Every field is optional so the environment can fill gaps.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FileConfig {
	/// Ledger JSON-RPC endpoint
	pub rpc_url: Option<String>,
	/// Alert threshold in percent
	pub threshold_percent: Option<Decimal>,
	/// Delay between poll cycles
	pub poll_interval_secs: Option<u64>,
	/// Watched symbols, in reporting order
	#[serde(default)]
	pub symbols: Vec<FileSymbol>,
}

/// One `[[symbols]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FileSymbol {
	pub symbol: String,
	/// Aggregator contract address
	pub aggregator: String,
	/// Pair contract address
	pub pool: String,
	/// Token sits in reserve1 instead of reserve0
	#[serde(default)]
	pub invert: bool,
}
